pub mod group;
pub mod presenter;

pub use group::{
    group_leaderboards, in_group, suggested_filter, to_top_users, GroupLeaderboards, Leaderboard,
    MarketFilter, UserLookup, MAX_LEADERBOARD_SIZE,
};
pub use presenter::{LeaderboardPresenter, LeaderboardRow, ScoreFormat, ScoredUser};
