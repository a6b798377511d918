use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::data::types::{CachedScore, Group, Market, User};
use crate::leaderboard::presenter::{LeaderboardPresenter, LeaderboardRow, ScoreFormat, ScoredUser};

pub const MAX_LEADERBOARD_SIZE: usize = 50;

/// Below this many open markets a group page lists every market by default.
const MIN_OPEN_MARKETS: usize = 5;

/// Resolves user ids to users. Implemented by plain maps and by the user cache.
pub trait UserLookup {
    fn lookup(&self, user_id: &str) -> Option<User>;
}

impl UserLookup for HashMap<String, User> {
    fn lookup(&self, user_id: &str) -> Option<User> {
        self.get(user_id).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketFilter {
    Open,
    All,
}

pub fn in_group<'a>(group: &'a Group, markets: &'a [Market]) -> impl Iterator<Item = &'a Market> {
    markets
        .iter()
        .filter(move |m| m.group_slugs.iter().any(|slug| *slug == group.slug))
}

/// Default market filter for a group page, counting only the group's own
/// markets that close after `now`.
pub fn suggested_filter(group: &Group, markets: &[Market], now: DateTime<Utc>) -> MarketFilter {
    let open = in_group(group, markets)
        .filter(|m| m.close_time.map_or(false, |t| t > now))
        .count();
    if open < MIN_OPEN_MARKETS {
        MarketFilter::All
    } else {
        MarketFilter::Open
    }
}

/// Cached `(user id, score)` entries resolved to users, in cached order.
/// Ids that no longer resolve are dropped; a missing score counts as zero.
pub fn to_top_users(cached: &[CachedScore], users: &impl UserLookup) -> Vec<ScoredUser> {
    cached
        .iter()
        .filter_map(|entry| {
            let Some(user) = users.lookup(&entry.user_id) else {
                debug!("Leaderboard user {} not found", entry.user_id);
                return None;
            };
            Some(ScoredUser {
                user,
                score: entry.score.unwrap_or(0.0),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    pub title: String,
    pub header: String,
    pub rows: Vec<LeaderboardRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupLeaderboards {
    pub top_traders: Leaderboard,
    pub top_creators: Leaderboard,
}

/// The two leaderboards on a group page: traders by profit and creators by
/// number of traders, both without the house account.
pub fn group_leaderboards(
    group: &Group,
    users: &impl UserLookup,
    house_bot_username: &str,
    money_moniker: &str,
    max_to_show: usize,
) -> GroupLeaderboards {
    let excluded = vec![house_bot_username.to_string()];
    let traders = LeaderboardPresenter::new(excluded.clone(), max_to_show, ScoreFormat::Money)
        .with_money_moniker(money_moniker);
    let creators = LeaderboardPresenter::new(excluded, max_to_show, ScoreFormat::Raw);

    let top_traders = to_top_users(&group.cached_leaderboard.top_traders, users);
    let top_creators = to_top_users(&group.cached_leaderboard.top_creators, users);

    GroupLeaderboards {
        top_traders: Leaderboard {
            title: "🏅 Top traders".to_string(),
            header: "Profit".to_string(),
            rows: traders.present(&top_traders),
        },
        top_creators: Leaderboard {
            title: "🏅 Top creators".to_string(),
            header: "Number of traders".to_string(),
            rows: creators.present(&top_creators),
        },
    }
}
