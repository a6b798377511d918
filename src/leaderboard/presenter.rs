use tracing::debug;

use crate::data::types::User;
use crate::display::format::{format_money, format_raw, MONEY_MONIKER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreFormat {
    /// Currency style, e.g. `M$1,234`.
    Money,
    /// The number as is, e.g. trader counts.
    Raw,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredUser {
    pub user: User,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub user: User,
    pub score: f64,
    pub formatted_score: String,
}

/// Ranks scored users for display. The presenter knows nothing about what a
/// score means; it filters, orders, caps and formats.
#[derive(Debug, Clone)]
pub struct LeaderboardPresenter {
    excluded_usernames: Vec<String>,
    max_to_show: usize,
    format: ScoreFormat,
    money_moniker: String,
}

impl LeaderboardPresenter {
    pub fn new(excluded_usernames: Vec<String>, max_to_show: usize, format: ScoreFormat) -> Self {
        Self {
            excluded_usernames,
            max_to_show,
            format,
            money_moniker: MONEY_MONIKER.to_string(),
        }
    }

    pub fn with_money_moniker(mut self, moniker: impl Into<String>) -> Self {
        self.money_moniker = moniker.into();
        self
    }

    pub fn format_score(&self, score: f64) -> String {
        match self.format {
            ScoreFormat::Money => format_money(score, &self.money_moniker),
            ScoreFormat::Raw => format_raw(score),
        }
    }

    /// Rows sorted by descending score, at most `max_to_show` of them.
    ///
    /// The sort is stable, so equal scores keep the order they were given in.
    /// That tie order is whatever the caller supplied and carries no meaning.
    pub fn present(&self, entries: &[ScoredUser]) -> Vec<LeaderboardRow> {
        let mut ranked: Vec<&ScoredUser> = entries
            .iter()
            .filter(|e| !self.excluded_usernames.iter().any(|name| *name == e.user.username))
            .filter(|e| {
                if e.score.is_nan() {
                    debug!("Dropping leaderboard entry for {} without a score", e.user.username);
                    false
                } else {
                    true
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        ranked
            .into_iter()
            .take(self.max_to_show)
            .enumerate()
            .map(|(i, e)| LeaderboardRow {
                rank: i + 1,
                user: e.user.clone(),
                score: e.score,
                formatted_score: self.format_score(e.score),
            })
            .collect()
    }
}
