use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::editor::Node;
use crate::pricing::{clamp_probability, state_probability};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Yes,
    No,
}

impl Side {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "YES" => Some(Side::Yes),
            "NO" => Some(Side::No),
            _ => None,
        }
    }
}

/// A point in a chart's data domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Per-outcome amounts: pool balances for CPMM, total shares for DPM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    #[serde(rename = "YES", default)]
    pub yes: f64,
    #[serde(rename = "NO", default)]
    pub no: f64,
}

impl Pool {
    pub fn new(yes: f64, no: f64) -> Self {
        Self { yes, no }
    }

    pub fn get(&self, side: Side) -> f64 {
        match side {
            Side::Yes => self.yes,
            Side::No => self.no,
        }
    }
}

/// Aggregate position state of a binary market, by pricing mechanism.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarketState {
    /// Constant-product market maker with weight `p` on the YES side.
    Cpmm { pool: Pool, p: f64 },
    /// Dynamic parimutuel market.
    Dpm { total_shares: Pool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Yes,
    No,
    /// Resolved to a probability.
    Mkt(f64),
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Creator {
    pub id: String,
    pub username: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    pub id: String,
    pub slug: String,
    pub question: String,
    pub creator: Creator,
    pub created_time: DateTime<Utc>,
    pub close_time: Option<DateTime<Utc>>,
    /// Current displayed probability of YES, always in (0,1).
    pub probability: f64,
    pub state: Option<MarketState>,
    pub cover_image_url: Option<String>,
    /// Rich-text description in editor document form.
    pub description: Option<Node>,
    /// Slugs of the groups the market is listed in.
    pub group_slugs: Vec<String>,
    pub resolution: Option<Resolution>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bet {
    pub id: String,
    pub market_id: String,
    pub created_time: DateTime<Utc>,
    pub prob_before: f64,
    pub prob_after: f64,
    pub outcome: Side,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedScore {
    pub user_id: String,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CachedLeaderboard {
    pub top_traders: Vec<CachedScore>,
    pub top_creators: Vec<CachedScore>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub about: String,
    pub creator_id: String,
    pub cached_leaderboard: CachedLeaderboard,
}

/// Converts backend millisecond timestamps; out-of-range values fall back to the epoch.
pub fn millis_to_utc(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

// Raw records as delivered by the backend. Every field the backend may omit is
// optional here and defaulted exactly once in the conversions below.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMarket {
    pub id: String,
    #[serde(default)]
    pub slug: String,
    pub question: String,
    #[serde(default)]
    pub creator_id: String,
    #[serde(default)]
    pub creator_username: String,
    #[serde(default)]
    pub creator_name: Option<String>,
    #[serde(default)]
    pub created_time: i64,
    #[serde(default)]
    pub close_time: Option<i64>,
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(default)]
    pub mechanism: Option<String>,
    #[serde(default)]
    pub pool: Option<Pool>,
    #[serde(default)]
    pub p: Option<f64>,
    #[serde(default)]
    pub total_shares: Option<Pool>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub description: Option<serde_json::Value>,
    #[serde(default)]
    pub group_slugs: Option<Vec<String>>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub resolution_probability: Option<f64>,
}

impl RawMarket {
    fn state(&self) -> Option<MarketState> {
        match (self.mechanism.as_deref(), self.pool, self.total_shares) {
            (Some("dpm-2"), _, Some(total_shares)) => Some(MarketState::Dpm { total_shares }),
            (Some("cpmm-1") | None, Some(pool), _) => Some(MarketState::Cpmm {
                pool,
                p: self.p.unwrap_or(0.5),
            }),
            _ => None,
        }
    }

    fn resolution(&self) -> Option<Resolution> {
        match self.resolution.as_deref()? {
            "YES" => Some(Resolution::Yes),
            "NO" => Some(Resolution::No),
            "MKT" => self.resolution_probability.map(Resolution::Mkt),
            "CANCEL" => Some(Resolution::Cancel),
            _ => None,
        }
    }
}

/// Descriptions arrive either as an editor document or as plain text.
fn description_node(value: serde_json::Value) -> Option<Node> {
    match value {
        serde_json::Value::String(text) if text.is_empty() => None,
        serde_json::Value::String(text) => serde_json::from_value(serde_json::json!({
            "type": "doc",
            "content": [{ "type": "paragraph", "content": [{ "type": "text", "text": text }] }]
        }))
        .ok(),
        value @ serde_json::Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    }
}

impl From<RawMarket> for Market {
    fn from(raw: RawMarket) -> Self {
        let state = raw.state();
        let resolution = raw.resolution();
        let description = raw.description.and_then(description_node);
        let probability = raw
            .probability
            .filter(|p| p.is_finite())
            .or_else(|| state.as_ref().and_then(state_probability))
            .unwrap_or(0.5);

        Market {
            creator: Creator {
                name: raw
                    .creator_name
                    .unwrap_or_else(|| raw.creator_username.clone()),
                id: raw.creator_id,
                username: raw.creator_username,
            },
            id: raw.id,
            slug: raw.slug,
            question: raw.question,
            created_time: millis_to_utc(raw.created_time),
            close_time: raw.close_time.map(millis_to_utc),
            probability: clamp_probability(probability),
            state,
            cover_image_url: raw.cover_image_url.filter(|url| !url.is_empty()),
            description,
            group_slugs: raw.group_slugs.unwrap_or_default(),
            resolution,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBet {
    pub id: String,
    pub contract_id: String,
    #[serde(default)]
    pub created_time: i64,
    #[serde(default)]
    pub prob_before: Option<f64>,
    #[serde(default)]
    pub prob_after: Option<f64>,
    pub outcome: String,
    #[serde(default)]
    pub amount: f64,
}

impl RawBet {
    /// Bets on anything other than a binary YES/NO outcome are dropped.
    pub fn into_bet(self) -> Option<Bet> {
        let outcome = Side::parse(&self.outcome)?;
        let prob_before = self.prob_before.unwrap_or(0.5);
        let prob_after = self.prob_after.unwrap_or(prob_before);

        Some(Bet {
            id: self.id,
            market_id: self.contract_id,
            created_time: millis_to_utc(self.created_time),
            prob_before: clamp_probability(prob_before),
            prob_after: clamp_probability(prob_after),
            outcome,
            amount: self.amount,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl From<RawUser> for User {
    fn from(raw: RawUser) -> Self {
        User {
            name: raw.name.unwrap_or_else(|| raw.username.clone()),
            id: raw.id,
            username: raw.username,
            avatar_url: raw.avatar_url,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCachedScore {
    pub user_id: String,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCachedLeaderboard {
    #[serde(default)]
    pub top_traders: Vec<RawCachedScore>,
    #[serde(default)]
    pub top_creators: Vec<RawCachedScore>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGroup {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub creator_id: String,
    #[serde(default)]
    pub cached_leaderboard: Option<RawCachedLeaderboard>,
}

fn cached_scores(raw: Vec<RawCachedScore>) -> Vec<CachedScore> {
    raw.into_iter()
        .map(|s| CachedScore {
            user_id: s.user_id,
            score: s.score,
        })
        .collect()
}

impl From<RawGroup> for Group {
    fn from(raw: RawGroup) -> Self {
        let leaderboard = raw.cached_leaderboard.unwrap_or_default();
        Group {
            id: raw.id,
            slug: raw.slug,
            name: raw.name,
            about: raw.about,
            creator_id: raw.creator_id,
            cached_leaderboard: CachedLeaderboard {
                top_traders: cached_scores(leaderboard.top_traders),
                top_creators: cached_scores(leaderboard.top_creators),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpmm_market_from_raw() {
        let raw: RawMarket = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "slug": "will-it-rain",
            "question": "Will it rain?",
            "creatorId": "u1",
            "creatorUsername": "alice",
            "createdTime": 1_700_000_000_000i64,
            "mechanism": "cpmm-1",
            "pool": { "YES": 100.0, "NO": 100.0 },
            "p": 0.5
        }))
        .unwrap();

        let market = Market::from(raw);
        assert_eq!(market.creator.name, "alice");
        assert!((market.probability - 0.5).abs() < 1e-12);
        assert!(matches!(market.state, Some(MarketState::Cpmm { .. })));
        assert!(market.close_time.is_none());
        assert_eq!(market.created_time.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_market_without_state_defaults_to_even_odds() {
        let raw: RawMarket = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "question": "Q?"
        }))
        .unwrap();

        let market = Market::from(raw);
        assert!(market.state.is_none());
        assert_eq!(market.probability, 0.5);
    }

    #[test]
    fn test_explicit_probability_is_clamped() {
        let raw: RawMarket = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "question": "Q?",
            "probability": 1.0,
            "resolution": "MKT",
            "resolutionProbability": 0.7
        }))
        .unwrap();

        let market = Market::from(raw);
        assert!(market.probability < 1.0);
        assert_eq!(market.resolution, Some(Resolution::Mkt(0.7)));
    }

    #[test]
    fn test_plain_text_description_becomes_document() {
        let raw: RawMarket = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "question": "Q?",
            "description": "Resolves YES if it rains."
        }))
        .unwrap();

        let description = Market::from(raw).description.unwrap();
        assert_eq!(description.content[0].content[0].text.as_deref(), Some("Resolves YES if it rains."));
    }

    #[test]
    fn test_group_slugs_default_to_empty() {
        let listed: RawMarket = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "question": "Q?",
            "groupSlugs": ["science", "weather"]
        }))
        .unwrap();
        assert_eq!(Market::from(listed).group_slugs, vec!["science", "weather"]);

        let unlisted: RawMarket = serde_json::from_value(serde_json::json!({ "id": "abc", "question": "Q?" })).unwrap();
        assert!(Market::from(unlisted).group_slugs.is_empty());
    }

    #[test]
    fn test_non_binary_bet_is_dropped() {
        let raw: RawBet = serde_json::from_value(serde_json::json!({
            "id": "b1",
            "contractId": "abc",
            "outcome": "3",
            "amount": 10.0
        }))
        .unwrap();
        assert!(raw.into_bet().is_none());
    }

    #[test]
    fn test_bet_prob_after_falls_back_to_prob_before() {
        let raw: RawBet = serde_json::from_value(serde_json::json!({
            "id": "b1",
            "contractId": "abc",
            "outcome": "NO",
            "probBefore": 0.4,
            "amount": 10.0
        }))
        .unwrap();
        let bet = raw.into_bet().unwrap();
        assert_eq!(bet.outcome, Side::No);
        assert_eq!(bet.prob_after, 0.4);
    }

    #[test]
    fn test_group_without_cached_leaderboard() {
        let raw: RawGroup = serde_json::from_value(serde_json::json!({
            "id": "g1",
            "slug": "science",
            "name": "Science"
        }))
        .unwrap();
        let group = Group::from(raw);
        assert!(group.cached_leaderboard.top_traders.is_empty());
    }
}
