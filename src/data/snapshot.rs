use std::fs;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::calibration::{predictions_from_bets, CalibrationInput};
use crate::data::types::{Bet, Group, Market, RawBet, RawGroup, RawMarket, RawUser, User};

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    markets: Vec<RawMarket>,
    #[serde(default)]
    bets: Vec<RawBet>,
    #[serde(default)]
    users: Vec<RawUser>,
    #[serde(default)]
    groups: Vec<RawGroup>,
    #[serde(default)]
    calibration: Option<CalibrationInput>,
}

/// A point-in-time export of backend records, already normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub markets: Vec<Market>,
    pub bets: Vec<Bet>,
    pub users: Vec<User>,
    pub groups: Vec<Group>,
    pub calibration: Option<CalibrationInput>,
}

impl Snapshot {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot file: {}", path))?;

        Self::from_json(&contents).with_context(|| format!("Failed to parse snapshot file: {}", path))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_str(json)?;

        Ok(Self {
            markets: raw.markets.into_iter().map(Market::from).collect(),
            bets: raw.bets.into_iter().filter_map(RawBet::into_bet).collect(),
            users: raw.users.into_iter().map(User::from).collect(),
            groups: raw.groups.into_iter().map(Group::from).collect(),
            calibration: raw.calibration,
        })
    }

    /// Explicit calibration predictions when the snapshot carries them,
    /// otherwise predictions derived from bets on resolved markets.
    pub fn calibration_input(&self) -> CalibrationInput {
        match &self.calibration {
            Some(input) => input.clone(),
            None => predictions_from_bets(&self.bets, &self.markets),
        }
    }

    pub fn bets_for(&self, market_id: &str) -> Vec<Bet> {
        self.bets
            .iter()
            .filter(|b| b.market_id == market_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "markets": [
            {
                "id": "m1",
                "slug": "will-it-rain",
                "question": "Will it rain?",
                "creatorId": "u1",
                "creatorUsername": "alice",
                "createdTime": 1700000000000,
                "mechanism": "cpmm-1",
                "pool": { "YES": 50, "NO": 150 },
                "p": 0.5,
                "resolution": "YES"
            }
        ],
        "bets": [
            { "id": "b1", "contractId": "m1", "createdTime": 1700000100000, "probBefore": 0.5, "probAfter": 0.62, "outcome": "YES", "amount": 20 },
            { "id": "b2", "contractId": "m1", "createdTime": 1700000200000, "probBefore": 0.62, "probAfter": 0.55, "outcome": "NO", "amount": 10 }
        ],
        "users": [ { "id": "u1", "username": "alice" } ]
    }"#;

    #[test]
    fn test_from_json_normalizes_records() {
        let snapshot = Snapshot::from_json(SNAPSHOT).unwrap();
        assert_eq!(snapshot.markets.len(), 1);
        assert!((snapshot.markets[0].probability - 0.75).abs() < 1e-12);
        assert_eq!(snapshot.bets.len(), 2);
        assert_eq!(snapshot.users[0].name, "alice");
        assert!(snapshot.groups.is_empty());
        assert_eq!(snapshot.bets_for("m1").len(), 2);
    }

    #[test]
    fn test_calibration_derived_from_bets_when_absent() {
        let snapshot = Snapshot::from_json(SNAPSHOT).unwrap();
        let input = snapshot.calibration_input();
        assert_eq!(input.yes.len(), 1);
        assert_eq!(input.no.len(), 1);
        assert_eq!(input.yes[0].resolution, 1.0);
    }

    #[test]
    fn test_explicit_calibration_wins() {
        let snapshot = Snapshot::from_json(
            r#"{ "calibration": { "yes": [ { "probability": 0.52, "resolution": 1 } ] } }"#,
        )
        .unwrap();
        let input = snapshot.calibration_input();
        assert_eq!(input.yes.len(), 1);
        assert!(input.no.is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Snapshot::from_json("{ not json").is_err());
    }
}
