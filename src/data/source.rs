use anyhow::{bail, Result};
use tracing::{info, warn};

use crate::data::api::MarketApiClient;
use crate::data::cache::UserCache;
use crate::data::snapshot::Snapshot;
use crate::data::types::Market;

const BET_LIMIT: usize = 1000;

/// Where refreshed snapshots come from.
pub enum SnapshotSource {
    File(String),
    Api {
        client: MarketApiClient,
        market_id: Option<String>,
        group_slug: Option<String>,
    },
}

impl SnapshotSource {
    /// A configured snapshot file wins over the live API.
    pub fn select(
        snapshot_path: Option<String>,
        api_url: &str,
        market_id: Option<String>,
        group_slug: Option<String>,
    ) -> Result<Self> {
        if let Some(path) = snapshot_path {
            return Ok(SnapshotSource::File(path));
        }
        if market_id.is_none() && group_slug.is_none() {
            bail!("No snapshot_path configured and neither MARKET_ID nor GROUP_SLUG is set");
        }
        Ok(SnapshotSource::Api {
            client: MarketApiClient::new(api_url.to_string()),
            market_id,
            group_slug,
        })
    }

    /// Loads a fresh snapshot and makes sure every user it references is in
    /// `users`.
    pub async fn load(&self, users: &UserCache) -> Result<Snapshot> {
        match self {
            SnapshotSource::File(path) => {
                let snapshot = Snapshot::load(path)?;
                for user in &snapshot.users {
                    users.insert(user.clone());
                }
                info!(
                    "Loaded snapshot {}: {} markets, {} bets, {} groups",
                    path,
                    snapshot.markets.len(),
                    snapshot.bets.len(),
                    snapshot.groups.len()
                );
                Ok(snapshot)
            }
            SnapshotSource::Api {
                client,
                market_id,
                group_slug,
            } => {
                let mut snapshot = Snapshot::default();

                if let Some(id) = market_id {
                    snapshot.markets.push(client.fetch_market(id).await?);
                    snapshot.bets = client.fetch_bets(id, BET_LIMIT).await?;
                }

                if let Some(slug) = group_slug {
                    match client.fetch_group(slug).await {
                        Ok(group) => {
                            let board = &group.cached_leaderboard;
                            let ids: Vec<String> = board
                                .top_traders
                                .iter()
                                .chain(&board.top_creators)
                                .map(|entry| entry.user_id.clone())
                                .collect();
                            client.warm_users(&ids, users).await;

                            match client.fetch_group_markets(&group).await {
                                Ok(markets) => merge_markets(&mut snapshot.markets, markets),
                                Err(e) => warn!("No markets for group {}: {:#}", slug, e),
                            }
                            snapshot.groups.push(group);
                        }
                        Err(e) => warn!("Skipping group {}: {:#}", slug, e),
                    }
                }

                info!(
                    "Fetched {} markets and {} bets from the API",
                    snapshot.markets.len(),
                    snapshot.bets.len()
                );
                Ok(snapshot)
            }
        }
    }
}

/// Adds `incoming` markets not already present, merging group memberships
/// into markets that are.
fn merge_markets(markets: &mut Vec<Market>, incoming: Vec<Market>) {
    for market in incoming {
        match markets.iter_mut().find(|m| m.id == market.id) {
            Some(existing) => {
                for slug in market.group_slugs {
                    if !existing.group_slugs.contains(&slug) {
                        existing.group_slugs.push(slug);
                    }
                }
            }
            None => markets.push(market),
        }
    }
}
