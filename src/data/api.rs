use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, warn};

use crate::data::cache::UserCache;
use crate::data::types::{Bet, Group, Market, RawBet, RawGroup, RawMarket, RawUser, User};

/// Read-only client for the market backend's public JSON API.
pub struct MarketApiClient {
    client: Client,
    base_url: String,
}

impl MarketApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn market_url(&self, market_id: &str) -> String {
        format!("{}/market/{}", self.base_url, market_id)
    }

    fn bets_url(&self, market_id: &str, limit: usize) -> String {
        format!("{}/bets?contractId={}&limit={}", self.base_url, market_id, limit)
    }

    fn user_url(&self, user_id: &str) -> String {
        format!("{}/user/by-id/{}", self.base_url, user_id)
    }

    fn group_url(&self, slug: &str) -> String {
        format!("{}/group/{}", self.base_url, slug)
    }

    fn group_markets_url(&self, group_id: &str) -> String {
        format!("{}/group/by-id/{}/markets", self.base_url, group_id)
    }

    pub async fn fetch_market(&self, market_id: &str) -> Result<Market> {
        let raw: RawMarket = self
            .client
            .get(self.market_url(market_id))
            .send()
            .await
            .with_context(|| format!("Failed to fetch market {}", market_id))?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse market response")?;

        Ok(Market::from(raw))
    }

    /// Most recent binary bets on a market, newest first as the backend returns them.
    pub async fn fetch_bets(&self, market_id: &str, limit: usize) -> Result<Vec<Bet>> {
        let raw: Vec<RawBet> = self
            .client
            .get(self.bets_url(market_id, limit))
            .send()
            .await
            .with_context(|| format!("Failed to fetch bets for {}", market_id))?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse bets response")?;

        let total = raw.len();
        let bets: Vec<Bet> = raw.into_iter().filter_map(RawBet::into_bet).collect();
        if bets.len() < total {
            debug!("Dropped {} non-binary bets on {}", total - bets.len(), market_id);
        }
        Ok(bets)
    }

    pub async fn fetch_user(&self, user_id: &str) -> Result<User> {
        let raw: RawUser = self
            .client
            .get(self.user_url(user_id))
            .send()
            .await
            .with_context(|| format!("Failed to fetch user {}", user_id))?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse user response")?;

        Ok(User::from(raw))
    }

    pub async fn fetch_group(&self, slug: &str) -> Result<Group> {
        let raw: RawGroup = self
            .client
            .get(self.group_url(slug))
            .send()
            .await
            .with_context(|| format!("Failed to fetch group {}", slug))?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse group response")?;

        Ok(Group::from(raw))
    }

    /// Markets listed in a group. The group's slug is added to each market's
    /// memberships when the backend leaves it out.
    pub async fn fetch_group_markets(&self, group: &Group) -> Result<Vec<Market>> {
        let raw: Vec<RawMarket> = self
            .client
            .get(self.group_markets_url(&group.id))
            .send()
            .await
            .with_context(|| format!("Failed to fetch markets for group {}", group.slug))?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse group markets response")?;

        Ok(raw
            .into_iter()
            .map(|raw| {
                let mut market = Market::from(raw);
                if !market.group_slugs.contains(&group.slug) {
                    market.group_slugs.push(group.slug.clone());
                }
                market
            })
            .collect())
    }

    /// Makes sure every id is in the cache, fetching the ones that are not.
    /// Users that cannot be fetched are skipped and stay unresolved.
    pub async fn warm_users(&self, user_ids: &[String], cache: &UserCache) {
        for user_id in user_ids {
            if cache.get(user_id).is_some() {
                continue;
            }
            match self.fetch_user(user_id).await {
                Ok(user) => cache.insert(user),
                Err(e) => warn!("Could not resolve user {}: {:#}", user_id, e),
            }
        }
    }
}
