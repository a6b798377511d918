use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::time::Duration;

use crate::calibration::{BucketError, Buckets, DEFAULT_POINTS};
use crate::leaderboard::MAX_LEADERBOARD_SIZE;
use crate::pricing::FeeSchedule;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub display: DisplayConfig,
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    pub refresh: RefreshConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    pub domain: String,
    #[serde(default = "default_money_moniker")]
    pub money_moniker: String,
    #[serde(default = "default_house_bot")]
    pub house_bot_username: String,
    /// Amount previewed on swipe cards before the user changes it.
    #[serde(default = "default_swipe_amount")]
    pub swipe_amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalibrationConfig {
    /// Bucket midpoints in percent.
    #[serde(default = "default_points")]
    pub points: Vec<f64>,
    pub chart_width: f64,
    pub output_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardConfig {
    #[serde(default = "default_max_to_show")]
    pub max_to_show: usize,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PricingConfig {
    #[serde(default)]
    pub liquidity_fee_rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    pub interval_secs: u64,
    #[serde(default)]
    pub snapshot_path: Option<String>,
    #[serde(default = "default_user_cache_ttl")]
    pub user_cache_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub csv_logging: bool,
    pub csv_log_path: String,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            max_to_show: default_max_to_show(),
        }
    }
}

fn default_money_moniker() -> String { "M$".to_string() }
fn default_house_bot() -> String { "acc".to_string() }
fn default_swipe_amount() -> f64 { 10.0 }
fn default_points() -> Vec<f64> { DEFAULT_POINTS.to_vec() }
fn default_max_to_show() -> usize { MAX_LEADERBOARD_SIZE }
fn default_user_cache_ttl() -> u64 { 60 }

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub api_url: String,
    pub market_id: Option<String>,
    pub group_slug: Option<String>,
    pub dry_run: bool,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {}", path))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn buckets(&self) -> Result<Buckets, BucketError> {
        Buckets::from_percentages(&self.calibration.points)
    }

    pub fn fee_schedule(&self) -> FeeSchedule {
        FeeSchedule {
            liquidity_fee_rate: self.pricing.liquidity_fee_rate,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs.max(1))
    }

    pub fn user_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh.user_cache_ttl_secs)
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            api_url: std::env::var("MANIFOLD_API_URL")
                .unwrap_or_else(|_| "https://manifold.markets/api/v0".to_string()),
            market_id: std::env::var("MARKET_ID").ok().filter(|s| !s.is_empty()),
            group_slug: std::env::var("GROUP_SLUG").ok().filter(|s| !s.is_empty()),
            dry_run: std::env::var("DRY_RUN")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        })
    }
}
