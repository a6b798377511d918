use std::fs;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{error, info, warn};

use market_view::calibration::{aggregate_series, Buckets};
use market_view::chart::calibration_chart;
use market_view::chart::svg::to_svg;
use market_view::config::{Config, EnvConfig};
use market_view::data::{DataProvider, Snapshot, SnapshotSource, UserCache};
use market_view::display::{build_swipe_card, contract_url, format_pct, group_url, SwipeCardOptions};
use market_view::editor::NodeViewRegistry;
use market_view::leaderboard::{group_leaderboards, in_group, suggested_filter};
use market_view::monitoring::CsvLogger;
use market_view::pricing::ProbabilityProjector;

/// Everything needed to turn a snapshot into rendered output.
struct Renderer {
    config: Config,
    dry_run: bool,
    buckets: Buckets,
    projector: ProbabilityProjector,
    registry: NodeViewRegistry,
    users: Arc<UserCache>,
    logger: Option<CsvLogger>,
}

impl Renderer {
    fn render(&self, snapshot: &Snapshot) {
        if let Err(e) = self.render_calibration(snapshot) {
            error!("Calibration render failed: {:#}", e);
        }
        self.render_cards(snapshot);
        self.render_groups(snapshot);
    }

    fn render_calibration(&self, snapshot: &Snapshot) -> Result<()> {
        let series = aggregate_series(&snapshot.calibration_input(), &self.buckets);
        let chart = calibration_chart(&series, &self.buckets, self.config.calibration.chart_width);
        info!(
            "📈 Calibration: {} YES points, {} NO points",
            series.yes.len(),
            series.no.len()
        );

        if self.dry_run {
            info!("Dry run: not writing {}", self.config.calibration.output_path);
        } else {
            fs::write(&self.config.calibration.output_path, to_svg(&chart))?;
            info!("Wrote {}", self.config.calibration.output_path);
        }

        if let Some(logger) = &self.logger {
            logger.log_calibration(&series)?;
        }
        Ok(())
    }

    fn render_cards(&self, snapshot: &Snapshot) {
        let now = Utc::now();
        let amount = self.config.display.swipe_amount;
        let options = SwipeCardOptions::default();

        for market in &snapshot.markets {
            let bets = snapshot.bets_for(&market.id);
            let card = build_swipe_card(market, &bets, amount, &self.projector, &self.registry, &options, now);
            info!(
                "🃏 {} | now {} | {} on YES → {} | {} on NO → {} | {}",
                card.question,
                format_pct(card.current_prob),
                amount,
                format_pct(card.yes_prob),
                amount,
                format_pct(card.no_prob),
                card.close_label.as_deref().unwrap_or("no close time"),
            );
            info!("   {}", contract_url(&self.config.display.domain, market));
        }
    }

    fn render_groups(&self, snapshot: &Snapshot) {
        let now = Utc::now();
        let display_config = &self.config.display;

        for group in &snapshot.groups {
            let url = group_url(&display_config.domain, &group.slug);
            let market_count = in_group(group, &snapshot.markets).count();
            let filter = suggested_filter(group, &snapshot.markets, now);
            info!(
                "👥 {} ({}), {} markets, default market filter {:?}",
                group.name, url, market_count, filter
            );

            let boards = group_leaderboards(
                group,
                self.users.as_ref(),
                &display_config.house_bot_username,
                &display_config.money_moniker,
                self.config.leaderboard.max_to_show,
            );

            for board in [&boards.top_traders, &boards.top_creators] {
                info!("{} ({})", board.title, board.header);
                for row in &board.rows {
                    info!("  {:>2}. {} {}", row.rank, row.user.name, row.formatted_score);
                }
                if let Some(logger) = &self.logger {
                    if let Err(e) = logger.log_leaderboard(board) {
                        warn!("Failed to log leaderboard: {:#}", e);
                    }
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("📊 Market view starting...");

    // Load configuration
    let config = Config::load("config.toml")?;
    let env_config = EnvConfig::load()?;

    info!("Dry run mode: {}", env_config.dry_run);
    info!("Refresh interval: {}s", config.refresh_interval().as_secs());

    let buckets = config.buckets()?;
    let projector = ProbabilityProjector::new(config.fee_schedule());
    let users = Arc::new(UserCache::new(config.user_cache_ttl()));

    let source = SnapshotSource::select(
        config.refresh.snapshot_path.clone(),
        &env_config.api_url,
        env_config.market_id.clone(),
        env_config.group_slug.clone(),
    )?;

    let logger = if config.monitoring.csv_logging {
        let logger = CsvLogger::new(config.monitoring.csv_log_path.clone())?;
        logger.log_event("startup")?;
        Some(logger)
    } else {
        None
    };

    let interval = config.refresh_interval();
    let renderer = Renderer {
        config,
        dry_run: env_config.dry_run,
        buckets,
        projector,
        registry: NodeViewRegistry::standard(),
        users: Arc::clone(&users),
        logger,
    };

    let initial = source.load(&users).await?;
    renderer.render(&initial);

    let provider = DataProvider::new(initial);
    let render_task = provider.on_change(move |snapshot: Snapshot| renderer.render(&snapshot));

    info!("✅ Initialized, refreshing every {}s", interval.as_secs());

    let refresher = provider.clone();
    let refresh_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match source.load(&users).await {
                Ok(snapshot) => {
                    if snapshot != refresher.current() {
                        refresher.publish(snapshot);
                    }
                }
                Err(e) => warn!("Refresh failed, keeping previous data: {:#}", e),
            }
        }
    });

    // Keep running
    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    refresh_task.abort();
    drop(provider);
    render_task.abort();

    Ok(())
}
