use chrono::{DateTime, Utc};

use crate::chart::{probability_history_chart, Chart};
use crate::data::types::{Bet, Market, Side};
use crate::display::links::contract_path;
use crate::display::time::from_now;
use crate::editor::NodeViewRegistry;
use crate::pricing::ProbabilityProjector;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeCardOptions {
    /// Compact cards skip the history chart.
    pub small: bool,
    pub chart_width: f64,
    pub chart_height: f64,
}

impl Default for SwipeCardOptions {
    fn default() -> Self {
        Self {
            small: false,
            chart_width: 320.0,
            chart_height: 100.0,
        }
    }
}

/// Everything a swipeable market card displays for a given bet amount.
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeCard {
    pub market_id: String,
    pub question: String,
    pub creator_name: String,
    pub creator_path: String,
    pub path: String,
    pub image_url: String,
    pub close_label: Option<String>,
    /// Description rendered through the node view registry, empty if absent.
    pub description_html: String,
    pub current_prob: f64,
    /// Market probability if the amount were bet on YES.
    pub yes_prob: f64,
    /// Market probability if the amount were bet on NO.
    pub no_prob: f64,
    pub chart: Option<Chart>,
}

/// Stable placeholder picture for markets without a cover image, derived from
/// the leading base-36 digits of the market id.
pub fn fallback_image_url(market_id: &str) -> String {
    let index = market_id
        .chars()
        .map_while(|c| c.to_digit(36))
        .fold(0u64, |acc, d| (acc * 36 + d as u64) % 1000);
    format!("https://picsum.photos/id/{}/512", index)
}

pub fn build_swipe_card(
    market: &Market,
    bets: &[Bet],
    amount: f64,
    projector: &ProbabilityProjector,
    registry: &NodeViewRegistry,
    options: &SwipeCardOptions,
    now: DateTime<Utc>,
) -> SwipeCard {
    let chart = (!options.small).then(|| {
        probability_history_chart(
            market,
            bets,
            options.chart_width,
            options.chart_height,
            now,
            "white",
        )
    });

    SwipeCard {
        market_id: market.id.clone(),
        question: market.question.clone(),
        creator_name: market.creator.name.clone(),
        creator_path: format!("/{}", market.creator.username),
        path: contract_path(market),
        image_url: market
            .cover_image_url
            .clone()
            .unwrap_or_else(|| fallback_image_url(&market.id)),
        close_label: market
            .close_time
            .map(|t| format!("trading closes {}", from_now(t, now))),
        description_html: market
            .description
            .as_ref()
            .map(|doc| registry.render(doc))
            .unwrap_or_default(),
        current_prob: market.probability,
        yes_prob: projector.outcome_probability_after_bet(market, Side::Yes, amount),
        no_prob: 1.0 - projector.outcome_probability_after_bet(market, Side::No, amount),
        chart,
    }
}
