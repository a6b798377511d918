use tracing::{debug, warn};

use crate::data::types::{Market, MarketState, Pool, Side};

/// Live probabilities approach but never reach the bounds.
pub const PROB_EPSILON: f64 = 1e-6;

pub fn clamp_probability(prob: f64) -> f64 {
    prob.clamp(PROB_EPSILON, 1.0 - PROB_EPSILON)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeeSchedule {
    /// Share of the opposite outcome's probability taken from each bet and
    /// returned to the pool as liquidity.
    pub liquidity_fee_rate: f64,
}

/// Probability of YES implied by a CPMM pool with weight `p`.
pub fn cpmm_probability(pool: &Pool, p: f64) -> f64 {
    (p * pool.no) / ((1.0 - p) * pool.yes + p * pool.no)
}

/// Probability of `side` implied by DPM share totals.
pub fn dpm_probability(total_shares: &Pool, side: Side) -> f64 {
    let square_sum = total_shares.yes.powi(2) + total_shares.no.powi(2);
    total_shares.get(side).powi(2) / square_sum
}

fn is_valid(state: &MarketState) -> bool {
    match state {
        MarketState::Cpmm { pool, p } => {
            pool.yes.is_finite()
                && pool.no.is_finite()
                && pool.yes > 0.0
                && pool.no > 0.0
                && *p > 0.0
                && *p < 1.0
        }
        MarketState::Dpm { total_shares } => {
            total_shares.yes.is_finite()
                && total_shares.no.is_finite()
                && total_shares.yes >= 0.0
                && total_shares.no >= 0.0
                && total_shares.yes + total_shares.no > 0.0
        }
    }
}

/// YES probability implied by a mechanism state, `None` if the state is malformed.
pub fn state_probability(state: &MarketState) -> Option<f64> {
    if !is_valid(state) {
        return None;
    }
    let prob = match state {
        MarketState::Cpmm { pool, p } => cpmm_probability(pool, *p),
        MarketState::Dpm { total_shares } => dpm_probability(total_shares, Side::Yes),
    };
    prob.is_finite().then_some(prob)
}

/// Shares received for buying `side` with `bet`, keeping `y^p * n^(1-p)` constant.
fn cpmm_shares(pool: &Pool, p: f64, bet: f64, side: Side) -> f64 {
    let (y, n) = (pool.yes, pool.no);
    let k = y.powf(p) * n.powf(1.0 - p);
    match side {
        Side::Yes => y + bet - (k * (bet + n).powf(p - 1.0)).powf(1.0 / p),
        Side::No => n + bet - (k * (bet + y).powf(-p)).powf(1.0 / (1.0 - p)),
    }
}

fn cpmm_pool_after(pool: &Pool, p: f64, bet: f64, side: Side) -> Pool {
    let shares = cpmm_shares(pool, p, bet, side);
    match side {
        Side::Yes => Pool::new(pool.yes - shares + bet, pool.no + bet),
        Side::No => Pool::new(pool.yes + bet, pool.no - shares + bet),
    }
}

/// The liquidity fee is added back at the post-trade probability, so it only
/// shrinks the amount that trades against the pool.
fn cpmm_probability_after_bet(pool: &Pool, p: f64, bet: f64, side: Side, fees: &FeeSchedule) -> f64 {
    let fee = if fees.liquidity_fee_rate > 0.0 {
        let prob_before_fees = cpmm_probability(&cpmm_pool_after(pool, p, bet, side), p);
        let bet_p = match side {
            Side::Yes => 1.0 - prob_before_fees,
            Side::No => prob_before_fees,
        };
        fees.liquidity_fee_rate * bet_p * bet
    } else {
        0.0
    };

    cpmm_probability(&cpmm_pool_after(pool, p, bet - fee, side), p)
}

fn dpm_probability_after_bet(total_shares: &Pool, bet: f64, side: Side) -> f64 {
    let square_sum = total_shares.yes.powi(2) + total_shares.no.powi(2);
    let shares = total_shares.get(side);
    let bought = (bet.powi(2) + shares.powi(2) + 2.0 * bet * square_sum.sqrt()).sqrt() - shares;

    let new_shares = match side {
        Side::Yes => Pool::new(total_shares.yes + bought, total_shares.no),
        Side::No => Pool::new(total_shares.yes, total_shares.no + bought),
    };
    dpm_probability(&new_shares, Side::Yes)
}

/// Projects the market probability after a hypothetical bet without touching
/// the market. Every failure path returns the current displayed probability.
#[derive(Debug, Clone, Default)]
pub struct ProbabilityProjector {
    fees: FeeSchedule,
}

impl ProbabilityProjector {
    pub fn new(fees: FeeSchedule) -> Self {
        let rate = fees.liquidity_fee_rate;
        let fees = if (0.0..1.0).contains(&rate) {
            fees
        } else {
            warn!("Ignoring invalid liquidity fee rate {}", rate);
            FeeSchedule::default()
        };
        Self { fees }
    }

    /// YES probability after buying `side` for `amount`.
    pub fn probability_after_bet(&self, market: &Market, side: Side, amount: f64) -> f64 {
        if amount == 0.0 {
            return market.probability;
        }
        if !amount.is_finite() || amount < 0.0 {
            debug!("Bet amount {} for market {} is not projectable", amount, market.id);
            return market.probability;
        }

        let Some(state) = market.state.as_ref().filter(|s| is_valid(s)) else {
            debug!("Market {} has no usable mechanism state", market.id);
            return market.probability;
        };

        let prob = match state {
            MarketState::Cpmm { pool, p } => {
                cpmm_probability_after_bet(pool, *p, amount, side, &self.fees)
            }
            MarketState::Dpm { total_shares } => dpm_probability_after_bet(total_shares, amount, side),
        };

        if prob.is_finite() {
            clamp_probability(prob)
        } else {
            debug!("Projection for market {} was not finite", market.id);
            market.probability
        }
    }

    /// Probability of the bought outcome after the bet (`1 - p` when buying NO).
    pub fn outcome_probability_after_bet(&self, market: &Market, side: Side, amount: f64) -> f64 {
        let prob = self.probability_after_bet(market, side, amount);
        match side {
            Side::Yes => prob,
            Side::No => 1.0 - prob,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::Creator;
    use chrono::Utc;

    fn market(state: Option<MarketState>, probability: f64) -> Market {
        Market {
            id: "m1".to_string(),
            slug: "m1".to_string(),
            question: "Will it happen?".to_string(),
            creator: Creator {
                id: "u1".to_string(),
                username: "alice".to_string(),
                name: "Alice".to_string(),
            },
            created_time: Utc::now(),
            close_time: None,
            probability,
            state,
            cover_image_url: None,
            description: None,
            group_slugs: Vec::new(),
            resolution: None,
        }
    }

    fn cpmm(yes: f64, no: f64, p: f64) -> Market {
        let state = MarketState::Cpmm { pool: Pool::new(yes, no), p };
        let prob = state_probability(&state).unwrap();
        market(Some(state), prob)
    }

    #[test]
    fn test_zero_amount_returns_current_probability() {
        let m = cpmm(120.0, 80.0, 0.5);
        let projector = ProbabilityProjector::default();
        assert_eq!(projector.probability_after_bet(&m, Side::Yes, 0.0), m.probability);
        assert_eq!(projector.probability_after_bet(&m, Side::No, 0.0), m.probability);
    }

    #[test]
    fn test_cpmm_yes_bet_known_value() {
        // k = 100, shares = 200 - 100^2 / 200 = 150, pool -> (50, 200)
        let m = cpmm(100.0, 100.0, 0.5);
        let prob = ProbabilityProjector::default().probability_after_bet(&m, Side::Yes, 100.0);
        assert!((prob - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_cpmm_bets_move_toward_outcome() {
        let m = cpmm(100.0, 300.0, 0.3);
        let projector = ProbabilityProjector::default();
        let yes = projector.probability_after_bet(&m, Side::Yes, 25.0);
        let no = projector.probability_after_bet(&m, Side::No, 25.0);
        assert!(yes > m.probability);
        assert!(no < m.probability);
    }

    #[test]
    fn test_outcome_probability_for_no_is_complement() {
        let m = cpmm(100.0, 100.0, 0.5);
        let projector = ProbabilityProjector::default();
        let prob = projector.probability_after_bet(&m, Side::No, 100.0);
        let outcome = projector.outcome_probability_after_bet(&m, Side::No, 100.0);
        assert!((outcome - (1.0 - prob)).abs() < 1e-12);
        assert!((outcome - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_results_stay_strictly_inside_unit_interval() {
        let projector = ProbabilityProjector::default();
        let markets = [
            cpmm(100.0, 100.0, 0.5),
            cpmm(1.0, 5000.0, 0.9),
            cpmm(5000.0, 1.0, 0.1),
            market(Some(MarketState::Dpm { total_shares: Pool::new(10.0, 0.0) }), 0.99),
        ];
        for m in &markets {
            for amount in [0.01, 1.0, 100.0, 1e6, 1e12] {
                for side in [Side::Yes, Side::No] {
                    let prob = projector.probability_after_bet(m, side, amount);
                    assert!(prob > 0.0 && prob < 1.0, "{} out of range", prob);
                }
            }
        }
    }

    #[test]
    fn test_liquidity_fee_dampens_movement() {
        let m = cpmm(100.0, 100.0, 0.5);
        let free = ProbabilityProjector::default().probability_after_bet(&m, Side::Yes, 100.0);
        let with_fee = ProbabilityProjector::new(FeeSchedule { liquidity_fee_rate: 0.1 })
            .probability_after_bet(&m, Side::Yes, 100.0);
        assert!(with_fee < free);
        assert!(with_fee > m.probability);
    }

    #[test]
    fn test_liquidity_fee_only_reduces_traded_amount() {
        // betP = 1 - 0.770344, fee = 0.1 * betP * 100 = 2.29656
        let m = cpmm(100.0, 300.0, 0.3);
        let prob = ProbabilityProjector::new(FeeSchedule { liquidity_fee_rate: 0.1 })
            .probability_after_bet(&m, Side::Yes, 100.0);
        assert!((prob - 0.766931).abs() < 1e-6, "{}", prob);

        let without_fee = ProbabilityProjector::default().probability_after_bet(&m, Side::Yes, 100.0 - 2.29656);
        assert!((prob - without_fee).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_fee_rate_is_ignored() {
        let m = cpmm(100.0, 100.0, 0.5);
        let prob = ProbabilityProjector::new(FeeSchedule { liquidity_fee_rate: f64::NAN })
            .probability_after_bet(&m, Side::Yes, 100.0);
        assert!((prob - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_dpm_yes_bet() {
        let m = market(
            Some(MarketState::Dpm { total_shares: Pool::new(100.0, 100.0) }),
            0.5,
        );
        let prob = ProbabilityProjector::default().probability_after_bet(&m, Side::Yes, 100.0);
        assert!(prob > 0.8 && prob < 0.85);
    }

    #[test]
    fn test_fail_soft_on_missing_or_malformed_state() {
        let projector = ProbabilityProjector::default();

        let missing = market(None, 0.37);
        assert_eq!(projector.probability_after_bet(&missing, Side::Yes, 50.0), 0.37);

        let malformed = market(
            Some(MarketState::Cpmm { pool: Pool::new(-1.0, 10.0), p: 0.5 }),
            0.42,
        );
        assert_eq!(projector.probability_after_bet(&malformed, Side::Yes, 50.0), 0.42);
        assert!((projector.outcome_probability_after_bet(&malformed, Side::No, 50.0) - 0.58).abs() < 1e-12);
    }

    #[test]
    fn test_fail_soft_on_non_finite_or_negative_amount() {
        let m = cpmm(100.0, 100.0, 0.5);
        let projector = ProbabilityProjector::default();
        for amount in [f64::NAN, f64::INFINITY, -10.0] {
            assert_eq!(projector.probability_after_bet(&m, Side::Yes, amount), m.probability);
        }
    }

    #[test]
    fn test_projection_is_deterministic() {
        let m = cpmm(80.0, 120.0, 0.6);
        let projector = ProbabilityProjector::default();
        let first = projector.probability_after_bet(&m, Side::No, 33.3);
        let second = projector.probability_after_bet(&m, Side::No, 33.3);
        assert_eq!(first, second);
    }
}
