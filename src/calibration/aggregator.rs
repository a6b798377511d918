use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calibration::buckets::Buckets;
use crate::data::types::{Bet, Market, Point, Resolution, Side};

/// A final prediction and how the market actually resolved (1.0 = YES).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub probability: f64,
    pub resolution: f64,
}

impl Prediction {
    pub fn new(probability: f64, resolution: f64) -> Self {
        Self { probability, resolution }
    }

    fn is_valid(&self) -> bool {
        self.probability.is_finite()
            && self.resolution.is_finite()
            && (0.0..=1.0).contains(&self.probability)
            && (0.0..=1.0).contains(&self.resolution)
    }
}

/// Predictions split by the side they favored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CalibrationInput {
    #[serde(default)]
    pub yes: Vec<Prediction>,
    #[serde(default)]
    pub no: Vec<Prediction>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationSeries {
    pub yes: Vec<Point>,
    pub no: Vec<Point>,
}

/// Groups predictions into their nearest bucket and returns one
/// `(midpoint, mean resolution)` point per non-empty bucket, in ascending
/// midpoint order. Empty buckets produce no point.
pub fn aggregate(predictions: &[Prediction], buckets: &Buckets) -> Vec<Point> {
    let mut bins: Vec<Vec<f64>> = vec![Vec::new(); buckets.len()];
    let mut skipped = 0usize;

    for prediction in predictions {
        if !prediction.is_valid() {
            skipped += 1;
            continue;
        }
        bins[buckets.nearest(prediction.probability)].push(prediction.resolution);
    }

    if skipped > 0 {
        debug!("Skipped {} malformed calibration predictions", skipped);
    }

    buckets
        .midpoints()
        .iter()
        .zip(bins)
        .filter_map(|(&midpoint, mut values)| {
            if values.is_empty() {
                return None;
            }
            // Summing in sorted order keeps the mean independent of input order
            values.sort_by(f64::total_cmp);
            let frequency = values.iter().sum::<f64>() / values.len() as f64;
            Some(Point::new(midpoint, frequency))
        })
        .collect()
}

pub fn aggregate_series(input: &CalibrationInput, buckets: &Buckets) -> CalibrationSeries {
    CalibrationSeries {
        yes: aggregate(&input.yes, buckets),
        no: aggregate(&input.no, buckets),
    }
}

fn resolution_indicator(resolution: &Resolution) -> Option<f64> {
    match resolution {
        Resolution::Yes => Some(1.0),
        Resolution::No => Some(0.0),
        Resolution::Mkt(prob) => Some(*prob),
        Resolution::Cancel => None,
    }
}

/// Turns bets on resolved markets into predictions, one cohort per bet side.
/// Bets on unresolved or cancelled markets are ignored.
pub fn predictions_from_bets(bets: &[Bet], markets: &[Market]) -> CalibrationInput {
    let resolutions: HashMap<&str, f64> = markets
        .iter()
        .filter_map(|m| {
            let indicator = resolution_indicator(m.resolution.as_ref()?)?;
            Some((m.id.as_str(), indicator))
        })
        .collect();

    let mut input = CalibrationInput::default();
    for bet in bets {
        let Some(&indicator) = resolutions.get(bet.market_id.as_str()) else {
            continue;
        };
        let prediction = Prediction::new(bet.prob_after, indicator);
        match bet.outcome {
            Side::Yes => input.yes.push(prediction),
            Side::No => input.no.push(prediction),
        }
    }
    input
}
