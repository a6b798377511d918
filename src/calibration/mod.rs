pub mod aggregator;
pub mod buckets;

pub use aggregator::{
    aggregate, aggregate_series, predictions_from_bets, CalibrationInput, CalibrationSeries,
    Prediction,
};
pub use buckets::{BucketError, Buckets, DEFAULT_POINTS};
