pub mod projection;

pub use projection::{
    clamp_probability, cpmm_probability, dpm_probability, state_probability, FeeSchedule,
    ProbabilityProjector, PROB_EPSILON,
};
