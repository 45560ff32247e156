//! # Spurt / Stamina Model
//!
//! Coefficient tables and the per-participant classifier.

pub mod coefficients;
pub mod spurt;

pub use coefficients::{distance_fit_coef, style_coef, DistanceBand, FitRank};
pub use spurt::{
    course_length, evaluate, predicted_max_spurt_speed, SpurtOutcome, SpurtStats, StaminaOutcome,
};
