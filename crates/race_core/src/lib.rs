//! # race_core - Race Telemetry Decode & Analysis Engine
//!
//! Turns recorded race logs into per-participant analytics and multi-race
//! statistics.
//!
//! ## Features
//! - Bounds-checked decode of base64/gzip race scenarios
//! - O(log n) time lookup and interpolation over frames
//! - Caster/target recovery from bit-packed skill events
//! - Last-spurt and stamina classification
//! - Parallel batch ingestion with per-player, per-style and per-skill reports

pub mod analysis;
pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod reference;
pub mod telemetry;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use analysis::{aggregate, AggregateReport, GroupKey, RaceBatch};
pub use config::AnalysisConfig;
pub use error::{DecodeError, RaceError, Result};
pub use input::{HorseMetadata, ParticipantAttributes, RaceInput};
pub use model::{evaluate, SpurtOutcome, SpurtStats, StaminaOutcome};
pub use reference::{NoReferenceData, ReferenceData};
pub use telemetry::{decode, FrameIndex, RaceLog};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
