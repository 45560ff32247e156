//! # Aggregation Pipeline
//!
//! [`RaceBatch::ingest`] decodes and classifies races (in parallel for
//! large batches); the report methods reduce the batch into plain counts
//! and percentages.

pub mod aggregate;
pub mod batch;
pub mod player;
pub mod skills;
pub mod stats;
pub mod styles;

pub use aggregate::{aggregate, AggregateReport, GroupKey, ReportRows};
pub use batch::{AnalyzedRace, EntryOutcome, ExcludedRace, RaceBatch};
pub use player::{CharacterWinRates, NameCount, PlayerWinRates, RaceHistoryEntry};
pub use skills::{OccurrenceBucket, SkillReport, StyleHitRate};
pub use stats::{median, percent, FinishTimeStats, RateCounter};
pub use styles::{CharacterWins, StyleWins};
