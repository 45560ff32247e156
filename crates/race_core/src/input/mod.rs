//! # Race Input
//!
//! Typed participant metadata and two-line race files.

pub mod metadata;
pub mod race_file;

pub use metadata::{
    anonymize_metadata, parse_metadata, HorseMetadata, ParticipantAttributes, SkillEntry,
};
pub use race_file::{load_race_dir, race_id_for, RaceInput};
