//! # Telemetry
//!
//! Decoded race logs and the read-only views built on top of them:
//! - [`decoder`]: base64/gzip/binary → [`RaceLog`]
//! - [`frame_index`]: time lookups and interpolation over frames
//! - [`events`]: caster/target recovery from the event stream

pub mod decoder;
pub mod events;
pub mod frame_index;
pub mod types;

pub use decoder::{decode, decode_bytes, decode_bytes_with_limit, decode_with_limit};
pub use events::{
    debuff_sets, find_events, occurrence_count, proc_details, skill_activations,
    DebuffProcDetail, DebuffSetSummary, SkillActivation,
};
pub use frame_index::{FrameIndex, InterpolatedFrame, InterpolatedParticipant};
pub use types::*;
