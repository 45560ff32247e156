//! Decoded race log types.
//!
//! Layout mirrors the wire format: frames of per-participant samples, one
//! result record per participant, and a sparse event stream.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// One decoded race. Immutable once produced by [`decode`](super::decode).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RaceLog {
    /// Format version from the header block
    pub version: i32,
    pub distance_diff_max: f32,
    /// Non-decreasing in `time`
    pub frames: Vec<Frame>,
    /// Index-aligned with `Frame::participants`
    pub results: Vec<ParticipantResult>,
    pub events: Vec<EventRecord>,
}

impl RaceLog {
    pub fn participant_count(&self) -> usize {
        self.results.len()
    }

    /// Slot of the participant with `finish_order == 0`.
    pub fn winner_index(&self) -> Option<usize> {
        self.results.iter().position(|r| r.finish_order == 0)
    }

    pub fn check_index(&self, index: usize) -> crate::Result<()> {
        if index >= self.participant_count() {
            return Err(crate::RaceError::OutOfRange { index, count: self.participant_count() });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    /// Seconds since the start
    pub time: f32,
    pub participants: Vec<ParticipantFrame>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticipantFrame {
    /// Metres from the start gate
    pub distance: f32,
    pub lane_position: u16,
    /// Centi-metres per second
    pub speed: u16,
    pub hp: f32,
    pub temptation_mode: TemptationMode,
    /// Slot of the participant blocking this one, if any
    pub blocked_by: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticipantResult {
    /// 0 = winner
    pub finish_order: i32,
    pub finish_time: f32,
    pub finish_diff_time: f32,
    pub start_delay_time: f32,
    pub guts_order: u8,
    pub wit_order: u8,
    /// <= 0 when the participant never entered the last spurt
    pub last_spurt_start_distance: f32,
    pub running_style: RunningStyle,
    pub defeat: i32,
    pub finish_time_raw: f32,
}

/// Fixed-capacity parameter block; only the first `param_count` entries are meaningful.
pub const MAX_EVENT_PARAMS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EventRecord {
    pub frame_time: f32,
    pub event_type: EventType,
    pub param_count: u8,
    pub params: [i32; MAX_EVENT_PARAMS],
}

impl EventRecord {
    pub fn new(frame_time: f32, event_type: EventType, params: &[i32]) -> Self {
        let mut block = [0; MAX_EVENT_PARAMS];
        let count = params.len().min(MAX_EVENT_PARAMS);
        block[..count].copy_from_slice(&params[..count]);
        Self { frame_time, event_type, param_count: count as u8, params: block }
    }

    /// Parameter `i`, or `None` past `param_count`.
    pub fn param(&self, i: usize) -> Option<i32> {
        (i < self.param_count as usize).then(|| self.params[i])
    }

    pub fn params(&self) -> &[i32] {
        &self.params[..self.param_count as usize]
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
    Display, EnumIter,
)]
pub enum RunningStyle {
    #[default]
    #[strum(to_string = "None")]
    None,
    #[strum(to_string = "Front Runner")]
    FrontRunner,
    #[strum(to_string = "Pace Chaser")]
    PaceChaser,
    #[strum(to_string = "Late Surger")]
    LateSurger,
    #[strum(to_string = "End Closer")]
    EndCloser,
}

impl RunningStyle {
    /// Wire id; unknown ids collapse to `None`.
    pub fn from_id(id: u8) -> Self {
        match id {
            1 => RunningStyle::FrontRunner,
            2 => RunningStyle::PaceChaser,
            3 => RunningStyle::LateSurger,
            4 => RunningStyle::EndCloser,
            _ => RunningStyle::None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Styles that count toward style statistics (everything but `None`).
    pub fn is_ranked(self) -> bool {
        self != RunningStyle::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TemptationMode {
    #[default]
    None,
    Late,
    Pace,
    Front,
    SpeedUp,
    Unknown(i8),
}

impl TemptationMode {
    pub fn from_id(id: i8) -> Self {
        match id {
            0 => TemptationMode::None,
            1 => TemptationMode::Late,
            2 => TemptationMode::Pace,
            3 => TemptationMode::Front,
            4 => TemptationMode::SpeedUp,
            other => TemptationMode::Unknown(other),
        }
    }

    pub fn id(self) -> i8 {
        match self {
            TemptationMode::None => 0,
            TemptationMode::Late => 1,
            TemptationMode::Pace => 2,
            TemptationMode::Front => 3,
            TemptationMode::SpeedUp => 4,
            TemptationMode::Unknown(id) => id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EventType {
    #[default]
    Score,
    ChallengeMatchPoint,
    Unused,
    Skill,
    CompeteTop,
    CompeteFight,
    ReleaseConservePower,
    StaminaLimitBreakBuff,
    CompeteBeforeSpurt,
    StaminaKeep,
    SecureLead,
    Unknown(i8),
}

impl EventType {
    pub fn from_id(id: i8) -> Self {
        match id {
            0 => EventType::Score,
            1 => EventType::ChallengeMatchPoint,
            2 => EventType::Unused,
            3 => EventType::Skill,
            4 => EventType::CompeteTop,
            5 => EventType::CompeteFight,
            6 => EventType::ReleaseConservePower,
            7 => EventType::StaminaLimitBreakBuff,
            8 => EventType::CompeteBeforeSpurt,
            9 => EventType::StaminaKeep,
            10 => EventType::SecureLead,
            other => EventType::Unknown(other),
        }
    }

    pub fn id(self) -> i8 {
        match self {
            EventType::Score => 0,
            EventType::ChallengeMatchPoint => 1,
            EventType::Unused => 2,
            EventType::Skill => 3,
            EventType::CompeteTop => 4,
            EventType::CompeteFight => 5,
            EventType::ReleaseConservePower => 6,
            EventType::StaminaLimitBreakBuff => 7,
            EventType::CompeteBeforeSpurt => 8,
            EventType::StaminaKeep => 9,
            EventType::SecureLead => 10,
            EventType::Unknown(id) => id,
        }
    }
}
