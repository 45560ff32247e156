//! Read-only lookups into the character/skill/card catalogue.
//!
//! The catalogue itself lives outside the engine; anything implementing
//! [`ReferenceData`] can be plugged in. Display helpers never fail.

use crate::model::{DistanceBand, FitRank};
use crate::telemetry::{RunningStyle, TemptationMode};

pub trait ReferenceData: Send + Sync {
    fn chara_name(&self, chara_id: u32) -> Option<String>;
    fn skill_name(&self, skill_id: i32) -> Option<String>;
    fn card_name(&self, card_id: u32) -> Option<String>;

    fn display_chara(&self, chara_id: u32) -> String {
        self.chara_name(chara_id).unwrap_or_else(|| unknown(chara_id))
    }

    fn display_skill(&self, skill_id: i32) -> String {
        self.skill_name(skill_id).unwrap_or_else(|| unknown(skill_id))
    }

    fn display_card(&self, card_id: u32) -> String {
        self.card_name(card_id).unwrap_or_else(|| unknown(card_id))
    }
}

/// Catalogue with no entries; every lookup renders the placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReferenceData;

impl ReferenceData for NoReferenceData {
    fn chara_name(&self, _chara_id: u32) -> Option<String> {
        None
    }

    fn skill_name(&self, _skill_id: i32) -> Option<String> {
        None
    }

    fn card_name(&self, _card_id: u32) -> Option<String> {
        None
    }
}

fn unknown(id: impl std::fmt::Display) -> String {
    format!("Unknown ({})", id)
}

pub fn running_style_label(style_id: u8) -> String {
    RunningStyle::from_id(style_id).to_string()
}

/// `G`..`S`, or `?` for ids outside the rank table.
pub fn rank_label(rank_id: u8) -> String {
    FitRank::from_id(rank_id).map(|r| r.to_string()).unwrap_or_else(|| "?".to_string())
}

pub fn distance_band_label(band: DistanceBand) -> String {
    band.to_string()
}

/// Label for an active temptation; `None` when the participant is calm.
pub fn temptation_label(mode: TemptationMode) -> Option<&'static str> {
    match mode {
        TemptationMode::None => None,
        TemptationMode::Late => Some("Rushed (Late)"),
        TemptationMode::Pace => Some("Rushed (Pace)"),
        TemptationMode::Front => Some("Rushed (Front)"),
        TemptationMode::SpeedUp => Some("Rushed (Speed up)"),
        TemptationMode::Unknown(_) => Some("Rushed"),
    }
}
