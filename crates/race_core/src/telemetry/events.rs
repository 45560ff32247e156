//! # Event Decoder
//!
//! Read-only queries over the event stream.
//!
//! Skill events carry `param[0] = caster slot`, `param[1] = skill id` and,
//! for targeted skills, `param[4] = target bit mask` (bit `i` = slot `i`).

use std::collections::BTreeSet;

use serde::Serialize;

use super::types::{EventRecord, EventType, RaceLog};
use crate::input::HorseMetadata;

/// Minimum params for an event to identify caster and skill
pub const MIN_PARAMS_FOR_OCCURRENCE: u8 = 2;

/// Minimum params for an event to carry a target mask
pub const MIN_PARAMS_FOR_TARGETS: u8 = 5;

const CASTER_PARAM: usize = 0;
const SKILL_PARAM: usize = 1;
const TARGET_MASK_PARAM: usize = 4;

/// One targeted activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebuffProcDetail {
    /// `None` when the caster param is not a valid slot
    pub caster_index: Option<usize>,
    pub skill_id: i32,
    /// Every slot other than the caster
    pub opponent_set: BTreeSet<usize>,
    /// Opponents whose bit is set in the target mask
    pub hit_set: BTreeSet<usize>,
}

/// Team-aware tally for one skill across a race.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DebuffSetSummary {
    pub procs: usize,
    pub opponents: BTreeSet<usize>,
    pub hits: BTreeSet<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkillActivation {
    pub time: f32,
    pub caster_index: usize,
    pub skill_id: i32,
}

/// Events of `category` whose skill-id parameter equals `match_id`.
pub fn find_events(log: &RaceLog, category: EventType, match_id: i32) -> Vec<&EventRecord> {
    log.events
        .iter()
        .filter(|e| e.event_type == category && e.param(SKILL_PARAM) == Some(match_id))
        .collect()
}

/// Skill activations of `skill_id` with at least caster + skill params.
pub fn occurrence_count(log: &RaceLog, skill_id: i32) -> usize {
    skill_events(log, skill_id, MIN_PARAMS_FOR_OCCURRENCE).count()
}

/// Caster and target sets for every targeted activation of `skill_id`.
///
/// Events with fewer than five params carry no mask and are skipped. A
/// negative caster param excludes nobody, so every slot is an opponent.
pub fn proc_details(log: &RaceLog, skill_id: i32) -> Vec<DebuffProcDetail> {
    let count = log.participant_count();
    debug_assert!(count <= u32::BITS as usize, "target mask holds at most 32 participants");
    skill_events(log, skill_id, MIN_PARAMS_FOR_TARGETS)
        .filter_map(|event| {
            let caster = event.param(CASTER_PARAM).and_then(|c| usize::try_from(c).ok());
            let mask = target_mask(event)?;
            let opponent_set: BTreeSet<usize> =
                (0..count).filter(|&i| Some(i) != caster).collect();
            let hit_set = opponent_set.iter().copied().filter(|&i| mask_has(mask, i)).collect();
            Some(DebuffProcDetail { caster_index: caster, skill_id, opponent_set, hit_set })
        })
        .collect()
}

/// Like [`proc_details`] but treats everyone sharing the caster's trainer
/// as a teammate, and folds all activations into one summary.
pub fn debuff_sets(log: &RaceLog, metadata: &[HorseMetadata], skill_id: i32) -> DebuffSetSummary {
    let count = log.participant_count();
    let mut trainers: Vec<Option<&str>> = vec![None; count];
    for record in metadata {
        if let Some(slot) = trainers.get_mut(record.slot()) {
            *slot = Some(record.trainer_name.as_str());
        }
    }

    let mut summary = DebuffSetSummary::default();
    for event in skill_events(log, skill_id, MIN_PARAMS_FOR_OCCURRENCE) {
        summary.procs += 1;
        let Some(mask) = target_mask(event) else {
            continue;
        };
        let caster = event.param(CASTER_PARAM).and_then(|c| usize::try_from(c).ok());
        let caster_trainer = caster.and_then(|c| trainers.get(c).copied().flatten());
        for idx in 0..count {
            let same_team = Some(idx) == caster
                || (caster_trainer.is_some() && trainers[idx] == caster_trainer);
            if same_team {
                continue;
            }
            summary.opponents.insert(idx);
            if mask_has(mask, idx) {
                summary.hits.insert(idx);
            }
        }
    }
    summary
}

/// Every skill activation with caster + skill params, ordered by time.
pub fn skill_activations(log: &RaceLog) -> Vec<SkillActivation> {
    let mut out: Vec<SkillActivation> = log
        .events
        .iter()
        .filter(|e| {
            e.event_type == EventType::Skill && e.param_count >= MIN_PARAMS_FOR_OCCURRENCE
        })
        .filter_map(|e| {
            Some(SkillActivation {
                time: e.frame_time,
                caster_index: usize::try_from(e.param(CASTER_PARAM)?).ok()?,
                skill_id: e.param(SKILL_PARAM)?,
            })
        })
        .collect();
    out.sort_by(|a, b| a.time.total_cmp(&b.time));
    out
}

fn skill_events<'a>(
    log: &'a RaceLog,
    skill_id: i32,
    min_params: u8,
) -> impl Iterator<Item = &'a EventRecord> + 'a {
    log.events.iter().filter(move |e| {
        e.event_type == EventType::Skill
            && e.param_count >= min_params
            && e.param(SKILL_PARAM) == Some(skill_id)
    })
}

/// Mask reinterpreted as unsigned.
fn target_mask(event: &EventRecord) -> Option<u32> {
    event.param(TARGET_MASK_PARAM).map(|m| m as u32)
}

fn mask_has(mask: u32, index: usize) -> bool {
    index < u32::BITS as usize && mask & (1u32 << index) != 0
}
