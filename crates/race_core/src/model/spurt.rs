//! # Spurt / Stamina Model
//!
//! Closed-form classification of a participant's last spurt and stamina
//! over an already recorded race.
//!
//! ## Steps
//! 1. course length from the winner's interpolated distance at its raw finish time
//! 2. expected spurt position = course length × `expected_spurt_ratio`
//! 3. predicted max spurt speed from speed stat, distance fit and style
//! 4. stamina scan over frames until the course length is reached
//! 5. spurt timing check, then observed vs predicted speed

use serde::Serialize;
use strum::Display;
use tracing::debug;

use super::coefficients::{distance_fit_coef, style_coef, DistanceBand, SPURT_PHASE};
use crate::config::AnalysisConfig;
use crate::input::ParticipantAttributes;
use crate::telemetry::{FrameIndex, RaceLog, RunningStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum SpurtOutcome {
    #[strum(to_string = "✓")]
    Success,
    #[strum(to_string = "✗")]
    Failure,
    /// Never entered the last spurt
    #[strum(to_string = "—")]
    NotApplicable,
}

impl SpurtOutcome {
    pub fn is_success(self) -> bool {
        self == SpurtOutcome::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum StaminaOutcome {
    #[strum(to_string = "✓")]
    Survived,
    #[strum(to_string = "✗")]
    Depleted,
}

impl StaminaOutcome {
    pub fn is_survived(self) -> bool {
        self == StaminaOutcome::Survived
    }
}

/// Per participant, per race. Speeds in m/s, distances in metres.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpurtStats {
    pub success: SpurtOutcome,
    /// 0 when the participant never spurted
    pub last_spurt_start_distance: f32,
    pub expected_spurt_position: f32,
    pub delay_distance: f32,
    pub predicted_max_spurt_speed: f32,
    pub observed_max_speed: f32,
    pub course_length: f32,
    pub stamina: StaminaOutcome,
    /// Remaining distance when hp hit zero outside the finish tolerance
    pub death_distance_from_finish: Option<f32>,
}

/// Winner's interpolated distance at its raw finish time.
///
/// Falls back to `fallback_slot`'s largest recorded distance when there is
/// no winner, no frames, or the winner sample is not positive.
pub fn course_length(log: &RaceLog, fallback_slot: usize) -> f32 {
    let index = FrameIndex::new(&log.frames);
    let from_winner = log.winner_index().and_then(|w| {
        let finish = log.results[w].finish_time_raw;
        index.distance_at(w, finish)
    });
    match from_winner {
        Some(d) if d > 0.0 => d,
        _ => {
            let fallback = index.max_distance(fallback_slot).unwrap_or(0.0);
            debug!(fallback_slot, fallback, "course length from participant max distance");
            fallback
        }
    }
}

/// Theoretical top speed in the last spurt.
pub fn predicted_max_spurt_speed(
    course_length: f32,
    speed_stat: f32,
    fit_rank_id: u8,
    style: RunningStyle,
) -> f32 {
    let base_speed = 20.0 - (course_length - 2000.0) / 1000.0;
    let fit = distance_fit_coef(fit_rank_id);
    let style = style_coef(style.id(), SPURT_PHASE);
    (base_speed * (style + 0.01) + (speed_stat / 500.0).sqrt() * fit) * 1.05
        + (500.0 * speed_stat).sqrt() * fit * 0.002
}

/// Classify one participant's spurt and stamina.
///
/// # Errors
/// [`RaceError::OutOfRange`](crate::RaceError::OutOfRange) when
/// `participant` has no slot in the log.
pub fn evaluate(
    log: &RaceLog,
    participant: usize,
    attributes: &ParticipantAttributes,
    style: RunningStyle,
    config: &AnalysisConfig,
) -> crate::Result<SpurtStats> {
    log.check_index(participant)?;
    let result = &log.results[participant];

    let course_length = course_length(log, participant);
    let expected_spurt_position = course_length * config.expected_spurt_ratio;
    let band = DistanceBand::for_course(course_length);
    let predicted_max_spurt_speed = predicted_max_spurt_speed(
        course_length,
        attributes.speed as f32,
        attributes.proper_distance(band),
        style,
    );

    let (stamina, death_distance_from_finish) =
        stamina_check(log, participant, course_length, config.stamina_finish_tolerance);

    let spurt_start = result.last_spurt_start_distance;
    let (success, last_spurt_start_distance, delay_distance, observed_max_speed) =
        if spurt_start <= 0.0 {
            (SpurtOutcome::NotApplicable, 0.0, 0.0, 0.0)
        } else {
            let delay = spurt_start - expected_spurt_position;
            let observed = observed_max_speed(log, participant, spurt_start);
            let outcome = if delay.abs() > config.spurt_timing_tolerance {
                SpurtOutcome::Failure
            } else if observed > 0.0 && observed >= predicted_max_spurt_speed {
                SpurtOutcome::Success
            } else {
                SpurtOutcome::Failure
            };
            (outcome, spurt_start, delay, observed)
        };

    Ok(SpurtStats {
        success,
        last_spurt_start_distance,
        expected_spurt_position,
        delay_distance,
        predicted_max_spurt_speed,
        observed_max_speed,
        course_length,
        stamina,
        death_distance_from_finish,
    })
}

/// Max recorded speed (m/s) from the first frame at or past `from_distance`.
fn observed_max_speed(log: &RaceLog, participant: usize, from_distance: f32) -> f32 {
    log.frames
        .iter()
        .filter_map(|f| f.participants.get(participant))
        .skip_while(|p| p.distance < from_distance)
        .map(|p| p.speed as f32 / 100.0)
        .fold(0.0, f32::max)
}

fn stamina_check(
    log: &RaceLog,
    participant: usize,
    course_length: f32,
    tolerance: f32,
) -> (StaminaOutcome, Option<f32>) {
    for frame in &log.frames {
        let Some(p) = frame.participants.get(participant) else {
            continue;
        };
        if p.distance >= course_length {
            break;
        }
        if p.hp <= 0.0 {
            let remaining = course_length - p.distance;
            if remaining > tolerance {
                return (StaminaOutcome::Depleted, Some(remaining));
            }
            return (StaminaOutcome::Survived, None);
        }
    }
    (StaminaOutcome::Survived, None)
}
