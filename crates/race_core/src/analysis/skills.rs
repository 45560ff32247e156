//! # Skill Report
//!
//! How often a skill fires per race, how the field fares at each
//! occurrence count, and who it hits, split on whether the caster carries
//! a modifier skill.

use std::collections::BTreeMap;

use serde::Serialize;

use super::batch::RaceBatch;
use super::stats::{percent, RateCounter};
use crate::model::SpurtOutcome;
use crate::telemetry::{occurrence_count, proc_details, RunningStyle};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccurrenceBucket {
    /// Activations in one race
    pub occurrences: usize,
    pub races: usize,
    /// Share of usable races
    pub percent: f64,
    /// Participants that spurted, in races with this many activations
    pub spurt: RateCounter,
    pub spurt_rate: f64,
    pub stamina: RateCounter,
    pub stamina_survival_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleHitRate {
    pub style: RunningStyle,
    /// samples = opponents, successes = hits
    pub with_modifier: RateCounter,
    pub with_modifier_rate: f64,
    pub without_modifier: RateCounter,
    pub without_modifier_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SkillReport {
    pub skill_id: i32,
    pub modifier_ids: Vec<i32>,
    pub usable_races: usize,
    pub total_procs: usize,
    pub occurrence: Vec<OccurrenceBucket>,
    pub hit_rate_by_style: Vec<StyleHitRate>,
}

#[derive(Default)]
struct BucketAcc {
    races: usize,
    spurt: RateCounter,
    stamina: RateCounter,
}

const RANKED_STYLES: [RunningStyle; 4] = [
    RunningStyle::FrontRunner,
    RunningStyle::PaceChaser,
    RunningStyle::LateSurger,
    RunningStyle::EndCloser,
];

impl RaceBatch {
    pub fn skill_report(&self, skill_id: i32, modifier_ids: &[i32]) -> SkillReport {
        let mut buckets: BTreeMap<usize, BucketAcc> = BTreeMap::new();
        let mut with_mod: BTreeMap<RunningStyle, RateCounter> = BTreeMap::new();
        let mut without_mod: BTreeMap<RunningStyle, RateCounter> = BTreeMap::new();
        let mut total_procs = 0;

        for race in &self.races {
            let occurrences = occurrence_count(&race.log, skill_id);
            let acc = buckets.entry(occurrences).or_default();
            acc.races += 1;
            for entry in &race.entries {
                if entry.spurt.success != SpurtOutcome::NotApplicable {
                    acc.spurt.record(entry.spurt.success.is_success());
                }
                acc.stamina.record(entry.spurt.stamina.is_survived());
            }

            let procs = proc_details(&race.log, skill_id);
            total_procs += procs.len();
            for activation in &procs {
                let has_modifier = activation
                    .caster_index
                    .and_then(|slot| race.entry_at(slot))
                    .is_some_and(|caster| caster.has_any_skill(modifier_ids));
                let counters = if has_modifier { &mut with_mod } else { &mut without_mod };
                for &idx in &activation.opponent_set {
                    let style = race.log.results[idx].running_style;
                    if style.is_ranked() {
                        counters
                            .entry(style)
                            .or_default()
                            .record(activation.hit_set.contains(&idx));
                    }
                }
            }
        }

        let usable_races = self.usable_races();
        let max_occurrences = buckets.keys().next_back().copied();
        let occurrence = match max_occurrences {
            None => Vec::new(),
            Some(max) => (0..=max)
                .map(|n| {
                    let acc = buckets.remove(&n).unwrap_or_default();
                    OccurrenceBucket {
                        occurrences: n,
                        races: acc.races,
                        percent: percent(acc.races, usable_races),
                        spurt: acc.spurt,
                        spurt_rate: acc.spurt.rate(),
                        stamina: acc.stamina,
                        stamina_survival_rate: acc.stamina.rate(),
                    }
                })
                .collect(),
        };

        let hit_rate_by_style = RANKED_STYLES
            .iter()
            .map(|&style| {
                let with_modifier = with_mod.get(&style).copied().unwrap_or_default();
                let without_modifier = without_mod.get(&style).copied().unwrap_or_default();
                StyleHitRate {
                    style,
                    with_modifier,
                    with_modifier_rate: with_modifier.rate(),
                    without_modifier,
                    without_modifier_rate: without_modifier.rate(),
                }
            })
            .collect();

        SkillReport {
            skill_id,
            modifier_ids: modifier_ids.to_vec(),
            usable_races,
            total_procs,
            occurrence,
            hit_rate_by_style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::batch::AnalyzedRace;
    use crate::config::AnalysisConfig;
    use crate::fixtures::LogBuilder;
    use crate::input::{HorseMetadata, SkillEntry};
    use crate::telemetry::EventType;

    const DEBUFF: i32 = 999;
    const MODIFIER: i32 = 42;

    fn meta(slot: usize, skills: &[i32]) -> HorseMetadata {
        HorseMetadata {
            frame_order: slot as u32 + 1,
            trainer_name: format!("p{slot}"),
            skill_array: skills.iter().map(|&id| SkillEntry { skill_id: id, level: 1 }).collect(),
            ..Default::default()
        }
    }

    fn analyzed(log: crate::telemetry::RaceLog, metadata: &[HorseMetadata]) -> AnalyzedRace {
        AnalyzedRace::from_log("r".into(), log, metadata, &AnalysisConfig::default()).unwrap()
    }

    fn batch() -> RaceBatch {
        // styles by slot: 1, 2, 3, 4
        let base = || LogBuilder::new(4).linear_frames(3, 10.0, &[20.0, 19.0, 18.0, 17.0]);
        let metadata = vec![meta(0, &[MODIFIER]), meta(1, &[]), meta(2, &[]), meta(3, &[])];

        // slot 0 (with modifier) hits slots 1 and 2; slot 3 hits slot 0
        let twice = base()
            .event(5.0, EventType::Skill, &[0, DEBUFF, 0, 0, 0b0110])
            .event(6.0, EventType::Skill, &[3, DEBUFF, 0, 0, 0b0001])
            .build();
        // one activation with no target mask
        let once = base().event(5.0, EventType::Skill, &[1, DEBUFF]).build();
        let none = base().build();

        RaceBatch {
            races: vec![
                analyzed(twice, &metadata),
                analyzed(once, &metadata),
                analyzed(none.clone(), &metadata),
                analyzed(none, &metadata),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_occurrence_histogram() {
        let report = batch().skill_report(DEBUFF, &[MODIFIER]);
        assert_eq!(report.usable_races, 4);
        assert_eq!(report.total_procs, 2);
        let counts: Vec<(usize, usize)> =
            report.occurrence.iter().map(|b| (b.occurrences, b.races)).collect();
        assert_eq!(counts, vec![(0, 2), (1, 1), (2, 1)]);
        assert_eq!(report.occurrence[0].percent, 50.0);
        assert_eq!(report.occurrence[2].stamina.samples, 4);
        // no one spurted, so spurt buckets stay empty
        assert_eq!(report.occurrence[0].spurt.samples, 0);
    }

    #[test]
    fn test_hit_rate_split_on_modifier() {
        let report = batch().skill_report(DEBUFF, &[MODIFIER]);
        let by_style: BTreeMap<RunningStyle, &StyleHitRate> =
            report.hit_rate_by_style.iter().map(|r| (r.style, r)).collect();

        let pace = by_style[&RunningStyle::PaceChaser];
        assert_eq!(pace.with_modifier, RateCounter { samples: 1, successes: 1 });
        assert_eq!(pace.without_modifier, RateCounter { samples: 1, successes: 0 });

        let front = by_style[&RunningStyle::FrontRunner];
        assert_eq!(front.with_modifier.samples, 0);
        assert_eq!(front.without_modifier_rate, 100.0);

        let closer = by_style[&RunningStyle::EndCloser];
        assert_eq!(closer.with_modifier, RateCounter { samples: 1, successes: 0 });
        assert_eq!(closer.with_modifier_rate, 0.0);
    }

    #[test]
    fn test_without_modifiers_everything_is_unsplit() {
        let report = batch().skill_report(DEBUFF, &[]);
        assert!(report.hit_rate_by_style.iter().all(|r| r.with_modifier.samples == 0));
    }

    #[test]
    fn test_zero_races() {
        let report = RaceBatch::default().skill_report(DEBUFF, &[MODIFIER]);
        assert_eq!(report.usable_races, 0);
        assert_eq!(report.total_procs, 0);
        assert!(report.occurrence.is_empty());
        assert!(report
            .hit_rate_by_style
            .iter()
            .all(|r| r.with_modifier_rate == 0.0 && r.without_modifier_rate == 0.0));
    }
}
