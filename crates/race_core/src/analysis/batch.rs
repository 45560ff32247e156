//! # Race Batch
//!
//! Decode and classify many races. Each race is independent, so the map
//! stage runs on the rayon pool once the batch is large enough; the
//! reports in the sibling modules are sequential reduces over the result.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::input::{HorseMetadata, ParticipantAttributes, RaceInput};
use crate::model::{evaluate, SpurtStats};
use crate::telemetry::{decode_with_limit, RaceLog, RunningStyle};

/// One participant of one race, joined with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryOutcome {
    pub slot: usize,
    pub trainer_name: String,
    pub chara_id: u32,
    pub trained_chara_id: u32,
    pub skill_ids: Vec<i32>,
    pub finish_order: i32,
    pub finish_time: f32,
    pub running_style: RunningStyle,
    pub spurt: SpurtStats,
}

impl EntryOutcome {
    pub fn is_winner(&self) -> bool {
        self.finish_order == 0
    }

    pub fn has_any_skill(&self, ids: &[i32]) -> bool {
        self.skill_ids.iter().any(|s| ids.contains(s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedRace {
    pub race_id: String,
    pub recorded_at: Option<NaiveDateTime>,
    #[serde(skip)]
    pub log: RaceLog,
    /// Metadata order; slots missing from the log are dropped
    pub entries: Vec<EntryOutcome>,
    pub skipped_entries: usize,
}

impl AnalyzedRace {
    /// Decode and classify one race file.
    pub fn analyze(input: &RaceInput, config: &AnalysisConfig) -> crate::Result<Self> {
        let log = decode_with_limit(&input.scenario, config.max_participants)?;
        let mut race = Self::from_log(input.race_id.clone(), log, &input.metadata, config)?;
        race.recorded_at = input.recorded_at();
        Ok(race)
    }

    /// Classify an already decoded log against its metadata.
    pub fn from_log(
        race_id: String,
        log: RaceLog,
        metadata: &[HorseMetadata],
        config: &AnalysisConfig,
    ) -> crate::Result<Self> {
        let count = log.participant_count();
        let mut entries = Vec::with_capacity(metadata.len());
        let mut skipped_entries = 0;

        for record in metadata {
            let slot = record.slot();
            if slot >= count {
                debug!(race_id = %race_id, slot, count, "metadata slot not in race, skipping");
                skipped_entries += 1;
                continue;
            }
            let result = &log.results[slot];
            let running_style = if result.running_style.is_ranked() {
                result.running_style
            } else {
                RunningStyle::from_id(record.running_style)
            };
            let attributes = ParticipantAttributes::from(record);
            let spurt = evaluate(&log, slot, &attributes, running_style, config)?;
            entries.push(EntryOutcome {
                slot,
                trainer_name: record.trainer_name.clone(),
                chara_id: record.chara_id,
                trained_chara_id: record.trained_chara_id,
                skill_ids: record.skill_array.iter().map(|s| s.skill_id).collect(),
                finish_order: result.finish_order,
                finish_time: result.finish_time,
                running_style,
                spurt,
            });
        }

        Ok(Self { race_id, recorded_at: None, log, entries, skipped_entries })
    }

    /// Distinct non-empty trainer names in this race.
    pub fn players(&self) -> BTreeSet<&str> {
        self.entries
            .iter()
            .map(|e| e.trainer_name.as_str())
            .filter(|n| !n.is_empty())
            .collect()
    }

    pub fn entry_at(&self, slot: usize) -> Option<&EntryOutcome> {
        self.entries.iter().find(|e| e.slot == slot)
    }

    pub fn winner(&self) -> Option<&EntryOutcome> {
        self.entries.iter().find(|e| e.is_winner())
    }
}

/// A race that could not be used, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedRace {
    pub race_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RaceBatch {
    pub races: Vec<AnalyzedRace>,
    pub excluded: Vec<ExcludedRace>,
    pub skipped_entries: usize,
}

impl RaceBatch {
    /// Decode + classify every input. Failed races are recorded in
    /// `excluded` and never abort the batch.
    pub fn ingest(inputs: &[RaceInput], config: &AnalysisConfig) -> Self {
        let analyze = |input: &RaceInput| AnalyzedRace::analyze(input, config);
        let outcomes: Vec<crate::Result<AnalyzedRace>> =
            if inputs.len() > config.parallel_threshold {
                inputs.par_iter().map(analyze).collect()
            } else {
                inputs.iter().map(analyze).collect()
            };

        let mut batch = RaceBatch::default();
        for (input, outcome) in inputs.iter().zip(outcomes) {
            match outcome {
                Ok(race) => {
                    batch.skipped_entries += race.skipped_entries;
                    batch.races.push(race);
                }
                Err(e) => {
                    warn!(race_id = %input.race_id, error = %e, "excluding race");
                    batch.excluded.push(ExcludedRace {
                        race_id: input.race_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            usable = batch.races.len(),
            excluded = batch.excluded.len(),
            skipped_entries = batch.skipped_entries,
            "race batch ingested"
        );
        batch
    }

    pub fn usable_races(&self) -> usize {
        self.races.len()
    }

    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }

    /// Every entry belonging to `player`, with its race.
    pub(crate) fn entries_for<'a>(
        &'a self,
        player: &'a str,
    ) -> impl Iterator<Item = (&'a AnalyzedRace, &'a EntryOutcome)> + 'a {
        self.races.iter().flat_map(move |race| {
            race.entries.iter().filter(move |e| e.trainer_name == player).map(move |e| (race, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{metadata_json, race_file_text, LogBuilder};
    use crate::model::SpurtOutcome;
    use crate::telemetry::EventType;

    fn race_log() -> RaceLog {
        LogBuilder::new(3)
            .linear_frames(6, 20.0, &[20.0, 19.0, 18.0])
            .finish(&[0, 1, 2], &[100.0, 105.0, 111.0])
            .spurt_start(&[1330.0, 1340.0, 0.0])
            .build()
    }

    fn input(id: &str, log: &RaceLog, players: usize) -> RaceInput {
        RaceInput::parse(id, &race_file_text(log, &metadata_json(players, &["alice", "bob"], 1200)))
    }

    #[test]
    fn test_truncated_race_is_excluded() {
        let good = input("good.txt", &race_log(), 3);
        let mut bad = good.clone();
        bad.race_id = "bad.txt".into();
        bad.scenario.truncate(bad.scenario.len() / 2);

        let batch = RaceBatch::ingest(&[good, bad], &AnalysisConfig::default());
        assert_eq!(batch.usable_races(), 1);
        assert_eq!(batch.excluded.len(), 1);
        assert_eq!(batch.excluded[0].race_id, "bad.txt");
        assert_eq!(batch.races[0].entries.len(), 3);
    }

    #[test]
    fn test_extra_metadata_slots_are_skipped() {
        let batch =
            RaceBatch::ingest(&[input("r.txt", &race_log(), 5)], &AnalysisConfig::default());
        assert_eq!(batch.races[0].entries.len(), 3);
        assert_eq!(batch.skipped_entries, 2);
    }

    #[test]
    fn test_entries_carry_spurt_stats() {
        let batch =
            RaceBatch::ingest(&[input("r.txt", &race_log(), 3)], &AnalysisConfig::default());
        let race = &batch.races[0];
        assert_eq!(race.winner().map(|w| w.slot), Some(0));
        assert_eq!(race.entry_at(2).map(|e| e.spurt.success), Some(SpurtOutcome::NotApplicable));
        assert_eq!(race.players().len(), 2);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let inputs: Vec<RaceInput> =
            (0..12).map(|i| input(&format!("r{i}.txt"), &race_log(), 3)).collect();
        let sequential = AnalysisConfig { parallel_threshold: usize::MAX, ..Default::default() };
        let parallel = AnalysisConfig { parallel_threshold: 0, ..Default::default() };

        let a = RaceBatch::ingest(&inputs, &sequential);
        let b = RaceBatch::ingest(&inputs, &parallel);
        assert_eq!(a.races, b.races);
        assert_eq!(b.races[11].race_id, "r11.txt");
    }

    #[test]
    fn test_oversized_field_excluded_despite_config() {
        let crowded = LogBuilder::new(40).event(1.0, EventType::Skill, &[0, 9, 0, 0, -1]).build();
        let config = AnalysisConfig::from_json(r#"{"max_participants": 64}"#).unwrap();
        let batch = RaceBatch::ingest(&[input("crowded.txt", &crowded, 40)], &config);
        assert!(batch.is_empty());
        assert_eq!(batch.excluded[0].race_id, "crowded.txt");
        assert!(batch.excluded[0].error.contains("40"));
    }

    #[test]
    fn test_empty_batch() {
        let batch = RaceBatch::ingest(&[], &AnalysisConfig::default());
        assert!(batch.is_empty());
        assert!(batch.excluded.is_empty());
    }
}
