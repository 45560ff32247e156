//! One-shot aggregation: ingest a set of races and build a single report.

use serde::{Deserialize, Serialize};

use super::batch::RaceBatch;
use super::player::PlayerWinRates;
use super::skills::SkillReport;
use super::styles::{CharacterWins, StyleWins};
use crate::config::AnalysisConfig;
use crate::input::RaceInput;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKey {
    /// Per trained character owned by one player
    Player(String),
    RunningStyle,
    Character,
    /// Activations-per-race histogram for one skill
    SkillOccurrence(i32),
    SkillModifierSplit { skill_id: i32, modifier_ids: Vec<i32> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data")]
pub enum ReportRows {
    Player(PlayerWinRates),
    RunningStyle(Vec<StyleWins>),
    Character(Vec<CharacterWins>),
    Skill(SkillReport),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    /// 0 means "no data found", distinct from any per-race error
    pub usable_races: usize,
    pub excluded_races: usize,
    pub skipped_entries: usize,
    pub rows: ReportRows,
}

impl AggregateReport {
    pub fn is_empty(&self) -> bool {
        self.usable_races == 0
    }
}

impl RaceBatch {
    pub fn report(&self, key: &GroupKey) -> AggregateReport {
        let rows = match key {
            GroupKey::Player(name) => ReportRows::Player(self.player_summary(name)),
            GroupKey::RunningStyle => ReportRows::RunningStyle(self.wins_by_style()),
            GroupKey::Character => ReportRows::Character(self.wins_by_character()),
            GroupKey::SkillOccurrence(skill_id) => {
                ReportRows::Skill(self.skill_report(*skill_id, &[]))
            }
            GroupKey::SkillModifierSplit { skill_id, modifier_ids } => {
                ReportRows::Skill(self.skill_report(*skill_id, modifier_ids))
            }
        };
        AggregateReport {
            usable_races: self.usable_races(),
            excluded_races: self.excluded.len(),
            skipped_entries: self.skipped_entries,
            rows,
        }
    }
}

/// Decode, classify and group `inputs` in one call.
pub fn aggregate(inputs: &[RaceInput], key: &GroupKey, config: &AnalysisConfig) -> AggregateReport {
    RaceBatch::ingest(inputs, config).report(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{metadata_json, race_file_text, LogBuilder};

    fn inputs() -> Vec<RaceInput> {
        let log = LogBuilder::new(3)
            .linear_frames(6, 20.0, &[20.0, 19.0, 18.0])
            .finish(&[0, 1, 2], &[100.0, 105.0, 111.0])
            .build();
        let text = race_file_text(&log, &metadata_json(3, &["a"], 1000));
        let good = RaceInput::parse("good.txt", &text);
        let mut truncated = good.clone();
        truncated.race_id = "truncated.txt".into();
        truncated.scenario.truncate(24);
        vec![good, truncated]
    }

    #[test]
    fn test_zero_races_all_zero() {
        let config = AnalysisConfig::default();
        for key in [
            GroupKey::Player("a".into()),
            GroupKey::RunningStyle,
            GroupKey::Character,
            GroupKey::SkillOccurrence(1),
            GroupKey::SkillModifierSplit { skill_id: 1, modifier_ids: vec![2] },
        ] {
            let report = aggregate(&[], &key, &config);
            assert!(report.is_empty());
            assert_eq!(report.excluded_races, 0);
            match report.rows {
                ReportRows::Player(p) => {
                    assert_eq!(p.total_races, 0);
                    assert_eq!(p.win_rate, 0.0);
                }
                ReportRows::RunningStyle(rows) => assert!(rows.is_empty()),
                ReportRows::Character(rows) => assert!(rows.is_empty()),
                ReportRows::Skill(s) => {
                    assert_eq!(s.total_procs, 0);
                    assert!(s.hit_rate_by_style.iter().all(|r| !r.without_modifier_rate.is_nan()));
                }
            }
        }
    }

    #[test]
    fn test_one_good_one_truncated() {
        let report =
            aggregate(&inputs(), &GroupKey::Player("a".into()), &AnalysisConfig::default());
        assert_eq!(report.usable_races, 1);
        assert_eq!(report.excluded_races, 1);
        let ReportRows::Player(p) = report.rows else {
            panic!("expected player rows");
        };
        assert_eq!(p.total_races, 1);
        assert_eq!(p.wins, 1);
        assert_eq!(p.by_character.len(), 3);
    }

    #[test]
    fn test_report_serializes_with_kind_tag() {
        let report = aggregate(&inputs(), &GroupKey::RunningStyle, &AnalysisConfig::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rows"]["kind"], "RunningStyle");
        assert_eq!(json["rows"]["data"][0]["wins"], 1);
    }
}
