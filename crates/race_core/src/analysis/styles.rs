//! Winner counts by running style and by character.

use std::collections::BTreeMap;

use serde::Serialize;

use super::batch::RaceBatch;
use crate::telemetry::RunningStyle;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleWins {
    pub style: RunningStyle,
    pub label: String,
    pub wins: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterWins {
    pub chara_id: u32,
    pub wins: usize,
}

impl RaceBatch {
    /// Winners by ranked running style, taken from the race result itself.
    /// Styles with no wins are left out.
    pub fn wins_by_style(&self) -> Vec<StyleWins> {
        let mut counts: BTreeMap<RunningStyle, usize> = BTreeMap::new();
        for race in &self.races {
            let Some(w) = race.log.winner_index() else {
                continue;
            };
            let style = race.log.results[w].running_style;
            if style.is_ranked() {
                *counts.entry(style).or_insert(0) += 1;
            }
        }
        let mut out: Vec<StyleWins> = counts
            .into_iter()
            .map(|(style, wins)| StyleWins { style, label: style.to_string(), wins })
            .collect();
        out.sort_by(|a, b| b.wins.cmp(&a.wins).then_with(|| a.style.cmp(&b.style)));
        out
    }

    /// Winners by character id. Needs metadata for the winning slot.
    pub fn wins_by_character(&self) -> Vec<CharacterWins> {
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for winner in self.races.iter().filter_map(|r| r.winner()) {
            *counts.entry(winner.chara_id).or_insert(0) += 1;
        }
        let mut out: Vec<CharacterWins> =
            counts.into_iter().map(|(chara_id, wins)| CharacterWins { chara_id, wins }).collect();
        out.sort_by(|a, b| b.wins.cmp(&a.wins).then_with(|| a.chara_id.cmp(&b.chara_id)));
        out
    }
}
