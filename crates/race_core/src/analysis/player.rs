//! Per-player reports: who shows up most, how each trained character does,
//! and a player's race history.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDateTime;
use serde::Serialize;

use super::batch::{EntryOutcome, RaceBatch};
use super::stats::{percent, FinishTimeStats, RateCounter};
use crate::model::StaminaOutcome;
use crate::telemetry::RunningStyle;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCount {
    pub name: String,
    /// Races the player appears in
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterWinRates {
    pub trained_chara_id: u32,
    pub chara_id: u32,
    pub races: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub top2: usize,
    pub top2_rate: f64,
    pub top3: usize,
    pub top3_rate: f64,
    /// Every appearance is a sample; races without a spurt count as misses
    pub spurt: RateCounter,
    pub spurt_rate: f64,
    pub stamina: RateCounter,
    pub stamina_survival_rate: f64,
    /// Most frequent ranked style, lower style id on ties
    pub running_style: Option<RunningStyle>,
    pub finish_times: FinishTimeStats,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PlayerWinRates {
    pub player_name: String,
    pub total_races: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub by_character: Vec<CharacterWinRates>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceHistoryEntry {
    pub race_id: String,
    pub recorded_at: Option<NaiveDateTime>,
    pub players: Vec<String>,
    pub winners: Vec<String>,
    /// The player's characters in this race, at most three
    pub chara_ids: Vec<u32>,
}

const MAX_TEAM_SIZE: usize = 3;

impl RaceBatch {
    /// Players ranked by number of races (desc), then by name.
    pub fn name_frequency(&self) -> Vec<NameCount> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for race in &self.races {
            for name in race.players() {
                *counts.entry(name).or_insert(0) += 1;
            }
        }
        let mut out: Vec<NameCount> = counts
            .into_iter()
            .map(|(name, count)| NameCount { name: name.to_string(), count })
            .collect();
        out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        out
    }

    /// Most frequent player, the default subject of a summary.
    pub fn default_player(&self) -> Option<String> {
        self.name_frequency().into_iter().next().map(|n| n.name)
    }

    pub fn player_summary(&self, player: &str) -> PlayerWinRates {
        let mut race_ids: BTreeSet<&str> = BTreeSet::new();
        let mut win_ids: BTreeSet<&str> = BTreeSet::new();
        let mut grouped: BTreeMap<u32, Vec<&EntryOutcome>> = BTreeMap::new();

        for (race, entry) in self.entries_for(player) {
            race_ids.insert(race.race_id.as_str());
            if entry.is_winner() {
                win_ids.insert(race.race_id.as_str());
            }
            grouped.entry(entry.trained_chara_id).or_default().push(entry);
        }

        let mut by_character: Vec<CharacterWinRates> = grouped
            .into_iter()
            .map(|(trained_chara_id, entries)| character_row(trained_chara_id, &entries))
            .collect();
        by_character.sort_by(|a, b| {
            b.win_rate
                .total_cmp(&a.win_rate)
                .then_with(|| a.trained_chara_id.cmp(&b.trained_chara_id))
        });

        PlayerWinRates {
            player_name: player.to_string(),
            total_races: race_ids.len(),
            wins: win_ids.len(),
            win_rate: percent(win_ids.len(), race_ids.len()),
            by_character,
        }
    }

    /// Races featuring `player`, newest first; undated races last.
    pub fn race_history(&self, player: &str) -> Vec<RaceHistoryEntry> {
        let mut out: Vec<RaceHistoryEntry> = self
            .races
            .iter()
            .filter(|race| race.entries.iter().any(|e| e.trainer_name == player))
            .map(|race| {
                let players = race.players().into_iter().map(str::to_string).collect();
                let winners: BTreeSet<&str> = race
                    .entries
                    .iter()
                    .filter(|e| e.is_winner() && !e.trainer_name.is_empty())
                    .map(|e| e.trainer_name.as_str())
                    .collect();
                let chara_ids = race
                    .entries
                    .iter()
                    .filter(|e| e.trainer_name == player)
                    .map(|e| e.chara_id)
                    .take(MAX_TEAM_SIZE)
                    .collect();
                RaceHistoryEntry {
                    race_id: race.race_id.clone(),
                    recorded_at: race.recorded_at,
                    players,
                    winners: winners.into_iter().map(str::to_string).collect(),
                    chara_ids,
                }
            })
            .collect();
        // None sorts below Some, so reversing puts undated races last
        out.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        out
    }
}

fn character_row(trained_chara_id: u32, entries: &[&EntryOutcome]) -> CharacterWinRates {
    let races = entries.len();
    let wins = entries.iter().filter(|e| e.finish_order == 0).count();
    let top2 = entries.iter().filter(|e| e.finish_order <= 1).count();
    let top3 = entries.iter().filter(|e| e.finish_order <= 2).count();

    let mut spurt = RateCounter::default();
    let mut stamina = RateCounter::default();
    let mut style_counts: BTreeMap<RunningStyle, usize> = BTreeMap::new();
    for e in entries {
        spurt.record(e.spurt.success.is_success());
        stamina.record(e.spurt.stamina == StaminaOutcome::Survived);
        if e.running_style.is_ranked() {
            *style_counts.entry(e.running_style).or_insert(0) += 1;
        }
    }

    let mut running_style = None;
    let mut best = 0;
    for (style, count) in style_counts {
        if count > best {
            best = count;
            running_style = Some(style);
        }
    }

    CharacterWinRates {
        trained_chara_id,
        chara_id: entries.first().map(|e| e.chara_id).unwrap_or_default(),
        races,
        wins,
        win_rate: percent(wins, races),
        top2,
        top2_rate: percent(top2, races),
        top3,
        top3_rate: percent(top3, races),
        spurt,
        spurt_rate: spurt.rate(),
        stamina,
        stamina_survival_rate: stamina.rate(),
        running_style,
        finish_times: FinishTimeStats::from_times(entries.iter().map(|e| e.finish_time)),
    }
}
