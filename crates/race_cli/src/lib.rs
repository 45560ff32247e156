//! Race CLI
//!
//! 레이스 파일 디렉터리 → JSON 리포트
//! Each command loads its inputs, runs one report and returns JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::{info, warn};

use race_core::analysis::{AnalyzedRace, GroupKey};
use race_core::input::load_race_dir;
use race_core::{AnalysisConfig, RaceBatch, RaceInput};

/// Defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    AnalysisConfig::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
}

/// Every race file in `dir`, decoded and classified.
pub fn load_batch(dir: &Path, config: &AnalysisConfig) -> Result<RaceBatch> {
    let (inputs, failures) =
        load_race_dir(dir).with_context(|| format!("listing race files in {}", dir.display()))?;
    for failure in &failures {
        warn!(error = %failure, "race file skipped");
    }
    info!(dir = %dir.display(), files = inputs.len(), "loaded race files");
    Ok(RaceBatch::ingest(&inputs, config))
}

pub fn players(batch: &RaceBatch) -> Result<Value> {
    Ok(serde_json::to_value(batch.name_frequency())?)
}

/// Summary and history for `player`, or the most frequent player.
pub fn summary(batch: &RaceBatch, player: Option<&str>) -> Result<Value> {
    let name = match player {
        Some(name) => name.to_string(),
        None => batch.default_player().context("no players found in the race files")?,
    };
    let report = batch.report(&GroupKey::Player(name.clone()));
    Ok(json!({
        "report": report,
        "history": batch.race_history(&name),
    }))
}

pub fn styles(batch: &RaceBatch) -> Result<Value> {
    Ok(serde_json::to_value(batch.report(&GroupKey::RunningStyle))?)
}

pub fn characters(batch: &RaceBatch) -> Result<Value> {
    Ok(serde_json::to_value(batch.report(&GroupKey::Character))?)
}

pub fn skill(batch: &RaceBatch, skill_id: i32, modifier_ids: &[i32]) -> Result<Value> {
    let key = if modifier_ids.is_empty() {
        GroupKey::SkillOccurrence(skill_id)
    } else {
        GroupKey::SkillModifierSplit { skill_id, modifier_ids: modifier_ids.to_vec() }
    };
    Ok(serde_json::to_value(batch.report(&key))?)
}

/// Per-participant spurt/stamina for a single race file. Decode errors are fatal here.
pub fn race(file: &Path, config: &AnalysisConfig) -> Result<Value> {
    let text =
        fs::read_to_string(file).with_context(|| format!("reading race file {}", file.display()))?;
    let race_id = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| race_core::input::race_id_for(&text));
    let input = RaceInput::parse(race_id, &text);
    let race = AnalyzedRace::analyze(&input, config)
        .with_context(|| format!("analyzing {}", file.display()))?;
    Ok(json!({
        "race_id": race.race_id,
        "recorded_at": race.recorded_at,
        "participants": race.log.participant_count(),
        "frames": race.log.frames.len(),
        "entries": race.entries,
    }))
}
