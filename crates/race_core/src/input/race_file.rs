//! Two-line race files: metadata JSON on line 1, encoded scenario on line 2.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::metadata::{parse_metadata, HorseMetadata};
use crate::RaceError;

const BOM: char = '\u{feff}';
const STAMP_LEN: usize = 15;

/// One race before decoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceInput {
    /// File name, or a content hash when there is none
    pub race_id: String,
    pub metadata: Vec<HorseMetadata>,
    /// Base64 scenario text, trimmed
    pub scenario: String,
}

impl RaceInput {
    /// Split a race file. Unparseable metadata degrades to an empty list.
    pub fn parse(race_id: impl Into<String>, text: &str) -> Self {
        let race_id = race_id.into();
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let mut lines = normalized.lines();
        let meta_line = lines.next().unwrap_or("").trim_start_matches(BOM);
        let scenario = lines.next().unwrap_or("").trim().to_string();

        let metadata = if meta_line.trim().is_empty() {
            Vec::new()
        } else {
            match parse_metadata(meta_line) {
                Ok(records) => records,
                Err(e) => {
                    warn!(
                        race_id = %race_id,
                        error = %e,
                        "metadata unreadable, continuing without it"
                    );
                    Vec::new()
                }
            }
        };

        Self { race_id, metadata, scenario }
    }

    /// Like [`parse`](Self::parse), keyed by a hash of the scenario.
    pub fn from_text(text: &str) -> Self {
        let mut input = Self::parse(String::new(), text);
        input.race_id = race_id_for(&input.scenario);
        input
    }

    /// `YYYYMMDD_HHMMSS` stamp found anywhere in the race id.
    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        let bytes = self.race_id.as_bytes();
        if bytes.len() < STAMP_LEN {
            return None;
        }
        (0..=bytes.len() - STAMP_LEN)
            .filter(|&i| is_stamp(&bytes[i..i + STAMP_LEN]))
            .find_map(|i| {
                let stamp = std::str::from_utf8(&bytes[i..i + STAMP_LEN]).ok()?;
                NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M%S").ok()
            })
    }

    /// Metadata record for a 0-based slot.
    pub fn metadata_for(&self, slot: usize) -> Option<&HorseMetadata> {
        self.metadata.iter().find(|m| m.slot() == slot)
    }
}

fn is_stamp(window: &[u8]) -> bool {
    window.iter().enumerate().all(|(i, b)| if i == 8 { *b == b'_' } else { b.is_ascii_digit() })
}

/// First 16 hex chars of the SHA-256 of the trimmed payload.
pub fn race_id_for(text: &str) -> String {
    let digest = Sha256::digest(text.trim().as_bytes());
    digest.iter().take(8).map(|b| format!("{:02x}", b)).collect()
}

/// Every `*.txt` file in `dir`, sorted by file name.
///
/// Unreadable files come back in the second list and are otherwise skipped.
pub fn load_race_dir(dir: &Path) -> crate::Result<(Vec<RaceInput>, Vec<RaceError>)> {
    let entries = fs::read_dir(dir)
        .map_err(|source| RaceError::Io { path: dir.to_path_buf(), source })?;

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
        })
        .collect();
    paths.sort();

    let mut inputs = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();
    for path in paths {
        match fs::read_to_string(&path) {
            Ok(text) => {
                let race_id = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| race_id_for(&text));
                inputs.push(RaceInput::parse(race_id, &text));
            }
            Err(source) => {
                warn!(path = %path.display(), error = %source, "skipping unreadable race file");
                failures.push(RaceError::Io { path, source });
            }
        }
    }
    debug!(
        dir = %dir.display(),
        loaded = inputs.len(),
        failed = failures.len(),
        "race directory loaded"
    );
    Ok((inputs, failures))
}
