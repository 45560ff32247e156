//! Participant metadata carried on line 1 of a race file.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::DistanceBand;
use crate::telemetry::RunningStyle;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillEntry {
    pub skill_id: i32,
    pub level: u32,
}

/// One participant record. Every field is optional in the source JSON.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HorseMetadata {
    /// 1-based gate slot
    pub frame_order: u32,
    pub trainer_name: String,
    pub viewer_id: u64,
    pub chara_id: u32,
    pub card_id: u32,
    pub trained_chara_id: u32,
    pub running_style: u8,
    pub speed: u32,
    pub stamina: u32,
    pub pow: u32,
    pub guts: u32,
    pub wiz: u32,
    pub proper_distance_short: u8,
    pub proper_distance_mile: u8,
    pub proper_distance_middle: u8,
    pub proper_distance_long: u8,
    pub skill_array: Vec<SkillEntry>,
}

impl HorseMetadata {
    /// 0-based participant slot. `frame_order` 0 is read as 1.
    pub fn slot(&self) -> usize {
        self.frame_order.max(1) as usize - 1
    }

    pub fn has_skill(&self, skill_id: i32) -> bool {
        self.skill_array.iter().any(|s| s.skill_id == skill_id)
    }
}

/// Stat block and identity the spurt model reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParticipantAttributes {
    pub speed: u32,
    pub stamina: u32,
    pub power: u32,
    pub guts: u32,
    pub wit: u32,
    /// Proficiency rank ids for short, mile, middle, long
    pub proper_distance: [u8; 4],
    pub skills: Vec<SkillEntry>,
    pub trainer_name: String,
    pub chara_id: u32,
    pub card_id: u32,
    pub trained_chara_id: u32,
    pub running_style: RunningStyle,
}

impl ParticipantAttributes {
    pub fn proper_distance(&self, band: DistanceBand) -> u8 {
        self.proper_distance[band.id() as usize - 1]
    }
}

impl From<&HorseMetadata> for ParticipantAttributes {
    fn from(m: &HorseMetadata) -> Self {
        Self {
            speed: m.speed,
            stamina: m.stamina,
            power: m.pow,
            guts: m.guts,
            wit: m.wiz,
            proper_distance: [
                m.proper_distance_short,
                m.proper_distance_mile,
                m.proper_distance_middle,
                m.proper_distance_long,
            ],
            skills: m.skill_array.clone(),
            trainer_name: m.trainer_name.clone(),
            chara_id: m.chara_id,
            card_id: m.card_id,
            trained_chara_id: m.trained_chara_id,
            running_style: RunningStyle::from_id(m.running_style),
        }
    }
}

/// Parse line 1 of a race file: a JSON array of records or a single record.
pub fn parse_metadata(text: &str) -> crate::Result<Vec<HorseMetadata>> {
    let value: serde_json::Value = serde_json::from_str(text.trim())?;
    let records = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        serde_json::Value::Object(_) => vec![serde_json::from_value(value)?],
        other => {
            return Err(crate::RaceError::MalformedMetadata(format!(
                "expected array or object, got {}",
                json_kind(&other)
            )))
        }
    };
    Ok(records)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Replace trainer names with `Anon1`, `Anon2`, ... in first-seen order and
/// clear viewer ids.
pub fn anonymize_metadata(records: &[HorseMetadata]) -> Vec<HorseMetadata> {
    let mut aliases: HashMap<String, String> = HashMap::new();
    records
        .iter()
        .map(|record| {
            let next = aliases.len() + 1;
            let alias = aliases
                .entry(record.trainer_name.clone())
                .or_insert_with(|| format!("Anon{}", next))
                .clone();
            HorseMetadata { trainer_name: alias, viewer_id: 0, ..record.clone() }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::metadata_json;

    #[test]
    fn test_parse_array() {
        let records = parse_metadata(&metadata_json(4, &["alice", "bob"], 1100)).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[2].trainer_name, "alice");
        assert_eq!(records[3].slot(), 3);
        assert!(records[0].has_skill(200011));
    }

    #[test]
    fn test_parse_single_object_with_missing_fields() {
        let records = parse_metadata(r#"{"trainer_name": "solo", "chara_id": 1001}"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].frame_order, 0);
        assert_eq!(records[0].slot(), 0);
        assert!(records[0].skill_array.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_metadata("not json"),
            Err(crate::RaceError::MalformedMetadata(_))
        ));
        assert!(matches!(parse_metadata("42"), Err(crate::RaceError::MalformedMetadata(_))));
    }

    #[test]
    fn test_attributes_from_metadata() {
        let records = parse_metadata(&metadata_json(2, &["a"], 1100)).unwrap();
        let attrs = ParticipantAttributes::from(&records[1]);
        assert_eq!(attrs.speed, 1100);
        assert_eq!(attrs.proper_distance(DistanceBand::Middle), 7);
        assert_eq!(attrs.proper_distance(DistanceBand::Short), 5);
        assert_eq!(attrs.running_style, RunningStyle::PaceChaser);
    }

    #[test]
    fn test_anonymize_first_seen_order() {
        let records = parse_metadata(&metadata_json(4, &["zed", "amy"], 1000)).unwrap();
        let anon = anonymize_metadata(&records);
        let names: Vec<&str> = anon.iter().map(|r| r.trainer_name.as_str()).collect();
        assert_eq!(names, vec!["Anon1", "Anon2", "Anon1", "Anon2"]);
        assert!(anon.iter().all(|r| r.viewer_id == 0));
        assert_eq!(anon[1].chara_id, records[1].chara_id);
    }
}
