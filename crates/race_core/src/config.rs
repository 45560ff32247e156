//! # Analysis Configuration
//!
//! Tolerances and batch tuning shared by the spurt model and the
//! aggregation pipeline.
//!
//! ```rust
//! use race_core::config::AnalysisConfig;
//!
//! let config = AnalysisConfig::default();
//! assert_eq!(config.spurt_timing_tolerance, 10.0);
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Max |delay| between observed and expected spurt start (기본: 10.0)
    pub spurt_timing_tolerance: f32,
    /// hp death within this many units of the line still counts as survival (기본: 1.0)
    pub stamina_finish_tolerance: f32,
    /// Fraction of course length where the spurt is expected to begin (기본: 2/3)
    pub expected_spurt_ratio: f32,
    /// Largest field accepted at decode; values above 32 are clamped to 32
    pub max_participants: usize,
    /// Batches larger than this are decoded on the rayon pool
    pub parallel_threshold: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            spurt_timing_tolerance: 10.0,
            stamina_finish_tolerance: 1.0,
            expected_spurt_ratio: 2.0 / 3.0,
            max_participants: 32,
            parallel_threshold: 8,
        }
    }
}

impl AnalysisConfig {
    /// Zero tolerances. Every borderline spurt or stamina result flips to failure.
    pub fn strict() -> Self {
        Self {
            spurt_timing_tolerance: 0.0,
            stamina_finish_tolerance: 0.0,
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = AnalysisConfig::default();
        assert!((cfg.expected_spurt_ratio - 0.6667).abs() < 0.001);
        assert_eq!(cfg.max_participants, 32);
    }

    #[test]
    fn test_strict_is_tighter() {
        let strict = AnalysisConfig::strict();
        let default = AnalysisConfig::default();
        assert!(strict.spurt_timing_tolerance < default.spurt_timing_tolerance);
        assert!(strict.stamina_finish_tolerance < default.stamina_finish_tolerance);
        assert_eq!(strict.parallel_threshold, default.parallel_threshold);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = AnalysisConfig::from_json(r#"{"spurt_timing_tolerance": 5.0}"#).unwrap();
        assert_eq!(cfg.spurt_timing_tolerance, 5.0);
        assert_eq!(cfg.stamina_finish_tolerance, 1.0);
    }

    #[test]
    fn test_config_serialization() {
        let cfg = AnalysisConfig::strict();
        let json = serde_json::to_string(&cfg).unwrap();
        let parsed: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cfg);
    }
}
