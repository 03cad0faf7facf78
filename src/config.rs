use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{ExtractionError, Result};

/// Heuristic constants used across the extraction stages.
///
/// None of these are known to be optimal; they are kept here so a caller can
/// override them from a JSON file without touching code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionTuning {
    /// Max vertical offset (layout units) from a line's anchor for a fragment to join it
    pub line_tolerance: f32,
    /// Font size ratio over the document mean that marks a heading
    pub heading_font_ratio: f32,
    pub policy_window: usize,
    pub weight_target: f64,
    pub weight_tolerance: f64,
    pub title_min_score: f32,
    pub code_anchor_distance: f32,
    pub default_font_size: f32,
    pub timezone: String,
    pub default_due_time: NaiveTime,
    /// Title similarity above which two inline matches with equal weight collapse
    pub near_duplicate_similarity: f32,
}

impl Default for ExtractionTuning {
    fn default() -> Self {
        Self {
            line_tolerance: 5.0,
            heading_font_ratio: 1.2,
            policy_window: 12,
            weight_target: 100.0,
            weight_tolerance: 10.0,
            title_min_score: 0.3,
            code_anchor_distance: 100.0,
            default_font_size: 12.0,
            timezone: "America/Toronto".to_string(),
            default_due_time: NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN),
            near_duplicate_similarity: 0.85,
        }
    }
}

impl ExtractionTuning {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| ExtractionError::io(path, e))?;
        let tuning: Self = serde_json::from_reader(BufReader::new(file))?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<()> {
        if self.line_tolerance < 0.0 {
            return Err(ExtractionError::InvalidTuning(
                "line_tolerance must not be negative".to_string(),
            ));
        }
        if self.heading_font_ratio <= 0.0 {
            return Err(ExtractionError::InvalidTuning(
                "heading_font_ratio must be positive".to_string(),
            ));
        }
        if self.weight_target <= 0.0 || self.weight_tolerance < 0.0 {
            return Err(ExtractionError::InvalidTuning(format!(
                "weight target {} / tolerance {} out of range",
                self.weight_target, self.weight_tolerance
            )));
        }
        if self.default_font_size <= 0.0 {
            return Err(ExtractionError::InvalidTuning(
                "default_font_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn weight_ceiling(&self) -> f64 {
        self.weight_target + self.weight_tolerance
    }

    pub fn weight_floor(&self) -> f64 {
        self.weight_target - self.weight_tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let tuning: ExtractionTuning =
            serde_json::from_str(r#"{ "weight_tolerance": 5.0 }"#).unwrap();
        assert_eq!(tuning.weight_tolerance, 5.0);
        assert_eq!(tuning.policy_window, 12);
        assert_eq!(tuning.weight_ceiling(), 105.0);
        assert_eq!(tuning.weight_floor(), 95.0);
    }

    #[test]
    fn rejects_negative_tolerance() {
        let tuning = ExtractionTuning {
            weight_tolerance: -1.0,
            ..ExtractionTuning::default()
        };
        assert!(tuning.validate().is_err());
    }
}
