// Analysis configuration
// Per-profile settings loaded from JSON with per-field defaults

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::dunes::{CrestConfig, GeometryConfig};
use crate::wavelet::WaveletConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for analysing one profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// First analysed sample (istart)
    pub start: usize,

    /// End of the analysed range, exclusive; `None` runs to the last sample
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,

    pub wavelet: WaveletConfig,
    pub crests: CrestConfig,
    pub geometry: GeometryConfig,
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Analysed range `[start, end)` for a profile of `len` samples
    pub fn range(&self, len: usize) -> (usize, usize) {
        (self.start, self.end.unwrap_or(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AnalysisConfig::from_json_str(
            r#"{ "start": 10, "wavelet": { "low_scale": 5.0 }, "geometry": { "max_length": 150.0 } }"#,
        )
        .unwrap();

        assert_eq!(config.start, 10);
        assert_eq!(config.end, None);
        assert_eq!(config.wavelet.low_scale, 5.0);
        assert_eq!(config.wavelet.high_scale, 300.0);
        assert_eq!(config.crests.prominence, 0.1);
        assert_eq!(config.geometry.max_length, 150.0);
        assert_eq!(config.range(400), (10, 400));
    }

    #[test]
    fn test_config_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("analysis.json");

        let config = AnalysisConfig {
            end: Some(250),
            ..Default::default()
        };
        let json = serde_json::to_string_pretty(&config).unwrap();
        std::fs::write(&path, &json).unwrap();

        // Only per-profile sections; the lag window belongs to survey pairs
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["crests", "end", "geometry", "start", "wavelet"]);

        let loaded = AnalysisConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded.range(400), (0, 250));
        assert_eq!(loaded.geometry.max_length, 300.0);
    }

    #[test]
    fn test_bad_config() {
        assert!(matches!(
            AnalysisConfig::from_json_str("{ \"start\": -1 }"),
            Err(ConfigError::Json(_))
        ));

        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            AnalysisConfig::from_json_file(&temp_dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
