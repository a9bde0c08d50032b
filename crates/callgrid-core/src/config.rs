use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CallGridError, ConfigError};
use crate::types::Orientation;

/// Upper bound accepted for the quiescence window.
pub const MAX_MIN_INTERVAL_MS: u64 = 60_000;

/// Grid reconciliation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Minimum spacing between the end of one pass and the start of the next.
    #[serde(alias = "minIntervalMs")]
    pub min_interval_ms: u64,
    pub orientation: Orientation,
    #[serde(alias = "hideLocalLabelOneOnOne")]
    pub hide_local_label_one_on_one: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 2_500,
            orientation: Orientation::Portrait,
            hide_local_label_one_on_one: true,
        }
    }
}

impl GridConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CallGridError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json(&raw)?;
        debug!("Loaded grid config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Override the quiescence window, clamped to `0..=MAX_MIN_INTERVAL_MS`.
    pub fn with_min_interval_ms(mut self, ms: u64) -> Self {
        self.min_interval_ms = ms.min(MAX_MIN_INTERVAL_MS);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_interval_ms > MAX_MIN_INTERVAL_MS {
            return Err(ConfigError::InvalidValue {
                key: "min_interval_ms".into(),
                reason: format!("{} exceeds {}", self.min_interval_ms, MAX_MIN_INTERVAL_MS),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_fields() {
        let json = r#"{
            "minIntervalMs": 500,
            "orientation": "landscape",
            "hideLocalLabelOneOnOne": false
        }"#;

        let cfg = GridConfig::from_json(json).expect("valid camelCase config");
        assert_eq!(cfg.min_interval(), Duration::from_millis(500));
        assert_eq!(cfg.orientation, Orientation::Landscape);
        assert!(!cfg.hide_local_label_one_on_one);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg = GridConfig::from_json(r#"{"min_interval_ms": 100}"#).expect("valid config");
        assert_eq!(cfg.min_interval_ms, 100);
        assert_eq!(cfg.orientation, Orientation::Portrait);
        assert!(cfg.hide_local_label_one_on_one);
    }

    #[test]
    fn rejects_oversized_interval() {
        let err = GridConfig::from_json(r#"{"min_interval_ms": 600000}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn override_is_clamped() {
        let cfg = GridConfig::default().with_min_interval_ms(u64::MAX);
        assert_eq!(cfg.min_interval_ms, MAX_MIN_INTERVAL_MS);
    }
}
