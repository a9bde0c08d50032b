//! Demo configuration: optional JSON file plus an environment override.

use anyhow::{Context, Result};
use callgrid_core::GridConfig;
use tracing::{info, warn};

pub const CONFIG_VAR: &str = "CALLGRID_CONFIG";
pub const MIN_INTERVAL_VAR: &str = "CALLGRID_MIN_INTERVAL_MS";

/// Reads `CALLGRID_CONFIG` and `CALLGRID_MIN_INTERVAL_MS`.
pub fn from_env() -> Result<GridConfig> {
    let base = match std::env::var(CONFIG_VAR) {
        Ok(path) => {
            info!("Loading config from {}", path);
            GridConfig::from_file(&path).with_context(|| format!("loading {path}"))?
        }
        Err(_) => GridConfig::default(),
    };
    resolve(base, std::env::var(MIN_INTERVAL_VAR).ok().as_deref())
}

/// Applies the min-interval override to `base` and validates the result.
///
/// An unparsable override is ignored; an oversized one is clamped.
pub fn resolve(base: GridConfig, min_interval_ms: Option<&str>) -> Result<GridConfig> {
    let config = match min_interval_ms.map(|raw| (raw, raw.trim().parse::<u64>())) {
        Some((_, Ok(ms))) => base.with_min_interval_ms(ms),
        Some((raw, Err(_))) => {
            warn!("{}={:?} is not a number of milliseconds, ignored", MIN_INTERVAL_VAR, raw);
            base
        }
        None => base,
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use callgrid_core::{config::MAX_MIN_INTERVAL_MS, Orientation};

    #[test]
    fn override_replaces_file_value() {
        let base = GridConfig::from_json(r#"{"min_interval_ms": 1000, "orientation": "landscape"}"#)
            .expect("valid json");
        let config = resolve(base, Some("250")).expect("valid");
        assert_eq!(config.min_interval_ms, 250);
        assert_eq!(config.orientation, Orientation::Landscape);
    }

    #[test]
    fn garbage_override_is_ignored() {
        let config = resolve(GridConfig::default(), Some("soon")).expect("valid");
        assert_eq!(config, GridConfig::default());
    }

    #[test]
    fn oversized_override_is_clamped() {
        let config = resolve(GridConfig::default(), Some("999999")).expect("valid");
        assert_eq!(config.min_interval_ms, MAX_MIN_INTERVAL_MS);
    }
}
