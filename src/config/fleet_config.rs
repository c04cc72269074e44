//! Fleet Configuration - operator-tunable maintenance thresholds as TOML
//!
//! Each struct implements `Default` with the values in [`super::defaults`],
//! so a missing config file yields a fully working setup.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::types::{canonical_label, OTHER_SERVICE_LABEL};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a fleet deployment.
///
/// Load with `FleetConfig::load()` which searches:
/// 1. `$TIPPER_CONFIG` env var
/// 2. `./fleet_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Fleet / site identification
    #[serde(default)]
    pub fleet: FleetInfo,

    /// Status classification thresholds
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Service label → hours until the next service
    #[serde(default = "default_service_intervals")]
    pub service_intervals: BTreeMap<String, f64>,

    /// Repository location
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            fleet: FleetInfo::default(),
            thresholds: ThresholdConfig::default(),
            service_intervals: default_service_intervals(),
            storage: StorageConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl FleetConfig {
    /// Load configuration using the standard search order:
    /// 1. `$TIPPER_CONFIG` environment variable
    /// 2. `./fleet_config.toml` in the current working directory
    /// 3. Built-in defaults
    ///
    /// A file that fails to load or validate is logged and skipped.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), fleet = %config.fleet.name, "Loaded fleet config from TIPPER_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from TIPPER_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "TIPPER_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(defaults::DEFAULT_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(fleet = %config.fleet.name, "Loaded fleet config from ./fleet_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./fleet_config.toml, using defaults");
                }
            }
        }

        info!("No fleet_config.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings and never fail the parse.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Fleet config saved");
        Ok(())
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - The due-soon threshold must be finite and non-negative
    /// - Every service interval must be finite and > 0
    /// - Interval labels must be non-empty, must not shadow "Other" and must
    ///   already be in the form events are matched against (no surrounding
    ///   whitespace, no " Service" suffix)
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let threshold = self.thresholds.due_soon_threshold_hours;
        if !threshold.is_finite() {
            errors.push(format!(
                "thresholds.due_soon_threshold_hours must be finite (got {threshold})"
            ));
        } else if threshold < 0.0 {
            errors.push(format!(
                "thresholds.due_soon_threshold_hours = {threshold:.1} cannot be negative"
            ));
        }

        if let Some(minutes) = self.fleet.utc_offset_minutes {
            if self.fleet.utc_offset().is_none() {
                errors.push(format!(
                    "fleet.utc_offset_minutes = {minutes} must be within one day of UTC"
                ));
            }
        }

        for (label, hours) in &self.service_intervals {
            if label.trim().is_empty() {
                errors.push("service_intervals: labels must not be empty".to_string());
                continue;
            }
            let canonical = canonical_label(label);
            if canonical.eq_ignore_ascii_case(OTHER_SERVICE_LABEL) {
                errors.push(format!(
                    "service_intervals.{label}: '{OTHER_SERVICE_LABEL}' is reserved for unscheduled services"
                ));
            } else if canonical != label {
                errors.push(format!(
                    "service_intervals.'{label}' can never match a service event, use '{canonical}'"
                ));
            }
            if !hours.is_finite() || *hours <= 0.0 {
                errors.push(format!(
                    "service_intervals.{label} = {hours} must be a positive number of hours"
                ));
            }
        }

        if self.service_intervals.is_empty() {
            warn!("service_intervals is empty, only 'Other' services can be logged");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(toml::ser::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Fleet Info
// ============================================================================

/// Identification metadata; appears in logs and API responses only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetInfo {
    /// Fleet name
    #[serde(default = "default_fleet_name")]
    pub name: String,

    /// Site / mine name
    #[serde(default)]
    pub site: String,

    /// Site offset from UTC in minutes (e.g. 480 for AWST).
    ///
    /// Decides which calendar date counts as "today" when service dates are
    /// checked. Unset means the host's local time zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
}

impl FleetInfo {
    /// Configured site offset, `None` when unset or out of range.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .and_then(|m| m.checked_mul(60))
            .and_then(FixedOffset::east_opt)
    }
}

fn default_fleet_name() -> String {
    "DEFAULT".to_string()
}

impl Default for FleetInfo {
    fn default() -> Self {
        Self {
            name: default_fleet_name(),
            site: String::new(),
            utc_offset_minutes: None,
        }
    }
}

// ============================================================================
// Thresholds
// ============================================================================

/// Status classification thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Remaining hours below which a unit is "due soon".
    /// Retuned per fleet depending on how far ahead workshops plan.
    #[serde(default = "default_due_soon_threshold")]
    pub due_soon_threshold_hours: f64,
}

fn default_due_soon_threshold() -> f64 {
    defaults::DEFAULT_DUE_SOON_THRESHOLD_HOURS
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            due_soon_threshold_hours: default_due_soon_threshold(),
        }
    }
}

// ============================================================================
// Service Intervals
// ============================================================================

fn default_service_intervals() -> BTreeMap<String, f64> {
    defaults::DEFAULT_SERVICE_INTERVALS
        .iter()
        .map(|&(label, hours)| (label.to_string(), hours))
        .collect()
}

// ============================================================================
// Storage Config
// ============================================================================

/// Repository location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// sled database directory.
    ///
    /// Can be overridden by the `--db` CLI flag.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_DB_PATH)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

// ============================================================================
// Server Config
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `TIPPER_SERVER_ADDR` env var or `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    defaults::DEFAULT_SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = FleetConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: FleetConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config.thresholds.due_soon_threshold_hours, 100.0);
        assert_eq!(config.service_intervals.get("1000hrs"), Some(&1000.0));
        assert_eq!(config.service_intervals.get("2500hrs"), Some(&2500.0));
        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert_eq!(config.fleet.name, "DEFAULT");
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[fleet]
name = "North Pit"

[thresholds]
due_soon_threshold_hours = 150.0
"#;
        let config = FleetConfig::from_toml_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.fleet.name, "North Pit");
        assert_eq!(config.thresholds.due_soon_threshold_hours, 150.0);
        // Non-overridden values retain defaults
        assert_eq!(config.service_intervals.len(), 2);
        assert_eq!(config.storage.db_path, PathBuf::from("./data/fleet.db"));
    }

    #[test]
    fn test_interval_table_replaces_defaults() {
        let toml_str = r#"
[service_intervals]
"500hrs" = 500.0
"1000hrs" = 1000.0
"#;
        let config = FleetConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.service_intervals.len(), 2);
        assert_eq!(config.service_intervals.get("500hrs"), Some(&500.0));
        assert!(!config.service_intervals.contains_key("2500hrs"));
    }

    #[test]
    fn test_validation_catches_negative_threshold() {
        let mut config = FleetConfig::default();
        config.thresholds.due_soon_threshold_hours = -1.0;
        let result = config.validate();
        assert!(result.is_err());
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("due_soon_threshold_hours")));
        }
    }

    #[test]
    fn test_validation_catches_nan_threshold() {
        let mut config = FleetConfig::default();
        config.thresholds.due_soon_threshold_hours = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_catches_bad_intervals() {
        let mut config = FleetConfig::default();
        config.service_intervals.insert("250hrs".to_string(), 0.0);
        config.service_intervals.insert("Other".to_string(), 100.0);
        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 2, "errors: {errors:?}");
                assert!(errors.iter().any(|e| e.contains("250hrs")));
                assert!(errors.iter().any(|e| e.contains("reserved")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_catches_unreachable_labels() {
        let mut config = FleetConfig::default();
        config.service_intervals.insert("500hrs Service".to_string(), 500.0);
        config.service_intervals.insert(" 750hrs".to_string(), 750.0);
        config.service_intervals.insert("Other service".to_string(), 100.0);
        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 3, "errors: {errors:?}");
                assert!(errors.iter().any(|e| e.contains("use '500hrs'")));
                assert!(errors.iter().any(|e| e.contains("use '750hrs'")));
                assert!(errors.iter().any(|e| e.contains("reserved")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_utc_offset() {
        let config =
            FleetConfig::from_toml_str("[fleet]\nutc_offset_minutes = 480\n").unwrap();
        assert_eq!(config.fleet.utc_offset(), FixedOffset::east_opt(8 * 3600));
        assert_eq!(FleetConfig::default().fleet.utc_offset(), None);

        let mut config = FleetConfig::default();
        config.fleet.utc_offset_minutes = Some(24 * 60);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_roundtrip_toml() {
        let original = FleetConfig::default();
        let toml_str = original.to_toml().expect("serialization should work");
        let roundtripped = FleetConfig::from_toml_str(&toml_str).expect("deserialization should work");
        assert_eq!(
            original.thresholds.due_soon_threshold_hours,
            roundtripped.thresholds.due_soon_threshold_hours
        );
        assert_eq!(original.service_intervals, roundtripped.service_intervals);
    }

    #[test]
    fn test_all_sections_serialize() {
        let toml_str = FleetConfig::default().to_toml().unwrap();
        assert!(toml_str.contains("[fleet]"), "Missing [fleet] section");
        assert!(toml_str.contains("[thresholds]"), "Missing [thresholds] section");
        assert!(toml_str.contains("[service_intervals]"), "Missing [service_intervals] section");
        assert!(toml_str.contains("[storage]"), "Missing [storage] section");
        assert!(toml_str.contains("[server]"), "Missing [server] section");
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fleet_config.toml");

        let mut config = FleetConfig::default();
        config.fleet.name = "South Pit".to_string();
        config.thresholds.due_soon_threshold_hours = 80.0;
        config.save_to_file(&path).unwrap();

        let loaded = FleetConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.fleet.name, "South Pit");
        assert_eq!(loaded.thresholds.due_soon_threshold_hours, 80.0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = FleetConfig::load_from_file(Path::new("/nonexistent/fleet_config.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }
}
