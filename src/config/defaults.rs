//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Config Loading
// ============================================================================

/// Environment variable holding the path to the fleet config file.
pub const CONFIG_ENV_VAR: &str = "TIPPER_CONFIG";

/// Config file looked up in the working directory when the env var is unset.
pub const DEFAULT_CONFIG_FILE: &str = "fleet_config.toml";

// ============================================================================
// Status Classification
// ============================================================================

/// Units with fewer remaining hours than this are "due soon".
pub const DEFAULT_DUE_SOON_THRESHOLD_HOURS: f64 = 100.0;

// ============================================================================
// Service Intervals
// ============================================================================

/// Interval table applied when the config file has no `[service_intervals]`.
///
/// Label → hours added to the meter reading at service time.
pub const DEFAULT_SERVICE_INTERVALS: &[(&str, f64)] = &[("1000hrs", 1000.0), ("2500hrs", 2500.0)];

// ============================================================================
// Storage
// ============================================================================

/// Default sled database location.
pub const DEFAULT_DB_PATH: &str = "./data/fleet.db";

/// Maximum service events returned by the history endpoint.
pub const SERVICE_HISTORY_LIMIT: usize = 200;

// ============================================================================
// HTTP Server
// ============================================================================

/// Default bind address for the JSON API.
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8080";
