//! Fleet Configuration Module
//!
//! Provides per-fleet configuration loaded from TOML files so that the
//! due-soon threshold and the service interval table can be retuned without
//! code changes.
//!
//! ## Loading Order
//!
//! 1. `TIPPER_CONFIG` environment variable (path to TOML file)
//! 2. `fleet_config.toml` in the current working directory
//! 3. Built-in defaults (see [`defaults`])
//!
//! ## Example
//!
//! ```toml
//! [fleet]
//! name = "North Pit"
//! utc_offset_minutes = 480
//!
//! [thresholds]
//! due_soon_threshold_hours = 100.0
//!
//! [service_intervals]
//! "1000hrs" = 1000.0
//! "2500hrs" = 2500.0
//! ```

pub mod defaults;
mod fleet_config;
pub mod validation;

pub use fleet_config::*;
