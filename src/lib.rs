//! Tipper Maint: hour-meter driven maintenance tracking for a tipper fleet
//!
//! ## Architecture
//!
//! - **Types**: `UnitRecord` and `ServiceEvent`, validated on entry
//! - **Maintenance**: Status classifier, fleet aggregator and service logger
//!   (pure functions over snapshots)
//! - **Storage**: `FleetRepository` trait with in-memory and sled backends
//! - **Tracker**: Workflow glue between the engine and a repository
//! - **API**: Axum dashboard endpoints over the tracker

pub mod api;
pub mod config;
pub mod maintenance;
pub mod storage;
pub mod tracker;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, FleetConfig};

// Re-export the engine
pub use maintenance::{
    summarize, FleetSummary, ServiceLogger, StatusClassifier, StatusKind, ValidationError,
};

// Re-export storage
pub use storage::{FleetRepository, InMemoryRepository, RepositoryError, SledRepository};

// Re-export workflow and model types
pub use tracker::{ClassifiedUnit, FleetSnapshot, MaintenanceTracker, TrackerError};
pub use types::{DataError, ServiceEvent, ServiceType, UnitRecord};
