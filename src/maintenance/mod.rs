//! Maintenance status engine
//!
//! Pure, synchronous computations over unit records:
//!
//! - **Status Classifier**: remaining hours → `OK` / `DUE_SOON` / `OVERDUE`
//! - **Fleet Aggregator**: per-status and per-filter id lists for a snapshot
//! - **Service Logger**: validated single-step transform of a record by a service event
//!
//! Nothing here touches storage; the [`crate::tracker`] wires these to a repository.

mod aggregator;
mod classifier;
mod service_log;

pub use aggregator::{summarize, FleetSummary, StatusBuckets};
pub use classifier::{classify_remaining, StatusClassifier, StatusKind};
pub use service_log::{ServiceLogger, ValidationError};
