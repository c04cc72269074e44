//! Status classification from remaining hours

use serde::{Deserialize, Serialize};

use crate::config::{defaults, FleetConfig};
use crate::types::UnitRecord;

/// Service urgency of a unit, ordered by increasing severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusKind {
    Ok,
    DueSoon,
    Overdue,
}

impl StatusKind {
    /// All kinds, least severe first.
    pub const ALL: [Self; 3] = [Self::Ok, Self::DueSoon, Self::Overdue];
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusKind::Ok => write!(f, "OK"),
            StatusKind::DueSoon => write!(f, "DUE SOON"),
            StatusKind::Overdue => write!(f, "OVERDUE"),
        }
    }
}

/// Classify by remaining hours against a due-soon threshold.
///
/// First match wins:
/// 1. `remaining < 0` → Overdue
/// 2. `remaining < threshold` → DueSoon
/// 3. otherwise → Ok
pub fn classify_remaining(remaining_hours: f64, due_soon_threshold_hours: f64) -> StatusKind {
    if remaining_hours < 0.0 {
        StatusKind::Overdue
    } else if remaining_hours < due_soon_threshold_hours {
        StatusKind::DueSoon
    } else {
        StatusKind::Ok
    }
}

/// Maps unit records to a [`StatusKind`] using a configurable threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusClassifier {
    due_soon_threshold_hours: f64,
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self::new(defaults::DEFAULT_DUE_SOON_THRESHOLD_HOURS)
    }
}

impl StatusClassifier {
    pub fn new(due_soon_threshold_hours: f64) -> Self {
        Self {
            due_soon_threshold_hours,
        }
    }

    pub fn from_config(config: &FleetConfig) -> Self {
        Self::new(config.thresholds.due_soon_threshold_hours)
    }

    pub fn due_soon_threshold_hours(&self) -> f64 {
        self.due_soon_threshold_hours
    }

    pub fn classify(&self, record: &UnitRecord) -> StatusKind {
        classify_remaining(record.remaining_hours(), self.due_soon_threshold_hours)
    }
}
