//! UnitRecord: one tipper's maintenance state

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

// ============================================================================
// Data Errors
// ============================================================================

/// A unit record that violates the model invariants.
///
/// Raised when records enter the system (repository load, import), never
/// coerced into defaults.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("unit record has an empty id")]
    EmptyId,

    #[error("unit {unit}: {field} must be a finite number")]
    NonFinite { unit: String, field: &'static str },

    #[error("unit {unit}: {field} = {value} cannot be negative")]
    NegativeMeter {
        unit: String,
        field: &'static str,
        value: f64,
    },

    #[error("unit {unit}: due_at_meter ({due}) is below last_service_meter ({last})")]
    DueBeforeLastService { unit: String, due: f64, last: f64 },

    #[error("unit id '{0}' appears more than once in the fleet")]
    DuplicateId(String),
}

// ============================================================================
// UnitRecord
// ============================================================================

/// Maintenance state of a single fleet unit.
///
/// All meter values are hour-meter readings in hours. The remaining hours
/// until service are always derived from `due_at_meter` and `current_meter`
/// via [`UnitRecord::remaining_hours`] and are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    /// Stable identifier, unique across the fleet
    pub id: String,

    /// Human-readable name, e.g. "TIPPEG-6 - APSYM/CSF2"
    pub label: String,

    /// Hour meter at the last service
    pub last_service_meter: f64,

    /// Description of the last service performed
    #[serde(default)]
    pub last_service_type: Option<String>,

    /// Date of the last logged service
    #[serde(default)]
    pub last_service_date: Option<NaiveDate>,

    /// Hour meter at which the next service is due
    pub due_at_meter: f64,

    /// Latest reported hour meter
    pub current_meter: f64,

    /// Filter category → expiring/expired
    #[serde(default)]
    pub filter_flags: BTreeMap<String, bool>,
}

impl UnitRecord {
    /// Build a record with no service history, validating meter invariants.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        last_service_meter: f64,
        due_at_meter: f64,
        current_meter: f64,
    ) -> Result<Self, DataError> {
        let record = Self {
            id: id.into(),
            label: label.into(),
            last_service_meter,
            last_service_type: None,
            last_service_date: None,
            due_at_meter,
            current_meter,
            filter_flags: BTreeMap::new(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Builder-style filter flag setter.
    #[must_use]
    pub fn with_filter(mut self, category: impl Into<String>, expiring: bool) -> Self {
        self.filter_flags.insert(category.into(), expiring);
        self
    }

    /// Hours left until the next service is due. Negative means overdue.
    pub fn remaining_hours(&self) -> f64 {
        self.due_at_meter - self.current_meter
    }

    /// Hours until service clamped at zero, as shown to operators.
    pub fn hours_until_service(&self) -> f64 {
        self.remaining_hours().max(0.0)
    }

    /// Filter categories currently flagged as expiring.
    pub fn expiring_filters(&self) -> impl Iterator<Item = &str> {
        self.filter_flags
            .iter()
            .filter(|&(_, &expiring)| expiring)
            .map(|(name, _)| name.as_str())
    }

    /// Check the record invariants.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.id.trim().is_empty() {
            return Err(DataError::EmptyId);
        }

        let meters = [
            ("last_service_meter", self.last_service_meter),
            ("due_at_meter", self.due_at_meter),
            ("current_meter", self.current_meter),
        ];

        for (field, value) in meters {
            if !value.is_finite() {
                return Err(DataError::NonFinite {
                    unit: self.id.clone(),
                    field,
                });
            }
            if value < 0.0 {
                return Err(DataError::NegativeMeter {
                    unit: self.id.clone(),
                    field,
                    value,
                });
            }
        }

        if self.due_at_meter < self.last_service_meter {
            return Err(DataError::DueBeforeLastService {
                unit: self.id.clone(),
                due: self.due_at_meter,
                last: self.last_service_meter,
            });
        }

        Ok(())
    }
}

/// Validate every record of a fleet snapshot, including id uniqueness.
///
/// Stops at the first violation.
pub fn validate_fleet(records: &[UnitRecord]) -> Result<(), DataError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        record.validate()?;
        if !seen.insert(record.id.as_str()) {
            return Err(DataError::DuplicateId(record.id.clone()));
        }
    }
    Ok(())
}
