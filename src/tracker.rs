//! Maintenance Tracker
//!
//! Wires the pure maintenance engine to a [`FleetRepository`]:
//! load snapshot → validate → classify / summarize, and
//! load unit → apply service → save → append history → reclassify.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::FleetConfig;
use crate::maintenance::{
    summarize, FleetSummary, ServiceLogger, StatusClassifier, StatusKind, ValidationError,
};
use crate::storage::{FleetRepository, RepositoryError};
use crate::types::{validate_fleet, DataError, ServiceEvent, UnitRecord};

/// Errors surfaced by tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid fleet data: {0}")]
    Data(#[from] DataError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("unknown unit '{0}'")]
    UnknownUnit(String),
}

/// A unit record paired with its current classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedUnit {
    pub record: UnitRecord,
    pub status: StatusKind,
}

/// Fleet state as of one repository read.
#[derive(Debug, Clone, Serialize)]
pub struct FleetSnapshot {
    /// Units in repository order
    pub units: Vec<ClassifiedUnit>,
    pub summary: FleetSummary,
}

impl FleetSnapshot {
    /// Units with the given status, in repository order.
    pub fn with_status(&self, kind: StatusKind) -> impl Iterator<Item = &ClassifiedUnit> {
        self.units.iter().filter(move |u| u.status == kind)
    }
}

/// Maintenance workflow over an injected repository.
#[derive(Clone)]
pub struct MaintenanceTracker {
    repository: Arc<dyn FleetRepository>,
    classifier: StatusClassifier,
    logger: ServiceLogger,
}

impl MaintenanceTracker {
    pub fn new(
        repository: Arc<dyn FleetRepository>,
        classifier: StatusClassifier,
        logger: ServiceLogger,
    ) -> Self {
        Self {
            repository,
            classifier,
            logger,
        }
    }

    pub fn from_config(repository: Arc<dyn FleetRepository>, config: &FleetConfig) -> Self {
        Self::new(
            repository,
            StatusClassifier::from_config(config),
            ServiceLogger::from_config(config),
        )
    }

    pub fn classifier(&self) -> &StatusClassifier {
        &self.classifier
    }

    pub fn logger(&self) -> &ServiceLogger {
        &self.logger
    }

    pub fn backend_name(&self) -> &'static str {
        self.repository.backend_name()
    }

    /// Load and validate the whole fleet.
    fn load_fleet(&self) -> Result<Vec<UnitRecord>, TrackerError> {
        let fleet = self.repository.load_fleet()?;
        if let Err(e) = validate_fleet(&fleet) {
            warn!(backend = self.backend_name(), error = %e, "Repository returned invalid fleet data");
            return Err(e.into());
        }
        Ok(fleet)
    }

    /// Classify every unit and summarize the fleet.
    pub fn snapshot(&self) -> Result<FleetSnapshot, TrackerError> {
        let fleet = self.load_fleet()?;
        let summary = summarize(&fleet, &self.classifier);
        let units = fleet
            .into_iter()
            .map(|record| ClassifiedUnit {
                status: self.classifier.classify(&record),
                record,
            })
            .collect();
        Ok(FleetSnapshot { units, summary })
    }

    /// Look up one unit with its current status.
    pub fn unit(&self, unit_id: &str) -> Result<ClassifiedUnit, TrackerError> {
        let record = self
            .load_fleet()?
            .into_iter()
            .find(|u| u.id == unit_id)
            .ok_or_else(|| TrackerError::UnknownUnit(unit_id.to_string()))?;
        Ok(ClassifiedUnit {
            status: self.classifier.classify(&record),
            record,
        })
    }

    /// Apply a service event to the unit it names and persist the result.
    pub fn log_service(&self, event: &ServiceEvent) -> Result<ClassifiedUnit, TrackerError> {
        self.log_service_for(&event.unit_id, event)
    }

    /// Apply a service event submitted against `unit_id`.
    ///
    /// An event naming a different unit is rejected as misrouted, and a
    /// serviced record that breaks the model invariants is never saved. The
    /// record is saved before the event is appended to history, so a failed append
    /// leaves the unit serviced but without a history entry.
    pub fn log_service_for(
        &self,
        unit_id: &str,
        event: &ServiceEvent,
    ) -> Result<ClassifiedUnit, TrackerError> {
        let current = self.unit(unit_id)?.record;

        let updated = match self.logger.apply_service(&current, event) {
            Ok(updated) => updated,
            Err(e) => {
                warn!(unit = %unit_id, reason = %e, "Service event rejected");
                return Err(e.into());
            }
        };

        if let Err(e) = updated.validate() {
            warn!(unit = %unit_id, error = %e, "Serviced record is invalid, not saved");
            return Err(e.into());
        }

        self.repository.save_unit(&updated)?;
        self.repository.append_service_event(event)?;

        let status = self.classifier.classify(&updated);
        info!(
            unit = %updated.id,
            service = %event.service_type,
            date = %event.date,
            due_at_meter = updated.due_at_meter,
            status = %status,
            "Service logged"
        );

        Ok(ClassifiedUnit {
            record: updated,
            status,
        })
    }

    /// Service history of a known unit, oldest first.
    pub fn service_history(&self, unit_id: &str) -> Result<Vec<ServiceEvent>, TrackerError> {
        // Resolve the unit first so unknown ids are reported as such
        self.unit(unit_id)?;
        Ok(self.repository.service_history(unit_id)?)
    }

    /// Onboard or replace units after validating them as a batch.
    ///
    /// Nothing is written unless every record in the batch is valid and ids
    /// are unique within it. Ids already stored are replaced in place.
    pub fn import(&self, records: &[UnitRecord]) -> Result<usize, TrackerError> {
        validate_fleet(records)?;

        for record in records {
            self.repository.save_unit(record)?;
        }

        info!(count = records.len(), backend = self.backend_name(), "Units imported");
        Ok(records.len())
    }
}
