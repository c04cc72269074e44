//! FleetRepository trait: pluggable storage backend
//!
//! Abstracts unit and service-history persistence so the tracker never knows
//! where records live:
//! - `InMemoryRepository`: for tests, demos and ephemeral deployments
//! - `SledRepository`: embedded on-disk store (see `sled_repo`)

use std::sync::RwLock;

use crate::types::{ServiceEvent, UnitRecord};

/// Trait for pluggable repository backends
///
/// Implementations must be thread-safe (Send + Sync) for shared access
/// across request handlers. Backends store what they are given; record
/// validation happens in the tracker.
pub trait FleetRepository: Send + Sync {
    /// All units in onboarding order
    fn load_fleet(&self) -> Result<Vec<UnitRecord>, RepositoryError>;

    /// Insert a new unit or replace the one with the same id, keeping its position
    fn save_unit(&self, record: &UnitRecord) -> Result<(), RepositoryError>;

    /// Append a service event to the unit's history
    fn append_service_event(&self, event: &ServiceEvent) -> Result<(), RepositoryError>;

    /// Service history of one unit, oldest first
    fn service_history(&self, unit_id: &str) -> Result<Vec<ServiceEvent>, RepositoryError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// In-memory repository
///
/// Thread-safe via `RwLock`. Not durable; data is lost on restart.
#[derive(Default)]
pub struct InMemoryRepository {
    units: RwLock<Vec<UnitRecord>>,
    events: RwLock<Vec<ServiceEvent>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with an initial fleet, in order.
    pub fn with_units(units: impl IntoIterator<Item = UnitRecord>) -> Self {
        Self {
            units: RwLock::new(units.into_iter().collect()),
            events: RwLock::new(Vec::new()),
        }
    }
}

impl FleetRepository for InMemoryRepository {
    fn load_fleet(&self) -> Result<Vec<UnitRecord>, RepositoryError> {
        let store = self
            .units
            .read()
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;
        Ok(store.clone())
    }

    fn save_unit(&self, record: &UnitRecord) -> Result<(), RepositoryError> {
        let mut store = self
            .units
            .write()
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        match store.iter_mut().find(|u| u.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => store.push(record.clone()),
        }
        Ok(())
    }

    fn append_service_event(&self, event: &ServiceEvent) -> Result<(), RepositoryError> {
        self.events
            .write()
            .map_err(|e| RepositoryError::Storage(e.to_string()))?
            .push(event.clone());
        Ok(())
    }

    fn service_history(&self, unit_id: &str) -> Result<Vec<ServiceEvent>, RepositoryError> {
        let store = self
            .events
            .read()
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;
        Ok(store
            .iter()
            .filter(|e| e.unit_id == unit_id)
            .cloned()
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServiceType;
    use chrono::NaiveDate;

    fn unit(id: &str, current: f64) -> UnitRecord {
        UnitRecord::new(id, id, 0.0, 1000.0, current).unwrap()
    }

    fn event(unit_id: &str, day: u32) -> ServiceEvent {
        ServiceEvent::new(
            unit_id,
            ServiceType::Scheduled("1000hrs".into()),
            NaiveDate::from_ymd_opt(2025, 5, day).unwrap(),
        )
    }

    #[test]
    fn test_save_replaces_in_place() {
        let repo = InMemoryRepository::with_units([unit("T1", 10.0), unit("T2", 20.0), unit("T3", 30.0)]);
        repo.save_unit(&unit("T2", 99.0)).unwrap();
        repo.save_unit(&unit("T4", 40.0)).unwrap();

        let fleet = repo.load_fleet().unwrap();
        let ids: Vec<&str> = fleet.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "T2", "T3", "T4"]);
        assert_eq!(fleet[1].current_meter, 99.0);
    }

    #[test]
    fn test_history_filters_by_unit() {
        let repo = InMemoryRepository::new();
        repo.append_service_event(&event("T1", 1)).unwrap();
        repo.append_service_event(&event("T2", 2)).unwrap();
        repo.append_service_event(&event("T1", 3)).unwrap();

        let history = repo.service_history("T1").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date.format("%d").to_string(), "01");
        assert_eq!(history[1].date.format("%d").to_string(), "03");
        assert!(repo.service_history("T9").unwrap().is_empty());
    }

    #[test]
    fn test_trait_object() {
        let repo: Box<dyn FleetRepository> = Box::new(InMemoryRepository::new());
        assert_eq!(repo.backend_name(), "InMemory");
        repo.save_unit(&unit("T1", 1.0)).unwrap();
        assert_eq!(repo.load_fleet().unwrap().len(), 1);
    }
}
