//! sled-backed fleet repository
//!
//! Trees:
//! - `units`: sequence (u64 big-endian) → JSON `UnitRecord`
//! - `unit_index`: unit id → sequence key in `units`
//! - `service_events`: `unit_id \0 sequence` → JSON `ServiceEvent`
//!
//! Sequence keys come from `Db::generate_id`, which is monotonic, so
//! iterating `units` yields onboarding order and a unit's events come back
//! oldest first.

use std::path::Path;

use super::persistence::{FleetRepository, RepositoryError};
use crate::types::{ServiceEvent, UnitRecord};

impl From<sled::Error> for RepositoryError {
    fn from(err: sled::Error) -> Self {
        RepositoryError::Storage(err.to_string())
    }
}

/// Durable repository stored in a sled database directory.
#[derive(Clone)]
pub struct SledRepository {
    db: sled::Db,
    units: sled::Tree,
    unit_index: sled::Tree,
    events: sled::Tree,
}

impl SledRepository {
    /// Open or create the repository at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path_ref = path.as_ref();
        let db = sled::open(path_ref)?;
        let repo = Self {
            units: db.open_tree("units")?,
            unit_index: db.open_tree("unit_index")?,
            events: db.open_tree("service_events")?,
            db,
        };

        tracing::info!(path = %path_ref.display(), units = repo.units.len(), "Fleet repository opened");

        Ok(repo)
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), RepositoryError> {
        self.db.flush()?;
        Ok(())
    }

    fn event_prefix(unit_id: &str) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(unit_id.len() + 1);
        prefix.extend_from_slice(unit_id.as_bytes());
        prefix.push(0);
        prefix
    }
}

impl FleetRepository for SledRepository {
    fn load_fleet(&self) -> Result<Vec<UnitRecord>, RepositoryError> {
        let mut fleet = Vec::with_capacity(self.units.len());
        for item in self.units.iter() {
            let (_key, value) = item?;
            fleet.push(serde_json::from_slice::<UnitRecord>(&value)?);
        }
        tracing::debug!("Loaded {} units", fleet.len());
        Ok(fleet)
    }

    fn save_unit(&self, record: &UnitRecord) -> Result<(), RepositoryError> {
        let value = serde_json::to_vec(record)?;

        let key = match self.unit_index.get(record.id.as_bytes())? {
            Some(existing) => existing.to_vec(),
            None => {
                let seq = self.db.generate_id()?.to_be_bytes().to_vec();
                self.unit_index.insert(record.id.as_bytes(), seq.as_slice())?;
                seq
            }
        };

        self.units.insert(key, value)?;
        self.db.flush()?;
        Ok(())
    }

    fn append_service_event(&self, event: &ServiceEvent) -> Result<(), RepositoryError> {
        let mut key = Self::event_prefix(&event.unit_id);
        key.extend_from_slice(&self.db.generate_id()?.to_be_bytes());

        let value = serde_json::to_vec(event)?;
        self.events.insert(key, value)?;
        self.db.flush()?;
        Ok(())
    }

    fn service_history(&self, unit_id: &str) -> Result<Vec<ServiceEvent>, RepositoryError> {
        let mut history = Vec::new();
        for item in self.events.scan_prefix(Self::event_prefix(unit_id)) {
            let (_key, value) = item?;
            match serde_json::from_slice::<ServiceEvent>(&value) {
                Ok(event) => history.push(event),
                Err(e) => {
                    tracing::warn!(unit = %unit_id, "Skipping unreadable service event: {}", e);
                }
            }
        }
        Ok(history)
    }

    fn backend_name(&self) -> &'static str {
        "Sled"
    }
}
