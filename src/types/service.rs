//! ServiceEvent: a logged maintenance action

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Label used for services outside the interval table.
pub const OTHER_SERVICE_LABEL: &str = "Other";

/// Kind of service performed.
///
/// Scheduled services carry an interval label such as `"1000hrs"`; whether the
/// label is recognized is decided against the configured interval table when
/// the event is applied. The long form used on service sheets
/// (`"1000hrs Service"`) parses to the same label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceType {
    /// Interval service keyed by label
    Scheduled(String),
    /// Unscheduled work described in the event notes
    Other,
}

impl ServiceType {
    /// Parse a service type label, tolerating the `" Service"` suffix.
    pub fn parse(raw: &str) -> Self {
        let label = canonical_label(raw);
        if label.eq_ignore_ascii_case(OTHER_SERVICE_LABEL) {
            return Self::Other;
        }
        Self::Scheduled(label.to_string())
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Scheduled(label) => label,
            Self::Other => OTHER_SERVICE_LABEL,
        }
    }
}

/// Label as it is matched against the interval table: trimmed, with the
/// long-form `" Service"` suffix removed.
pub fn canonical_label(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_suffix(" Service")
        .or_else(|| trimmed.strip_suffix(" service"))
        .unwrap_or(trimmed)
        .trim_end()
}

impl From<String> for ServiceType {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ServiceType> for String {
    fn from(kind: ServiceType) -> Self {
        kind.label().to_string()
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A service performed on a unit. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceEvent {
    /// Id of the serviced unit
    pub unit_id: String,

    /// Interval label or "Other"
    pub service_type: ServiceType,

    /// Calendar date the service was performed
    pub date: NaiveDate,

    /// Free-text notes (required for "Other")
    #[serde(default)]
    pub notes: Option<String>,

    /// Hours until the next service, for "Other" services only.
    /// Interval services always use the configured table.
    #[serde(default)]
    pub interval_hours: Option<f64>,
}

impl ServiceEvent {
    pub fn new(unit_id: impl Into<String>, service_type: ServiceType, date: NaiveDate) -> Self {
        Self {
            unit_id: unit_id.into(),
            service_type,
            date,
            notes: None,
            interval_hours: None,
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn with_interval_hours(mut self, hours: f64) -> Self {
        self.interval_hours = Some(hours);
        self
    }

    /// Notes with surrounding whitespace removed, `None` when blank.
    pub fn trimmed_notes(&self) -> Option<&str> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}
