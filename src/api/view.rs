//! Presentation views: JSON rows derived from classified units
//!
//! Colour and severity styling is a pure function of [`StatusKind`]; nothing
//! in the engine knows about it.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::maintenance::StatusKind;
use crate::tracker::ClassifiedUnit;

/// Rendering hint for a status cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayHint {
    Critical,
    Warning,
    Normal,
}

impl DisplayHint {
    pub fn color(self) -> &'static str {
        match self {
            DisplayHint::Critical => "red",
            DisplayHint::Warning => "orange",
            DisplayHint::Normal => "green",
        }
    }
}

impl From<StatusKind> for DisplayHint {
    fn from(kind: StatusKind) -> Self {
        match kind {
            StatusKind::Overdue => DisplayHint::Critical,
            StatusKind::DueSoon => DisplayHint::Warning,
            StatusKind::Ok => DisplayHint::Normal,
        }
    }
}

/// Status with its styling, as serialized into every row.
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub kind: StatusKind,
    pub label: String,
    pub hint: DisplayHint,
    pub color: &'static str,
}

impl From<StatusKind> for StatusView {
    fn from(kind: StatusKind) -> Self {
        let hint = DisplayHint::from(kind);
        Self {
            kind,
            label: kind.to_string(),
            hint,
            color: hint.color(),
        }
    }
}

/// Full row of the main fleet table and the unit detail view.
#[derive(Debug, Clone, Serialize)]
pub struct UnitView {
    pub id: String,
    pub label: String,
    pub last_service_meter: f64,
    pub last_service_type: Option<String>,
    pub last_service_date: Option<NaiveDate>,
    pub due_at_meter: f64,
    pub current_meter: f64,
    pub remaining_hours: f64,
    /// Remaining hours clamped at zero
    pub hours_until_service: f64,
    pub status: StatusView,
    pub filter_flags: BTreeMap<String, bool>,
}

impl From<&ClassifiedUnit> for UnitView {
    fn from(unit: &ClassifiedUnit) -> Self {
        let r = &unit.record;
        Self {
            id: r.id.clone(),
            label: r.label.clone(),
            last_service_meter: r.last_service_meter,
            last_service_type: r.last_service_type.clone(),
            last_service_date: r.last_service_date,
            due_at_meter: r.due_at_meter,
            current_meter: r.current_meter,
            remaining_hours: r.remaining_hours(),
            hours_until_service: r.hours_until_service(),
            status: unit.status.into(),
            filter_flags: r.filter_flags.clone(),
        }
    }
}

/// Condensed row for the alert lists.
#[derive(Debug, Clone, Serialize)]
pub struct AlertRow {
    pub id: String,
    pub label: String,
    pub current_meter: f64,
    pub due_at_meter: f64,
    pub remaining_hours: f64,
}

impl From<&ClassifiedUnit> for AlertRow {
    fn from(unit: &ClassifiedUnit) -> Self {
        let r = &unit.record;
        Self {
            id: r.id.clone(),
            label: r.label.clone(),
            current_meter: r.current_meter,
            due_at_meter: r.due_at_meter,
            remaining_hours: r.remaining_hours(),
        }
    }
}

/// Headline counts.
#[derive(Debug, Clone, Serialize)]
pub struct FleetMetrics {
    pub total: usize,
    pub overdue: usize,
    pub due_soon: usize,
    pub ok: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UnitRecord;

    #[test]
    fn test_hint_mapping() {
        assert_eq!(DisplayHint::from(StatusKind::Overdue).color(), "red");
        assert_eq!(DisplayHint::from(StatusKind::DueSoon).color(), "orange");
        assert_eq!(DisplayHint::from(StatusKind::Ok).color(), "green");
    }

    #[test]
    fn test_unit_view_clamps_hours_until_service() {
        let unit = ClassifiedUnit {
            record: UnitRecord::new("T1", "TIPPEG-4", 1000.0, 1000.0, 2817.0).unwrap(),
            status: StatusKind::Overdue,
        };
        let view = UnitView::from(&unit);
        assert_eq!(view.remaining_hours, -1817.0);
        assert_eq!(view.hours_until_service, 0.0);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"]["kind"], "OVERDUE");
        assert_eq!(json["status"]["label"], "OVERDUE");
        assert_eq!(json["status"]["hint"], "critical");
        assert_eq!(json["status"]["color"], "red");
    }
}
