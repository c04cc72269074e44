//! API route handlers
//!
//! Thin adapters from HTTP to the [`MaintenanceTracker`]:
//! - Fleet table with metrics and per-unit status
//! - Overdue / due-soon alert lists
//! - Filter replacement status
//! - Unit detail, service history and the service logging form

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::envelope::{ApiErrorResponse, ApiResponse};
use super::view::{AlertRow, FleetMetrics, UnitView};
use crate::config::{defaults, FleetInfo};
use crate::maintenance::StatusKind;
use crate::tracker::{FleetSnapshot, MaintenanceTracker};
use crate::types::{ServiceEvent, ServiceType};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct DashboardState {
    pub tracker: Arc<MaintenanceTracker>,
    pub fleet: FleetInfo,
}

impl DashboardState {
    pub fn new(tracker: MaintenanceTracker, fleet: FleetInfo) -> Self {
        Self {
            tracker: Arc::new(tracker),
            fleet,
        }
    }

    fn snapshot(&self) -> Result<FleetSnapshot, Response> {
        self.tracker
            .snapshot()
            .map_err(|e| ApiErrorResponse::from_tracker(&e))
    }
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub fleet: String,
    pub backend: &'static str,
}

/// GET /health
pub async fn health(State(state): State<DashboardState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        fleet: state.fleet.name.clone(),
        backend: state.tracker.backend_name(),
    })
}

// ============================================================================
// Fleet Overview
// ============================================================================

#[derive(Debug, Serialize)]
pub struct FleetResponse {
    pub fleet: String,
    pub site: String,
    pub metrics: FleetMetrics,
    pub units: Vec<UnitView>,
}

/// GET /api/v1/fleet - Headline metrics and the full unit table
pub async fn get_fleet(State(state): State<DashboardState>) -> Response {
    let snapshot = match state.snapshot() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let summary = &snapshot.summary;

    ApiResponse::ok(FleetResponse {
        fleet: state.fleet.name.clone(),
        site: state.fleet.site.clone(),
        metrics: FleetMetrics {
            total: summary.total,
            overdue: summary.count(StatusKind::Overdue),
            due_soon: summary.count(StatusKind::DueSoon),
            ok: summary.count(StatusKind::Ok),
        },
        units: snapshot.units.iter().map(UnitView::from).collect(),
    })
}

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub overdue: Vec<AlertRow>,
    pub due_soon: Vec<AlertRow>,
}

/// GET /api/v1/alerts - Units needing attention, most severe list first
pub async fn get_alerts(State(state): State<DashboardState>) -> Response {
    match state.snapshot() {
        Ok(snapshot) => ApiResponse::ok(AlertsResponse {
            overdue: snapshot
                .with_status(StatusKind::Overdue)
                .map(AlertRow::from)
                .collect(),
            due_soon: snapshot
                .with_status(StatusKind::DueSoon)
                .map(AlertRow::from)
                .collect(),
        }),
        Err(resp) => resp,
    }
}

#[derive(Debug, Serialize)]
pub struct FilterUnitRow {
    pub id: String,
    pub label: String,
    pub flags: BTreeMap<String, bool>,
    /// Categories flagged on this unit
    pub expiring: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FiltersResponse {
    /// Filter category → ids flagged as expiring
    pub expiring: BTreeMap<String, Vec<String>>,
    pub units: Vec<FilterUnitRow>,
}

/// GET /api/v1/filters - Filter replacement status
pub async fn get_filters(State(state): State<DashboardState>) -> Response {
    match state.snapshot() {
        Ok(snapshot) => ApiResponse::ok(FiltersResponse {
            units: snapshot
                .units
                .iter()
                .map(|u| FilterUnitRow {
                    id: u.record.id.clone(),
                    label: u.record.label.clone(),
                    flags: u.record.filter_flags.clone(),
                    expiring: u.record.expiring_filters().map(str::to_string).collect(),
                })
                .collect(),
            expiring: snapshot.summary.filters,
        }),
        Err(resp) => resp,
    }
}

// ============================================================================
// Unit Detail & Service Logging
// ============================================================================

/// GET /api/v1/units/:id
pub async fn get_unit(State(state): State<DashboardState>, Path(id): Path<String>) -> Response {
    match state.tracker.unit(&id) {
        Ok(unit) => ApiResponse::ok(UnitView::from(&unit)),
        Err(e) => ApiErrorResponse::from_tracker(&e),
    }
}

/// GET /api/v1/units/:id/history - Logged services, newest first
pub async fn get_history(State(state): State<DashboardState>, Path(id): Path<String>) -> Response {
    match state.tracker.service_history(&id) {
        Ok(mut events) => {
            events.reverse();
            events.truncate(defaults::SERVICE_HISTORY_LIMIT);
            ApiResponse::ok(events)
        }
        Err(e) => ApiErrorResponse::from_tracker(&e),
    }
}

/// Body of the service logging form.
#[derive(Debug, Deserialize)]
pub struct LogServiceRequest {
    /// Optional; must match the unit in the path when present
    #[serde(default)]
    pub unit_id: Option<String>,
    pub service_type: ServiceType,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub interval_hours: Option<f64>,
}

/// POST /api/v1/units/:id/service - Log a service and return the updated unit
///
/// Rejected events and malformed bodies return 400 with the specific reason
/// so the operator can correct the form.
pub async fn log_service(
    State(state): State<DashboardState>,
    Path(id): Path<String>,
    payload: Result<Json<LogServiceRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return ApiErrorResponse::validation_failed(rejection.body_text()),
    };

    let event = ServiceEvent {
        unit_id: request.unit_id.unwrap_or_else(|| id.clone()),
        service_type: request.service_type,
        date: request.date,
        notes: request.notes,
        interval_hours: request.interval_hours,
    };

    match state.tracker.log_service_for(&id, &event) {
        Ok(unit) => ApiResponse::ok(UnitView::from(&unit)),
        Err(e) => ApiErrorResponse::from_tracker(&e),
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub due_soon_threshold_hours: f64,
    pub service_intervals: BTreeMap<String, f64>,
    /// Labels accepted by the service form, "Other" last
    pub service_types: Vec<String>,
}

/// GET /api/v1/config - Active classification threshold and interval table
pub async fn get_config(State(state): State<DashboardState>) -> Response {
    let logger = state.tracker.logger();
    let service_intervals: BTreeMap<String, f64> = logger
        .labels()
        .filter_map(|label| logger.interval_hours(label).map(|h| (label.to_string(), h)))
        .collect();
    let service_types = service_intervals
        .keys()
        .cloned()
        .chain(std::iter::once(ServiceType::Other.label().to_string()))
        .collect();

    ApiResponse::ok(ConfigResponse {
        due_soon_threshold_hours: state.tracker.classifier().due_soon_threshold_hours(),
        service_intervals,
        service_types,
    })
}
