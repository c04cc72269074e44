//! API route definitions
//!
//! - /api/v1/fleet - Metrics and the full unit table
//! - /api/v1/alerts - Overdue and due-soon lists
//! - /api/v1/filters - Filter replacement status
//! - /api/v1/units/:id - Unit detail, history and service logging
//! - /api/v1/config - Active threshold and interval table

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, DashboardState};

/// Create all API routes for the dashboard
pub fn api_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/fleet", get(handlers::get_fleet))
        .route("/alerts", get(handlers::get_alerts))
        .route("/filters", get(handlers::get_filters))
        .route("/units/:id", get(handlers::get_unit))
        .route("/units/:id/history", get(handlers::get_history))
        .route("/units/:id/service", post(handlers::log_service))
        .route("/config", get(handlers::get_config))
        .with_state(state)
}

/// Health endpoint at root level
pub fn health_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .with_state(state)
}
