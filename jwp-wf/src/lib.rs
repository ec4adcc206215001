//! jwp-wf library - editorial workflow engine
//!
//! Exposes the router and services for integration testing.

pub mod api;
pub mod db;
pub mod error;
pub mod notify;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use jwp_common::events::EventBus;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus feeding the notification dispatcher
    pub event_bus: EventBus,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, event_bus: EventBus) -> Self {
        Self {
            db,
            event_bus,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::submission_routes())
        .merge(api::status_routes())
        .merge(api::assignment_routes())
        .merge(api::review_routes())
        .merge(api::maintenance_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
