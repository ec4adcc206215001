//! On-demand maintenance endpoints
//!
//! Sweeps run when called, not on a timer; an operator or external cron
//! drives them.

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;

use crate::error::ApiResult;
use crate::services::sweeps;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct OverdueSweepResponse {
    pub marked_overdue: usize,
}

/// POST /api/maintenance/reviews/sweep-overdue
pub async fn sweep_overdue(
    State(state): State<AppState>,
) -> ApiResult<Json<OverdueSweepResponse>> {
    let marked = sweeps::sweep_overdue_reviews(&state.db, &state.event_bus).await?;
    Ok(Json(OverdueSweepResponse {
        marked_overdue: marked,
    }))
}

#[derive(Debug, Serialize)]
pub struct ExpireAssignmentsResponse {
    pub expired: usize,
}

/// POST /api/maintenance/assignments/expire
pub async fn expire_assignments(
    State(state): State<AppState>,
) -> ApiResult<Json<ExpireAssignmentsResponse>> {
    let expired = sweeps::expire_editor_assignments(&state.db, &state.event_bus).await?;
    Ok(Json(ExpireAssignmentsResponse { expired }))
}

/// Build maintenance routes
pub fn maintenance_routes() -> Router<AppState> {
    Router::new()
        .route("/api/maintenance/reviews/sweep-overdue", post(sweep_overdue))
        .route("/api/maintenance/assignments/expire", post(expire_assignments))
}
