//! Submission intake endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::services::submission::{self, SubmissionRequest};
use crate::AppState;

/// Response for a successful submission
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub article_id: Uuid,
    pub submission_id: Uuid,
    /// Editor assigned automatically, when one was available
    pub editor_id: Option<Uuid>,
    pub message: String,
}

/// POST /api/workflow/submit
///
/// Validates and persists a new manuscript. Validation failures return 400
/// with the specific message; infrastructure failures return a generic 500.
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<SubmissionRequest>,
) -> ApiResult<Json<SubmitResponse>> {
    let receipt = submission::submit(&state.db, &state.event_bus, request).await?;

    Ok(Json(SubmitResponse {
        success: true,
        article_id: receipt.article_id,
        submission_id: receipt.submission_id,
        editor_id: receipt.editor_id,
        message: "Submission received".to_string(),
    }))
}

/// Build submission routes
pub fn submission_routes() -> Router<AppState> {
    Router::new().route("/api/workflow/submit", post(submit))
}
