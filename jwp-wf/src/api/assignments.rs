//! Reviewer and editor assignment endpoints

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::services::{assignment, editor};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AssignReviewersRequest {
    /// Overrides the configured maximum number of reviewers
    #[serde(default)]
    pub limit: Option<usize>,
}

/// POST /api/manuscripts/:id/assign-reviewers
///
/// Runs the assignment orchestrator and returns its report. Per-candidate
/// failures are listed in the report; the call itself only fails when the
/// article is missing or the database is unavailable.
pub async fn assign_reviewers(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
    request: Option<Json<AssignReviewersRequest>>,
) -> ApiResult<Json<assignment::AssignmentReport>> {
    let limit = request.and_then(|Json(r)| r.limit);
    let report =
        assignment::assign_reviewers(&state.db, &state.event_bus, article_id, limit).await?;
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
pub struct AssignEditorResponse {
    pub article_id: Uuid,
    pub editor_id: Uuid,
    pub deadline: chrono::DateTime<chrono::Utc>,
}

/// POST /api/manuscripts/:id/assign-editor
///
/// Manual trigger for automatic editor assignment. 409 when the article
/// already has an editor; 404-style failure when no editor covers the
/// category.
pub async fn assign_editor(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> ApiResult<Json<AssignEditorResponse>> {
    let article = db::articles::load_article(&state.db, article_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Article {} not found", article_id)))?;

    if article.editor_id.is_some() {
        return Err(ApiError::Conflict(
            "Article already has an assigned editor".to_string(),
        ));
    }

    let assignment = editor::auto_assign_editor(&state.db, &state.event_bus, &article)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "No accepting editor covers category '{}'",
                article.category
            ))
        })?;

    Ok(Json(AssignEditorResponse {
        article_id,
        editor_id: assignment.editor_id,
        deadline: assignment.deadline,
    }))
}

/// Build assignment routes
pub fn assignment_routes() -> Router<AppState> {
    Router::new()
        .route("/api/manuscripts/:id/assign-reviewers", post(assign_reviewers))
        .route("/api/manuscripts/:id/assign-editor", post(assign_editor))
}
