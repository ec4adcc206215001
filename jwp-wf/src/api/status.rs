//! Status transition, editor decision and history endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use jwp_common::db::models::StatusHistoryEntry;
use jwp_common::status::{ArticleStatus, ReviewRecommendation};
use jwp_common::Error;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::services::status;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: ArticleStatus,
    #[serde(default)]
    pub actor_id: Option<Uuid>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusChangeResponse {
    pub article_id: Uuid,
    pub old_status: ArticleStatus,
    pub new_status: ArticleStatus,
}

/// PUT /api/manuscripts/:id/status
///
/// Moves an article through the workflow state machine. A transition
/// outside the table returns 409 and leaves the stored status unchanged.
pub async fn update_status(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
    Json(request): Json<StatusChangeRequest>,
) -> ApiResult<Json<StatusChangeResponse>> {
    let change = status::update_submission_status(
        &state.db,
        &state.event_bus,
        article_id,
        request.status,
        request.actor_id,
        request.note.as_deref(),
    )
    .await?;

    Ok(Json(StatusChangeResponse {
        article_id: change.article_id,
        old_status: change.old_status,
        new_status: change.new_status,
    }))
}

/// Editor verdict on a manuscript
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: ReviewRecommendation,
    #[serde(default)]
    pub actor_id: Option<Uuid>,
    #[serde(default)]
    pub note: Option<String>,
}

/// POST /api/manuscripts/:id/decision
///
/// Maps an editor decision onto a status transition: accept -> accepted,
/// either revision level -> revision_requested, reject -> rejected.
pub async fn record_decision(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
    Json(request): Json<DecisionRequest>,
) -> ApiResult<Json<StatusChangeResponse>> {
    let target = match request.decision {
        ReviewRecommendation::Accept => ArticleStatus::Accepted,
        ReviewRecommendation::MinorRevision | ReviewRecommendation::MajorRevision => {
            ArticleStatus::RevisionRequested
        }
        ReviewRecommendation::Reject => ArticleStatus::Rejected,
    };

    let change = status::update_submission_status(
        &state.db,
        &state.event_bus,
        article_id,
        target,
        request.actor_id,
        request.note.as_deref().or(Some("Editorial decision")),
    )
    .await?;

    Ok(Json(StatusChangeResponse {
        article_id: change.article_id,
        old_status: change.old_status,
        new_status: change.new_status,
    }))
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub article_id: Uuid,
    pub submission_id: Uuid,
    pub current_status: ArticleStatus,
    pub history: Vec<StatusHistoryEntry>,
}

/// GET /api/manuscripts/:id/history
///
/// The submission's append-only status log, oldest first.
pub async fn get_history(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> ApiResult<Json<HistoryResponse>> {
    let article = db::articles::load_article(&state.db, article_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Article {} not found", article_id)))?;
    let submission = db::submissions::load_submission_by_article(&state.db, article_id)
        .await?
        .ok_or_else(|| {
            ApiError::from(Error::Internal(format!(
                "Article {} has no submission record",
                article_id
            )))
        })?;
    let history = db::submissions::load_status_history(&state.db, submission.guid).await?;

    Ok(Json(HistoryResponse {
        article_id,
        submission_id: submission.guid,
        current_status: article.workflow_status()?,
        history,
    }))
}

/// Build status routes
pub fn status_routes() -> Router<AppState> {
    Router::new()
        .route("/api/manuscripts/:id/status", put(update_status))
        .route("/api/manuscripts/:id/decision", post(record_decision))
        .route("/api/manuscripts/:id/history", get(get_history))
}
