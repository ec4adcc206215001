//! Review endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use jwp_common::db::models::Review;
use jwp_common::status::{ArticleStatus, ReviewRecommendation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::services::review;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    pub reviewer_id: Uuid,
    pub recommendation: ReviewRecommendation,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SubmitReviewResponse {
    pub success: bool,
    pub review_id: Uuid,
    pub article_id: Uuid,
    /// Aggregate decision applied when this completed the review set
    pub decision: Option<ArticleStatus>,
}

/// POST /api/reviews/:id/submit
///
/// Records a reviewer's verdict. Reviews not owned by the caller report
/// not-found rather than revealing their existence.
pub async fn submit_review(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
    Json(request): Json<SubmitReviewRequest>,
) -> ApiResult<Json<SubmitReviewResponse>> {
    let outcome = review::submit_review(
        &state.db,
        &state.event_bus,
        review_id,
        request.reviewer_id,
        request.recommendation,
        request.comments,
        request.rating,
    )
    .await?;

    Ok(Json(SubmitReviewResponse {
        success: true,
        review_id: outcome.review_id,
        article_id: outcome.article_id,
        decision: outcome.decision,
    }))
}

#[derive(Debug, Serialize)]
pub struct ArticleReviewsResponse {
    pub article_id: Uuid,
    pub reviews: Vec<Review>,
}

/// GET /api/manuscripts/:id/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> ApiResult<Json<ArticleReviewsResponse>> {
    // 404 for unknown articles rather than an empty list
    db::articles::load_article(&state.db, article_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Article {} not found", article_id)))?;

    let reviews = db::reviews::load_reviews_for_article(&state.db, article_id).await?;
    Ok(Json(ArticleReviewsResponse {
        article_id,
        reviews,
    }))
}

/// Build review routes
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/api/reviews/:id/submit", post(submit_review))
        .route("/api/manuscripts/:id/reviews", get(list_reviews))
}
