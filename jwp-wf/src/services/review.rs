//! Review completion and decision aggregation
//!
//! Records a reviewer's verdict, book-keeps the reviewer profile, and once
//! every review for the article is complete, folds the recommendations into
//! an article-level decision through the state machine.

use chrono::Utc;
use jwp_common::db::models::Review;
use jwp_common::events::{EventBus, WorkflowEvent};
use jwp_common::status::{aggregate_decision, ArticleStatus, ReviewRecommendation, ReviewStatus};
use jwp_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db;
use crate::services::status;

/// Outcome of a review submission
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub review_id: Uuid,
    pub article_id: Uuid,
    /// Decision applied when this was the last outstanding review
    pub decision: Option<ArticleStatus>,
}

/// Record a completed review
///
/// Rejects reviews that do not exist, belong to a different reviewer, or
/// are already completed. Load/completion counters move in the same
/// transaction as the review row.
pub async fn submit_review(
    pool: &SqlitePool,
    event_bus: &EventBus,
    review_id: Uuid,
    reviewer_id: Uuid,
    recommendation: ReviewRecommendation,
    comments: Option<String>,
    rating: Option<f64>,
) -> Result<ReviewOutcome> {
    let review = db::reviews::load_review(pool, review_id)
        .await?
        .filter(|r| r.reviewer_id == reviewer_id)
        .ok_or_else(|| Error::NotFound(format!("Review {} not found", review_id)))?;

    if review.review_status()? == ReviewStatus::Completed {
        return Err(Error::InvalidInput(
            "Review has already been completed".to_string(),
        ));
    }
    if let Some(r) = rating {
        if !(1.0..=5.0).contains(&r) {
            return Err(Error::InvalidInput(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
    }

    let now = Utc::now();
    let mut tx = pool.begin().await?;
    db::reviews::complete_review(
        &mut *tx,
        review_id,
        recommendation,
        comments.as_deref(),
        rating,
        now,
    )
    .await?;
    db::profiles::record_completed_review(&mut *tx, reviewer_id, now).await?;
    tx.commit().await?;

    info!(
        "Review {} completed by {} with recommendation {}",
        review_id, reviewer_id, recommendation
    );

    event_bus.emit_lossy(WorkflowEvent::ReviewCompleted {
        article_id: review.article_id,
        review_id,
        reviewer_id,
        recommendation,
        timestamp: now,
    });

    let decision = finalize_if_complete(pool, event_bus, review.article_id).await?;

    Ok(ReviewOutcome {
        review_id,
        article_id: review.article_id,
        decision,
    })
}

/// Apply the aggregate decision once no review is outstanding
///
/// Only articles still under review move; a decision already applied (or an
/// article parked elsewhere in the workflow) is left alone.
async fn finalize_if_complete(
    pool: &SqlitePool,
    event_bus: &EventBus,
    article_id: Uuid,
) -> Result<Option<ArticleStatus>> {
    let reviews = db::reviews::load_reviews_for_article(pool, article_id).await?;
    if reviews.is_empty() || !all_complete(&reviews) {
        return Ok(None);
    }

    let article = db::articles::load_article(pool, article_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Article {} not found", article_id)))?;
    if article.workflow_status()? != ArticleStatus::UnderReview {
        return Ok(None);
    }

    let recommendations: Vec<ReviewRecommendation> = reviews
        .iter()
        .filter_map(|r| r.review_recommendation())
        .collect();
    let Some(decision) = aggregate_decision(&recommendations) else {
        return Ok(None);
    };

    status::apply_transition(
        pool,
        &article,
        decision,
        None,
        Some("All reviews completed"),
    )
    .await?;

    info!("Article {} decision: {}", article_id, decision);

    event_bus.emit_lossy(WorkflowEvent::DecisionReached {
        article_id,
        status: decision,
        timestamp: Utc::now(),
    });

    Ok(Some(decision))
}

fn all_complete(reviews: &[Review]) -> bool {
    reviews
        .iter()
        .all(|r| matches!(r.review_status(), Ok(ReviewStatus::Completed)))
}
