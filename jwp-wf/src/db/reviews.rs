//! Review database operations

use chrono::{DateTime, Utc};
use jwp_common::db::models::Review;
use jwp_common::status::{ReviewRecommendation, ReviewStatus};
use jwp_common::Result;
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

const REVIEW_COLUMNS: &str = "guid, article_id, reviewer_id, status, recommendation, \
     comments, rating, assigned_at, due_at, completed_at";

/// Insert a pending review
pub async fn insert_review(ex: impl SqliteExecutor<'_>, review: &Review) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reviews
            (guid, article_id, reviewer_id, status, recommendation,
             comments, rating, assigned_at, due_at, completed_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(review.guid.to_string())
    .bind(review.article_id.to_string())
    .bind(review.reviewer_id.to_string())
    .bind(&review.status)
    .bind(&review.recommendation)
    .bind(&review.comments)
    .bind(review.rating)
    .bind(review.assigned_at.to_rfc3339())
    .bind(review.due_at.to_rfc3339())
    .bind(review.completed_at.map(|t| t.to_rfc3339()))
    .execute(ex)
    .await?;
    Ok(())
}

/// Load a review by id
pub async fn load_review(db: &SqlitePool, id: Uuid) -> Result<Option<Review>> {
    let review = sqlx::query_as::<_, Review>(&format!(
        "SELECT {} FROM reviews WHERE guid = ?",
        REVIEW_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(db)
    .await?;
    Ok(review)
}

/// Load all reviews for an article
pub async fn load_reviews_for_article(db: &SqlitePool, article_id: Uuid) -> Result<Vec<Review>> {
    let reviews = sqlx::query_as::<_, Review>(&format!(
        "SELECT {} FROM reviews WHERE article_id = ? ORDER BY assigned_at ASC",
        REVIEW_COLUMNS
    ))
    .bind(article_id.to_string())
    .fetch_all(db)
    .await?;
    Ok(reviews)
}

/// Mark a review completed with the reviewer's verdict
pub async fn complete_review(
    ex: impl SqliteExecutor<'_>,
    review_id: Uuid,
    recommendation: ReviewRecommendation,
    comments: Option<&str>,
    rating: Option<f64>,
    completed_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE reviews
        SET status = ?, recommendation = ?, comments = ?, rating = ?, completed_at = ?
        WHERE guid = ?
        "#,
    )
    .bind(ReviewStatus::Completed.as_str())
    .bind(recommendation.as_str())
    .bind(comments)
    .bind(rating)
    .bind(completed_at.to_rfc3339())
    .bind(review_id.to_string())
    .execute(ex)
    .await?;
    Ok(())
}

/// Mark a review overdue
pub async fn mark_overdue(ex: impl SqliteExecutor<'_>, review_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE reviews SET status = ? WHERE guid = ?")
        .bind(ReviewStatus::Overdue.as_str())
        .bind(review_id.to_string())
        .execute(ex)
        .await?;
    Ok(())
}

/// List pending reviews past their due date
pub async fn list_overdue_candidates(db: &SqlitePool, now: DateTime<Utc>) -> Result<Vec<Review>> {
    let reviews = sqlx::query_as::<_, Review>(&format!(
        "SELECT {} FROM reviews WHERE status = 'pending' AND due_at < ? ORDER BY due_at ASC",
        REVIEW_COLUMNS
    ))
    .bind(now.to_rfc3339())
    .fetch_all(db)
    .await?;
    Ok(reviews)
}

/// Reviewer ids already holding a review for an article
pub async fn reviewer_ids_for_article(db: &SqlitePool, article_id: Uuid) -> Result<Vec<Uuid>> {
    let ids: Vec<String> =
        sqlx::query_scalar("SELECT reviewer_id FROM reviews WHERE article_id = ?")
            .bind(article_id.to_string())
            .fetch_all(db)
            .await?;
    Ok(ids
        .iter()
        .filter_map(|s| Uuid::parse_str(s).ok())
        .collect())
}
