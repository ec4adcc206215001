//! Recommended reviewer database operations

use jwp_common::db::models::RecommendedReviewer;
use jwp_common::Result;
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

/// Insert an author-recommended reviewer
pub async fn insert_recommended(
    ex: impl SqliteExecutor<'_>,
    rec: &RecommendedReviewer,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO recommended_reviewers
            (guid, article_id, name, email, affiliation, expertise, matched_user_id, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(rec.guid.to_string())
    .bind(rec.article_id.to_string())
    .bind(&rec.name)
    .bind(&rec.email)
    .bind(&rec.affiliation)
    .bind(&rec.expertise)
    .bind(rec.matched_user_id.map(|id| id.to_string()))
    .bind(&rec.status)
    .execute(ex)
    .await?;
    Ok(())
}

/// List recommended reviewers for an article
pub async fn list_for_article(
    db: &SqlitePool,
    article_id: Uuid,
) -> Result<Vec<RecommendedReviewer>> {
    let recs = sqlx::query_as::<_, RecommendedReviewer>(
        r#"
        SELECT guid, article_id, name, email, affiliation, expertise, matched_user_id, status
        FROM recommended_reviewers
        WHERE article_id = ?
        ORDER BY created_at ASC, guid ASC
        "#,
    )
    .bind(article_id.to_string())
    .fetch_all(db)
    .await?;
    Ok(recs)
}

/// Update a recommended reviewer's status ('invited' or 'contacted')
pub async fn mark_status(
    ex: impl SqliteExecutor<'_>,
    rec_id: Uuid,
    status: &str,
) -> Result<()> {
    sqlx::query("UPDATE recommended_reviewers SET status = ? WHERE guid = ?")
        .bind(status)
        .bind(rec_id.to_string())
        .execute(ex)
        .await?;
    Ok(())
}
