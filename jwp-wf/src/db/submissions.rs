//! Submission and status-history database operations
//!
//! The status-history table is append-only: every article status write
//! appends exactly one row here in the same transaction, keeping the log
//! monotonic with the article's status.

use chrono::{DateTime, Utc};
use jwp_common::db::models::{ArticleAuthor, StatusHistoryEntry, Submission};
use jwp_common::status::ArticleStatus;
use jwp_common::Result;
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

/// Insert a submission record
pub async fn insert_submission(ex: impl SqliteExecutor<'_>, submission: &Submission) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO submissions (guid, article_id, submitted_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(submission.guid.to_string())
    .bind(submission.article_id.to_string())
    .bind(submission.submitted_at.to_rfc3339())
    .execute(ex)
    .await?;
    Ok(())
}

/// Load the submission wrapping an article
pub async fn load_submission_by_article(
    db: &SqlitePool,
    article_id: Uuid,
) -> Result<Option<Submission>> {
    let submission = sqlx::query_as::<_, Submission>(
        "SELECT guid, article_id, submitted_at FROM submissions WHERE article_id = ?",
    )
    .bind(article_id.to_string())
    .fetch_optional(db)
    .await?;
    Ok(submission)
}

/// Append a status-history row
pub async fn append_status_history(
    ex: impl SqliteExecutor<'_>,
    submission_id: Uuid,
    status: ArticleStatus,
    actor_id: Option<Uuid>,
    note: Option<&str>,
    recorded_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO submission_status_history (submission_id, status, actor_id, note, recorded_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(submission_id.to_string())
    .bind(status.as_str())
    .bind(actor_id.map(|id| id.to_string()))
    .bind(note)
    .bind(recorded_at.to_rfc3339())
    .execute(ex)
    .await?;
    Ok(())
}

/// Load a submission's status history, oldest first
pub async fn load_status_history(
    db: &SqlitePool,
    submission_id: Uuid,
) -> Result<Vec<StatusHistoryEntry>> {
    let entries = sqlx::query_as::<_, StatusHistoryEntry>(
        r#"
        SELECT id, submission_id, status, actor_id, note, recorded_at
        FROM submission_status_history
        WHERE submission_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(submission_id.to_string())
    .fetch_all(db)
    .await?;
    Ok(entries)
}

/// Insert one author-manifest row
pub async fn insert_article_author(
    ex: impl SqliteExecutor<'_>,
    author: &ArticleAuthor,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO article_authors
            (article_id, position, name, email, institution, country, is_corresponding)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(author.article_id.to_string())
    .bind(author.position)
    .bind(&author.name)
    .bind(&author.email)
    .bind(&author.institution)
    .bind(&author.country)
    .bind(author.is_corresponding)
    .execute(ex)
    .await?;
    Ok(())
}

/// Load an article's author manifest, in declared order
pub async fn load_article_authors(db: &SqlitePool, article_id: Uuid) -> Result<Vec<ArticleAuthor>> {
    let authors = sqlx::query_as::<_, ArticleAuthor>(
        r#"
        SELECT article_id, position, name, email, institution, country, is_corresponding
        FROM article_authors
        WHERE article_id = ?
        ORDER BY position ASC
        "#,
    )
    .bind(article_id.to_string())
    .fetch_all(db)
    .await?;
    Ok(authors)
}
