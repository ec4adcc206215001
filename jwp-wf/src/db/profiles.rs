//! Reviewer and editor profile database operations
//!
//! Workload counters live here. current_load counts open assignments and is
//! incremented on invitation, decremented on completion or expiry (floor 0).

use chrono::{DateTime, Utc};
use jwp_common::db::models::{EditorProfile, ReviewerProfile};
use jwp_common::Result;
use sqlx::{FromRow, SqliteExecutor, SqlitePool};
use uuid::Uuid;

/// A reviewer candidate: account plus scoring profile
#[derive(Debug, Clone, FromRow)]
pub struct ReviewerCandidate {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub keywords: String,
    pub current_load: i64,
    pub max_per_month: i64,
    pub quality_score: f64,
    pub completed_count: i64,
    pub late_count: i64,
    pub last_review_at: Option<DateTime<Utc>>,
}

impl ReviewerCandidate {
    pub fn profile(&self) -> ReviewerProfile {
        ReviewerProfile {
            user_id: self.user_id,
            keywords: self.keywords.clone(),
            current_load: self.current_load,
            max_per_month: self.max_per_month,
            quality_score: self.quality_score,
            completed_count: self.completed_count,
            late_count: self.late_count,
            last_review_at: self.last_review_at,
        }
    }
}

/// Insert a reviewer profile
pub async fn insert_reviewer_profile(
    ex: impl SqliteExecutor<'_>,
    profile: &ReviewerProfile,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reviewer_profiles
            (user_id, keywords, current_load, max_per_month, quality_score,
             completed_count, late_count, last_review_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(profile.user_id.to_string())
    .bind(&profile.keywords)
    .bind(profile.current_load)
    .bind(profile.max_per_month)
    .bind(profile.quality_score)
    .bind(profile.completed_count)
    .bind(profile.late_count)
    .bind(profile.last_review_at.map(|t| t.to_rfc3339()))
    .execute(ex)
    .await?;
    Ok(())
}

/// Load a reviewer profile by user id
pub async fn load_reviewer_profile(
    db: &SqlitePool,
    user_id: Uuid,
) -> Result<Option<ReviewerProfile>> {
    let profile = sqlx::query_as::<_, ReviewerProfile>(
        r#"
        SELECT user_id, keywords, current_load, max_per_month, quality_score,
               completed_count, late_count, last_review_at
        FROM reviewer_profiles
        WHERE user_id = ?
        "#,
    )
    .bind(user_id.to_string())
    .fetch_optional(db)
    .await?;
    Ok(profile)
}

/// List reviewer candidates with spare capacity
///
/// Profiles at or over max_per_month are not offered as system candidates.
pub async fn list_available_reviewers(db: &SqlitePool) -> Result<Vec<ReviewerCandidate>> {
    let candidates = sqlx::query_as::<_, ReviewerCandidate>(
        r#"
        SELECT u.guid AS user_id, u.name, u.email,
               p.keywords, p.current_load, p.max_per_month, p.quality_score,
               p.completed_count, p.late_count, p.last_review_at
        FROM reviewer_profiles p
        JOIN users u ON u.guid = p.user_id
        WHERE p.current_load < p.max_per_month
        ORDER BY u.guid ASC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(candidates)
}

/// Increment a reviewer's open-assignment count
pub async fn increment_reviewer_load(ex: impl SqliteExecutor<'_>, user_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE reviewer_profiles SET current_load = current_load + 1 WHERE user_id = ?")
        .bind(user_id.to_string())
        .execute(ex)
        .await?;
    Ok(())
}

/// Book-keep a completed review on the reviewer's profile
///
/// Decrements current_load (floor 0), increments completed_count and stamps
/// last_review_at.
pub async fn record_completed_review(
    ex: impl SqliteExecutor<'_>,
    user_id: Uuid,
    completed_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE reviewer_profiles
        SET current_load = MAX(current_load - 1, 0),
            completed_count = completed_count + 1,
            last_review_at = ?
        WHERE user_id = ?
        "#,
    )
    .bind(completed_at.to_rfc3339())
    .bind(user_id.to_string())
    .execute(ex)
    .await?;
    Ok(())
}

/// Penalize a reviewer for a review that went overdue
pub async fn increment_late_count(ex: impl SqliteExecutor<'_>, user_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE reviewer_profiles SET late_count = late_count + 1 WHERE user_id = ?")
        .bind(user_id.to_string())
        .execute(ex)
        .await?;
    Ok(())
}

/// Insert an editor profile
pub async fn insert_editor_profile(
    ex: impl SqliteExecutor<'_>,
    profile: &EditorProfile,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO editor_profiles (user_id, sections, current_load, accepting)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(profile.user_id.to_string())
    .bind(&profile.sections)
    .bind(profile.current_load)
    .bind(profile.accepting)
    .execute(ex)
    .await?;
    Ok(())
}

/// List editors currently accepting assignments, least-loaded first
///
/// Deterministic tie-break on guid so repeated runs pick the same editor.
pub async fn list_accepting_editors(db: &SqlitePool) -> Result<Vec<EditorProfile>> {
    let editors = sqlx::query_as::<_, EditorProfile>(
        r#"
        SELECT user_id, sections, current_load, accepting
        FROM editor_profiles
        WHERE accepting = 1
        ORDER BY current_load ASC, user_id ASC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(editors)
}

/// Increment an editor's open-assignment count
pub async fn increment_editor_load(ex: impl SqliteExecutor<'_>, user_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE editor_profiles SET current_load = current_load + 1 WHERE user_id = ?")
        .bind(user_id.to_string())
        .execute(ex)
        .await?;
    Ok(())
}

/// Decrement an editor's open-assignment count (floor 0)
pub async fn decrement_editor_load(ex: impl SqliteExecutor<'_>, user_id: Uuid) -> Result<()> {
    sqlx::query(
        "UPDATE editor_profiles SET current_load = MAX(current_load - 1, 0) WHERE user_id = ?",
    )
    .bind(user_id.to_string())
    .execute(ex)
    .await?;
    Ok(())
}
