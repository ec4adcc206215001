//! Editor assignment and review invitation database operations

use chrono::{DateTime, Utc};
use jwp_common::db::models::{EditorAssignment, ReviewInvitation};
use jwp_common::status::AssignmentStatus;
use jwp_common::Result;
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

/// Insert an editor assignment
pub async fn insert_editor_assignment(
    ex: impl SqliteExecutor<'_>,
    assignment: &EditorAssignment,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO editor_assignments (guid, article_id, editor_id, status, assigned_at, deadline)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(assignment.guid.to_string())
    .bind(assignment.article_id.to_string())
    .bind(assignment.editor_id.to_string())
    .bind(&assignment.status)
    .bind(assignment.assigned_at.to_rfc3339())
    .bind(assignment.deadline.to_rfc3339())
    .execute(ex)
    .await?;
    Ok(())
}

/// List pending assignments past their deadline
pub async fn list_expired_pending(
    db: &SqlitePool,
    now: DateTime<Utc>,
) -> Result<Vec<EditorAssignment>> {
    let assignments = sqlx::query_as::<_, EditorAssignment>(
        r#"
        SELECT guid, article_id, editor_id, status, assigned_at, deadline
        FROM editor_assignments
        WHERE status = 'pending' AND deadline < ?
        ORDER BY deadline ASC
        "#,
    )
    .bind(now.to_rfc3339())
    .fetch_all(db)
    .await?;
    Ok(assignments)
}

/// Mark an assignment expired
pub async fn mark_expired(ex: impl SqliteExecutor<'_>, assignment_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE editor_assignments SET status = ? WHERE guid = ?")
        .bind(AssignmentStatus::Expired.as_str())
        .bind(assignment_id.to_string())
        .execute(ex)
        .await?;
    Ok(())
}

/// Insert a review invitation
pub async fn insert_invitation(
    ex: impl SqliteExecutor<'_>,
    invitation: &ReviewInvitation,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO review_invitations (guid, review_id, article_id, reviewer_id, status, sent_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(invitation.guid.to_string())
    .bind(invitation.review_id.to_string())
    .bind(invitation.article_id.to_string())
    .bind(invitation.reviewer_id.to_string())
    .bind(&invitation.status)
    .bind(invitation.sent_at.to_rfc3339())
    .execute(ex)
    .await?;
    Ok(())
}
