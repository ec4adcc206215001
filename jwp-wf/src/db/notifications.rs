//! Notification database operations
//!
//! Rows record every outbound notification attempt; the dispatcher flips
//! queued → sent/failed after talking to the mail gateway.

use chrono::{DateTime, Utc};
use jwp_common::db::models::Notification;
use jwp_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Insert a queued notification
pub async fn insert_notification(db: &SqlitePool, notification: &Notification) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO notifications
            (guid, recipient_email, user_id, kind, subject, body, status, created_at, sent_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(notification.guid.to_string())
    .bind(&notification.recipient_email)
    .bind(notification.user_id.map(|id| id.to_string()))
    .bind(&notification.kind)
    .bind(&notification.subject)
    .bind(&notification.body)
    .bind(&notification.status)
    .bind(notification.created_at.to_rfc3339())
    .bind(notification.sent_at.map(|t| t.to_rfc3339()))
    .execute(db)
    .await?;
    Ok(())
}

/// Mark a notification delivered
pub async fn mark_sent(db: &SqlitePool, guid: Uuid, sent_at: DateTime<Utc>) -> Result<()> {
    sqlx::query("UPDATE notifications SET status = 'sent', sent_at = ? WHERE guid = ?")
        .bind(sent_at.to_rfc3339())
        .bind(guid.to_string())
        .execute(db)
        .await?;
    Ok(())
}

/// Mark a notification failed
pub async fn mark_failed(db: &SqlitePool, guid: Uuid) -> Result<()> {
    sqlx::query("UPDATE notifications SET status = 'failed' WHERE guid = ?")
        .bind(guid.to_string())
        .execute(db)
        .await?;
    Ok(())
}
