//! Settings database operations
//!
//! Typed get/set accessors over the settings key-value table. Each accessor
//! carries the same default that database initialization seeds, so callers
//! behave sensibly even against a database that predates the setting.

use jwp_common::{Error, Result};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Get a setting parsed into `T`
///
/// Returns None when the key is absent or NULL.
pub async fn get_setting<T: FromStr>(db: &SqlitePool, key: &str) -> Result<Option<T>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(db)
            .await?;

    match value.flatten() {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("Setting '{}' has unparseable value: {}", key, raw))),
        None => Ok(None),
    }
}

/// Set a setting value
pub async fn set_setting(db: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value) VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(db)
    .await?;
    Ok(())
}

/// Days a reviewer gets before a pending review is considered overdue
///
/// Default: 21
pub async fn review_due_days(db: &SqlitePool) -> Result<i64> {
    get_setting(db, "review_due_days")
        .await
        .map(|opt| opt.unwrap_or(21))
}

/// Maximum reviewers selected per article by the orchestrator
///
/// Default: 3
pub async fn max_reviewers_per_article(db: &SqlitePool) -> Result<usize> {
    get_setting(db, "max_reviewers_per_article")
        .await
        .map(|opt| opt.unwrap_or(3))
}

/// Maximum author-recommended reviewers selected before rank-fill
///
/// Default: 2
pub async fn max_recommended_selections(db: &SqlitePool) -> Result<usize> {
    get_setting(db, "max_recommended_selections")
        .await
        .map(|opt| opt.unwrap_or(2))
}

/// Minimum score for a recommended reviewer to take a preferred slot
///
/// Default: 0.6
pub async fn recommended_score_floor(db: &SqlitePool) -> Result<f64> {
    get_setting(db, "recommended_score_floor")
        .await
        .map(|opt| opt.unwrap_or(0.6))
}

/// Days an editor has to accept a pending assignment
///
/// Default: 7
pub async fn editor_assignment_deadline_days(db: &SqlitePool) -> Result<i64> {
    get_setting(db, "editor_assignment_deadline_days")
        .await
        .map(|opt| opt.unwrap_or(7))
}

/// Mail gateway endpoint; None when delivery is disabled
pub async fn mail_gateway_url(db: &SqlitePool) -> Result<Option<String>> {
    let url: Option<String> = get_setting(db, "mail_gateway_url").await?;
    Ok(url.filter(|u| !u.trim().is_empty()))
}

/// Sender address for outgoing notifications
pub async fn mail_from_address(db: &SqlitePool) -> Result<String> {
    get_setting(db, "mail_from_address")
        .await
        .map(|opt| opt.unwrap_or_else(|| "editorial@jwp.invalid".to_string()))
}

/// Event bus channel capacity
///
/// Default: 256
pub async fn event_bus_capacity(db: &SqlitePool) -> Result<usize> {
    get_setting(db, "event_bus_capacity")
        .await
        .map(|opt| opt.unwrap_or(256))
}

/// HTTP bind address from settings
pub async fn http_bind(db: &SqlitePool) -> Result<(String, u16)> {
    let host: String = get_setting(db, "http_host")
        .await?
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port: u16 = get_setting(db, "http_port").await?.unwrap_or(5810);
    Ok((host, port))
}
