//! Database initialization
//!
//! Creates the schema on first run and heals missing defaults on every
//! startup, so the service starts against an empty folder with no manual
//! provisioning step.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::{info, warn};

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_pragmas(&pool).await?;
    create_schema(&pool).await?;

    // Versioned migrations (idempotent - safe to call multiple times)
    crate::db::migrations::run_migrations(&pool).await?;

    // Initialize default settings
    init_default_settings(&pool).await?;

    Ok(pool)
}

/// Create an in-memory database with the full schema, for tests
pub async fn init_test_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    configure_pragmas(&pool).await?;
    create_schema(&pool).await?;
    crate::db::migrations::run_migrations(&pool).await?;
    init_default_settings(&pool).await?;

    Ok(pool)
}

async fn configure_pragmas(pool: &SqlitePool) -> Result<()> {
    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}

async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_settings_table(pool).await?;
    create_users_table(pool).await?;
    create_articles_table(pool).await?;
    create_submissions_table(pool).await?;
    create_status_history_table(pool).await?;
    create_article_authors_table(pool).await?;
    create_reviews_table(pool).await?;
    create_reviewer_profiles_table(pool).await?;
    create_editor_profiles_table(pool).await?;
    create_editor_assignments_table(pool).await?;
    create_recommended_reviewers_table(pool).await?;
    create_review_invitations_table(pool).await?;
    create_notifications_table(pool).await?;
    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            affiliation TEXT,
            role TEXT NOT NULL CHECK (role IN ('author', 'reviewer', 'editor', 'admin')),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the articles table
///
/// Articles are never hard-deleted; withdrawal is a workflow status.
pub async fn create_articles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            guid TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            abstract TEXT NOT NULL,
            keywords TEXT NOT NULL DEFAULT '[]',
            category TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN (
                'draft', 'submitted', 'technical_check', 'under_review',
                'revision_requested', 'revision_submitted', 'accepted',
                'rejected', 'published', 'withdrawn'
            )),
            author_id TEXT NOT NULL REFERENCES users(guid),
            co_author_ids TEXT NOT NULL DEFAULT '[]',
            editor_id TEXT REFERENCES users(guid),
            conflict_user_ids TEXT NOT NULL DEFAULT '[]',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_status ON articles(status)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_author ON articles(author_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_editor ON articles(editor_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_category ON articles(category)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the submissions table (one-to-one with articles)
pub async fn create_submissions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS submissions (
            guid TEXT PRIMARY KEY,
            article_id TEXT NOT NULL UNIQUE REFERENCES articles(guid),
            submitted_at TIMESTAMP NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the submission status-history table
///
/// Append-only: rows are inserted alongside every article status write and
/// never updated or deleted.
pub async fn create_status_history_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS submission_status_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            submission_id TEXT NOT NULL REFERENCES submissions(guid),
            status TEXT NOT NULL CHECK (status IN (
                'draft', 'submitted', 'technical_check', 'under_review',
                'revision_requested', 'revision_submitted', 'accepted',
                'rejected', 'published', 'withdrawn'
            )),
            actor_id TEXT REFERENCES users(guid),
            note TEXT,
            recorded_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_status_history_submission ON submission_status_history(submission_id, id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_article_authors_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS article_authors (
            article_id TEXT NOT NULL REFERENCES articles(guid),
            position INTEGER NOT NULL,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            institution TEXT NOT NULL,
            country TEXT,
            is_corresponding INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (article_id, position),
            CHECK (position >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the reviews table
pub async fn create_reviews_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            guid TEXT PRIMARY KEY,
            article_id TEXT NOT NULL REFERENCES articles(guid),
            reviewer_id TEXT NOT NULL REFERENCES users(guid),
            status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'completed', 'overdue')),
            recommendation TEXT CHECK (recommendation IS NULL OR recommendation IN
                ('accept', 'minor_revision', 'major_revision', 'reject')),
            comments TEXT,
            rating REAL CHECK (rating IS NULL OR (rating >= 1.0 AND rating <= 5.0)),
            assigned_at TIMESTAMP NOT NULL,
            due_at TIMESTAMP NOT NULL,
            completed_at TIMESTAMP,
            UNIQUE (article_id, reviewer_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_article ON reviews(article_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_reviewer ON reviews(reviewer_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_status_due ON reviews(status, due_at)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the reviewer_profiles table
///
/// Workload counters and track record used by the assignment scorer.
pub async fn create_reviewer_profiles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviewer_profiles (
            user_id TEXT PRIMARY KEY REFERENCES users(guid),
            keywords TEXT NOT NULL DEFAULT '[]',
            current_load INTEGER NOT NULL DEFAULT 0,
            max_per_month INTEGER NOT NULL DEFAULT 3,
            quality_score REAL NOT NULL DEFAULT 0.5,
            completed_count INTEGER NOT NULL DEFAULT 0,
            late_count INTEGER NOT NULL DEFAULT 0,
            last_review_at TIMESTAMP,
            CHECK (current_load >= 0),
            CHECK (max_per_month >= 0),
            CHECK (quality_score >= 0.0 AND quality_score <= 1.0),
            CHECK (completed_count >= 0),
            CHECK (late_count >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_reviewer_profiles_load ON reviewer_profiles(current_load)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_editor_profiles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS editor_profiles (
            user_id TEXT PRIMARY KEY REFERENCES users(guid),
            sections TEXT NOT NULL DEFAULT '[]',
            current_load INTEGER NOT NULL DEFAULT 0,
            accepting INTEGER NOT NULL DEFAULT 1,
            CHECK (current_load >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_editor_assignments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS editor_assignments (
            guid TEXT PRIMARY KEY,
            article_id TEXT NOT NULL REFERENCES articles(guid),
            editor_id TEXT NOT NULL REFERENCES users(guid),
            status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'accepted', 'expired')),
            assigned_at TIMESTAMP NOT NULL,
            deadline TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_editor_assignments_article ON editor_assignments(article_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_editor_assignments_status ON editor_assignments(status, deadline)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the recommended_reviewers table
///
/// Author-suggested candidates; matched_user_id links to an existing user
/// when the suggestion corresponds to a known reviewer.
pub async fn create_recommended_reviewers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recommended_reviewers (
            guid TEXT PRIMARY KEY,
            article_id TEXT NOT NULL REFERENCES articles(guid),
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            affiliation TEXT,
            expertise TEXT,
            matched_user_id TEXT REFERENCES users(guid),
            status TEXT NOT NULL DEFAULT 'suggested' CHECK (status IN ('suggested', 'invited', 'contacted')),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_recommended_reviewers_article ON recommended_reviewers(article_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_review_invitations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS review_invitations (
            guid TEXT PRIMARY KEY,
            review_id TEXT NOT NULL REFERENCES reviews(guid),
            article_id TEXT NOT NULL REFERENCES articles(guid),
            reviewer_id TEXT NOT NULL REFERENCES users(guid),
            status TEXT NOT NULL DEFAULT 'sent' CHECK (status IN ('sent', 'accepted', 'declined')),
            sent_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_review_invitations_article ON review_invitations(article_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_notifications_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            guid TEXT PRIMARY KEY,
            recipient_email TEXT NOT NULL,
            user_id TEXT REFERENCES users(guid),
            kind TEXT NOT NULL,
            subject TEXT NOT NULL,
            body TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'queued' CHECK (status IN ('queued', 'sent', 'failed')),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            sent_at TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_notifications_status ON notifications(status)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize or update default settings
///
/// Ensures all required settings exist with default values and resets NULL
/// values to defaults.
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    // Workflow settings
    ensure_setting(pool, "review_due_days", "21").await?;
    ensure_setting(pool, "max_reviewers_per_article", "3").await?;
    ensure_setting(pool, "max_recommended_selections", "2").await?;
    ensure_setting(pool, "recommended_score_floor", "0.6").await?;
    ensure_setting(pool, "editor_assignment_deadline_days", "7").await?;

    // Notification settings
    ensure_setting(pool, "mail_gateway_url", "").await?; // Empty = delivery disabled
    ensure_setting(pool, "mail_from_address", "editorial@jwp.invalid").await?;
    ensure_setting(pool, "event_bus_capacity", "256").await?;

    // HTTP server settings
    ensure_setting(pool, "http_host", "127.0.0.1").await?;
    ensure_setting(pool, "http_port", "5810").await?;

    info!("Default settings initialized");
    Ok(())
}

/// Ensure a setting exists with the specified default value
///
/// If the setting doesn't exist, it will be created with the default.
/// If the setting exists but has a NULL value, it will be reset to the default.
async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE key = ?)")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if !exists {
        // Use INSERT OR IGNORE to handle concurrent initialization races
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(default_value)
            .execute(pool)
            .await?;
        return Ok(());
    }

    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if value.is_none() {
        sqlx::query("UPDATE settings SET value = ?, updated_at = CURRENT_TIMESTAMP WHERE key = ?")
            .bind(default_value)
            .bind(key)
            .execute(pool)
            .await?;

        warn!("Setting '{}' was NULL, reset to default: {}", key, default_value);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_creates_and_settings_initialize() {
        let pool = init_test_database().await.unwrap();

        let due_days: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = 'review_due_days'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(due_days.as_deref(), Some("21"));

        // Status CHECK constraint rejects values outside the state set
        let bad_insert = sqlx::query(
            "INSERT INTO articles (guid, title, abstract, category, status, author_id)
             VALUES ('a', 't', 'x', 'c', 'nonsense', 'u')",
        )
        .execute(&pool)
        .await;
        assert!(bad_insert.is_err());
    }
}
