//! Database schema migrations
//!
//! Versioned schema migrations so existing installations upgrade in place
//! without manual deletion or data loss.
//!
//! Guidelines:
//! 1. Never modify existing migrations - they must remain stable for users
//!    upgrading from older versions
//! 2. Always add new migrations - one function per schema change
//! 3. Prefer ALTER TABLE over DROP/CREATE to preserve data
//! 4. Keep every migration idempotent (check before altering)

use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Current schema version
///
/// Increment this when adding new migrations.
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Get current schema version from database
///
/// Returns 0 if the schema_version table has no rows.
async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let version: Option<i32> = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await?;
    Ok(version.unwrap_or(0))
}

/// Record a schema version as applied
async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

/// Run all pending migrations
///
/// Safe to call on every startup; already-applied versions are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let mut version = get_schema_version(pool).await?;

    if version >= CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    while version < CURRENT_SCHEMA_VERSION {
        let next = version + 1;
        match next {
            1 => migrate_v1(pool).await?,
            _ => break,
        }
        set_schema_version(pool, next).await?;
        info!("Applied schema migration v{}", next);
        version = next;
    }

    Ok(())
}

/// v1: baseline schema
///
/// Tables are created by `init::create_schema`; the baseline migration only
/// stamps the version so future ALTERs know where an installation stands.
async fn migrate_v1(_pool: &SqlitePool) -> Result<()> {
    Ok(())
}
