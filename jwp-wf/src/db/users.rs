//! User database operations

use jwp_common::db::models::User;
use jwp_common::Result;
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

/// Insert a user
pub async fn insert_user(ex: impl SqliteExecutor<'_>, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (guid, name, email, affiliation, role)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.guid.to_string())
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.affiliation)
    .bind(&user.role)
    .execute(ex)
    .await?;
    Ok(())
}

/// Load a user by id
pub async fn load_user(db: &SqlitePool, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT guid, name, email, affiliation, role FROM users WHERE guid = ?",
    )
    .bind(id.to_string())
    .fetch_optional(db)
    .await?;
    Ok(user)
}

/// Find a user by email (case-insensitive)
pub async fn find_user_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT guid, name, email, affiliation, role FROM users WHERE email = ? COLLATE NOCASE",
    )
    .bind(email.trim())
    .fetch_optional(db)
    .await?;
    Ok(user)
}
