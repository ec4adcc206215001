//! Article database operations

use chrono::Utc;
use jwp_common::db::models::Article;
use jwp_common::status::ArticleStatus;
use jwp_common::Result;
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

const ARTICLE_COLUMNS: &str = "guid, title, abstract, keywords, category, status, \
     author_id, co_author_ids, editor_id, conflict_user_ids";

/// Insert an article
pub async fn insert_article(ex: impl SqliteExecutor<'_>, article: &Article) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO articles
            (guid, title, abstract, keywords, category, status,
             author_id, co_author_ids, editor_id, conflict_user_ids)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(article.guid.to_string())
    .bind(&article.title)
    .bind(&article.abstract_text)
    .bind(&article.keywords)
    .bind(&article.category)
    .bind(&article.status)
    .bind(article.author_id.to_string())
    .bind(&article.co_author_ids)
    .bind(article.editor_id.map(|id| id.to_string()))
    .bind(&article.conflict_user_ids)
    .execute(ex)
    .await?;
    Ok(())
}

/// Load an article by id
pub async fn load_article(db: &SqlitePool, id: Uuid) -> Result<Option<Article>> {
    let article = sqlx::query_as::<_, Article>(&format!(
        "SELECT {} FROM articles WHERE guid = ?",
        ARTICLE_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(db)
    .await?;
    Ok(article)
}

/// Persist a new workflow status
///
/// The caller validates the transition through the state machine first and
/// appends the matching status-history row in the same transaction.
pub async fn update_status(
    ex: impl SqliteExecutor<'_>,
    article_id: Uuid,
    status: ArticleStatus,
) -> Result<()> {
    sqlx::query("UPDATE articles SET status = ?, updated_at = ? WHERE guid = ?")
        .bind(status.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(article_id.to_string())
        .execute(ex)
        .await?;
    Ok(())
}

/// Set (or clear) the article's assigned editor
pub async fn set_editor(
    ex: impl SqliteExecutor<'_>,
    article_id: Uuid,
    editor_id: Option<Uuid>,
) -> Result<()> {
    sqlx::query("UPDATE articles SET editor_id = ?, updated_at = ? WHERE guid = ?")
        .bind(editor_id.map(|id| id.to_string()))
        .bind(Utc::now().to_rfc3339())
        .bind(article_id.to_string())
        .execute(ex)
        .await?;
    Ok(())
}
