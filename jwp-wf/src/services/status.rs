//! Article status transitions
//!
//! The single write path for article status: validates the move against the
//! transition table, then persists the new status and the matching
//! status-history row in one transaction. Callers that bypass this path
//! would break the history/status invariant, so nothing else writes
//! `articles.status`.

use chrono::Utc;
use jwp_common::db::models::Article;
use jwp_common::events::{EventBus, WorkflowEvent};
use jwp_common::status::ArticleStatus;
use jwp_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db;

/// Outcome of a status change
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub article_id: Uuid,
    pub old_status: ArticleStatus,
    pub new_status: ArticleStatus,
}

/// Move an article to a new workflow status
///
/// Rejects transitions outside the table with `Error::InvalidTransition`,
/// leaving persisted state untouched.
pub async fn update_submission_status(
    pool: &SqlitePool,
    event_bus: &EventBus,
    article_id: Uuid,
    new_status: ArticleStatus,
    actor_id: Option<Uuid>,
    note: Option<&str>,
) -> Result<StatusChange> {
    let article = db::articles::load_article(pool, article_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Article {} not found", article_id)))?;

    let change = apply_transition(pool, &article, new_status, actor_id, note).await?;

    event_bus.emit_lossy(WorkflowEvent::StatusChanged {
        article_id,
        old_status: change.old_status,
        new_status: change.new_status,
        actor_id,
        timestamp: Utc::now(),
    });

    Ok(change)
}

/// Validate and persist a transition for an already-loaded article
///
/// Shared by the public status endpoint, the editor decision endpoint and
/// the review-completion aggregator. Does not emit events; callers choose
/// which event fits.
pub async fn apply_transition(
    pool: &SqlitePool,
    article: &Article,
    new_status: ArticleStatus,
    actor_id: Option<Uuid>,
    note: Option<&str>,
) -> Result<StatusChange> {
    let old_status = article.workflow_status()?;
    old_status.transition(new_status)?;

    let submission = db::submissions::load_submission_by_article(pool, article.guid)
        .await?
        .ok_or_else(|| {
            Error::Internal(format!("Article {} has no submission record", article.guid))
        })?;

    let now = Utc::now();
    let mut tx = pool.begin().await?;
    db::articles::update_status(&mut *tx, article.guid, new_status).await?;
    db::submissions::append_status_history(
        &mut *tx,
        submission.guid,
        new_status,
        actor_id,
        note,
        now,
    )
    .await?;
    tx.commit().await?;

    info!(
        "Article {} status: {} -> {}",
        article.guid, old_status, new_status
    );

    Ok(StatusChange {
        article_id: article.guid,
        old_status,
        new_status,
    })
}
