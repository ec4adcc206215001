//! On-demand maintenance sweeps
//!
//! Invoked through the maintenance endpoints, not on a timer. Each sweep is
//! idempotent: a row already swept does not match the next run's filter.

use chrono::Utc;
use jwp_common::events::{EventBus, WorkflowEvent};
use jwp_common::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db;

/// Mark pending reviews past their due date as overdue
///
/// Each overdue review penalizes the reviewer's late counter once. Returns
/// the number of reviews marked.
pub async fn sweep_overdue_reviews(pool: &SqlitePool, event_bus: &EventBus) -> Result<usize> {
    let now = Utc::now();
    let candidates = db::reviews::list_overdue_candidates(pool, now).await?;
    let mut marked = 0;

    for review in &candidates {
        let mut tx = pool.begin().await?;
        db::reviews::mark_overdue(&mut *tx, review.guid).await?;
        db::profiles::increment_late_count(&mut *tx, review.reviewer_id).await?;
        tx.commit().await?;
        marked += 1;

        warn!(
            "Review {} for article {} is overdue (was due {})",
            review.guid, review.article_id, review.due_at
        );
        event_bus.emit_lossy(WorkflowEvent::ReviewOverdue {
            article_id: review.article_id,
            review_id: review.guid,
            reviewer_id: review.reviewer_id,
            timestamp: now,
        });
    }

    info!("Overdue sweep marked {} review(s)", marked);
    Ok(marked)
}

/// Expire pending editor assignments past their deadline
///
/// Releases the editor's workload slot and clears the article's editor when
/// it still points at the expiring editor. Returns the number expired.
pub async fn expire_editor_assignments(pool: &SqlitePool, event_bus: &EventBus) -> Result<usize> {
    let now = Utc::now();
    let candidates = db::assignments::list_expired_pending(pool, now).await?;
    let mut expired = 0;

    for assignment in &candidates {
        let article = db::articles::load_article(pool, assignment.article_id).await?;
        let clear_editor = article
            .as_ref()
            .is_some_and(|a| a.editor_id == Some(assignment.editor_id));

        let mut tx = pool.begin().await?;
        db::assignments::mark_expired(&mut *tx, assignment.guid).await?;
        db::profiles::decrement_editor_load(&mut *tx, assignment.editor_id).await?;
        if clear_editor {
            db::articles::set_editor(&mut *tx, assignment.article_id, None).await?;
        }
        tx.commit().await?;
        expired += 1;

        event_bus.emit_lossy(WorkflowEvent::AssignmentExpired {
            article_id: assignment.article_id,
            assignment_id: assignment.guid,
            editor_id: assignment.editor_id,
            timestamp: now,
        });
    }

    info!("Assignment-expiry sweep expired {} assignment(s)", expired);
    Ok(expired)
}
