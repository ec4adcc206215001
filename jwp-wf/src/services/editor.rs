//! Automatic editor assignment
//!
//! Picks the least-loaded accepting editor whose sections cover the
//! article's category (or "general"), creates a pending assignment with a
//! deadline, and points the article at the editor.

use chrono::{Duration, Utc};
use jwp_common::db::models::{Article, EditorAssignment};
use jwp_common::events::{EventBus, WorkflowEvent};
use jwp_common::status::AssignmentStatus;
use jwp_common::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db;

/// Section name that matches every category
const GENERAL_SECTION: &str = "general";

/// Assign an editor to an article by category and workload
///
/// Returns None when no accepting editor covers the category; the caller
/// decides whether that is an error (manual endpoint) or just logged
/// (submission intake).
pub async fn auto_assign_editor(
    pool: &SqlitePool,
    event_bus: &EventBus,
    article: &Article,
) -> Result<Option<EditorAssignment>> {
    let category = article.category.trim().to_lowercase();

    // Least-loaded first, guid tie-break; take the first section match
    let editors = db::profiles::list_accepting_editors(pool).await?;
    let chosen = editors.iter().find(|e| {
        e.section_list()
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&category) || s.eq_ignore_ascii_case(GENERAL_SECTION))
    });

    let Some(editor) = chosen else {
        warn!(
            "No accepting editor covers category '{}' for article {}",
            article.category, article.guid
        );
        return Ok(None);
    };

    let deadline_days = db::settings::editor_assignment_deadline_days(pool).await?;
    let now = Utc::now();
    let assignment = EditorAssignment {
        guid: Uuid::new_v4(),
        article_id: article.guid,
        editor_id: editor.user_id,
        status: AssignmentStatus::Pending.as_str().to_string(),
        assigned_at: now,
        deadline: now + Duration::days(deadline_days),
    };

    let mut tx = pool.begin().await?;
    db::assignments::insert_editor_assignment(&mut *tx, &assignment).await?;
    db::profiles::increment_editor_load(&mut *tx, editor.user_id).await?;
    db::articles::set_editor(&mut *tx, article.guid, Some(editor.user_id)).await?;
    tx.commit().await?;

    info!(
        "Assigned editor {} to article {} (deadline {})",
        editor.user_id, article.guid, assignment.deadline
    );

    event_bus.emit_lossy(WorkflowEvent::EditorAssigned {
        article_id: article.guid,
        editor_id: editor.user_id,
        deadline: assignment.deadline,
        timestamp: now,
    });

    Ok(Some(assignment))
}
