//! Notification dispatcher
//!
//! Background task subscribed to the workflow event bus. For each event it
//! resolves recipient addresses from the database, records a notifications
//! row, and hands the message to the mailer. Runs off the request path so a
//! slow or dead mail gateway never blocks workflow operations.

use chrono::Utc;
use jwp_common::db::models::Notification;
use jwp_common::events::{EventBus, WorkflowEvent};
use jwp_common::Result;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::db;
use crate::notify::mailer::Mailer;

/// A rendered notification ready for delivery
struct PendingMessage {
    recipient_email: String,
    user_id: Option<Uuid>,
    kind: &'static str,
    subject: String,
    body: String,
}

/// Run the dispatcher until the event bus closes
///
/// Spawned once at startup. Lagged events are skipped with a warning; the
/// sweep endpoints and notifications table make dropped mail observable.
pub async fn run_dispatcher(event_bus: EventBus, pool: SqlitePool, mailer: Mailer) {
    let mut rx = event_bus.subscribe();
    debug!(
        "Notification dispatcher started (delivery {})",
        if mailer.delivery_enabled() { "enabled" } else { "disabled" }
    );

    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Err(e) = handle_event(&pool, &mailer, &event).await {
                    warn!("Notification handling failed for {:?}: {}", event, e);
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Notification dispatcher lagged, skipped {} event(s)", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Event bus closed, notification dispatcher shutting down");
                break;
            }
        }
    }
}

async fn handle_event(pool: &SqlitePool, mailer: &Mailer, event: &WorkflowEvent) -> Result<()> {
    for message in render_messages(pool, event).await? {
        let notification = Notification {
            guid: Uuid::new_v4(),
            recipient_email: message.recipient_email.clone(),
            user_id: message.user_id,
            kind: message.kind.to_string(),
            subject: message.subject.clone(),
            body: message.body.clone(),
            status: "queued".to_string(),
            created_at: Utc::now(),
            sent_at: None,
        };
        db::notifications::insert_notification(pool, &notification).await?;

        let delivered = mailer
            .send(&message.recipient_email, &message.subject, &message.body)
            .await;
        if delivered {
            db::notifications::mark_sent(pool, notification.guid, Utc::now()).await?;
        } else {
            // Logged only; no retries
            db::notifications::mark_failed(pool, notification.guid).await?;
        }
    }
    Ok(())
}

/// Resolve recipients and render subject/body for one event
///
/// Plain format strings; no templating engine. Events whose recipients no
/// longer resolve produce nothing rather than erroring.
async fn render_messages(pool: &SqlitePool, event: &WorkflowEvent) -> Result<Vec<PendingMessage>> {
    let mut messages = Vec::new();

    match event {
        WorkflowEvent::SubmissionReceived {
            article_id,
            title,
            author_id,
            ..
        } => {
            if let Some(author) = db::users::load_user(pool, *author_id).await? {
                messages.push(PendingMessage {
                    recipient_email: author.email,
                    user_id: Some(*author_id),
                    kind: "submission_received",
                    subject: format!("Submission received: {}", title),
                    body: format!(
                        "Your manuscript \"{}\" has been received and assigned id {}. \
                         You will be notified as it moves through review.",
                        title, article_id
                    ),
                });
            }
        }

        WorkflowEvent::EditorAssigned {
            article_id,
            editor_id,
            deadline,
            ..
        } => {
            if let Some(editor) = db::users::load_user(pool, *editor_id).await? {
                messages.push(PendingMessage {
                    recipient_email: editor.email,
                    user_id: Some(*editor_id),
                    kind: "editor_assigned",
                    subject: format!("Editorial assignment for manuscript {}", article_id),
                    body: format!(
                        "You have been assigned as handling editor for manuscript {}. \
                         Please accept or decline by {}.",
                        article_id, deadline
                    ),
                });
            }
        }

        WorkflowEvent::ReviewInvited {
            article_id,
            reviewer_id,
            due_at,
            ..
        } => {
            if let Some(reviewer) = db::users::load_user(pool, *reviewer_id).await? {
                messages.push(PendingMessage {
                    recipient_email: reviewer.email,
                    user_id: Some(*reviewer_id),
                    kind: "review_invitation",
                    subject: format!("Review invitation for manuscript {}", article_id),
                    body: format!(
                        "You have been invited to review manuscript {}. \
                         The review is due by {}.",
                        article_id, due_at
                    ),
                });
            }
        }

        WorkflowEvent::RecommendedReviewerContacted {
            article_id, email, ..
        } => {
            messages.push(PendingMessage {
                recipient_email: email.clone(),
                user_id: None,
                kind: "reviewer_contact",
                subject: "Invitation to review a manuscript".to_string(),
                body: format!(
                    "An author has recommended you as a reviewer for manuscript {}. \
                     Reply to this message to register and accept the review.",
                    article_id
                ),
            });
        }

        WorkflowEvent::ReviewCompleted { article_id, .. } => {
            // The handling editor tracks review progress
            if let Some(article) = db::articles::load_article(pool, *article_id).await? {
                if let Some(editor_id) = article.editor_id {
                    if let Some(editor) = db::users::load_user(pool, editor_id).await? {
                        messages.push(PendingMessage {
                            recipient_email: editor.email,
                            user_id: Some(editor_id),
                            kind: "review_completed",
                            subject: format!("Review completed for manuscript {}", article_id),
                            body: format!(
                                "A review for manuscript {} has been completed.",
                                article_id
                            ),
                        });
                    }
                }
            }
        }

        WorkflowEvent::StatusChanged {
            article_id,
            old_status,
            new_status,
            ..
        } => {
            if let Some(article) = db::articles::load_article(pool, *article_id).await? {
                if let Some(author) = db::users::load_user(pool, article.author_id).await? {
                    messages.push(PendingMessage {
                        recipient_email: author.email,
                        user_id: Some(article.author_id),
                        kind: "status_changed",
                        subject: format!("Manuscript {} status update", article_id),
                        body: format!(
                            "The status of \"{}\" changed from {} to {}.",
                            article.title, old_status, new_status
                        ),
                    });
                }
            }
        }

        WorkflowEvent::DecisionReached {
            article_id, status, ..
        } => {
            if let Some(article) = db::articles::load_article(pool, *article_id).await? {
                if let Some(author) = db::users::load_user(pool, article.author_id).await? {
                    messages.push(PendingMessage {
                        recipient_email: author.email,
                        user_id: Some(article.author_id),
                        kind: "decision_reached",
                        subject: format!("Editorial decision for \"{}\"", article.title),
                        body: format!(
                            "All reviews for your manuscript are complete. Decision: {}.",
                            status
                        ),
                    });
                }
            }
        }

        WorkflowEvent::ReviewOverdue {
            article_id,
            reviewer_id,
            ..
        } => {
            if let Some(reviewer) = db::users::load_user(pool, *reviewer_id).await? {
                messages.push(PendingMessage {
                    recipient_email: reviewer.email,
                    user_id: Some(*reviewer_id),
                    kind: "review_overdue",
                    subject: format!("Review overdue for manuscript {}", article_id),
                    body: format!(
                        "Your review for manuscript {} is past its due date. \
                         Please submit it as soon as possible.",
                        article_id
                    ),
                });
            }
        }

        WorkflowEvent::AssignmentExpired {
            article_id,
            editor_id,
            ..
        } => {
            if let Some(editor) = db::users::load_user(pool, *editor_id).await? {
                messages.push(PendingMessage {
                    recipient_email: editor.email,
                    user_id: Some(*editor_id),
                    kind: "assignment_expired",
                    subject: format!("Editorial assignment expired for manuscript {}", article_id),
                    body: format!(
                        "Your assignment for manuscript {} was not accepted before its \
                         deadline and has expired.",
                        article_id
                    ),
                });
            }
        }
    }

    Ok(messages)
}
