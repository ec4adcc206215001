//! Event types for the JWP workflow event system
//!
//! Provides the shared `WorkflowEvent` definitions and the `EventBus` used
//! to decouple notification dispatch from the request path. Services emit
//! events after their database writes commit; the notification dispatcher
//! subscribes and handles email side effects off the critical path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::status::{ArticleStatus, ReviewRecommendation};

/// JWP workflow event types
///
/// Events are broadcast via EventBus. Every variant carries the ids the
/// dispatcher needs to resolve recipients without re-deriving workflow
/// state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkflowEvent {
    /// A new manuscript cleared validation and was persisted
    SubmissionReceived {
        article_id: Uuid,
        title: String,
        author_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// An editor was assigned to a manuscript
    EditorAssigned {
        article_id: Uuid,
        editor_id: Uuid,
        deadline: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    /// An existing reviewer was invited (a pending review row exists)
    ReviewInvited {
        article_id: Uuid,
        review_id: Uuid,
        reviewer_id: Uuid,
        due_at: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    /// An author-recommended reviewer without an account was contacted
    RecommendedReviewerContacted {
        article_id: Uuid,
        recommended_id: Uuid,
        email: String,
        timestamp: DateTime<Utc>,
    },

    /// A reviewer submitted a completed review
    ReviewCompleted {
        article_id: Uuid,
        review_id: Uuid,
        reviewer_id: Uuid,
        recommendation: ReviewRecommendation,
        timestamp: DateTime<Utc>,
    },

    /// An article's workflow status changed
    StatusChanged {
        article_id: Uuid,
        old_status: ArticleStatus,
        new_status: ArticleStatus,
        actor_id: Option<Uuid>,
        timestamp: DateTime<Utc>,
    },

    /// All reviews completed and an aggregate decision was applied
    DecisionReached {
        article_id: Uuid,
        status: ArticleStatus,
        timestamp: DateTime<Utc>,
    },

    /// A pending review passed its due date
    ReviewOverdue {
        article_id: Uuid,
        review_id: Uuid,
        reviewer_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// A pending editor assignment passed its deadline
    AssignmentExpired {
        article_id: Uuid,
        assignment_id: Uuid,
        editor_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl WorkflowEvent {
    /// Article the event concerns
    pub fn article_id(&self) -> Uuid {
        match self {
            WorkflowEvent::SubmissionReceived { article_id, .. }
            | WorkflowEvent::EditorAssigned { article_id, .. }
            | WorkflowEvent::ReviewInvited { article_id, .. }
            | WorkflowEvent::RecommendedReviewerContacted { article_id, .. }
            | WorkflowEvent::ReviewCompleted { article_id, .. }
            | WorkflowEvent::StatusChanged { article_id, .. }
            | WorkflowEvent::DecisionReached { article_id, .. }
            | WorkflowEvent::ReviewOverdue { article_id, .. }
            | WorkflowEvent::AssignmentExpired { article_id, .. } => *article_id,
        }
    }
}

/// Broadcast bus for workflow events
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WorkflowEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// `capacity` is the number of events buffered before old events are
    /// dropped for slow subscribers.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: WorkflowEvent,
    ) -> std::result::Result<usize, broadcast::error::SendError<WorkflowEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Used where it is acceptable for no component to be listening
    /// (e.g. tests that exercise services without a dispatcher).
    pub fn emit_lossy(&self, event: WorkflowEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
