//! Editorial workflow state machine
//!
//! An article moves through ten defined states:
//! draft → submitted → technical_check → under_review →
//! (revision_requested ⇄ revision_submitted) → accepted → published,
//! with rejected/withdrawn reachable from the active states.
//!
//! The transition table is static and directional. rejected, published and
//! withdrawn are terminal. Any pair not in the table is rejected with
//! `Error::InvalidTransition`; the caller must choose a valid target state.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Article workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    /// Being prepared by the author, not yet submitted
    Draft,
    /// Received, awaiting editorial screening
    Submitted,
    /// Initial editorial screening before peer review
    TechnicalCheck,
    /// Out with reviewers
    UnderReview,
    /// Editors asked the author for changes
    RevisionRequested,
    /// Author returned a revised manuscript
    RevisionSubmitted,
    /// Approved for publication
    Accepted,
    /// Declined (terminal)
    Rejected,
    /// Live (terminal)
    Published,
    /// Pulled by the author (terminal)
    Withdrawn,
}

impl ArticleStatus {
    /// States reachable from `self` in one step
    pub fn allowed_transitions(self) -> &'static [ArticleStatus] {
        use ArticleStatus::*;
        match self {
            Draft => &[Submitted, Withdrawn],
            Submitted => &[TechnicalCheck, Rejected, Withdrawn],
            TechnicalCheck => &[UnderReview, Rejected, Withdrawn],
            UnderReview => &[RevisionRequested, Accepted, Rejected, Withdrawn],
            RevisionRequested => &[RevisionSubmitted, Withdrawn],
            RevisionSubmitted => &[UnderReview, Accepted, Rejected, Withdrawn],
            Accepted => &[Published],
            Rejected | Published | Withdrawn => &[],
        }
    }

    /// Whether `to` is reachable from `self` in one step
    pub fn can_transition(self, to: ArticleStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Validate a transition, returning the target on success
    pub fn transition(self, to: ArticleStatus) -> Result<ArticleStatus> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(Error::InvalidTransition { from: self, to })
        }
    }

    /// Terminal states have no outgoing transitions
    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Database TEXT representation
    pub fn as_str(self) -> &'static str {
        use ArticleStatus::*;
        match self {
            Draft => "draft",
            Submitted => "submitted",
            TechnicalCheck => "technical_check",
            UnderReview => "under_review",
            RevisionRequested => "revision_requested",
            RevisionSubmitted => "revision_submitted",
            Accepted => "accepted",
            Rejected => "rejected",
            Published => "published",
            Withdrawn => "withdrawn",
        }
    }

    /// All states, in workflow order (used for CHECK constraints and UIs)
    pub fn all() -> &'static [ArticleStatus] {
        use ArticleStatus::*;
        &[
            Draft,
            Submitted,
            TechnicalCheck,
            UnderReview,
            RevisionRequested,
            RevisionSubmitted,
            Accepted,
            Rejected,
            Published,
            Withdrawn,
        ]
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArticleStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        use ArticleStatus::*;
        match s {
            "draft" => Ok(Draft),
            "submitted" => Ok(Submitted),
            "technical_check" => Ok(TechnicalCheck),
            "under_review" => Ok(UnderReview),
            "revision_requested" => Ok(RevisionRequested),
            "revision_submitted" => Ok(RevisionSubmitted),
            "accepted" => Ok(Accepted),
            "rejected" => Ok(Rejected),
            "published" => Ok(Published),
            "withdrawn" => Ok(Withdrawn),
            other => Err(Error::InvalidInput(format!(
                "Unknown article status: {}",
                other
            ))),
        }
    }
}

/// Reviewer verdict on a manuscript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewRecommendation {
    Accept,
    MinorRevision,
    MajorRevision,
    Reject,
}

impl ReviewRecommendation {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewRecommendation::Accept => "accept",
            ReviewRecommendation::MinorRevision => "minor_revision",
            ReviewRecommendation::MajorRevision => "major_revision",
            ReviewRecommendation::Reject => "reject",
        }
    }
}

impl fmt::Display for ReviewRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewRecommendation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "accept" => Ok(ReviewRecommendation::Accept),
            "minor_revision" => Ok(ReviewRecommendation::MinorRevision),
            "major_revision" => Ok(ReviewRecommendation::MajorRevision),
            "reject" => Ok(ReviewRecommendation::Reject),
            other => Err(Error::InvalidInput(format!(
                "Unknown review recommendation: {}",
                other
            ))),
        }
    }
}

/// Review lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Completed,
    Overdue,
}

impl ReviewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Completed => "completed",
            ReviewStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(ReviewStatus::Pending),
            "completed" => Ok(ReviewStatus::Completed),
            "overdue" => Ok(ReviewStatus::Overdue),
            other => Err(Error::InvalidInput(format!(
                "Unknown review status: {}",
                other
            ))),
        }
    }
}

/// Editor assignment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Expired,
}

impl AssignmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Accepted => "accepted",
            AssignmentStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(AssignmentStatus::Pending),
            "accepted" => Ok(AssignmentStatus::Accepted),
            "expired" => Ok(AssignmentStatus::Expired),
            other => Err(Error::InvalidInput(format!(
                "Unknown assignment status: {}",
                other
            ))),
        }
    }
}

/// Aggregate completed review recommendations into an article-level decision
///
/// Fixed precedence: any reject wins, then any revision request, then
/// unanimous accept. An empty slice yields no decision (the article stays
/// where it is until reviews exist).
pub fn aggregate_decision(recommendations: &[ReviewRecommendation]) -> Option<ArticleStatus> {
    if recommendations.is_empty() {
        return None;
    }
    if recommendations
        .iter()
        .any(|r| *r == ReviewRecommendation::Reject)
    {
        return Some(ArticleStatus::Rejected);
    }
    if recommendations.iter().any(|r| {
        matches!(
            r,
            ReviewRecommendation::MajorRevision | ReviewRecommendation::MinorRevision
        )
    }) {
        return Some(ArticleStatus::RevisionRequested);
    }
    // All remaining recommendations are accepts
    Some(ArticleStatus::Accepted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_only_transitions_to_published() {
        assert_eq!(
            ArticleStatus::Accepted.allowed_transitions(),
            &[ArticleStatus::Published]
        );
        assert!(!ArticleStatus::Accepted.can_transition(ArticleStatus::Rejected));
        assert!(!ArticleStatus::Accepted.can_transition(ArticleStatus::Withdrawn));
    }

    #[test]
    fn test_terminal_states_have_no_transitions() {
        for status in [
            ArticleStatus::Rejected,
            ArticleStatus::Published,
            ArticleStatus::Withdrawn,
        ] {
            assert!(status.is_terminal());
            for target in ArticleStatus::all() {
                assert!(!status.can_transition(*target));
            }
        }
    }

    #[test]
    fn test_transition_rejects_pairs_outside_table() {
        let result = ArticleStatus::Draft.transition(ArticleStatus::Published);
        match result {
            Err(Error::InvalidTransition { from, to }) => {
                assert_eq!(from, ArticleStatus::Draft);
                assert_eq!(to, ArticleStatus::Published);
            }
            other => panic!("Expected InvalidTransition, got {:?}", other),
        }
    }

    #[test]
    fn test_full_acceptance_path_is_valid() {
        let path = [
            ArticleStatus::Draft,
            ArticleStatus::Submitted,
            ArticleStatus::TechnicalCheck,
            ArticleStatus::UnderReview,
            ArticleStatus::RevisionRequested,
            ArticleStatus::RevisionSubmitted,
            ArticleStatus::Accepted,
            ArticleStatus::Published,
        ];
        for pair in path.windows(2) {
            assert!(
                pair[0].can_transition(pair[1]),
                "{} -> {} should be allowed",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_status_round_trip() {
        for status in ArticleStatus::all() {
            let parsed: ArticleStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, *status);
        }
    }

    #[test]
    fn test_aggregate_any_reject_wins() {
        let recs = [
            ReviewRecommendation::Accept,
            ReviewRecommendation::Reject,
        ];
        assert_eq!(aggregate_decision(&recs), Some(ArticleStatus::Rejected));
    }

    #[test]
    fn test_aggregate_revision_beats_accept() {
        let recs = [
            ReviewRecommendation::Accept,
            ReviewRecommendation::MinorRevision,
        ];
        assert_eq!(
            aggregate_decision(&recs),
            Some(ArticleStatus::RevisionRequested)
        );

        let recs = [
            ReviewRecommendation::MajorRevision,
            ReviewRecommendation::Accept,
        ];
        assert_eq!(
            aggregate_decision(&recs),
            Some(ArticleStatus::RevisionRequested)
        );
    }

    #[test]
    fn test_aggregate_unanimous_accept() {
        let recs = [ReviewRecommendation::Accept, ReviewRecommendation::Accept];
        assert_eq!(aggregate_decision(&recs), Some(ArticleStatus::Accepted));
    }

    #[test]
    fn test_aggregate_empty_is_no_decision() {
        assert_eq!(aggregate_decision(&[]), None);
    }
}
