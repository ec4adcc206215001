//! Submission intake
//!
//! Validates a new manuscript, persists the article, submission record,
//! author manifest and recommended reviewers in one transaction, then
//! attempts automatic editor assignment and emits notification events.

use chrono::Utc;
use jwp_common::db::models::{
    encode_string_list, Article, ArticleAuthor, RecommendedReviewer, Submission,
};
use jwp_common::events::{EventBus, WorkflowEvent};
use jwp_common::status::ArticleStatus;
use jwp_common::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{error, info};
use uuid::Uuid;

use crate::db;
use crate::services::editor;

/// Minimum title length enforced in the shared validation path
const MIN_TITLE_CHARS: usize = 10;

/// One author on the manuscript, as declared by the submitter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorEntry {
    pub name: String,
    pub email: String,
    pub institution: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub is_corresponding: bool,
}

/// Reviewer candidate suggested by the author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedEntry {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub affiliation: Option<String>,
    #[serde(default)]
    pub expertise: Option<String>,
}

/// A new manuscript submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub category: String,
    pub author_id: Uuid,
    #[serde(default)]
    pub co_author_ids: Vec<Uuid>,
    pub authors: Vec<AuthorEntry>,
    #[serde(default)]
    pub recommended_reviewers: Vec<RecommendedEntry>,
    #[serde(default)]
    pub conflict_user_ids: Vec<Uuid>,
}

/// What a successful submission produced
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub article_id: Uuid,
    pub submission_id: Uuid,
    pub editor_id: Option<Uuid>,
}

/// Validate a submission request
///
/// Every failure is a structured `InvalidInput` message for the caller;
/// nothing here panics or aborts the process.
pub fn validate(request: &SubmissionRequest) -> Result<()> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(Error::InvalidInput("Title is required".to_string()));
    }
    if title.chars().count() < MIN_TITLE_CHARS {
        return Err(Error::InvalidInput(format!(
            "Title must be at least {} characters",
            MIN_TITLE_CHARS
        )));
    }
    if request.abstract_text.trim().is_empty() {
        return Err(Error::InvalidInput("Abstract is required".to_string()));
    }
    if request.category.trim().is_empty() {
        return Err(Error::InvalidInput("Category is required".to_string()));
    }
    if request.authors.is_empty() {
        return Err(Error::InvalidInput(
            "At least one author is required".to_string(),
        ));
    }

    let corresponding = request
        .authors
        .iter()
        .filter(|a| a.is_corresponding)
        .count();
    if corresponding != 1 {
        return Err(Error::InvalidInput(
            "Exactly one corresponding author is required".to_string(),
        ));
    }

    for (index, author) in request.authors.iter().enumerate() {
        if author.name.trim().is_empty()
            || author.email.trim().is_empty()
            || author.institution.trim().is_empty()
        {
            return Err(Error::InvalidInput(format!(
                "Author {} is missing name, email or institution",
                index + 1
            )));
        }
    }

    Ok(())
}

/// Persist a validated submission and kick off editor assignment
pub async fn submit(
    pool: &SqlitePool,
    event_bus: &EventBus,
    request: SubmissionRequest,
) -> Result<SubmissionReceipt> {
    validate(&request)?;

    let author = db::users::load_user(pool, request.author_id)
        .await?
        .ok_or_else(|| {
            Error::InvalidInput(format!("Submitting author {} not found", request.author_id))
        })?;

    let now = Utc::now();
    let article = Article {
        guid: Uuid::new_v4(),
        title: request.title.trim().to_string(),
        abstract_text: request.abstract_text.trim().to_string(),
        keywords: encode_string_list(&request.keywords),
        category: request.category.trim().to_string(),
        status: ArticleStatus::Submitted.as_str().to_string(),
        author_id: author.guid,
        co_author_ids: encode_string_list(
            &request
                .co_author_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>(),
        ),
        editor_id: None,
        conflict_user_ids: encode_string_list(
            &request
                .conflict_user_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>(),
        ),
    };
    let submission = Submission {
        guid: Uuid::new_v4(),
        article_id: article.guid,
        submitted_at: now,
    };

    // Resolve recommended reviewers against existing accounts before the
    // write transaction starts
    let mut recommended_rows = Vec::with_capacity(request.recommended_reviewers.len());
    for entry in &request.recommended_reviewers {
        let matched = db::users::find_user_by_email(pool, &entry.email).await?;
        recommended_rows.push(RecommendedReviewer {
            guid: Uuid::new_v4(),
            article_id: article.guid,
            name: entry.name.trim().to_string(),
            email: entry.email.trim().to_string(),
            affiliation: entry.affiliation.clone(),
            expertise: entry.expertise.clone(),
            matched_user_id: matched.map(|u| u.guid),
            status: "suggested".to_string(),
        });
    }

    // Article + submission + history + authors + recommendations commit or
    // roll back together
    let mut tx = pool.begin().await?;

    db::articles::insert_article(&mut *tx, &article).await?;
    db::submissions::insert_submission(&mut *tx, &submission).await?;
    db::submissions::append_status_history(
        &mut *tx,
        submission.guid,
        ArticleStatus::Submitted,
        Some(author.guid),
        Some("Initial submission"),
        now,
    )
    .await?;

    for (position, entry) in request.authors.iter().enumerate() {
        let row = ArticleAuthor {
            article_id: article.guid,
            position: position as i64,
            name: entry.name.trim().to_string(),
            email: entry.email.trim().to_string(),
            institution: entry.institution.trim().to_string(),
            country: entry.country.clone(),
            is_corresponding: entry.is_corresponding,
        };
        db::submissions::insert_article_author(&mut *tx, &row).await?;
    }

    for row in &recommended_rows {
        db::recommended::insert_recommended(&mut *tx, row).await?;
    }

    tx.commit().await?;

    info!("Submission received: article {} \"{}\"", article.guid, article.title);

    // Editor assignment is best-effort; its failure never unwinds an
    // already-committed submission
    let editor_id = match editor::auto_assign_editor(pool, event_bus, &article).await {
        Ok(assignment) => assignment.map(|a| a.editor_id),
        Err(e) => {
            error!(
                "Editor auto-assignment failed for article {}: {}",
                article.guid, e
            );
            None
        }
    };

    event_bus.emit_lossy(WorkflowEvent::SubmissionReceived {
        article_id: article.guid,
        title: article.title.clone(),
        author_id: author.guid,
        timestamp: now,
    });

    Ok(SubmissionReceipt {
        article_id: article.guid,
        submission_id: submission.guid,
        editor_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> SubmissionRequest {
        SubmissionRequest {
            title: "Keyword overlap in peer review".to_string(),
            abstract_text: "We study reviewer matching.".to_string(),
            keywords: vec!["peer review".to_string()],
            category: "bibliometrics".to_string(),
            author_id: Uuid::new_v4(),
            co_author_ids: vec![],
            authors: vec![AuthorEntry {
                name: "A. Author".to_string(),
                email: "a@example.edu".to_string(),
                institution: "Example University".to_string(),
                country: None,
                is_corresponding: true,
            }],
            recommended_reviewers: vec![],
            conflict_user_ids: vec![],
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate(&valid_request()).is_ok());
    }

    #[test]
    fn test_empty_title_rejected() {
        let mut request = valid_request();
        request.title = "   ".to_string();
        assert!(matches!(validate(&request), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_short_title_rejected() {
        // Length checks hold in the shared path, not just a UI layer
        let mut request = valid_request();
        request.title = "Title".to_string();
        assert!(matches!(validate(&request), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_no_authors_rejected() {
        let mut request = valid_request();
        request.authors.clear();
        assert!(matches!(validate(&request), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_zero_corresponding_authors_rejected() {
        let mut request = valid_request();
        request.authors[0].is_corresponding = false;
        assert!(matches!(validate(&request), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_two_corresponding_authors_rejected() {
        let mut request = valid_request();
        let mut second = request.authors[0].clone();
        second.email = "b@example.edu".to_string();
        request.authors.push(second);
        assert!(matches!(validate(&request), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_incomplete_institution_rejected() {
        let mut request = valid_request();
        request.authors[0].institution = "".to_string();
        assert!(matches!(validate(&request), Err(Error::InvalidInput(_))));
    }
}
