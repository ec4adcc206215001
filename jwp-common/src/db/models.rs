//! Database models
//!
//! Row structs mirror the SQLite schema; status columns are stored as TEXT
//! and parsed into the workflow enums at the service boundary.

use crate::status::{ArticleStatus, AssignmentStatus, ReviewRecommendation, ReviewStatus};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use uuid::Uuid;

/// Decode a required TEXT column holding a hyphenated UUID
fn row_uuid(row: &SqliteRow, col: &str) -> sqlx::Result<Uuid> {
    let raw: String = row.try_get(col)?;
    Uuid::parse_str(&raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Decode a nullable TEXT column holding a hyphenated UUID
fn row_uuid_opt(row: &SqliteRow, col: &str) -> sqlx::Result<Option<Uuid>> {
    let raw: Option<String> = row.try_get(col)?;
    raw.map(|s| {
        Uuid::parse_str(&s).map_err(|e| sqlx::Error::ColumnDecode {
            index: col.to_string(),
            source: Box::new(e),
        })
    })
    .transpose()
}

/// Decode a JSON-array TEXT column into a string list
///
/// Malformed or NULL-ish content decodes as empty rather than failing the
/// whole row load.
pub fn decode_string_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Encode a string list into a JSON-array TEXT column
pub fn encode_string_list(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    #[sqlx(try_from = "String")]
    pub guid: Uuid,
    pub name: String,
    pub email: String,
    pub affiliation: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub guid: Uuid,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// JSON array of keyword strings
    pub keywords: String,
    pub category: String,
    pub status: String,
    pub author_id: Uuid,
    /// JSON array of co-author user guids
    pub co_author_ids: String,
    pub editor_id: Option<Uuid>,
    /// JSON array of user guids the author declared conflicts with
    pub conflict_user_ids: String,
}

impl<'r> FromRow<'r, SqliteRow> for Article {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            guid: row_uuid(row, "guid")?,
            title: row.try_get("title")?,
            abstract_text: row.try_get("abstract")?,
            keywords: row.try_get("keywords")?,
            category: row.try_get("category")?,
            status: row.try_get("status")?,
            author_id: row_uuid(row, "author_id")?,
            co_author_ids: row.try_get("co_author_ids")?,
            editor_id: row_uuid_opt(row, "editor_id")?,
            conflict_user_ids: row.try_get("conflict_user_ids")?,
        })
    }
}

impl Article {
    pub fn workflow_status(&self) -> Result<ArticleStatus> {
        self.status.parse()
    }

    pub fn keyword_list(&self) -> Vec<String> {
        decode_string_list(&self.keywords)
    }

    pub fn co_author_list(&self) -> Vec<Uuid> {
        decode_string_list(&self.co_author_ids)
            .iter()
            .filter_map(|s| Uuid::parse_str(s).ok())
            .collect()
    }

    pub fn conflict_list(&self) -> Vec<Uuid> {
        decode_string_list(&self.conflict_user_ids)
            .iter()
            .filter_map(|s| Uuid::parse_str(s).ok())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Submission {
    #[sqlx(try_from = "String")]
    pub guid: Uuid,
    #[sqlx(try_from = "String")]
    pub article_id: Uuid,
    pub submitted_at: DateTime<Utc>,
}

/// Append-only status history row; monotonic with the article's status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: i64,
    pub submission_id: Uuid,
    pub status: String,
    pub actor_id: Option<Uuid>,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for StatusHistoryEntry {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            submission_id: row_uuid(row, "submission_id")?,
            status: row.try_get("status")?,
            actor_id: row_uuid_opt(row, "actor_id")?,
            note: row.try_get("note")?,
            recorded_at: row.try_get("recorded_at")?,
        })
    }
}

/// Per-article author manifest entry, as declared at submission time
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ArticleAuthor {
    #[sqlx(try_from = "String")]
    pub article_id: Uuid,
    pub position: i64,
    pub name: String,
    pub email: String,
    pub institution: String,
    pub country: Option<String>,
    pub is_corresponding: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    #[sqlx(try_from = "String")]
    pub guid: Uuid,
    #[sqlx(try_from = "String")]
    pub article_id: Uuid,
    #[sqlx(try_from = "String")]
    pub reviewer_id: Uuid,
    pub status: String,
    pub recommendation: Option<String>,
    pub comments: Option<String>,
    pub rating: Option<f64>,
    pub assigned_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Review {
    pub fn review_status(&self) -> Result<ReviewStatus> {
        self.status.parse()
    }

    pub fn review_recommendation(&self) -> Option<ReviewRecommendation> {
        self.recommendation.as_deref().and_then(|r| r.parse().ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewerProfile {
    #[sqlx(try_from = "String")]
    pub user_id: Uuid,
    /// JSON array of expertise keywords
    pub keywords: String,
    pub current_load: i64,
    pub max_per_month: i64,
    pub quality_score: f64,
    pub completed_count: i64,
    pub late_count: i64,
    pub last_review_at: Option<DateTime<Utc>>,
}

impl ReviewerProfile {
    pub fn keyword_list(&self) -> Vec<String> {
        decode_string_list(&self.keywords)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EditorProfile {
    #[sqlx(try_from = "String")]
    pub user_id: Uuid,
    /// JSON array of section/category names this editor handles
    pub sections: String,
    pub current_load: i64,
    pub accepting: bool,
}

impl EditorProfile {
    pub fn section_list(&self) -> Vec<String> {
        decode_string_list(&self.sections)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EditorAssignment {
    #[sqlx(try_from = "String")]
    pub guid: Uuid,
    #[sqlx(try_from = "String")]
    pub article_id: Uuid,
    #[sqlx(try_from = "String")]
    pub editor_id: Uuid,
    pub status: String,
    pub assigned_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
}

impl EditorAssignment {
    pub fn assignment_status(&self) -> Result<AssignmentStatus> {
        self.status.parse()
    }
}

/// Author-suggested reviewer candidate; may not exist as a system user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedReviewer {
    pub guid: Uuid,
    pub article_id: Uuid,
    pub name: String,
    pub email: String,
    pub affiliation: Option<String>,
    /// Self-reported expertise, free text
    pub expertise: Option<String>,
    pub matched_user_id: Option<Uuid>,
    pub status: String,
}

impl<'r> FromRow<'r, SqliteRow> for RecommendedReviewer {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            guid: row_uuid(row, "guid")?,
            article_id: row_uuid(row, "article_id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            affiliation: row.try_get("affiliation")?,
            expertise: row.try_get("expertise")?,
            matched_user_id: row_uuid_opt(row, "matched_user_id")?,
            status: row.try_get("status")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewInvitation {
    #[sqlx(try_from = "String")]
    pub guid: Uuid,
    #[sqlx(try_from = "String")]
    pub review_id: Uuid,
    #[sqlx(try_from = "String")]
    pub article_id: Uuid,
    #[sqlx(try_from = "String")]
    pub reviewer_id: Uuid,
    pub status: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub guid: Uuid,
    pub recipient_email: String,
    pub user_id: Option<Uuid>,
    pub kind: String,
    pub subject: String,
    pub body: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, SqliteRow> for Notification {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            guid: row_uuid(row, "guid")?,
            recipient_email: row.try_get("recipient_email")?,
            user_id: row_uuid_opt(row, "user_id")?,
            kind: row.try_get("kind")?,
            subject: row.try_get("subject")?,
            body: row.try_get("body")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            sent_at: row.try_get("sent_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Setting {
    pub key: String,
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_list_round_trip() {
        let values = vec!["peer review".to_string(), "bibliometrics".to_string()];
        let encoded = encode_string_list(&values);
        assert_eq!(decode_string_list(&encoded), values);
    }

    #[test]
    fn test_malformed_list_decodes_empty() {
        assert!(decode_string_list("not json").is_empty());
        assert!(decode_string_list("").is_empty());
    }
}
