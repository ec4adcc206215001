//! Reviewer assignment orchestration
//!
//! Five steps: fetch the author's recommended reviewers, validate them
//! against existing accounts, fetch system candidates, merge and rank by
//! score, then select up to the configured maximum - preferring a couple of
//! well-scoring recommended candidates before filling by rank.
//!
//! Individual assignment failures are collected per candidate and do not
//! abort the rest of the batch.

use chrono::{Duration, Utc};
use jwp_common::db::models::{Article, Review, ReviewInvitation};
use jwp_common::events::{EventBus, WorkflowEvent};
use jwp_common::status::ReviewStatus;
use jwp_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db;
use crate::services::scoring;

/// Where a ranked candidate came from
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Author-recommended, matched to an existing account
    RecommendedExisting,
    /// Author-recommended, no account in the system
    RecommendedUnknown,
    /// Found by the system candidate search
    System,
}

/// A scored candidate in the merged ranking
#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub name: String,
    pub email: String,
    pub score: f64,
    pub source: CandidateSource,
    /// Existing account, when there is one
    pub user_id: Option<Uuid>,
    /// Row in recommended_reviewers, for recommended candidates
    pub recommended_id: Option<Uuid>,
}

/// One successful assignment
#[derive(Debug, Clone, Serialize)]
pub struct SelectedReviewer {
    pub name: String,
    pub email: String,
    pub score: f64,
    pub source: CandidateSource,
    pub user_id: Option<Uuid>,
    pub review_id: Option<Uuid>,
}

/// Orchestrator outcome
///
/// `success` is true when at least one assignment or contact succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentReport {
    pub article_id: Uuid,
    pub selected: Vec<SelectedReviewer>,
    pub errors: Vec<String>,
    pub success: bool,
}

/// Assign reviewers to an article
///
/// `limit` overrides the configured maximum when given.
pub async fn assign_reviewers(
    pool: &SqlitePool,
    event_bus: &EventBus,
    article_id: Uuid,
    limit: Option<usize>,
) -> Result<AssignmentReport> {
    let article = db::articles::load_article(pool, article_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Article {} not found", article_id)))?;

    let max_reviewers = match limit {
        Some(n) if n > 0 => n,
        _ => db::settings::max_reviewers_per_article(pool).await?,
    };
    let max_recommended = db::settings::max_recommended_selections(pool).await?;
    let score_floor = db::settings::recommended_score_floor(pool).await?;
    let due_days = db::settings::review_due_days(pool).await?;

    let ranked = rank_candidates(pool, &article).await?;
    let picks = select_candidates(&ranked, max_reviewers, max_recommended, score_floor);

    let mut selected = Vec::new();
    let mut errors = Vec::new();

    for candidate in picks {
        let outcome = match candidate.user_id {
            Some(user_id) => {
                invite_existing_reviewer(pool, event_bus, &article, candidate, user_id, due_days)
                    .await
            }
            None => contact_unknown_reviewer(pool, event_bus, &article, candidate).await,
        };
        match outcome {
            Ok(pick) => selected.push(pick),
            Err(e) => {
                warn!(
                    "Assignment of '{}' to article {} failed: {}",
                    candidate.name, article_id, e
                );
                errors.push(format!("{}: {}", candidate.name, e));
            }
        }
    }

    let success = !selected.is_empty();
    info!(
        "Reviewer assignment for article {}: {} selected, {} failed",
        article_id,
        selected.len(),
        errors.len()
    );

    Ok(AssignmentReport {
        article_id,
        selected,
        errors,
        success,
    })
}

/// Build the merged, score-ranked candidate list for an article
pub async fn rank_candidates(pool: &SqlitePool, article: &Article) -> Result<Vec<RankedCandidate>> {
    let now = Utc::now();
    let article_keywords = article.keyword_list();
    let excluded = excluded_user_ids(pool, article).await?;

    let mut ranked: Vec<RankedCandidate> = Vec::new();
    let mut seen_users: HashSet<Uuid> = HashSet::new();

    // Steps 1-2: recommended reviewers, validated against existing users
    let recommended = db::recommended::list_for_article(pool, article.guid).await?;
    for rec in &recommended {
        match rec.matched_user_id {
            Some(user_id) => {
                if excluded.contains(&user_id) || !seen_users.insert(user_id) {
                    continue;
                }
                let Some(profile) = db::profiles::load_reviewer_profile(pool, user_id).await?
                else {
                    // Account exists but no reviewer profile; treat like an
                    // unknown candidate on self-reported text
                    ranked.push(RankedCandidate {
                        name: rec.name.clone(),
                        email: rec.email.clone(),
                        score: scoring::boost_recommended(scoring::heuristic_score(
                            &article_keywords,
                            rec.expertise.as_deref(),
                            rec.affiliation.as_deref(),
                        )),
                        source: CandidateSource::RecommendedUnknown,
                        user_id: None,
                        recommended_id: Some(rec.guid),
                    });
                    continue;
                };
                let score = scoring::score_profile(&article_keywords, &profile, now);
                ranked.push(RankedCandidate {
                    name: rec.name.clone(),
                    email: rec.email.clone(),
                    score: scoring::boost_recommended(score.total),
                    source: CandidateSource::RecommendedExisting,
                    user_id: Some(user_id),
                    recommended_id: Some(rec.guid),
                });
            }
            None => {
                ranked.push(RankedCandidate {
                    name: rec.name.clone(),
                    email: rec.email.clone(),
                    score: scoring::boost_recommended(scoring::heuristic_score(
                        &article_keywords,
                        rec.expertise.as_deref(),
                        rec.affiliation.as_deref(),
                    )),
                    source: CandidateSource::RecommendedUnknown,
                    user_id: None,
                    recommended_id: Some(rec.guid),
                });
            }
        }
    }

    // Step 3: system candidates, conflicts excluded
    let candidates = db::profiles::list_available_reviewers(pool).await?;
    for candidate in &candidates {
        if excluded.contains(&candidate.user_id) || !seen_users.insert(candidate.user_id) {
            continue;
        }
        let score = scoring::score_profile(&article_keywords, &candidate.profile(), now);
        ranked.push(RankedCandidate {
            name: candidate.name.clone(),
            email: candidate.email.clone(),
            score: score.total,
            source: CandidateSource::System,
            user_id: Some(candidate.user_id),
            recommended_id: None,
        });
    }

    // Step 4: rank by score descending, guid/email tie-break for
    // deterministic ordering
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.email.cmp(&b.email))
    });

    Ok(ranked)
}

/// Users never offered for an article: the author, co-authors, declared
/// conflicts, and reviewers already holding a review
async fn excluded_user_ids(pool: &SqlitePool, article: &Article) -> Result<HashSet<Uuid>> {
    let mut excluded: HashSet<Uuid> = HashSet::new();
    excluded.insert(article.author_id);
    excluded.extend(article.co_author_list());
    excluded.extend(article.conflict_list());
    excluded.extend(db::reviews::reviewer_ids_for_article(pool, article.guid).await?);
    Ok(excluded)
}

/// Step 5: selection policy
///
/// Up to `max_recommended` recommended candidates scoring at or above the
/// floor take slots first, then remaining slots fill by rank.
fn select_candidates<'a>(
    ranked: &'a [RankedCandidate],
    max_reviewers: usize,
    max_recommended: usize,
    score_floor: f64,
) -> Vec<&'a RankedCandidate> {
    let mut chosen: Vec<usize> = Vec::new();

    for (index, candidate) in ranked.iter().enumerate() {
        if chosen.len() >= max_recommended.min(max_reviewers) {
            break;
        }
        if candidate.source != CandidateSource::System && candidate.score >= score_floor {
            chosen.push(index);
        }
    }

    for index in 0..ranked.len() {
        if chosen.len() >= max_reviewers {
            break;
        }
        if !chosen.contains(&index) {
            chosen.push(index);
        }
    }

    chosen.into_iter().map(|index| &ranked[index]).collect()
}

async fn invite_existing_reviewer(
    pool: &SqlitePool,
    event_bus: &EventBus,
    article: &Article,
    candidate: &RankedCandidate,
    user_id: Uuid,
    due_days: i64,
) -> Result<SelectedReviewer> {
    let now = Utc::now();
    let review = Review {
        guid: Uuid::new_v4(),
        article_id: article.guid,
        reviewer_id: user_id,
        status: ReviewStatus::Pending.as_str().to_string(),
        recommendation: None,
        comments: None,
        rating: None,
        assigned_at: now,
        due_at: now + Duration::days(due_days),
        completed_at: None,
    };
    let invitation = ReviewInvitation {
        guid: Uuid::new_v4(),
        review_id: review.guid,
        article_id: article.guid,
        reviewer_id: user_id,
        status: "sent".to_string(),
        sent_at: now,
    };

    // Review + invitation + workload move together; a failure here rolls
    // back this candidate only
    let mut tx = pool.begin().await?;
    db::reviews::insert_review(&mut *tx, &review).await?;
    db::assignments::insert_invitation(&mut *tx, &invitation).await?;
    db::profiles::increment_reviewer_load(&mut *tx, user_id).await?;
    if let Some(rec_id) = candidate.recommended_id {
        db::recommended::mark_status(&mut *tx, rec_id, "invited").await?;
    }
    tx.commit().await?;

    event_bus.emit_lossy(WorkflowEvent::ReviewInvited {
        article_id: article.guid,
        review_id: review.guid,
        reviewer_id: user_id,
        due_at: review.due_at,
        timestamp: now,
    });

    Ok(SelectedReviewer {
        name: candidate.name.clone(),
        email: candidate.email.clone(),
        score: candidate.score,
        source: candidate.source.clone(),
        user_id: Some(user_id),
        review_id: Some(review.guid),
    })
}

/// No account is created for an unknown recommendation; the row is marked
/// contacted and the dispatcher emails the given address
async fn contact_unknown_reviewer(
    pool: &SqlitePool,
    event_bus: &EventBus,
    article: &Article,
    candidate: &RankedCandidate,
) -> Result<SelectedReviewer> {
    let rec_id = candidate.recommended_id.ok_or_else(|| {
        Error::Internal("Unknown candidate without a recommended_reviewers row".to_string())
    })?;

    db::recommended::mark_status(pool, rec_id, "contacted").await?;

    event_bus.emit_lossy(WorkflowEvent::RecommendedReviewerContacted {
        article_id: article.guid,
        recommended_id: rec_id,
        email: candidate.email.clone(),
        timestamp: Utc::now(),
    });

    Ok(SelectedReviewer {
        name: candidate.name.clone(),
        email: candidate.email.clone(),
        score: candidate.score,
        source: candidate.source.clone(),
        user_id: None,
        review_id: None,
    })
}
