//! Reviewer candidate scoring
//!
//! Weighted multi-factor score over expertise match, workload, historical
//! quality, reliability and recency. Profile-backed candidates use all five
//! factors; author-recommended candidates without an account fall back to a
//! heuristic over their self-reported expertise and affiliation text.
//!
//! Author-recommended candidates get a 1.2x multiplier; the boosted score
//! is clamped to 1.0 so all candidates rank on one scale.

use chrono::{DateTime, Utc};
use jwp_common::db::models::ReviewerProfile;

/// Factor weights; sum to 1.0
pub const WEIGHT_EXPERTISE: f64 = 0.40;
pub const WEIGHT_WORKLOAD: f64 = 0.20;
pub const WEIGHT_QUALITY: f64 = 0.20;
pub const WEIGHT_RELIABILITY: f64 = 0.15;
pub const WEIGHT_RECENCY: f64 = 0.05;

/// Multiplier applied to author-recommended candidates
pub const RECOMMENDED_BOOST: f64 = 1.2;

/// Jaro-Winkler similarity at or above this counts as a keyword hit in the
/// heuristic scorer
const FUZZY_MATCH_THRESHOLD: f64 = 0.92;

/// Score breakdown for a profile-backed candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub total: f64,
    pub expertise: f64,
    pub workload: f64,
    pub quality: f64,
    pub reliability: f64,
    pub recency: f64,
}

/// Score a profile-backed reviewer against an article's keywords
pub fn score_profile(
    article_keywords: &[String],
    profile: &ReviewerProfile,
    now: DateTime<Utc>,
) -> CandidateScore {
    let expertise = expertise_match(article_keywords, &profile.keyword_list());
    let workload = workload_score(profile.current_load, profile.max_per_month);
    let quality = profile.quality_score.clamp(0.0, 1.0);
    let reliability = reliability_score(profile.completed_count, profile.late_count);
    let recency = recency_score(profile.last_review_at, now);

    let total = WEIGHT_EXPERTISE * expertise
        + WEIGHT_WORKLOAD * workload
        + WEIGHT_QUALITY * quality
        + WEIGHT_RELIABILITY * reliability
        + WEIGHT_RECENCY * recency;

    CandidateScore {
        total,
        expertise,
        workload,
        quality,
        reliability,
        recency,
    }
}

/// Bag-of-keywords overlap ratio: |article ∩ reviewer| / |article keywords|
///
/// Keywords are compared case-insensitively after trimming. An article with
/// no keywords matches nothing (0.0). Monotonically non-decreasing in the
/// number of overlapping keywords.
pub fn expertise_match(article_keywords: &[String], reviewer_keywords: &[String]) -> f64 {
    let article: Vec<String> = normalize_keywords(article_keywords);
    if article.is_empty() {
        return 0.0;
    }
    let reviewer: Vec<String> = normalize_keywords(reviewer_keywords);

    let hits = article.iter().filter(|k| reviewer.contains(k)).count();
    hits as f64 / article.len() as f64
}

fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}

/// Spare capacity: 1 - load/max, clamped to 0..1
///
/// A profile with max_per_month 0 never has capacity.
pub fn workload_score(current_load: i64, max_per_month: i64) -> f64 {
    if max_per_month <= 0 {
        return 0.0;
    }
    (1.0 - current_load as f64 / max_per_month as f64).clamp(0.0, 1.0)
}

/// Track record with late reviews penalized at double weight
///
/// (completed - 2*late) / completed, clamped to 0..1. A reviewer with no
/// completed reviews scores a neutral 0.5.
pub fn reliability_score(completed_count: i64, late_count: i64) -> f64 {
    if completed_count <= 0 {
        return 0.5;
    }
    ((completed_count - 2 * late_count) as f64 / completed_count as f64).clamp(0.0, 1.0)
}

/// Rewards reviewers idle 30-180 days
///
/// Inside the window scores 1.0; recently active (or never reviewed)
/// scores the neutral 0.5; long-idle reviewers taper to 0.4.
pub fn recency_score(last_review_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match last_review_at {
        None => 0.5,
        Some(last) => {
            let idle_days = (now - last).num_days();
            if (30..=180).contains(&idle_days) {
                1.0
            } else if idle_days < 30 {
                0.5
            } else {
                0.4
            }
        }
    }
}

/// Heuristic score for a recommended reviewer without a system account
///
/// Fuzzy keyword hits against the self-reported expertise text, scaled to
/// 0..0.8, plus 0.1 when an affiliation was given. There is no workload or
/// track-record signal to draw on, so the ceiling stays below a perfect
/// profile score.
pub fn heuristic_score(
    article_keywords: &[String],
    expertise_text: Option<&str>,
    affiliation: Option<&str>,
) -> f64 {
    let article = normalize_keywords(article_keywords);

    let keyword_component = match (article.is_empty(), expertise_text) {
        (true, _) | (_, None) => 0.0,
        (false, Some(text)) => {
            let lowered = text.to_lowercase();
            let tokens: Vec<String> = lowered
                .split(|c: char| !c.is_alphanumeric())
                .map(|t| t.to_string())
                .filter(|t| !t.is_empty())
                .collect();
            // A keyword hits on an exact phrase match or a close token
            let hits = article
                .iter()
                .filter(|keyword| {
                    lowered.contains(keyword.as_str())
                        || tokens.iter().any(|t| {
                            strsim::jaro_winkler(keyword.as_str(), t) >= FUZZY_MATCH_THRESHOLD
                        })
                })
                .count();
            hits as f64 / article.len() as f64
        }
    };

    let affiliation_bonus = match affiliation {
        Some(a) if !a.trim().is_empty() => 0.1,
        _ => 0.0,
    };

    (keyword_component * 0.8 + affiliation_bonus).min(1.0)
}

/// Apply the recommended-candidate boost, clamped to 1.0
pub fn boost_recommended(score: f64) -> f64 {
    (score * RECOMMENDED_BOOST).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jwp_common::db::models::encode_string_list;
    use uuid::Uuid;

    fn keywords(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn profile(keywords: &[&str], load: i64, max: i64) -> ReviewerProfile {
        ReviewerProfile {
            user_id: Uuid::new_v4(),
            keywords: encode_string_list(
                &keywords.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            ),
            current_load: load,
            max_per_month: max,
            quality_score: 0.5,
            completed_count: 0,
            late_count: 0,
            last_review_at: None,
        }
    }

    #[test]
    fn test_expertise_full_and_partial_overlap() {
        let article = keywords(&["machine learning", "nlp", "parsing"]);
        assert_eq!(
            expertise_match(&article, &keywords(&["machine learning", "nlp", "parsing"])),
            1.0
        );
        let one_third = expertise_match(&article, &keywords(&["nlp"]));
        assert!((one_third - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(expertise_match(&article, &keywords(&["astronomy"])), 0.0);
    }

    #[test]
    fn test_expertise_is_case_insensitive() {
        let article = keywords(&["Machine Learning"]);
        assert_eq!(
            expertise_match(&article, &keywords(&["machine learning"])),
            1.0
        );
    }

    #[test]
    fn test_expertise_empty_article_keywords() {
        assert_eq!(expertise_match(&[], &keywords(&["anything"])), 0.0);
    }

    #[test]
    fn test_expertise_monotone_in_overlap() {
        // Adding one more overlapping keyword never lowers the score,
        // holding the article keyword set fixed.
        let article = keywords(&["a", "b", "c", "d"]);
        let mut previous = -1.0;
        for reviewer in [
            vec![],
            vec!["a"],
            vec!["a", "b"],
            vec!["a", "b", "c"],
            vec!["a", "b", "c", "d"],
        ] {
            let score = expertise_match(&article, &keywords(&reviewer));
            assert!(score >= previous);
            previous = score;
        }
    }

    #[test]
    fn test_workload_score_bounds() {
        assert_eq!(workload_score(0, 3), 1.0);
        assert!((workload_score(1, 3) - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(workload_score(3, 3), 0.0);
        assert_eq!(workload_score(5, 3), 0.0); // over cap clamps, never negative
        assert_eq!(workload_score(0, 0), 0.0);
    }

    #[test]
    fn test_reliability_double_penalty() {
        assert_eq!(reliability_score(0, 0), 0.5);
        assert_eq!(reliability_score(10, 0), 1.0);
        // 10 completed, 2 late: (10 - 4) / 10
        assert!((reliability_score(10, 2) - 0.6).abs() < 1e-9);
        // Half late wipes the score out entirely
        assert_eq!(reliability_score(4, 2), 0.0);
        assert_eq!(reliability_score(2, 3), 0.0);
    }

    #[test]
    fn test_recency_window() {
        let now = Utc::now();
        assert_eq!(recency_score(None, now), 0.5);
        assert_eq!(recency_score(Some(now - Duration::days(10)), now), 0.5);
        assert_eq!(recency_score(Some(now - Duration::days(30)), now), 1.0);
        assert_eq!(recency_score(Some(now - Duration::days(90)), now), 1.0);
        assert_eq!(recency_score(Some(now - Duration::days(180)), now), 1.0);
        assert_eq!(recency_score(Some(now - Duration::days(400)), now), 0.4);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum = WEIGHT_EXPERTISE
            + WEIGHT_WORKLOAD
            + WEIGHT_QUALITY
            + WEIGHT_RELIABILITY
            + WEIGHT_RECENCY;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_profile_perfect_candidate() {
        let article = keywords(&["nlp", "parsing"]);
        let mut p = profile(&["nlp", "parsing"], 0, 3);
        p.quality_score = 1.0;
        p.completed_count = 10;
        p.last_review_at = Some(Utc::now() - Duration::days(60));

        let score = score_profile(&article, &p, Utc::now());
        assert!((score.total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_boost_clamps_to_one() {
        assert!((boost_recommended(0.5) - 0.6).abs() < 1e-9);
        assert_eq!(boost_recommended(0.9), 1.0);
        assert_eq!(boost_recommended(1.0), 1.0);
    }

    #[test]
    fn test_heuristic_score_components() {
        let article = keywords(&["bibliometrics", "citation"]);

        // No expertise text, no affiliation
        assert_eq!(heuristic_score(&article, None, None), 0.0);

        // Affiliation alone
        assert!((heuristic_score(&article, None, Some("MIT")) - 0.1).abs() < 1e-9);

        // Full keyword coverage plus affiliation
        let full = heuristic_score(
            &article,
            Some("Citation networks and bibliometrics methods"),
            Some("MIT"),
        );
        assert!((full - 0.9).abs() < 1e-9);

        // Fuzzy hit on a near-identical token ("bibliometric" vs "bibliometrics")
        let fuzzy = heuristic_score(&article, Some("bibliometric analysis"), None);
        assert!(fuzzy > 0.0);
    }
}
