use jwp_common::db::models::{encode_string_list, ReviewerProfile, User};
use jwp_common::events::EventBus;
use jwp_wf::db;
use jwp_wf::services::{assignment, submission, status as statussvc};
use jwp_common::status::ArticleStatus;
use jwp_wf::services::submission::{AuthorEntry, SubmissionRequest};
use uuid::Uuid;

async fn seed_reviewer(pool: &sqlx::SqlitePool, email: &str, kws: &[&str]) -> Uuid {
    let user = User { guid: Uuid::new_v4(), name: email.into(), email: email.into(), affiliation: None, role: "reviewer".into() };
    db::users::insert_user(pool, &user).await.unwrap();
    let p = ReviewerProfile { user_id: user.guid, keywords: encode_string_list(&kws.iter().map(|s| s.to_string()).collect::<Vec<_>>()), current_load: 0, max_per_month: 3, quality_score: 0.5, completed_count: 0, late_count: 0, last_review_at: None };
    db::profiles::insert_reviewer_profile(pool, &p).await.unwrap();
    user.guid
}

#[tokio::test]
async fn scratch_assign() {
    let pool = jwp_common::db::init_test_database().await.unwrap();
    let bus = EventBus::new(64);
    let author = User { guid: Uuid::new_v4(), name: "A".into(), email: "a@example.edu".into(), affiliation: None, role: "author".into() };
    db::users::insert_user(&pool, &author).await.unwrap();
    seed_reviewer(&pool, "r1@example.edu", &["machine learning"]).await;
    seed_reviewer(&pool, "r2@example.edu", &["peer review"]).await;

    let req = SubmissionRequest {
        title: "Reviewer matching under workload constraints".into(),
        abstract_text: "We evaluate multi-factor reviewer scoring.".into(),
        keywords: vec!["machine learning".into(), "peer review".into()],
        category: "computer science".into(),
        author_id: author.guid,
        co_author_ids: vec![],
        authors: vec![AuthorEntry { name: "A".into(), email: "a@example.edu".into(), institution: "U".into(), country: None, is_corresponding: true }],
        recommended_reviewers: vec![],
        conflict_user_ids: vec![],
    };
    let receipt = submission::submit(&pool, &bus, req).await.unwrap();
    let aid = receipt.article_id;
    for s in [ArticleStatus::TechnicalCheck, ArticleStatus::UnderReview] {
        statussvc::update_submission_status(&pool, &bus, aid, s, None, None).await.unwrap();
    }
    match assignment::assign_reviewers(&pool, &bus, aid, None).await {
        Ok(r) => println!("OK: selected={} errors={:?}", r.selected.len(), r.errors),
        Err(e) => panic!("ASSIGN ERROR: {:?}", e),
    }
}
