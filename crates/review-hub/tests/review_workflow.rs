//! End-to-end review scenarios through the public service facade and HTTP router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use review_hub::storage::{seed, Collections, InMemoryDocumentStore};
use review_hub::workflows::evaluations::{
    review_router, AccessPolicy, ReviewService, Reviewer, REVIEWER_HEADER,
};

const SEED: &str = r#"{
    "case_studies": [
        { "id": "cs1", "source_url": "https://acme.com/page", "case_study_final": "Acme intro - - - - - - - - - Acme results",
          "classification": { "industry": { "category": "Manufacturing", "subcategory": "Automotive" } } },
        { "id": "cs2", "source_url": "https://acme.com/other", "case_study_final": "Acme again" },
        { "id": "cs3", "source_url": "https://globex.io/story", "case_study_final": "Globex story" }
    ],
    "evaluations": [
        { "id": "legacy-1", "case_study_id": "cs3", "evaluator_email": "b@x.com", "evaluation_score": 10,
          "improvement_area": "Accuracy (Factual correctness and data reliability)",
          "improvement_feedback": "Verify figures", "timestamp": "2025-01-05T12:00:00Z" },
        { "id": "legacy-2", "case_study_id": "cs2", "evaluator_email": "a@x.com", "evaluation_score": 2,
          "improvement_area": "Depth", "improvement_feedback": "Thin", "timestamp": "2025-01-06T12:00:00Z" },
        { "id": "legacy-3", "case_study_id": "cs3", "evaluator_email": "a@x.com", "evaluation_score": 4,
          "improvement_area": "Charts please", "improvement_feedback": "Visuals", "timestamp": "not a date" },
        { "id": "legacy-4", "evaluator_email": "a@x.com", "evaluation_score": 9 }
    ]
}"#;

fn service() -> (Arc<InMemoryDocumentStore>, ReviewService<InMemoryDocumentStore>) {
    let store = Arc::new(InMemoryDocumentStore::new());
    let counts = seed::load_from_str(store.as_ref(), SEED, &Collections::default())
        .expect("seed loads");
    assert_eq!(counts.case_studies, 3);
    assert_eq!(counts.evaluations, 4);

    let policy = AccessPolicy::new(["u@x.com", "a@x.com", "b@x.com"], ["lead@x.com"]);
    let service = ReviewService::new(store.clone(), Collections::default(), policy)
        .with_company_urls(vec!["https://initech.net/about".to_string()]);
    (store, service)
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json payload")
}

#[test]
fn team_summary_weights_evaluators_equally() {
    let (_, service) = service();
    let summary = service.team_summary().expect("summary");

    assert_eq!(summary.total_evaluations, 3, "record without case study id is skipped");
    assert_eq!(summary.evaluator_count, 2);
    assert_eq!(summary.average_score, 6.5);

    let areas: Vec<&str> = summary
        .improvement_areas
        .iter()
        .map(|area| area.area.as_str())
        .collect();
    assert_eq!(areas, vec!["Accuracy", "Depth", "Other"]);
    assert_eq!(summary.top[0].score, Some(10));
    assert_eq!(summary.bottom[0].score, Some(2));
}

#[test]
fn shared_company_scenario_leaves_only_other_companies() {
    let (_, service) = service();
    let reviewer = Reviewer {
        email: "a@x.com".to_string(),
        is_admin: false,
    };

    // a@x.com already covered acme (through cs2) and globex.
    assert!(service.next_case_study(&reviewer).expect("lookup").is_none());

    let newcomer = service.authorize("U@x.com").expect("authorized");
    let next = service
        .next_case_study(&newcomer)
        .expect("lookup")
        .expect("something to review");
    assert!(["cs1", "cs2", "cs3"].contains(&next.id.as_str()));
}

#[test]
fn dashboard_statistics_include_configured_companies() {
    let (_, service) = service();
    let statistics = service.case_study_statistics().expect("statistics");

    assert_eq!(statistics.total_case_studies, 3);
    assert_eq!(statistics.evaluated_case_studies, 2);
    assert_eq!(statistics.pending_evaluations, 1);
    assert_eq!(statistics.company_distribution.get("https://acme.com"), Some(&2));
    assert_eq!(statistics.company_distribution.get("https://initech.net"), Some(&0));
    assert_eq!(
        statistics.industry_distribution.get("Automotive (Manufacturing)"),
        Some(&1)
    );
}

#[tokio::test]
async fn reviewer_flow_over_http() {
    let (store, service) = service();
    let router = review_router(Arc::new(service));

    let response = router
        .clone()
        .oneshot(
            Request::get("/api/v1/case-studies/next")
                .header(REVIEWER_HEADER, "u@x.com")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let assigned = json_body(response).await;
    let case_study_id = assigned["id"].as_str().expect("id").to_string();

    for score in [4, 8] {
        let response = router
            .clone()
            .oneshot(
                Request::post("/api/v1/evaluations")
                    .header(REVIEWER_HEADER, "u@x.com")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&json!({
                            "case_study_id": case_study_id,
                            "score": score,
                            "improvement_area": "Other",
                            "other_area": "Add a timeline",
                            "feedback": "Needs chronology"
                        }))
                        .expect("serialize"),
                    ))
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    assert_eq!(store.len("evaluations"), 5);

    let response = router
        .oneshot(
            Request::get("/api/v1/evaluations/mine")
                .header(REVIEWER_HEADER, "u@x.com")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let mine = json_body(response).await;
    let entries = mine.as_array().expect("array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["score"], 8);
    assert_eq!(entries[0]["improvement_area"], "Other");
    assert_eq!(entries[0]["other_area"], "Add a timeline");
}
