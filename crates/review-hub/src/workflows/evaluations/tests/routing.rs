use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::evaluations::router::next_handler;
use crate::workflows::evaluations::{review_router, REVIEWER_HEADER};

fn get(uri: &str, email: &str) -> Request<Body> {
    Request::get(uri)
        .header(REVIEWER_HEADER, email)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, email: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(REVIEWER_HEADER, email)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize")))
        .expect("request")
}

#[tokio::test]
async fn submit_route_returns_created_with_id() {
    let router = review_router(Arc::new(build_service(seeded_store())));

    let response = router
        .oneshot(post_json(
            "/api/v1/evaluations",
            REVIEWER,
            json!({
                "case_study_id": "cs1",
                "score": 7,
                "improvement_area": "Depth",
                "feedback": "Add numbers"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert!(payload.get("evaluation_id").and_then(|id| id.as_str()).is_some());
}

#[tokio::test]
async fn validation_failures_name_the_field() {
    let router = review_router(Arc::new(build_service(seeded_store())));

    let response = router
        .oneshot(post_json(
            "/api/v1/evaluations",
            REVIEWER,
            json!({
                "case_study_id": "cs1",
                "score": 11,
                "improvement_area": "Depth",
                "feedback": "Add numbers"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "score");
}

#[tokio::test]
async fn unknown_and_malformed_reviewers_are_rejected() {
    let router = review_router(Arc::new(build_service(seeded_store())));

    let response = router
        .clone()
        .oneshot(get("/api/v1/summary/team", "stranger@x.com"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router
        .oneshot(get("/api/v1/summary/team", "not-an-email"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn next_handler_reports_nothing_left() {
    let store = seeded_store();
    for case_study in ["cs1", "cs3"] {
        store_evaluation(&store, &scored(case_study, REVIEWER, 5));
    }
    let service = Arc::new(build_service(store));

    let response = next_handler(State(service), {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(REVIEWER_HEADER, REVIEWER.parse().expect("header value"));
        headers
    })
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload, json!({ "status": "nothing_left" }));
}

#[tokio::test]
async fn next_route_renders_content() {
    let router = review_router(Arc::new(build_service(seeded_store())));
    let response = router
        .oneshot(get("/api/v1/case-studies/next", REVIEWER))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert!(payload["company"].as_str().is_some());
    assert!(payload["content"].as_str().is_some_and(|c| c.ends_with("body")));
}

#[tokio::test]
async fn storage_outage_maps_to_service_unavailable() {
    let router = review_router(Arc::new(build_service(Arc::new(UnavailableStore))));
    let response = router
        .oneshot(get("/api/v1/dashboard", REVIEWER))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn delete_route_enforces_ownership() {
    let store = seeded_store();
    let owned = scored("cs1", REVIEWER, 5);
    store_evaluation(&store, &owned);
    let router = review_router(Arc::new(build_service(store.clone())));
    let uri = format!("/api/v1/evaluations/{}", owned.id);

    let forbidden = router
        .clone()
        .oneshot(
            Request::delete(uri.as_str())
                .header(REVIEWER_HEADER, OTHER_REVIEWER)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let deleted = router
        .clone()
        .oneshot(
            Request::delete(uri.as_str())
                .header(REVIEWER_HEADER, REVIEWER)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    assert!(store.is_empty("evaluations"));

    let missing = router
        .oneshot(
            Request::delete(uri.as_str())
                .header(REVIEWER_HEADER, REVIEWER)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn company_route_filters_by_prefix() {
    let router = review_router(Arc::new(build_service(seeded_store())));
    let response = router
        .oneshot(get(
            "/api/v1/case-studies?company=https%3A%2F%2Fglobex.io",
            REVIEWER,
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let ids: Vec<&str> = payload
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|item| item["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["cs3"]);
}

#[tokio::test]
async fn reviewer_summary_route_returns_own_statistics() {
    let store = seeded_store();
    store_evaluation(&store, &scored("cs1", REVIEWER, 8));
    store_evaluation(&store, &scored("cs3", OTHER_REVIEWER, 2));
    let router = review_router(Arc::new(build_service(store)));

    let response = router
        .oneshot(get("/api/v1/summary/me", REVIEWER))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["statistics"]["count"], 1);
    assert_eq!(payload["statistics"]["average"], 8.0);
}
