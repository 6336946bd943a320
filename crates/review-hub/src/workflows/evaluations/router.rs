use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::access::{AccessError, Reviewer};
use super::domain::{EvaluationDraft, EvaluationId};
use super::service::{ReviewService, ReviewServiceError};
use crate::storage::DocumentStore;
use crate::workflows::case_studies::CaseStudy;

/// Header carrying the caller's email address.
pub const REVIEWER_HEADER: &str = "x-reviewer-email";

/// Router builder exposing the reviewer endpoints.
pub fn review_router<S>(service: Arc<ReviewService<S>>) -> Router
where
    S: DocumentStore + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/case-studies/next", get(next_handler::<S>))
        .route("/api/v1/case-studies", get(company_handler::<S>))
        .route("/api/v1/evaluations", post(submit_handler::<S>))
        .route("/api/v1/evaluations/mine", get(mine_handler::<S>))
        .route(
            "/api/v1/evaluations/:evaluation_id",
            delete(delete_handler::<S>),
        )
        .route("/api/v1/summary/team", get(team_summary_handler::<S>))
        .route("/api/v1/summary/me", get(reviewer_summary_handler::<S>))
        .route("/api/v1/dashboard", get(dashboard_handler::<S>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompanyQuery {
    company: String,
}

fn reviewer<S>(service: &ReviewService<S>, headers: &HeaderMap) -> Result<Reviewer, Response>
where
    S: DocumentStore + ?Sized + 'static,
{
    let email = headers
        .get(REVIEWER_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    service.authorize(email).map_err(error_response)
}

fn case_study_payload(case_study: &CaseStudy) -> serde_json::Value {
    json!({
        "id": case_study.id,
        "source_url": case_study.source_url,
        "company": case_study.company(),
        "content": case_study.rendered_content(),
        "classification": case_study.classification,
    })
}

pub(crate) async fn next_handler<S>(
    State(service): State<Arc<ReviewService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + ?Sized + 'static,
{
    let reviewer = match reviewer(&service, &headers) {
        Ok(reviewer) => reviewer,
        Err(response) => return response,
    };
    match service.next_case_study(&reviewer) {
        Ok(Some(case_study)) => {
            (StatusCode::OK, axum::Json(case_study_payload(&case_study))).into_response()
        }
        Ok(None) => {
            let payload = json!({ "status": "nothing_left" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn company_handler<S>(
    State(service): State<Arc<ReviewService<S>>>,
    headers: HeaderMap,
    Query(query): Query<CompanyQuery>,
) -> Response
where
    S: DocumentStore + ?Sized + 'static,
{
    if let Err(response) = reviewer(&service, &headers) {
        return response;
    }
    match service.case_studies_for_company(&query.company) {
        Ok(case_studies) => {
            let payload: Vec<_> = case_studies.iter().map(case_study_payload).collect();
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<ReviewService<S>>>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<EvaluationDraft>,
) -> Response
where
    S: DocumentStore + ?Sized + 'static,
{
    let reviewer = match reviewer(&service, &headers) {
        Ok(reviewer) => reviewer,
        Err(response) => return response,
    };
    match service.submit_evaluation(&reviewer, draft) {
        Ok(id) => {
            let payload = json!({ "evaluation_id": id });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn mine_handler<S>(
    State(service): State<Arc<ReviewService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + ?Sized + 'static,
{
    let reviewer = match reviewer(&service, &headers) {
        Ok(reviewer) => reviewer,
        Err(response) => return response,
    };
    match service.evaluations_for(&reviewer) {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<ReviewService<S>>>,
    headers: HeaderMap,
    Path(evaluation_id): Path<String>,
) -> Response
where
    S: DocumentStore + ?Sized + 'static,
{
    let reviewer = match reviewer(&service, &headers) {
        Ok(reviewer) => reviewer,
        Err(response) => return response,
    };
    match service.delete_evaluation(&reviewer, &EvaluationId(evaluation_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn team_summary_handler<S>(
    State(service): State<Arc<ReviewService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + ?Sized + 'static,
{
    if let Err(response) = reviewer(&service, &headers) {
        return response;
    }
    match service.team_summary() {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn reviewer_summary_handler<S>(
    State(service): State<Arc<ReviewService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + ?Sized + 'static,
{
    let reviewer = match reviewer(&service, &headers) {
        Ok(reviewer) => reviewer,
        Err(response) => return response,
    };
    match service.reviewer_summary(&reviewer) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn dashboard_handler<S>(
    State(service): State<Arc<ReviewService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + ?Sized + 'static,
{
    if let Err(response) = reviewer(&service, &headers) {
        return response;
    }
    match service.case_study_statistics() {
        Ok(statistics) => (StatusCode::OK, axum::Json(statistics)).into_response(),
        Err(other) => error_response(other),
    }
}

/// Maps a service failure onto a JSON error response.
pub fn error_response(error: ReviewServiceError) -> Response {
    let (status, payload) = match &error {
        ReviewServiceError::Validation(err) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "error": err.to_string(), "field": err.field() }),
        ),
        ReviewServiceError::Access(AccessError::InvalidEmail(_)) => {
            (StatusCode::BAD_REQUEST, json!({ "error": error.to_string() }))
        }
        ReviewServiceError::Access(AccessError::NotAuthorized(_))
        | ReviewServiceError::Forbidden { .. } => {
            (StatusCode::FORBIDDEN, json!({ "error": error.to_string() }))
        }
        ReviewServiceError::NotFound { .. } => {
            (StatusCode::NOT_FOUND, json!({ "error": error.to_string() }))
        }
        ReviewServiceError::Storage(err) => {
            error!(error = %err, "storage failure while serving request");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "error": error.to_string() }),
            )
        }
    };
    (status, axum::Json(payload)).into_response()
}
