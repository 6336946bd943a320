use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::storage::{
    Collections, Document, DocumentStore, FieldFilter, InMemoryDocumentStore, StorageError,
};
use crate::workflows::case_studies::{CaseStudy, CaseStudyId};
use crate::workflows::evaluations::summary::{join, ReviewedEvaluation};
use crate::workflows::evaluations::{
    AccessPolicy, Evaluation, EvaluationDraft, EvaluationId, ImprovementArea, ReviewService,
    Reviewer,
};

pub(super) const REVIEWER: &str = "u@x.com";
pub(super) const OTHER_REVIEWER: &str = "v@x.com";
pub(super) const ADMIN: &str = "lead@x.com";

pub(super) fn timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

pub(super) fn case_study(id: &str, url: Option<&str>) -> CaseStudy {
    CaseStudy {
        id: CaseStudyId::from(id),
        source_url: url.map(str::to_string),
        content: Some(format!("{id} intro - - - - - - - - - {id} outcome")),
        classification: None,
    }
}

pub(super) fn evaluation(
    case_study_id: &str,
    evaluator: &str,
    score: Option<u8>,
    area: Option<ImprovementArea>,
    at: Option<&str>,
) -> Evaluation {
    let case_study = CaseStudyId::from(case_study_id);
    Evaluation {
        id: EvaluationId::derive(&case_study, evaluator),
        case_study_id: case_study,
        case_study_url: None,
        evaluator: evaluator.to_string(),
        score,
        improvement_area: area,
        feedback: Some(format!("{evaluator} on {case_study_id}")),
        timestamp: at.map(timestamp),
    }
}

pub(super) fn scored(case_study_id: &str, evaluator: &str, score: u8) -> Evaluation {
    evaluation(case_study_id, evaluator, Some(score), None, None)
}

pub(super) fn reviewed(evaluations: Vec<Evaluation>) -> Vec<ReviewedEvaluation> {
    join(evaluations, &[])
}

pub(super) fn draft(case_study_id: &str, score: i64, area: &str, feedback: &str) -> EvaluationDraft {
    EvaluationDraft {
        case_study_id: case_study_id.to_string(),
        score,
        improvement_area: area.to_string(),
        other_area: None,
        feedback: feedback.to_string(),
    }
}

pub(super) fn reviewer(email: &str) -> Reviewer {
    Reviewer {
        email: email.to_string(),
        is_admin: false,
    }
}

pub(super) fn admin() -> Reviewer {
    Reviewer {
        email: ADMIN.to_string(),
        is_admin: true,
    }
}

pub(super) fn access_policy() -> AccessPolicy {
    AccessPolicy::new([REVIEWER, OTHER_REVIEWER], [ADMIN])
}

pub(super) fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("fixture must be an object"),
    }
}

pub(super) fn seeded_store() -> Arc<InMemoryDocumentStore> {
    let store = Arc::new(InMemoryDocumentStore::new());
    for (id, url) in [
        ("cs1", "https://acme.com/page"),
        ("cs2", "https://acme.com/other"),
        ("cs3", "https://globex.io/story"),
    ] {
        store
            .put(
                "case_studies",
                id,
                object(json!({ "source_url": url, "case_study_final": format!("{id} body") })),
            )
            .expect("seed case study");
    }
    store
}

pub(super) fn store_evaluation(store: &InMemoryDocumentStore, evaluation: &Evaluation) {
    store
        .put("evaluations", evaluation.id.as_str(), evaluation.to_fields())
        .expect("seed evaluation");
}

pub(super) fn build_service<S>(store: Arc<S>) -> ReviewService<S>
where
    S: DocumentStore + 'static,
{
    ReviewService::new(store, Collections::default(), access_policy()).with_summary_limit(3)
}

/// Every operation fails as if the backend were offline.
pub(super) struct UnavailableStore;

impl DocumentStore for UnavailableStore {
    fn fetch_all(&self, _collection: &str) -> Result<Vec<Document>, StorageError> {
        Err(StorageError::Unavailable("database offline".to_string()))
    }

    fn fetch_where(
        &self,
        _collection: &str,
        _filter: &FieldFilter,
    ) -> Result<Vec<Document>, StorageError> {
        Err(StorageError::Unavailable("database offline".to_string()))
    }

    fn put(
        &self,
        _collection: &str,
        _id: &str,
        _fields: Map<String, Value>,
    ) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _collection: &str, _id: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("database offline".to_string()))
    }
}

/// Reads succeed; writes are refused.
#[derive(Default)]
pub(super) struct FailingWriteStore {
    pub(super) inner: InMemoryDocumentStore,
}

impl DocumentStore for FailingWriteStore {
    fn fetch_all(&self, collection: &str) -> Result<Vec<Document>, StorageError> {
        self.inner.fetch_all(collection)
    }

    fn fetch_where(
        &self,
        collection: &str,
        filter: &FieldFilter,
    ) -> Result<Vec<Document>, StorageError> {
        self.inner.fetch_where(collection, filter)
    }

    fn put(
        &self,
        _collection: &str,
        _id: &str,
        _fields: Map<String, Value>,
    ) -> Result<(), StorageError> {
        Err(StorageError::Rejected("write quota exceeded".to_string()))
    }

    fn delete(&self, _collection: &str, _id: &str) -> Result<(), StorageError> {
        Err(StorageError::Rejected("write quota exceeded".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
