use std::sync::Arc;

use tracing::{error, warn};

use super::domain::{fields, Evaluation, EvaluationId};
use crate::storage::{Collections, Document, DocumentStore, FieldFilter, StorageError};
use crate::workflows::case_studies::domain::fields as case_study_fields;
use crate::workflows::case_studies::{CaseStudy, CaseStudyId};

/// Typed access to the two collections. Every document passes through ingestion exactly once
/// here; evaluations that fail ingestion are logged and skipped.
pub struct ReviewRepository<S: ?Sized> {
    store: Arc<S>,
    collections: Collections,
}

impl<S: ?Sized> Clone for ReviewRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            collections: self.collections.clone(),
        }
    }
}

impl<S> ReviewRepository<S>
where
    S: DocumentStore + ?Sized,
{
    pub fn new(store: Arc<S>, collections: Collections) -> Self {
        Self { store, collections }
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    pub fn case_studies(&self) -> Result<Vec<CaseStudy>, StorageError> {
        let documents = self.read(&self.collections.case_studies, None)?;
        Ok(documents.iter().map(CaseStudy::from_document).collect())
    }

    pub fn case_study(&self, id: &CaseStudyId) -> Result<Option<CaseStudy>, StorageError> {
        let filter = FieldFilter::id_eq(id.as_str());
        let documents = self.read(&self.collections.case_studies, Some(&filter))?;
        Ok(documents.first().map(CaseStudy::from_document))
    }

    /// Case studies whose source URL starts with `prefix`, ordered by id.
    pub fn case_studies_with_url_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<CaseStudy>, StorageError> {
        let [lower, upper] = FieldFilter::prefix(case_study_fields::SOURCE_URL, prefix);
        let documents = self.read(&self.collections.case_studies, Some(&lower))?;
        let mut case_studies: Vec<CaseStudy> = documents
            .iter()
            .filter(|document| upper.matches(document))
            .map(CaseStudy::from_document)
            .collect();
        case_studies.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(case_studies)
    }

    pub fn evaluations(&self) -> Result<Vec<Evaluation>, StorageError> {
        let documents = self.read(&self.collections.evaluations, None)?;
        Ok(self.ingest(&documents))
    }

    pub fn evaluations_by(&self, evaluator: &str) -> Result<Vec<Evaluation>, StorageError> {
        let filter = FieldFilter::eq(fields::EVALUATOR, evaluator);
        let documents = self.read(&self.collections.evaluations, Some(&filter))?;
        Ok(self.ingest(&documents))
    }

    pub fn evaluation(&self, id: &EvaluationId) -> Result<Option<Evaluation>, StorageError> {
        let filter = FieldFilter::id_eq(id.as_str());
        let documents = self.read(&self.collections.evaluations, Some(&filter))?;
        Ok(self.ingest(&documents).into_iter().next())
    }

    /// Create-or-overwrite keyed by the evaluation id.
    pub fn upsert_evaluation(&self, evaluation: &Evaluation) -> Result<(), StorageError> {
        self.store
            .put(
                &self.collections.evaluations,
                evaluation.id.as_str(),
                evaluation.to_fields(),
            )
            .map_err(|err| {
                error!(evaluation = %evaluation.id, error = %err, "failed to write evaluation");
                err
            })
    }

    pub fn delete_evaluation(&self, id: &EvaluationId) -> Result<(), StorageError> {
        self.store
            .delete(&self.collections.evaluations, id.as_str())
            .map_err(|err| {
                error!(evaluation = %id, error = %err, "failed to delete evaluation");
                err
            })
    }

    fn read(
        &self,
        collection: &str,
        filter: Option<&FieldFilter>,
    ) -> Result<Vec<Document>, StorageError> {
        let result = match filter {
            Some(filter) => self.store.fetch_where(collection, filter),
            None => self.store.fetch_all(collection),
        };
        result.map_err(|err| {
            error!(collection, error = %err, "document store read failed");
            err
        })
    }

    fn ingest(&self, documents: &[Document]) -> Vec<Evaluation> {
        documents
            .iter()
            .filter_map(|document| match Evaluation::from_document(document) {
                Ok(evaluation) => Some(evaluation),
                Err(err) => {
                    warn!(
                        collection = %self.collections.evaluations,
                        document = %document.id,
                        error = %err,
                        "skipping malformed evaluation"
                    );
                    None
                }
            })
            .collect()
    }
}
