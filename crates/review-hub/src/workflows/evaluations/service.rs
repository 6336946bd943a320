use std::cmp::Reverse;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::access::{AccessError, AccessPolicy, Reviewer};
use super::assignment::AssignmentSelector;
use super::domain::{EvaluationDraft, EvaluationId};
use super::repository::ReviewRepository;
use super::summary::{join, FeedbackEntry, ReviewerSummary, TeamSummary};
use super::writer::{prepare, ValidationError};
use crate::storage::{Collections, DocumentStore, StorageError};
use crate::workflows::case_studies::{CaseStudy, CaseStudyId, CaseStudyStatistics};

pub const DEFAULT_SUMMARY_LIMIT: usize = 10;

/// Service composing the access policy, typed repository, assignment and aggregation.
pub struct ReviewService<S: ?Sized> {
    repository: ReviewRepository<S>,
    access: AccessPolicy,
    company_urls: Vec<String>,
    summary_limit: usize,
}

impl<S> ReviewService<S>
where
    S: DocumentStore + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, collections: Collections, access: AccessPolicy) -> Self {
        Self {
            repository: ReviewRepository::new(store, collections),
            access,
            company_urls: Vec::new(),
            summary_limit: DEFAULT_SUMMARY_LIMIT,
        }
    }

    /// Companies listed on the dashboard even before any case study mentions them.
    pub fn with_company_urls(mut self, company_urls: Vec<String>) -> Self {
        self.company_urls = company_urls;
        self
    }

    pub fn with_summary_limit(mut self, limit: usize) -> Self {
        self.summary_limit = limit;
        self
    }

    pub fn repository(&self) -> &ReviewRepository<S> {
        &self.repository
    }

    pub fn authorize(&self, email: &str) -> Result<Reviewer, ReviewServiceError> {
        Ok(self.access.authorize(email)?)
    }

    /// A random case study the reviewer has not covered yet, or `None` when nothing is left.
    pub fn next_case_study(
        &self,
        reviewer: &Reviewer,
    ) -> Result<Option<CaseStudy>, ReviewServiceError> {
        let case_studies = self.repository.case_studies()?;
        let evaluations = self.repository.evaluations_by(&reviewer.email)?;

        let selector = AssignmentSelector::for_evaluator(&reviewer.email, &case_studies, &evaluations);
        let candidates = selector.candidates(&case_studies).count();
        let selected = selector.choose(&case_studies, &mut rand::rng()).cloned();

        info!(
            reviewer = %reviewer.email,
            candidates,
            selected = selected.as_ref().map(|cs| cs.id.as_str()),
            "selected next case study"
        );
        Ok(selected)
    }

    /// Validates and upserts. Resubmitting for the same case study overwrites the earlier record.
    pub fn submit_evaluation(
        &self,
        reviewer: &Reviewer,
        draft: EvaluationDraft,
    ) -> Result<EvaluationId, ReviewServiceError> {
        let mut evaluation = prepare(&reviewer.email, &draft, None, Utc::now())?;
        evaluation.case_study_url = self
            .repository
            .case_study(&evaluation.case_study_id)?
            .and_then(|case_study| case_study.source_url);

        self.repository.upsert_evaluation(&evaluation)?;
        info!(
            reviewer = %reviewer.email,
            evaluation = %evaluation.id,
            case_study = evaluation.case_study_id.as_str(),
            "stored evaluation"
        );
        Ok(evaluation.id)
    }

    /// The reviewer's own evaluations, newest first.
    pub fn evaluations_for(
        &self,
        reviewer: &Reviewer,
    ) -> Result<Vec<FeedbackEntry>, ReviewServiceError> {
        let evaluations = self.repository.evaluations_by(&reviewer.email)?;
        let case_studies = self.repository.case_studies()?;

        let mut entries: Vec<FeedbackEntry> = join(evaluations, &case_studies)
            .iter()
            .map(FeedbackEntry::from)
            .collect();
        entries.sort_by_key(|entry| Reverse(entry.timestamp));
        Ok(entries)
    }

    /// Owners may delete their own evaluations; admins may delete any.
    pub fn delete_evaluation(
        &self,
        reviewer: &Reviewer,
        id: &EvaluationId,
    ) -> Result<(), ReviewServiceError> {
        let evaluation = self
            .repository
            .evaluation(id)?
            .ok_or_else(|| ReviewServiceError::NotFound { id: id.clone() })?;

        if !reviewer.is_admin && !evaluation.evaluator.eq_ignore_ascii_case(&reviewer.email) {
            return Err(ReviewServiceError::Forbidden { id: id.clone() });
        }

        self.repository.delete_evaluation(id)?;
        info!(
            reviewer = %reviewer.email,
            evaluation = %id,
            owner = %evaluation.evaluator,
            "deleted evaluation"
        );
        Ok(())
    }

    pub fn team_summary(&self) -> Result<TeamSummary, ReviewServiceError> {
        let evaluations = self.repository.evaluations()?;
        let case_studies = self.repository.case_studies()?;
        let reviewed = join(evaluations, &case_studies);
        Ok(TeamSummary::build(&reviewed, self.summary_limit))
    }

    pub fn reviewer_summary(
        &self,
        reviewer: &Reviewer,
    ) -> Result<ReviewerSummary, ReviewServiceError> {
        let evaluations = self.repository.evaluations_by(&reviewer.email)?;
        let case_studies = self.repository.case_studies()?;
        let reviewed = join(evaluations, &case_studies);
        Ok(ReviewerSummary::build(&reviewer.email, &reviewed))
    }

    pub fn case_study_statistics(&self) -> Result<CaseStudyStatistics, ReviewServiceError> {
        let case_studies = self.repository.case_studies()?;
        let evaluations = self.repository.evaluations()?;
        Ok(CaseStudyStatistics::compute(
            &case_studies,
            &evaluations,
            &self.company_urls,
        ))
    }

    /// Case studies whose source URL starts with `company_url`, ordered by id.
    pub fn case_studies_for_company(
        &self,
        company_url: &str,
    ) -> Result<Vec<CaseStudy>, ReviewServiceError> {
        Ok(self
            .repository
            .case_studies_with_url_prefix(company_url.trim())?)
    }

    pub fn case_study(&self, id: &CaseStudyId) -> Result<Option<CaseStudy>, ReviewServiceError> {
        Ok(self.repository.case_study(id)?)
    }
}

/// Error raised by the review service.
#[derive(Debug, thiserror::Error)]
pub enum ReviewServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("evaluation '{id}' not found")]
    NotFound { id: EvaluationId },
    #[error("evaluation '{id}' belongs to another reviewer")]
    Forbidden { id: EvaluationId },
}
