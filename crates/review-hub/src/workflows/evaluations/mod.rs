//! Reviewer access, case study assignment, evaluation writes and the summaries built from them.

pub mod access;
pub mod assignment;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod summary;
pub mod writer;

#[cfg(test)]
mod tests;

pub use access::{AccessError, AccessPolicy, Reviewer};
pub use assignment::{select_next, AssignmentSelector};
pub use domain::{Evaluation, EvaluationDraft, EvaluationId, ImprovementArea, IngestError};
pub use repository::ReviewRepository;
pub use router::{error_response, review_router, REVIEWER_HEADER};
pub use service::{ReviewService, ReviewServiceError, DEFAULT_SUMMARY_LIMIT};
pub use summary::{
    join, CaseStudySnapshot, FeedbackEntry, ReviewedEvaluation, ReviewerSummary, TeamSummary,
};
pub use writer::{prepare, ValidationError};
