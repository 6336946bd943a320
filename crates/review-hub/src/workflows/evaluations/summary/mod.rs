//! In-memory aggregation over evaluation record sets.

mod aggregates;
pub mod views;

use std::collections::HashMap;

use serde::Serialize;

use super::domain::Evaluation;
use crate::workflows::case_studies::{CaseStudy, CaseStudyId};

pub use aggregates::{
    average_score, bottom_n, improvement_area_detailed, improvement_area_summary,
    per_user_detail, per_user_statistics, top_n, AreaDetail, AreaSummary, UserDetail,
    UserStatistics,
};
pub use views::{FeedbackEntry, ReviewerSummary, TeamSummary};

pub const MISSING_URL: &str = "No URL provided";
pub const MISSING_CONTENT: &str = "No summary available";

/// Denormalized case study fields shown next to an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseStudySnapshot {
    pub source_url: String,
    pub content: String,
}

impl CaseStudySnapshot {
    pub fn unavailable() -> Self {
        Self {
            source_url: MISSING_URL.to_string(),
            content: MISSING_CONTENT.to_string(),
        }
    }
}

/// An evaluation joined with whatever is known about its case study.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewedEvaluation {
    pub evaluation: Evaluation,
    pub case_study: CaseStudySnapshot,
}

impl AsRef<Evaluation> for ReviewedEvaluation {
    fn as_ref(&self) -> &Evaluation {
        &self.evaluation
    }
}

impl AsRef<Evaluation> for Evaluation {
    fn as_ref(&self) -> &Evaluation {
        self
    }
}

/// Attaches case study snapshots. Evaluations whose case study is gone get sentinel values.
pub fn join(evaluations: Vec<Evaluation>, case_studies: &[CaseStudy]) -> Vec<ReviewedEvaluation> {
    let by_id: HashMap<&CaseStudyId, &CaseStudy> = case_studies
        .iter()
        .map(|case_study| (&case_study.id, case_study))
        .collect();

    evaluations
        .into_iter()
        .map(|evaluation| {
            let case_study = by_id.get(&evaluation.case_study_id).copied();
            let source_url = evaluation
                .case_study_url
                .clone()
                .or_else(|| case_study.and_then(|cs| cs.source_url.clone()))
                .unwrap_or_else(|| MISSING_URL.to_string());
            let content = case_study
                .and_then(CaseStudy::rendered_content)
                .unwrap_or_else(|| MISSING_CONTENT.to_string());
            ReviewedEvaluation {
                evaluation,
                case_study: CaseStudySnapshot {
                    source_url,
                    content,
                },
            }
        })
        .collect()
}

/// Rounds to one decimal place for display.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
