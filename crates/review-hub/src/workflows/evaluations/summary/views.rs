use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::aggregates::{
    average_score, bottom_n, improvement_area_detailed, improvement_area_summary,
    per_user_detail, per_user_statistics, top_n, AreaDetail, AreaSummary, UserDetail,
    UserStatistics,
};
use super::{round_one_decimal, CaseStudySnapshot, ReviewedEvaluation};
use crate::workflows::case_studies::CaseStudyId;
use crate::workflows::evaluations::domain::EvaluationId;

pub const MISSING_FEEDBACK: &str = "No feedback provided";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackEntry {
    pub evaluation_id: EvaluationId,
    pub case_study_id: CaseStudyId,
    pub evaluator: String,
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement_area: Option<String>,
    /// Free text behind an `Other` area.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_area: Option<String>,
    pub feedback: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub case_study: CaseStudySnapshot,
}

impl From<&ReviewedEvaluation> for FeedbackEntry {
    fn from(item: &ReviewedEvaluation) -> Self {
        let evaluation = &item.evaluation;
        Self {
            evaluation_id: evaluation.id.clone(),
            case_study_id: evaluation.case_study_id.clone(),
            evaluator: evaluation.evaluator.clone(),
            score: evaluation.score,
            improvement_area: evaluation
                .improvement_area
                .as_ref()
                .map(|area| area.label().to_string()),
            other_area: evaluation
                .improvement_area
                .as_ref()
                .and_then(|area| area.other_text())
                .map(str::to_string),
            feedback: evaluation
                .feedback
                .clone()
                .unwrap_or_else(|| MISSING_FEEDBACK.to_string()),
            timestamp: evaluation.timestamp,
            case_study: item.case_study.clone(),
        }
    }
}

/// Everything the team summary page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub total_evaluations: usize,
    pub evaluations_excluding_relevance: usize,
    pub evaluator_count: usize,
    /// Evaluator-weighted, one decimal.
    pub average_score: f64,
    pub per_user: Vec<UserStatistics>,
    pub top: Vec<FeedbackEntry>,
    pub bottom: Vec<FeedbackEntry>,
    pub improvement_areas: Vec<AreaSummary>,
    pub improvement_area_details: Vec<AreaDetail>,
    pub user_details: Vec<UserDetail>,
}

impl TeamSummary {
    pub fn build(reviewed: &[ReviewedEvaluation], limit: usize) -> Self {
        let evaluator_count = reviewed
            .iter()
            .map(|item| item.evaluation.evaluator.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        Self {
            total_evaluations: reviewed.len(),
            evaluations_excluding_relevance: reviewed
                .iter()
                .filter(|item| !item.evaluation.is_relevance())
                .count(),
            evaluator_count,
            average_score: round_one_decimal(average_score(reviewed)),
            per_user: per_user_statistics(reviewed)
                .into_iter()
                .map(UserStatistics::rounded)
                .collect(),
            top: entries(top_n(reviewed, limit)),
            bottom: entries(bottom_n(reviewed, limit)),
            improvement_areas: improvement_area_summary(reviewed),
            improvement_area_details: improvement_area_detailed(reviewed),
            user_details: per_user_detail(reviewed),
        }
    }
}

/// One reviewer's own numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewerSummary {
    pub reviewer: String,
    pub statistics: UserStatistics,
    pub improvement_areas: Vec<AreaSummary>,
    pub entries: Vec<FeedbackEntry>,
}

impl ReviewerSummary {
    /// `reviewed` may hold other reviewers' evaluations; only `reviewer`'s are counted.
    pub fn build(reviewer: &str, reviewed: &[ReviewedEvaluation]) -> Self {
        let own: Vec<ReviewedEvaluation> = reviewed
            .iter()
            .filter(|item| item.evaluation.evaluator == reviewer)
            .cloned()
            .collect();

        let statistics = per_user_statistics(&own)
            .into_iter()
            .next()
            .map(UserStatistics::rounded)
            .unwrap_or_else(|| UserStatistics {
                user: reviewer.to_string(),
                count: 0,
                average: None,
                min: None,
                max: None,
            });
        let entries = per_user_detail(&own)
            .into_iter()
            .next()
            .map(|detail| detail.entries)
            .unwrap_or_default();

        Self {
            reviewer: reviewer.to_string(),
            statistics,
            improvement_areas: improvement_area_summary(&own),
            entries,
        }
    }
}

impl UserStatistics {
    fn rounded(self) -> Self {
        Self {
            average: self.average.map(round_one_decimal),
            ..self
        }
    }
}

fn entries(items: Vec<ReviewedEvaluation>) -> Vec<FeedbackEntry> {
    items.iter().map(FeedbackEntry::from).collect()
}
