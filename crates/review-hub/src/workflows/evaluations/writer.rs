use chrono::{DateTime, Utc};

use super::domain::{Evaluation, EvaluationDraft, EvaluationId, ImprovementArea, SCORE_RANGE};
use crate::workflows::case_studies::CaseStudyId;

/// A submission rejected before anything is written. `field()` names the input to fix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("case study id must not be empty")]
    MissingCaseStudy,
    #[error("evaluator identity must not be empty")]
    MissingEvaluator,
    #[error("score must be between 1 and 10, got {0}")]
    ScoreOutOfRange(i64),
    #[error("'{0}' is not a known improvement area")]
    UnknownImprovementArea(String),
    #[error("describe the improvement area when choosing Other")]
    MissingOtherArea,
    #[error("feedback must not be empty")]
    EmptyFeedback,
}

impl ValidationError {
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingCaseStudy => "case_study_id",
            Self::MissingEvaluator => "evaluator",
            Self::ScoreOutOfRange(_) => "score",
            Self::UnknownImprovementArea(_) | Self::MissingOtherArea => "improvement_area",
            Self::EmptyFeedback => "feedback",
        }
    }
}

/// Validates a draft and builds the record to upsert. The id depends only on the case study and
/// the evaluator.
pub fn prepare(
    evaluator: &str,
    draft: &EvaluationDraft,
    case_study_url: Option<String>,
    timestamp: DateTime<Utc>,
) -> Result<Evaluation, ValidationError> {
    let case_study_id = draft.case_study_id.trim();
    if case_study_id.is_empty() {
        return Err(ValidationError::MissingCaseStudy);
    }
    let evaluator = evaluator.trim();
    if evaluator.is_empty() {
        return Err(ValidationError::MissingEvaluator);
    }
    if !SCORE_RANGE.contains(&draft.score) {
        return Err(ValidationError::ScoreOutOfRange(draft.score));
    }
    let score = u8::try_from(draft.score).map_err(|_| ValidationError::ScoreOutOfRange(draft.score))?;
    let improvement_area = improvement_area(&draft.improvement_area, draft.other_area.as_deref())?;
    let feedback = draft.feedback.trim();
    if feedback.is_empty() {
        return Err(ValidationError::EmptyFeedback);
    }

    let case_study_id = CaseStudyId::from(case_study_id);
    Ok(Evaluation {
        id: EvaluationId::derive(&case_study_id, evaluator),
        case_study_id,
        case_study_url,
        evaluator: evaluator.to_string(),
        score: Some(score),
        improvement_area: Some(improvement_area),
        feedback: Some(feedback.to_string()),
        timestamp: Some(timestamp),
    })
}

fn improvement_area(
    selection: &str,
    other_area: Option<&str>,
) -> Result<ImprovementArea, ValidationError> {
    if ImprovementArea::is_other_selection(selection) {
        let text = other_area
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or(ValidationError::MissingOtherArea)?;
        return Ok(ImprovementArea::category(text)
            .unwrap_or_else(|| ImprovementArea::Other(text.to_string())));
    }
    ImprovementArea::category(selection)
        .ok_or_else(|| ValidationError::UnknownImprovementArea(selection.trim().to_string()))
}
