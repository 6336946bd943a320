use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use crate::storage::Document;
use crate::workflows::case_studies::CaseStudyId;

/// Stored field names.
pub(crate) mod fields {
    pub const ID: &str = "id";
    pub const CASE_STUDY_ID: &str = "case_study_id";
    pub const CASE_STUDY_URL: &str = "case_study_url";
    pub const EVALUATOR: &str = "evaluator_email";
    pub const SCORE: &str = "evaluation_score";
    pub const IMPROVEMENT_AREA: &str = "improvement_area";
    pub const FEEDBACK: &str = "improvement_feedback";
    pub const TIMESTAMP: &str = "timestamp";
}

/// Lowest and highest accepted score.
pub const SCORE_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

/// Identifier of an evaluation. Derived from the case study and the evaluator so that a
/// resubmission lands on the same document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationId(pub String);

impl EvaluationId {
    /// UUIDv5 in the DNS namespace over `"{case_study_id}:{evaluator}"`.
    pub fn derive(case_study_id: &CaseStudyId, evaluator: &str) -> Self {
        let name = format!("{}:{}", case_study_id.as_str(), evaluator);
        Self(Uuid::new_v5(&Uuid::NAMESPACE_DNS, name.as_bytes()).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The area a reviewer would improve first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImprovementArea {
    Relevance,
    Accuracy,
    Structure,
    Depth,
    WritingStyle,
    Tone,
    /// Free text entered when none of the fixed categories fit.
    Other(String),
}

impl ImprovementArea {
    pub fn categories() -> [Self; 6] {
        [
            Self::Relevance,
            Self::Accuracy,
            Self::Structure,
            Self::Depth,
            Self::WritingStyle,
            Self::Tone,
        ]
    }

    /// Grouping label. Every free-text entry shares the `Other` bucket.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Relevance => "Relevance",
            Self::Accuracy => "Accuracy",
            Self::Structure => "Structure",
            Self::Depth => "Depth",
            Self::WritingStyle => "Writing Style",
            Self::Tone => "Tone",
            Self::Other(_) => "Other",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Relevance => "Alignment with AI case study goals",
            Self::Accuracy => "Factual correctness and data reliability",
            Self::Structure => "Logical organization and clear flow of information",
            Self::Depth => "Appropriate level of detail and thoroughness",
            Self::WritingStyle => "Clear, professional, unbiased, and engaging",
            Self::Tone => "Voice of a business consultant, appropriate for the audience",
            Self::Other(_) => "Please specify in your comment",
        }
    }

    /// Value written to the store: the category label, or the free text for `Other`.
    pub fn stored_value(&self) -> &str {
        match self {
            Self::Other(text) => text,
            known => known.label(),
        }
    }

    pub fn other_text(&self) -> Option<&str> {
        match self {
            Self::Other(text) => Some(text),
            _ => None,
        }
    }

    /// Reads a stored value. Accepts short labels, long labels with a parenthesised
    /// description, and `Style` for `Writing Style`. Anything else is free text.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self::category(trimmed).unwrap_or_else(|| Self::Other(trimmed.to_string())))
    }

    /// One of the fixed categories, matched on the label before any parenthesised description.
    pub fn category(raw: &str) -> Option<Self> {
        let head = raw.trim().split(" (").next().unwrap_or(raw).trim();
        match head.to_ascii_lowercase().as_str() {
            "relevance" => Some(Self::Relevance),
            "accuracy" => Some(Self::Accuracy),
            "structure" => Some(Self::Structure),
            "depth" => Some(Self::Depth),
            "writing style" | "style" => Some(Self::WritingStyle),
            "tone" => Some(Self::Tone),
            _ => None,
        }
    }

    /// Whether a form selection is the `Other` choice, with or without its description.
    pub fn is_other_selection(raw: &str) -> bool {
        let head = raw.trim().split(" (").next().unwrap_or_default().trim();
        head.eq_ignore_ascii_case("other")
    }
}

impl fmt::Display for ImprovementArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stored_value())
    }
}

impl Serialize for ImprovementArea {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.stored_value())
    }
}

impl<'de> Deserialize<'de> for ImprovementArea {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| serde::de::Error::custom("improvement area is empty"))
    }
}

/// One reviewer's score and feedback for one case study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub case_study_id: CaseStudyId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_study_url: Option<String>,
    pub evaluator: String,
    pub score: Option<u8>,
    pub improvement_area: Option<ImprovementArea>,
    pub feedback: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// A stored record that cannot be turned into a typed evaluation.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("document '{document}' is missing required field '{field}'")]
    MissingField {
        document: String,
        field: &'static str,
    },
}

impl Evaluation {
    /// Converts a stored document. Only the case study reference and the evaluator are
    /// required; unusable scores and timestamps read as absent.
    pub fn from_document(document: &Document) -> Result<Self, IngestError> {
        let required = |field: &'static str| {
            document
                .str_field(field)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .ok_or_else(|| IngestError::MissingField {
                    document: document.id.clone(),
                    field,
                })
        };

        let case_study_id = CaseStudyId(required(fields::CASE_STUDY_ID)?);
        let evaluator = required(fields::EVALUATOR)?;

        Ok(Self {
            id: EvaluationId(document.id.clone()),
            case_study_id,
            case_study_url: document
                .str_field(fields::CASE_STUDY_URL)
                .filter(|url| !url.trim().is_empty())
                .map(str::to_string),
            evaluator,
            score: document
                .get(fields::SCORE)
                .and_then(parse_score)
                .filter(|score| {
                    let in_range = SCORE_RANGE.contains(&i64::from(*score));
                    if !in_range {
                        warn!(
                            document = %document.id,
                            score,
                            "ignoring out-of-range evaluation score"
                        );
                    }
                    in_range
                }),
            improvement_area: document
                .str_field(fields::IMPROVEMENT_AREA)
                .and_then(ImprovementArea::parse),
            feedback: document
                .str_field(fields::FEEDBACK)
                .filter(|text| !text.trim().is_empty())
                .map(str::to_string),
            timestamp: document
                .str_field(fields::TIMESTAMP)
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|parsed| parsed.with_timezone(&Utc)),
        })
    }

    /// Field map in the stored document shape.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(fields::ID.to_string(), Value::String(self.id.0.clone()));
        map.insert(
            fields::CASE_STUDY_ID.to_string(),
            Value::String(self.case_study_id.0.clone()),
        );
        if let Some(url) = &self.case_study_url {
            map.insert(fields::CASE_STUDY_URL.to_string(), Value::String(url.clone()));
        }
        map.insert(
            fields::EVALUATOR.to_string(),
            Value::String(self.evaluator.clone()),
        );
        if let Some(score) = self.score {
            map.insert(fields::SCORE.to_string(), Value::from(score));
        }
        if let Some(area) = &self.improvement_area {
            map.insert(
                fields::IMPROVEMENT_AREA.to_string(),
                Value::String(area.stored_value().to_string()),
            );
        }
        if let Some(feedback) = &self.feedback {
            map.insert(fields::FEEDBACK.to_string(), Value::String(feedback.clone()));
        }
        if let Some(timestamp) = self.timestamp {
            map.insert(
                fields::TIMESTAMP.to_string(),
                Value::String(timestamp.to_rfc3339()),
            );
        }
        map
    }

    pub fn is_relevance(&self) -> bool {
        matches!(self.improvement_area, Some(ImprovementArea::Relevance))
    }
}

/// Integral numbers in `u8` range; everything else is treated as "no score".
fn parse_score(value: &Value) -> Option<u8> {
    if let Some(score) = value.as_u64() {
        return u8::try_from(score).ok();
    }
    value
        .as_f64()
        .filter(|score| score.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(score))
        .map(|score| score as u8)
}

/// Form payload submitted by a reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationDraft {
    pub case_study_id: String,
    pub score: i64,
    pub improvement_area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_area: Option<String>,
    pub feedback: String,
}
