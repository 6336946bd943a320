use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::company::clean_url;
use crate::storage::Document;

/// Marker the generator places between sections; renderers turn it into a blank line.
pub const SECTION_SEPARATOR: &str = "- - - - - - - - -";

/// Stored field names.
pub(crate) mod fields {
    pub const SOURCE_URL: &str = "source_url";
    pub const CONTENT: &str = "case_study_final";
    pub const CLASSIFICATION: &str = "classification";
}

/// Identifier assigned by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseStudyId(pub String);

impl CaseStudyId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CaseStudyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A generated write-up about one organization's AI adoption. Read-only to the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStudy {
    pub id: CaseStudyId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<ClassificationTag>,
    #[serde(default)]
    pub business_functions: Vec<ClassificationTag>,
    #[serde(default)]
    pub business_impacts: Vec<ClassificationTag>,
    #[serde(default)]
    pub maturity_models: Vec<MaturityModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationTag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
}

impl ClassificationTag {
    /// `"{subcategory} ({category})"` when both parts are present.
    pub fn label(&self) -> Option<String> {
        match (&self.category, &self.subcategory) {
            (Some(category), Some(subcategory)) => Some(format!("{subcategory} ({category})")),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaturityModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
}

impl MaturityModel {
    /// `"{subcategory} ({level} - {category})"` when all three parts are present.
    pub fn label(&self) -> Option<String> {
        match (&self.level, &self.category, &self.subcategory) {
            (Some(level), Some(category), Some(subcategory)) => {
                Some(format!("{subcategory} ({level} - {category})"))
            }
            _ => None,
        }
    }
}

impl CaseStudy {
    /// Converts a stored document, dropping any classification piece with the wrong shape.
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: CaseStudyId(document.id.clone()),
            source_url: optional_text(document, fields::SOURCE_URL),
            content: optional_text(document, fields::CONTENT),
            classification: document
                .get(fields::CLASSIFICATION)
                .and_then(Value::as_object)
                .map(Classification::from_object),
        }
    }

    /// Field map in the stored document shape.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if let Some(url) = &self.source_url {
            map.insert(fields::SOURCE_URL.to_string(), Value::String(url.clone()));
        }
        if let Some(content) = &self.content {
            map.insert(fields::CONTENT.to_string(), Value::String(content.clone()));
        }
        if let Some(classification) = &self.classification {
            if let Ok(value) = serde_json::to_value(classification) {
                map.insert(fields::CLASSIFICATION.to_string(), value);
            }
        }
        map
    }

    /// Company identity, if the case study has a source URL.
    pub fn company(&self) -> Option<String> {
        self.source_url.as_deref().map(clean_url)
    }

    /// Content with section separators turned into line breaks.
    pub fn rendered_content(&self) -> Option<String> {
        self.content
            .as_ref()
            .map(|content| content.replace(SECTION_SEPARATOR, "\n"))
    }
}

impl Classification {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            industry: object
                .get("industry")
                .and_then(Value::as_object)
                .map(ClassificationTag::from_object),
            business_functions: object_list(object, "business_functions")
                .map(ClassificationTag::from_object)
                .collect(),
            business_impacts: object_list(object, "business_impacts")
                .map(ClassificationTag::from_object)
                .collect(),
            maturity_models: object_list(object, "maturity_models")
                .map(|entry| MaturityModel {
                    level: text(entry, "level"),
                    category: text(entry, "category"),
                    subcategory: text(entry, "subcategory"),
                })
                .collect(),
        }
    }
}

impl ClassificationTag {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            category: text(object, "category"),
            subcategory: text(object, "subcategory"),
        }
    }
}

fn object_list<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a Map<String, Value>> {
    object
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn text(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn optional_text(document: &Document, key: &str) -> Option<String> {
    match document.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) if value.trim().is_empty() => None,
        Some(Value::String(value)) => Some(value.clone()),
        Some(other) => {
            warn!(
                document = %document.id,
                field = key,
                kind = value_kind(other),
                "ignoring non-text case study field"
            );
            None
        }
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
