//! Document store boundary.
//!
//! The review workflows only ever ask the store for whole collections, simple field filters,
//! id-keyed upserts, and deletes. Everything else happens over records already in memory.

pub mod memory;
pub mod seed;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use memory::InMemoryDocumentStore;

/// Reserved field name that addresses the document id in a [`FieldFilter`].
pub const DOCUMENT_ID: &str = "__name__";

/// Upper bound appended to a prefix to express "starts with" as a range.
const PREFIX_SENTINEL: char = '\u{f8ff}';

/// A stored document: its id plus the raw field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

/// Names of the collections the hub reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub case_studies: String,
    pub evaluations: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            case_studies: "case_studies".to_string(),
            evaluations: "evaluations".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl FilterOp {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            FilterOp::Eq => ordering == Ordering::Equal,
            FilterOp::Lt => ordering == Ordering::Less,
            FilterOp::Le => ordering != Ordering::Greater,
            FilterOp::Gt => ordering == Ordering::Greater,
            FilterOp::Ge => ordering != Ordering::Less,
        }
    }
}

/// Single-field equality or range condition.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    pub fn id_eq(id: impl Into<String>) -> Self {
        Self::eq(DOCUMENT_ID, Value::String(id.into()))
    }

    /// Range pair selecting string fields that start with `prefix`.
    pub fn prefix(field: &str, prefix: &str) -> [Self; 2] {
        [
            Self::new(field, FilterOp::Ge, prefix),
            Self::new(field, FilterOp::Le, format!("{prefix}{PREFIX_SENTINEL}")),
        ]
    }

    /// Evaluates the condition against a document. Missing fields never match.
    pub fn matches(&self, document: &Document) -> bool {
        let candidate = if self.field == DOCUMENT_ID {
            Value::String(document.id.clone())
        } else {
            match document.get(&self.field) {
                Some(value) => value.clone(),
                None => return false,
            }
        };

        compare_values(&candidate, &self.value)
            .map(|ordering| self.op.accepts(ordering))
            .unwrap_or(false)
    }
}

/// Numbers compare numerically and strings lexicographically; other types only support equality.
fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Bool(a), Value::Bool(b)) if a == b => Some(Ordering::Equal),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

/// Storage abstraction so the review service can be exercised without a database.
pub trait DocumentStore: Send + Sync {
    fn fetch_all(&self, collection: &str) -> Result<Vec<Document>, StorageError>;
    fn fetch_where(
        &self,
        collection: &str,
        filter: &FieldFilter,
    ) -> Result<Vec<Document>, StorageError>;
    /// Create-or-overwrite keyed by `id`.
    fn put(&self, collection: &str, id: &str, fields: Map<String, Value>)
        -> Result<(), StorageError>;
    fn delete(&self, collection: &str, id: &str) -> Result<(), StorageError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    #[error("document store rejected the request: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(id: &str, fields: Value) -> Document {
        match fields {
            Value::Object(map) => Document::new(id, map),
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn equality_matches_strings_and_numbers() {
        let doc = document("d1", json!({ "evaluator_email": "a@x.com", "evaluation_score": 7 }));
        assert!(FieldFilter::eq("evaluator_email", "a@x.com").matches(&doc));
        assert!(FieldFilter::eq("evaluation_score", 7).matches(&doc));
        assert!(FieldFilter::eq("evaluation_score", 7.0).matches(&doc));
        assert!(!FieldFilter::eq("evaluator_email", "b@x.com").matches(&doc));
    }

    #[test]
    fn mismatched_types_and_missing_fields_never_match() {
        let doc = document("d1", json!({ "evaluation_score": "7" }));
        assert!(!FieldFilter::eq("evaluation_score", 7).matches(&doc));
        assert!(!FieldFilter::new("missing", FilterOp::Ge, 0).matches(&doc));
    }

    #[test]
    fn range_operators_follow_ordering() {
        let doc = document("d1", json!({ "evaluation_score": 5 }));
        assert!(FieldFilter::new("evaluation_score", FilterOp::Gt, 4).matches(&doc));
        assert!(FieldFilter::new("evaluation_score", FilterOp::Ge, 5).matches(&doc));
        assert!(FieldFilter::new("evaluation_score", FilterOp::Le, 5).matches(&doc));
        assert!(!FieldFilter::new("evaluation_score", FilterOp::Lt, 5).matches(&doc));
    }

    #[test]
    fn document_id_is_addressable() {
        let doc = document("cs-42", json!({}));
        assert!(FieldFilter::id_eq("cs-42").matches(&doc));
        assert!(!FieldFilter::id_eq("cs-43").matches(&doc));
    }

    #[test]
    fn prefix_pair_selects_urls_under_a_site() {
        let [lower, upper] = FieldFilter::prefix("source_url", "https://acme.com");
        let inside = document("a", json!({ "source_url": "https://acme.com/blog/ai" }));
        let outside = document("b", json!({ "source_url": "https://acmf.com" }));

        assert!(lower.matches(&inside) && upper.matches(&inside));
        assert!(!(lower.matches(&outside) && upper.matches(&outside)));
    }
}
