//! JSON fixtures for the in-memory backend.
//!
//! ```json
//! { "case_studies": [ { "id": "cs1", "source_url": "https://acme.com/ai" } ],
//!   "evaluations": [ { "id": "…", "case_study_id": "cs1", "evaluator_email": "a@x.com" } ] }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{Collections, DocumentStore, StorageError};

#[derive(Debug, Default, Deserialize)]
struct SeedFile {
    #[serde(default)]
    case_studies: Vec<Value>,
    #[serde(default)]
    evaluations: Vec<Value>,
}

/// Number of documents written per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedCounts {
    pub case_studies: usize,
    pub evaluations: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("unable to read seed file '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("seed data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{collection}[{index}] must be a JSON object with a string \"id\"")]
    MissingId { collection: String, index: usize },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub fn load_into<S>(store: &S, path: &Path, collections: &Collections) -> Result<SeedCounts, SeedError>
where
    S: DocumentStore + ?Sized,
{
    let raw = fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let counts = load_from_str(store, &raw, collections)?;
    info!(
        path = %path.display(),
        case_studies = counts.case_studies,
        evaluations = counts.evaluations,
        "seeded document store"
    );
    Ok(counts)
}

pub fn load_from_str<S>(
    store: &S,
    raw: &str,
    collections: &Collections,
) -> Result<SeedCounts, SeedError>
where
    S: DocumentStore + ?Sized,
{
    let seed: SeedFile = serde_json::from_str(raw)?;
    Ok(SeedCounts {
        case_studies: write_collection(store, &collections.case_studies, seed.case_studies, false)?,
        evaluations: write_collection(store, &collections.evaluations, seed.evaluations, true)?,
    })
}

/// Evaluation documents keep their `id` field; case studies carry it only as the document key.
fn write_collection<S>(
    store: &S,
    collection: &str,
    records: Vec<Value>,
    keep_id_field: bool,
) -> Result<usize, SeedError>
where
    S: DocumentStore + ?Sized,
{
    let total = records.len();
    for (index, record) in records.into_iter().enumerate() {
        let Value::Object(mut fields) = record else {
            return Err(SeedError::MissingId {
                collection: collection.to_string(),
                index,
            });
        };
        let id = match fields.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => {
                return Err(SeedError::MissingId {
                    collection: collection.to_string(),
                    index,
                })
            }
        };
        if !keep_id_field {
            fields.remove("id");
        }
        store.put(collection, &id, fields)?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryDocumentStore;
    use std::io::Write;

    #[test]
    fn loads_both_collections() {
        let store = InMemoryDocumentStore::new();
        let raw = r#"{
            "case_studies": [{ "id": "cs1", "source_url": "https://acme.com/a" }],
            "evaluations": [{ "id": "e1", "case_study_id": "cs1", "evaluator_email": "a@x.com" }]
        }"#;

        let counts = load_from_str(&store, raw, &Collections::default()).expect("seed loads");
        assert_eq!(
            counts,
            SeedCounts {
                case_studies: 1,
                evaluations: 1
            }
        );
        let case_studies = store.fetch_all("case_studies").expect("fetch");
        assert_eq!(case_studies[0].id, "cs1");
        assert!(case_studies[0].get("id").is_none());
    }

    #[test]
    fn rejects_records_without_ids() {
        let store = InMemoryDocumentStore::new();
        let raw = r#"{ "case_studies": [{ "source_url": "https://acme.com" }] }"#;
        let err = load_from_str(&store, raw, &Collections::default()).expect_err("missing id");
        assert!(matches!(err, SeedError::MissingId { index: 0, .. }));
    }

    #[test]
    fn reads_seed_files_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "case_studies": [{{ "id": "cs9" }}] }}"#).expect("write");
        let store = InMemoryDocumentStore::new();
        let counts = load_into(&store, file.path(), &Collections::default()).expect("loads");
        assert_eq!(counts.case_studies, 1);
        assert_eq!(counts.evaluations, 0);
    }
}
