use metrics_exporter_prometheus::PrometheusHandle;
use review_hub::config::AppConfig;
use review_hub::error::AppError;
use review_hub::storage::{seed, Collections, InMemoryDocumentStore};
use review_hub::workflows::evaluations::{AccessPolicy, ReviewService};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory store, optionally filled from a seed file.
pub(crate) fn build_store(
    seed_path: Option<&Path>,
    collections: &Collections,
) -> Result<Arc<InMemoryDocumentStore>, AppError> {
    let store = Arc::new(InMemoryDocumentStore::new());
    if let Some(path) = seed_path {
        seed::load_into(store.as_ref(), path, collections)?;
    }
    Ok(store)
}

pub(crate) fn build_service(
    config: &AppConfig,
    store: Arc<InMemoryDocumentStore>,
) -> ReviewService<InMemoryDocumentStore> {
    let access = AccessPolicy::new(
        &config.access.authorized_emails,
        &config.access.admin_emails,
    );
    ReviewService::new(store, config.storage.collections.clone(), access)
        .with_company_urls(config.dashboard.company_urls.clone())
        .with_summary_limit(config.summary.limit)
}
