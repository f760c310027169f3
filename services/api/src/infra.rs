use metrics_exporter_prometheus::PrometheusHandle;
use rating_workbench::config::{StorageBackend, StorageConfig};
use rating_workbench::policy::{
    InMemoryPolicyRepository, JsonFilePolicyRepository, PolicyRepository, RepositoryError,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Open the repository selected by `APP_STORAGE_BACKEND`.
pub(crate) async fn open_repository(
    storage: &StorageConfig,
) -> Result<Arc<dyn PolicyRepository>, RepositoryError> {
    match storage.backend {
        StorageBackend::Memory => {
            info!("using in-memory policy storage");
            Ok(Arc::new(InMemoryPolicyRepository::new()))
        }
        StorageBackend::JsonFile => {
            let repository = JsonFilePolicyRepository::open(&storage.data_dir).await?;
            info!(path = %repository.file_path().display(), "using JSON file policy storage");
            Ok(Arc::new(repository))
        }
    }
}
