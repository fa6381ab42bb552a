//! Shared handler state

use std::sync::Arc;

use crate::auth::{JwtConfig, JwtManager};
use crate::observability::MetricsRegistry;
use crate::storage::{RecordStore, StorageResult};

use super::errors::ApiError;

/// State cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub tokens: Arc<JwtManager>,
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    pub fn new(store: RecordStore, jwt: JwtConfig) -> Self {
        Self {
            store: Arc::new(store),
            tokens: Arc::new(JwtManager::new(jwt)),
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Run a store operation on the blocking pool
    ///
    /// Store calls block on file I/O under the store lock, and user
    /// creation hashes the password before taking it; neither may run on
    /// the async workers.
    pub async fn with_store<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&RecordStore) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| ApiError::Task(e.to_string()))?
            .map_err(ApiError::from)
    }
}
