use std::sync::Arc;

use ascetic_core::engine::CompletionPolicy;
use ascetic_core::model::UserId;
use storage::remote::RemoteConfig;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;

/// Assembles the app-facing services for one user and performs the
/// mount-time load.
#[derive(Clone)]
pub struct AppServices {
    progress: Arc<ProgressService>,
}

impl AppServices {
    /// Build services backed by the client-local `SQLite` store.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or the initial
    /// load fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        user_id: UserId,
        policy: CompletionPolicy,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::with_storage(storage, clock, user_id, policy).await
    }

    /// Build services backed by the hosted REST gateway.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the initial load fails.
    pub async fn new_remote(
        config: RemoteConfig,
        clock: Clock,
        user_id: UserId,
        policy: CompletionPolicy,
    ) -> Result<Self, AppServicesError> {
        Self::with_storage(Storage::remote(config), clock, user_id, policy).await
    }

    /// Build services over an already-constructed storage backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the initial load fails.
    pub async fn with_storage(
        storage: Storage,
        clock: Clock,
        user_id: UserId,
        policy: CompletionPolicy,
    ) -> Result<Self, AppServicesError> {
        let progress = Arc::new(ProgressService::new(clock, user_id, &storage, policy));
        progress.load().await?;
        Ok(Self { progress })
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }
}
