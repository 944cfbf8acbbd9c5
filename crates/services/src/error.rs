//! Shared error types for the services crate.

use thiserror::Error;

use ascetic_core::model::JournalError;
use storage::remote::RemoteInitError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressService`.
///
/// Validation failures always surface. Storage failures surface only from
/// the initial load; write-through failures are retried, logged, and
/// reflected in the sync status instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Journal(#[from] JournalError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Remote(#[from] RemoteInitError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}
