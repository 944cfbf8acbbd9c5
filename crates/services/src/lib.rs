#![forbid(unsafe_code)]

pub mod app_services;
pub mod debounce;
pub mod error;
pub mod progress_service;
pub mod sync;

pub use ascetic_core::Clock;

pub use app_services::AppServices;
pub use debounce::Debouncer;
pub use error::{AppServicesError, ProgressError};
pub use progress_service::ProgressService;
pub use sync::{RetryPolicy, SyncStatus};
