use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

use ascetic_core::model::UserId;

use crate::repository::{
    JournalRecord, JournalRepository, ProgressRecord, ProgressRepository, Storage, StorageError,
};

mod rows;

pub use rows::{JournalRow, ProgressRow};

/// Connection settings for the hosted backend's REST interface.
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    base_url: Url,
    api_key: String,
    access_token: Option<String>,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteInitError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl RemoteConfig {
    /// Build a config, validating the base URL.
    ///
    /// # Errors
    ///
    /// Returns `RemoteInitError::InvalidBaseUrl` if `base_url` does not
    /// parse as an absolute URL.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        access_token: Option<String>,
    ) -> Result<Self, RemoteInitError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|_| RemoteInitError::InvalidBaseUrl(base_url.to_string()))?;
        Ok(Self {
            base_url,
            api_key: api_key.into(),
            access_token,
        })
    }

    /// Read connection settings from the environment, if present.
    ///
    /// Looks at `ASCETIC_SUPABASE_URL`, `ASCETIC_SUPABASE_ANON_KEY`, and
    /// optionally `ASCETIC_ACCESS_TOKEN`. Returns `None` when the URL or
    /// key is absent or empty — the caller then falls back to the local
    /// store.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("ASCETIC_SUPABASE_URL").ok()?;
        let api_key = env::var("ASCETIC_SUPABASE_ANON_KEY").ok()?;
        if base_url.trim().is_empty() || api_key.trim().is_empty() {
            return None;
        }
        let access_token = env::var("ASCETIC_ACCESS_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        Self::new(&base_url, api_key, access_token).ok()
    }
}

/// Row-CRUD client for the hosted relational store.
///
/// Every call is scoped to one user via an `eq.` filter and authenticated
/// with the project key plus the session's bearer token. Upserts merge on
/// the row's unique key, so concurrent writers degrade to last-write-wins
/// at the row level.
#[derive(Clone)]
pub struct RemoteRepository {
    client: Client,
    config: RemoteConfig,
}

impl RemoteRepository {
    #[must_use]
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self, table: &str) -> String {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        format!("{base}/rest/v1/{table}")
    }

    fn bearer(&self) -> &str {
        self.config
            .access_token
            .as_deref()
            .unwrap_or(&self.config.api_key)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(self.bearer())
    }
}

fn transport(err: reqwest::Error) -> StorageError {
    StorageError::Connection(err.to_string())
}

fn status_error(status: StatusCode) -> StorageError {
    match status {
        StatusCode::NOT_FOUND => StorageError::NotFound,
        StatusCode::CONFLICT => StorageError::Conflict,
        other => StorageError::Connection(format!("unexpected status {other}")),
    }
}

#[async_trait]
impl ProgressRepository for RemoteRepository {
    async fn get_progress(&self, user_id: UserId) -> Result<Option<ProgressRecord>, StorageError> {
        let response = self
            .apply_auth(self.client.get(self.endpoint("progress")))
            .query(&[("user_id", format!("eq.{user_id}")), ("limit", "1".into())])
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }

        let mut rows: Vec<ProgressRow> = response.json().await.map_err(transport)?;
        Ok(rows.pop().map(ProgressRow::into_record))
    }

    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let response = self
            .apply_auth(self.client.post(self.endpoint("progress")))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[ProgressRow::from_record(record)])
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }
        Ok(())
    }

    async fn delete_progress(&self, user_id: UserId) -> Result<(), StorageError> {
        let response = self
            .apply_auth(self.client.delete(self.endpoint("progress")))
            .query(&[("user_id", format!("eq.{user_id}"))])
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }
        Ok(())
    }
}

#[async_trait]
impl JournalRepository for RemoteRepository {
    async fn list_entries(&self, user_id: UserId) -> Result<Vec<JournalRecord>, StorageError> {
        let response = self
            .apply_auth(self.client.get(self.endpoint("journals")))
            .query(&[
                ("user_id", format!("eq.{user_id}")),
                ("order", "day_number.asc".into()),
            ])
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }

        let rows: Vec<JournalRow> = response.json().await.map_err(transport)?;
        rows.into_iter().map(JournalRow::into_record).collect()
    }

    async fn upsert_entry(&self, record: &JournalRecord) -> Result<(), StorageError> {
        let response = self
            .apply_auth(self.client.post(self.endpoint("journals")))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[JournalRow::from_record(record)])
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }
        Ok(())
    }

    async fn delete_entries(&self, user_id: UserId) -> Result<(), StorageError> {
        let response = self
            .apply_auth(self.client.delete(self.endpoint("journals")))
            .query(&[("user_id", format!("eq.{user_id}"))])
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }
        Ok(())
    }
}

impl Storage {
    /// Build a `Storage` backed by the hosted REST interface.
    #[must_use]
    pub fn remote(config: RemoteConfig) -> Self {
        let repo = RemoteRepository::new(config);
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let journals: Arc<dyn JournalRepository> = Arc::new(repo);
        Self { progress, journals }
    }
}
