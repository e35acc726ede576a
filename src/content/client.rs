//! Remote relational store client.
//!
//! Talks to a PostgREST endpoint (`<url>/rest/v1/<table>`). Rows travel as
//! raw JSON values; typing happens in the content store.

use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use std::future::Future;
use thiserror::Error;
use uuid::Uuid;

use super::auth::Profile;
use super::types::ContentKind;
use crate::storage::RemoteSettings;

/// Error codes meaning the table has not been provisioned yet.
const SCHEMA_MISSING_CODES: &[&str] = &["PGRST204", "PGRST205", "42P01"];

/// Remote content store operations.
pub trait RemoteStore: Send + Sync + 'static {
    /// Fetch every row of a collection in display order.
    fn select(
        &self,
        kind: ContentKind,
    ) -> impl Future<Output = Result<Vec<serde_json::Value>, ContentError>> + Send;

    /// Insert one row.
    fn insert(
        &self,
        kind: ContentKind,
        row: serde_json::Value,
    ) -> impl Future<Output = Result<(), ContentError>> + Send;

    /// Delete the row with `id`.
    fn delete(
        &self,
        kind: ContentKind,
        id: &str,
    ) -> impl Future<Output = Result<(), ContentError>> + Send;

    /// Look up a user's profile record.
    fn fetch_profile(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Option<Profile>, ContentError>> + Send;
}

/// PostgREST error body.
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the remote store.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl RestClient {
    /// Create a client for the project at `url`.
    pub fn new(url: &str, anon_key: &str) -> Result<Self, ContentError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ContentError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            access_token: None,
        })
    }

    /// Build a client if the settings describe a usable remote.
    pub fn from_settings(settings: &RemoteSettings) -> Result<Option<Self>, ContentError> {
        settings
            .connection()
            .map(|(url, key)| Self::new(url, key))
            .transpose()
    }

    /// Act as a signed-in user (required for admin writes under row-level security).
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// Bearer token sent with requests: the user's token, else the anon key.
    pub fn access_token(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.access_token()))
    }

    /// Pass successful responses through, classify the rest.
    async fn check(response: Response, table: &str) -> Result<Response, ContentError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status.as_u16(), &body, table))
    }
}

/// Turn a failed response into a [`ContentError`].
pub(crate) fn classify_error(status: u16, body: &str, table: &str) -> ContentError {
    let parsed: PostgrestError = serde_json::from_str(body).unwrap_or_default();

    if let Some(code) = parsed.code.as_deref() {
        if SCHEMA_MISSING_CODES.contains(&code) {
            return ContentError::SchemaMissing {
                table: table.to_string(),
            };
        }
    }

    ContentError::Api {
        status,
        code: parsed.code,
        message: parsed
            .message
            .unwrap_or_else(|| format!("request failed with status {}", status)),
    }
}

fn network_error(e: reqwest::Error) -> ContentError {
    ContentError::Network(e.to_string())
}

impl RemoteStore for RestClient {
    async fn select(&self, kind: ContentKind) -> Result<Vec<serde_json::Value>, ContentError> {
        tracing::debug!("Fetching {}", kind);

        let request = self
            .http
            .get(self.table_url(kind.table()))
            .query(&[("select", "*"), ("order", kind.order())]);

        let response = self.authorize(request).send().await.map_err(network_error)?;
        let response = Self::check(response, kind.table()).await?;

        response
            .json()
            .await
            .map_err(|e| ContentError::InvalidResponse(e.to_string()))
    }

    async fn insert(&self, kind: ContentKind, row: serde_json::Value) -> Result<(), ContentError> {
        tracing::debug!("Inserting into {}", kind);

        let request = self
            .http
            .post(self.table_url(kind.table()))
            .header("Prefer", "return=minimal")
            .json(&[row]);

        let response = self.authorize(request).send().await.map_err(network_error)?;
        Self::check(response, kind.table()).await?;
        Ok(())
    }

    async fn delete(&self, kind: ContentKind, id: &str) -> Result<(), ContentError> {
        tracing::debug!("Deleting {} from {}", id, kind);

        let filter = format!("eq.{}", id);
        let request = self
            .http
            .delete(self.table_url(kind.table()))
            .query(&[("id", filter.as_str())]);

        let response = self.authorize(request).send().await.map_err(network_error)?;
        Self::check(response, kind.table()).await?;
        Ok(())
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, ContentError> {
        let filter = format!("eq.{}", user_id);
        let request = self
            .http
            .get(self.table_url("profiles"))
            .query(&[("select", "*"), ("id", filter.as_str())]);

        let response = self.authorize(request).send().await.map_err(network_error)?;
        let response = Self::check(response, "profiles").await?;

        let mut rows: Vec<Profile> = response
            .json()
            .await
            .map_err(|e| ContentError::InvalidResponse(e.to_string()))?;

        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }
}

/// Remote content errors.
///
/// The `Display` text is what the user is shown.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Remote content store is not configured")]
    NotConfigured,

    #[error("Table '{table}' does not exist yet")]
    SchemaMissing { table: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Realtime channel error: {0}")]
    Realtime(String),
}

impl ContentError {
    pub fn is_schema_missing(&self) -> bool {
        matches!(self, ContentError::SchemaMissing { .. })
    }
}
