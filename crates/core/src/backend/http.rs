//! REST client for the remote list backend.
//!
//! Endpoints (relative to `base_url`):
//! - `GET lists/{key}` -> tracked items (bare array or `{"items": [...]}`)
//! - `PATCH items/{id}` / `DELETE items/{id}`
//! - `GET presets`, `POST presets`, `DELETE presets/{id}`,
//!   `POST presets/{id}/usage`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::bulk::{MutationClient, MutationError};
use crate::config::BackendConfig;
use crate::fetch::{FetchError, FetchKey, ListFetcher};
use crate::item::{decode_records, ItemUpdate, RawTrackedItem};
use crate::preset::{FilterPreset, NewPreset, PersistenceError, PresetPersistence};

/// Errors constructing the backend client.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Records stay untyped here so a single bad one cannot fail the response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListResponse {
    Bare(Vec<Value>),
    Wrapped { items: Vec<Value> },
}

impl ListResponse {
    fn into_items(self) -> Vec<RawTrackedItem> {
        match self {
            ListResponse::Bare(items) | ListResponse::Wrapped { items } => decode_records(items),
        }
    }
}

/// HTTP implementation of every collaborator the list view needs.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(BackendError::NotConfigured(
                "backend base_url is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_secs)))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_token: config.api_token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn list_url(&self, key: &FetchKey) -> String {
        self.url(&format!("lists/{}", urlencoding::encode(key.as_str())))
    }

    fn item_url(&self, id: &str) -> String {
        self.url(&format!("items/{}", urlencoding::encode(id)))
    }

    fn preset_url(&self, id: &str, suffix: Option<&str>) -> String {
        let mut path = format!("presets/{}", urlencoding::encode(id));
        if let Some(suffix) = suffix {
            path.push('/');
            path.push_str(suffix);
        }
        self.url(&path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn error_body(response: Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if body.is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            format!("HTTP {}: {}", status.as_u16(), body)
        }
    }

    async fn fetch_list(&self, key: &FetchKey) -> Result<Vec<RawTrackedItem>, FetchError> {
        let url = self.list_url(key);
        debug!("Fetching list: {}", url);

        let response = self
            .request(Method::GET, &url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Application(Self::error_body(response).await));
        }

        let body: ListResponse = response.json().await.map_err(|e| {
            FetchError::Application(format!("Failed to parse list response: {}", e))
        })?;

        Ok(body.into_items())
    }

    async fn check_mutation(response: Response, id: &str) -> Result<(), MutationError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            return Err(MutationError::NotFound(id.to_string()));
        }
        let message = Self::error_body(response).await;
        if status.is_client_error() {
            Err(MutationError::Rejected(message))
        } else {
            Err(MutationError::Network(message))
        }
    }

    async fn check_preset(response: Response, id: &str) -> Result<Response, PersistenceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(PersistenceError::NotFound(id.to_string()));
        }
        Err(PersistenceError::Storage(Self::error_body(response).await))
    }
}

#[async_trait]
impl ListFetcher for HttpBackend {
    async fn fetch(
        &self,
        key: &FetchKey,
        cancel: CancellationToken,
    ) -> Result<Vec<RawTrackedItem>, FetchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            result = self.fetch_list(key) => result,
        }
    }
}

#[async_trait]
impl MutationClient for HttpBackend {
    async fn mutate(&self, id: &str, update: ItemUpdate) -> Result<(), MutationError> {
        let response = self
            .request(Method::PATCH, &self.item_url(id))
            .json(&update)
            .send()
            .await
            .map_err(|e| MutationError::Network(e.to_string()))?;
        Self::check_mutation(response, id).await
    }

    async fn remove(&self, id: &str) -> Result<(), MutationError> {
        let response = self
            .request(Method::DELETE, &self.item_url(id))
            .send()
            .await
            .map_err(|e| MutationError::Network(e.to_string()))?;
        Self::check_mutation(response, id).await
    }
}

#[async_trait]
impl PresetPersistence for HttpBackend {
    async fn list(&self) -> Result<Vec<FilterPreset>, PersistenceError> {
        let response = self
            .request(Method::GET, &self.url("presets"))
            .send()
            .await
            .map_err(|e| PersistenceError::Network(e.to_string()))?;
        let response = Self::check_preset(response, "presets").await?;
        response
            .json()
            .await
            .map_err(|e| PersistenceError::Storage(format!("Failed to parse presets: {}", e)))
    }

    async fn create(&self, preset: NewPreset) -> Result<FilterPreset, PersistenceError> {
        let response = self
            .request(Method::POST, &self.url("presets"))
            .json(&preset)
            .send()
            .await
            .map_err(|e| PersistenceError::Network(e.to_string()))?;
        let response = Self::check_preset(response, &preset.name).await?;
        response
            .json()
            .await
            .map_err(|e| PersistenceError::Storage(format!("Failed to parse preset: {}", e)))
    }

    async fn delete(&self, id: &str) -> Result<(), PersistenceError> {
        let response = self
            .request(Method::DELETE, &self.preset_url(id, None))
            .send()
            .await
            .map_err(|e| PersistenceError::Network(e.to_string()))?;
        Self::check_preset(response, id).await.map(|_| ())
    }

    async fn increment_usage(&self, id: &str) -> Result<(), PersistenceError> {
        let response = self
            .request(Method::POST, &self.preset_url(id, Some("usage")))
            .send()
            .await
            .map_err(|e| PersistenceError::Network(e.to_string()))?;
        Self::check_preset(response, id).await.map(|_| ())
    }
}
