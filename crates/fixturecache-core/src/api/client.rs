//! API client for the fixtures REST service.
//!
//! This module provides the `ApiClient` struct, the reqwest-backed
//! `RemoteFetcher` used in production.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde_json::{Map, Value};
use tracing::debug;

use super::{ApiError, RemoteFetcher};
use crate::coordinator::ResourceKey;
use crate::models::Resource;

// ============================================================================
// Constants
// ============================================================================

/// Base URL of the hosted fixtures service
pub const DEFAULT_API_BASE_URL: &str = "https://general-personal-app.onrender.com";

/// HTTP request timeout in seconds.
/// The hosted service cold-starts slowly, so allow more than a typical API.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// API client for the fixtures service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    token: Option<Arc<str>>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: impl Into<Arc<str>>) {
        self.token = Some(token.into());
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// GET `url` and return the entity list under the category's envelope key
    pub async fn get_list<T: Resource>(&self, url: &str) -> Result<Vec<T>> {
        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;

        let body: Value = response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))?;

        let list = Self::extract_list::<T>(body)?;
        debug!(url = url, category = %T::CATEGORY, count = list.len(), "Fetched list");
        Ok(list)
    }

    /// Pull the entity array out of a response envelope.
    ///
    /// Some collections are stored keyed by id on the server and come back
    /// as an object; see [`keyed_values`] for the order used.
    fn extract_list<T: Resource>(mut body: Value) -> Result<Vec<T>> {
        let key = T::CATEGORY.envelope_key();
        let list = match body.get_mut(key).map(Value::take) {
            Some(Value::Array(items)) => items,
            Some(Value::Object(map)) => keyed_values(map),
            Some(Value::Null) | None => {
                return Err(ApiError::InvalidResponse(format!("missing \"{}\" list", key)).into())
            }
            Some(other) => {
                return Err(ApiError::InvalidResponse(format!(
                    "\"{}\" is not a list: {}",
                    key, other
                ))
                .into())
            }
        };

        list.into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<T>, _>>()
            .with_context(|| format!("Failed to parse {} entries", key))
    }
}

/// Values of an id-keyed object. When every key is an integer the values
/// follow numeric id order ("2" before "10"); otherwise map order is kept.
fn keyed_values(map: Map<String, Value>) -> Vec<Value> {
    let mut entries: Vec<(String, Value)> = map.into_iter().collect();
    let all_numeric = entries.iter().all(|(k, _)| k.parse::<u64>().is_ok());
    if all_numeric {
        entries.sort_by_key(|(k, _)| k.parse::<u64>().unwrap_or(u64::MAX));
    }
    entries.into_iter().map(|(_, item)| item).collect()
}

impl RemoteFetcher for ApiClient {
    async fn fetch<T: Resource>(&self, key: &ResourceKey) -> Result<Vec<T>> {
        self.get_list(key.as_str()).await
    }
}

// ============================================================================
// Tests
// ============================================================================
