//! services/assistant/src/adapters/http.rs
//!
//! The resilient request client: the concrete implementation of the
//! `RequestClient` port on top of `reqwest`. It performs exactly one call,
//! classifies the outcome and never retries or caches.

use crate::config::normalize_base_url;
use async_trait::async_trait;
use learning_assistant_core::ports::{ApiResponse, HttpMethod, RequestClient, RequestError};
use reqwest::{header::CONTENT_TYPE, Client};
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

pub struct HttpRequestClient {
    client: Client,
    base_url: RwLock<String>,
}

impl HttpRequestClient {
    /// Creates a new `HttpRequestClient` whose calls give up after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: RwLock::new(normalize_base_url(base_url)),
        }
    }
}

/// Picks the most helpful message out of an error body.
fn error_message(json: Option<&Value>, status: u16) -> String {
    json.and_then(|body| {
        ["error", "message"]
            .iter()
            .filter_map(|field| body.get(*field).and_then(Value::as_str))
            .find(|message| !message.is_empty())
            .map(str::to_string)
    })
    .unwrap_or_else(|| format!("HTTP {}", status))
}

//=========================================================================================
// `RequestClient` Trait Implementation
//=========================================================================================

#[async_trait]
impl RequestClient for HttpRequestClient {
    async fn call(
        &self,
        path: &str,
        method: HttpMethod,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<ApiResponse, RequestError> {
        let url = format!("{}{}", self.base_url(), path);
        let mut request = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        }
        .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        // Any transport failure means there is no usable path to the server.
        let response = request.send().await.map_err(|e| {
            warn!("{} {} unreachable: {}", method, path, e);
            RequestError::NetworkUnreachable(e.to_string())
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            warn!("{} {} body could not be read: {}", method, path, e);
            RequestError::NetworkUnreachable(e.to_string())
        })?;
        let json = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str::<Value>(&text).ok()
        };

        if !(200..300).contains(&status) {
            let message = error_message(json.as_ref(), status);
            warn!("{} {} failed with {}: {}", method, path, status, message);
            return Err(RequestError::Http { status, message });
        }

        debug!("{} {} -> {}", method, path, status);
        Ok(ApiResponse { status, json, text })
    }

    fn set_base_url(&self, base_url: &str) {
        let mut guard = self
            .base_url
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = normalize_base_url(base_url);
    }

    fn base_url(&self) -> String {
        self.base_url
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_field_wins_over_message() {
        let body = json!({ "message": "second", "error": "first" });
        assert_eq!(error_message(Some(&body), 500), "first");
    }

    #[test]
    fn message_field_is_used_when_error_is_absent() {
        let body = json!({ "message": "bad topic" });
        assert_eq!(error_message(Some(&body), 400), "bad topic");
    }

    #[test]
    fn generic_message_without_usable_body() {
        assert_eq!(error_message(None, 502), "HTTP 502");
        assert_eq!(error_message(Some(&json!({ "error": "" })), 404), "HTTP 404");
        assert_eq!(error_message(Some(&json!([1, 2])), 418), "HTTP 418");
    }

    #[test]
    fn base_url_is_normalized_on_update() {
        let client = HttpRequestClient::with_client(Client::new(), "http://a.test/");
        assert_eq!(client.base_url(), "http://a.test");
        client.set_base_url(" http://b.test// ");
        assert_eq!(client.base_url(), "http://b.test");
    }
}
