//! crates/learning_assistant_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the HTTP stack, the storage engine and the device speech
//! engines.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use tokio_util::sync::CancellationToken;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for storage and device port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Capability unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Outbound Request Contract
//=========================================================================================

/// Classification of a failed outbound call.
///
/// `NetworkUnreachable` is the single signal every caller uses to decide to go local.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Server unreachable: {0}")]
    NetworkUnreachable(String),
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RequestError {
    pub fn is_network(&self) -> bool {
        matches!(self, RequestError::NetworkUnreachable(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// The normalized shape of every successful call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// `None` when the body was empty or not JSON.
    pub json: Option<Value>,
    pub text: String,
}

impl ApiResponse {
    /// Returns a non-empty string field of the JSON body, if any.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.json
            .as_ref()
            .and_then(|json| json.get(field))
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait RequestClient: Send + Sync {
    /// Performs exactly one call against `path` on the configured backend.
    async fn call(
        &self,
        path: &str,
        method: HttpMethod,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<ApiResponse, RequestError>;

    /// Points subsequent calls at a different backend.
    fn set_base_url(&self, base_url: &str);

    fn base_url(&self) -> String;
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Absence of a key is `Ok(None)`, never an error.
    async fn get(&self, key: &str) -> PortResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> PortResult<()>;
    async fn remove(&self, key: &str) -> PortResult<()>;
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    fn is_available(&self) -> bool;

    /// Listens until an utterance is recognized or `cancel` fires.
    /// A cancelled capture yields `Ok(None)`.
    async fn listen(&self, locale: &str, cancel: CancellationToken) -> PortResult<Option<String>>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn is_available(&self) -> bool;

    async fn speak(&self, text: &str, locale: &str) -> PortResult<()>;

    async fn stop(&self) -> PortResult<()>;
}
