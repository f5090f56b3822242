//! Test doubles shared by the unit tests of the service layer.

use crate::adapters::MemoryStore;
use crate::app::credentials::CredentialStore;
use async_trait::async_trait;
use learning_assistant_core::ports::{ApiResponse, HttpMethod, RequestClient, RequestError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub body: Option<Value>,
    pub token: Option<String>,
}

/// A `RequestClient` that answers from a per-path script. Unscripted paths
/// behave like an unreachable server.
#[derive(Default)]
pub struct ScriptedClient {
    responses: Mutex<HashMap<String, Result<ApiResponse, RequestError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    base_url: Mutex<String>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, json: Value) {
        let response = ApiResponse {
            status: 200,
            text: json.to_string(),
            json: Some(json),
        };
        self.responses.lock().unwrap().insert(path.to_string(), Ok(response));
    }

    pub fn respond_raw(&self, path: &str, text: &str) {
        let response = ApiResponse {
            status: 200,
            json: None,
            text: text.to_string(),
        };
        self.responses.lock().unwrap().insert(path.to_string(), Ok(response));
    }

    pub fn fail(&self, path: &str, error: RequestError) {
        self.responses.lock().unwrap().insert(path.to_string(), Err(error));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|call| call.path == path).collect()
    }
}

#[async_trait]
impl RequestClient for ScriptedClient {
    async fn call(
        &self,
        path: &str,
        _method: HttpMethod,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<ApiResponse, RequestError> {
        self.calls.lock().unwrap().push(RecordedCall {
            path: path.to_string(),
            body: body.cloned(),
            token: token.map(str::to_string),
        });
        self.responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(RequestError::NetworkUnreachable("no route to host".to_string())))
    }

    fn set_base_url(&self, base_url: &str) {
        *self.base_url.lock().unwrap() = base_url.to_string();
    }

    fn base_url(&self) -> String {
        self.base_url.lock().unwrap().clone()
    }
}

pub fn memory_credentials() -> CredentialStore {
    CredentialStore::new(Arc::new(MemoryStore::new()))
}
