//! services/assistant/src/adapters/backend.rs
//!
//! Typed access to the remote AI backend. Every endpoint goes through the
//! `RequestClient` port; this module owns the request payloads and the wire
//! records, and maps them to domain types.

use learning_assistant_core::domain::{QuizQuestion, Role, Session, OPTIONS_PER_QUESTION};
use learning_assistant_core::ports::{ApiResponse, HttpMethod, RequestClient, RequestError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const SUMMARY_PATH: &str = "/ai/summary";
pub const DOUBT_PATH: &str = "/ai/doubt";
pub const TEST_PATH: &str = "/ai/test";
pub const TRANSLATE_PATH: &str = "/translate";
pub const TEACHER_EVENTS_PATH: &str = "/events/teacher";

//=========================================================================================
// Request Payloads
//=========================================================================================

#[derive(Serialize, Debug)]
pub struct LoginPayload<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Debug)]
pub struct RegisterPayload<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
}

#[derive(Serialize, Debug)]
pub struct SummaryPayload<'a> {
    pub topic: &'a str,
    pub grade: &'a str,
    pub board: &'a str,
    pub lang: &'a str,
}

#[derive(Serialize, Debug)]
pub struct DoubtPayload<'a> {
    pub question: &'a str,
    pub grade: &'a str,
    pub lang: &'a str,
}

#[derive(Serialize, Debug)]
pub struct TestPayload<'a> {
    pub topic: &'a str,
    pub count: usize,
    pub grade: &'a str,
    pub board: &'a str,
    pub lang: &'a str,
}

#[derive(Serialize, Debug)]
struct TranslatePayload<'a> {
    text: &'a str,
    to: &'a str,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeacherEventPayload {
    pub teacher_id: String,
    pub action: String,
    pub topic: String,
    pub grade: String,
    pub board: String,
    pub locale: String,
}

//=========================================================================================
// "Impure" Wire Records
//=========================================================================================

#[derive(Deserialize, Debug)]
struct AuthRecord {
    token: Option<String>,
    id: Option<Value>,
    email: Option<String>,
    role: Option<String>,
}

impl AuthRecord {
    /// A success without a token is not a usable login.
    fn to_domain(self, ttl: Option<chrono::Duration>) -> Result<Session, RequestError> {
        let token = self
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| RequestError::InvalidResponse("response has no token".to_string()))?;
        let user_id = match self.id {
            Some(Value::String(id)) => id,
            Some(Value::Number(id)) => id.to_string(),
            _ => String::new(),
        };
        let role = self.role.as_deref().map(Role::from_wire).unwrap_or_default();
        Ok(Session::new(user_id, self.email, role, token).with_ttl(ttl))
    }
}

#[derive(Deserialize, Debug)]
struct McqRecord {
    q: String,
    options: Vec<String>,
    a: usize,
}

impl McqRecord {
    fn to_domain(self) -> Result<QuizQuestion, RequestError> {
        let options: [String; OPTIONS_PER_QUESTION] = self.options.try_into().map_err(|v: Vec<String>| {
            RequestError::InvalidResponse(format!("question has {} options", v.len()))
        })?;
        if self.a >= OPTIONS_PER_QUESTION {
            return Err(RequestError::InvalidResponse(format!(
                "answer index {} out of range",
                self.a
            )));
        }
        Ok(QuizQuestion {
            prompt: self.q,
            options,
            correct_answer_index: self.a,
        })
    }
}

/// Text content of a generation response: the named field, else `text`, else
/// the raw body when it was not JSON at all.
fn content_text(response: &ApiResponse, field: &str) -> String {
    if let Some(text) = response.str_field(field).or_else(|| response.str_field("text")) {
        return text.to_string();
    }
    match response.json {
        None => response.text.trim().to_string(),
        Some(_) => String::new(),
    }
}

fn to_body<T: Serialize>(payload: &T) -> Result<Value, RequestError> {
    serde_json::to_value(payload).map_err(|e| RequestError::InvalidResponse(e.to_string()))
}

fn parse_json<T: for<'de> Deserialize<'de>>(response: ApiResponse) -> Result<T, RequestError> {
    let json = response
        .json
        .ok_or_else(|| RequestError::InvalidResponse("body is not JSON".to_string()))?;
    serde_json::from_value(json).map_err(|e| RequestError::InvalidResponse(e.to_string()))
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct AssistantBackend {
    client: Arc<dyn RequestClient>,
}

impl AssistantBackend {
    pub fn new(client: Arc<dyn RequestClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<dyn RequestClient> {
        &self.client
    }

    async fn post<T: Serialize>(
        &self,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<ApiResponse, RequestError> {
        let body = to_body(payload)?;
        self.client.call(path, HttpMethod::Post, Some(&body), token).await
    }

    pub async fn login(
        &self,
        payload: &LoginPayload<'_>,
        ttl: Option<chrono::Duration>,
    ) -> Result<Session, RequestError> {
        let response = self.post(LOGIN_PATH, payload, None).await?;
        parse_json::<AuthRecord>(response)?.to_domain(ttl)
    }

    pub async fn register(
        &self,
        payload: &RegisterPayload<'_>,
        ttl: Option<chrono::Duration>,
    ) -> Result<Session, RequestError> {
        let response = self.post(REGISTER_PATH, payload, None).await?;
        parse_json::<AuthRecord>(response)?.to_domain(ttl)
    }

    /// Returns the generated explanation; empty when the backend sent none.
    pub async fn summary(
        &self,
        payload: &SummaryPayload<'_>,
        token: Option<&str>,
    ) -> Result<String, RequestError> {
        let response = self.post(SUMMARY_PATH, payload, token).await?;
        Ok(content_text(&response, "summary"))
    }

    pub async fn doubt(
        &self,
        payload: &DoubtPayload<'_>,
        token: Option<&str>,
    ) -> Result<String, RequestError> {
        let response = self.post(DOUBT_PATH, payload, token).await?;
        Ok(content_text(&response, "answer"))
    }

    /// Fetches a quiz. Anything other than a well-formed `mcq` array of
    /// exactly `payload.count` items is an invalid response.
    pub async fn test(
        &self,
        payload: &TestPayload<'_>,
        token: Option<&str>,
    ) -> Result<Vec<QuizQuestion>, RequestError> {
        #[derive(Deserialize)]
        struct TestRecord {
            mcq: Vec<McqRecord>,
        }

        let response = self.post(TEST_PATH, payload, token).await?;
        let record: TestRecord = parse_json(response)?;
        if record.mcq.len() != payload.count {
            return Err(RequestError::InvalidResponse(format!(
                "expected {} questions, got {}",
                payload.count,
                record.mcq.len()
            )));
        }
        record.mcq.into_iter().map(McqRecord::to_domain).collect()
    }

    pub async fn translate(
        &self,
        text: &str,
        to: &str,
        token: Option<&str>,
    ) -> Result<String, RequestError> {
        let response = self
            .post(TRANSLATE_PATH, &TranslatePayload { text, to }, token)
            .await?;
        response
            .str_field("text")
            .map(str::to_string)
            .ok_or_else(|| RequestError::InvalidResponse("translation has no text".to_string()))
    }

    pub async fn teacher_event(
        &self,
        payload: &TeacherEventPayload,
        token: Option<&str>,
    ) -> Result<(), RequestError> {
        self.post(TEACHER_EVENTS_PATH, payload, token).await.map(|_| ())
    }
}
