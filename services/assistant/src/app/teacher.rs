//! Teacher tools: lesson plans, test generation and topic search. Every
//! action reports a telemetry event to the backend without waiting on it.

use crate::adapters::backend::TeacherEventPayload;
use crate::adapters::AssistantBackend;
use crate::app::quiz::request_questions;
use crate::app::study::{Explanation, StudyService, UserContext};
use crate::config::LearnerProfile;
use crate::error::AppError;
use learning_assistant_core::domain::QuizQuestion;
use learning_assistant_core::local_quiz;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Generated tests always have this many questions.
pub const TEACHER_TEST_QUESTIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeacherAction {
    Open,
    TestGenerate,
    Search,
}

impl TeacherAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeacherAction::Open => "open",
            TeacherAction::TestGenerate => "test_generate",
            TeacherAction::Search => "search",
        }
    }
}

impl fmt::Display for TeacherAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedTest {
    pub topic: String,
    pub questions: Vec<QuizQuestion>,
    pub offline: bool,
}

pub struct TeacherService {
    backend: AssistantBackend,
    study: StudyService,
    profile: LearnerProfile,
    rng: Mutex<StdRng>,
}

impl TeacherService {
    pub fn new(backend: AssistantBackend, study: StudyService, profile: LearnerProfile) -> Self {
        Self::with_rng(backend, study, profile, StdRng::from_entropy())
    }

    pub fn with_rng(
        backend: AssistantBackend,
        study: StudyService,
        profile: LearnerProfile,
        rng: StdRng,
    ) -> Self {
        Self {
            backend,
            study,
            profile,
            rng: Mutex::new(rng),
        }
    }

    /// Sends a telemetry event in the background. Skipped without a logged-in
    /// user; failures are only logged. The handle is returned so callers may
    /// wait for delivery.
    pub fn emit(&self, ctx: &UserContext, action: TeacherAction, topic: &str) -> Option<JoinHandle<()>> {
        let Some(teacher_id) = ctx.user_id.clone().filter(|id| !id.is_empty()) else {
            debug!("Skipping '{}' event without a logged-in user", action);
            return None;
        };
        let payload = TeacherEventPayload {
            teacher_id,
            action: action.as_str().to_string(),
            topic: topic.to_string(),
            grade: self.profile.grade.clone(),
            board: self.profile.board.clone(),
            locale: self.profile.locale.clone(),
        };
        let backend = self.backend.clone();
        let token = ctx.token.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = backend.teacher_event(&payload, token.as_deref()).await {
                warn!("Dropped '{}' event: {}", payload.action, e);
            }
        }))
    }

    pub async fn lesson_plan(&self, ctx: &UserContext, topic: &str) -> Result<Explanation, AppError> {
        let topic = non_empty(topic)?;
        self.emit(ctx, TeacherAction::Open, topic);
        self.study.lesson_plan(ctx, topic).await
    }

    pub async fn generate_test(&self, ctx: &UserContext, topic: &str) -> Result<GeneratedTest, AppError> {
        let topic = non_empty(topic)?;
        self.emit(ctx, TeacherAction::TestGenerate, topic);
        let (questions, offline) =
            match request_questions(&self.backend, &self.profile, ctx, topic, TEACHER_TEST_QUESTIONS).await {
                Ok(questions) => (questions, false),
                Err(_) => {
                    let mut rng = self.rng.lock().await;
                    (local_quiz(topic, TEACHER_TEST_QUESTIONS, &mut *rng), true)
                }
            };
        Ok(GeneratedTest {
            topic: topic.to_string(),
            questions,
            offline,
        })
    }

    /// Records the search and explains the topic.
    pub async fn search(&self, ctx: &UserContext, topic: &str) -> Result<Explanation, AppError> {
        let topic = non_empty(topic)?;
        self.emit(ctx, TeacherAction::Search, topic);
        self.study.explain(ctx, topic).await
    }
}

fn non_empty(topic: &str) -> Result<&str, AppError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(AppError::Validation("Please enter a topic".to_string()));
    }
    Ok(topic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::backend::{TEACHER_EVENTS_PATH, TEST_PATH};
    use crate::app::testing::{memory_credentials, ScriptedClient};
    use learning_assistant_core::Language;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn service(client: &Arc<ScriptedClient>) -> TeacherService {
        let backend = AssistantBackend::new(client.clone());
        let profile = LearnerProfile::default();
        let study = StudyService::new(backend.clone(), memory_credentials(), profile.clone());
        TeacherService::with_rng(backend, study, profile, StdRng::seed_from_u64(5))
    }

    fn teacher() -> UserContext {
        UserContext {
            token: Some("tok".into()),
            user_id: Some("12345678".into()),
            language: Language::English,
        }
    }

    #[tokio::test]
    async fn events_carry_the_profile_and_user() {
        let client = Arc::new(ScriptedClient::new());
        client.respond(TEACHER_EVENTS_PATH, json!({ "ok": true }));
        let handle = service(&client).emit(&teacher(), TeacherAction::Search, "Optics").unwrap();
        handle.await.unwrap();

        let call = &client.calls_to(TEACHER_EVENTS_PATH)[0];
        assert_eq!(call.token.as_deref(), Some("tok"));
        assert_eq!(
            call.body,
            Some(json!({
                "teacherId": "12345678",
                "action": "search",
                "topic": "Optics",
                "grade": "Class 10",
                "board": "CBSE",
                "locale": "IN"
            }))
        );
    }

    #[tokio::test]
    async fn no_event_without_a_user() {
        let client = Arc::new(ScriptedClient::new());
        let ctx = UserContext::anonymous(Language::English);
        assert!(service(&client).emit(&ctx, TeacherAction::Open, "Optics").is_none());
    }

    #[tokio::test]
    async fn failed_events_do_not_affect_the_action() {
        let client = Arc::new(ScriptedClient::new());
        let plan = service(&client).lesson_plan(&teacher(), "Optics").await.unwrap();
        assert!(plan.offline);
        assert_eq!(plan.title, "Lesson Plan — Optics");
    }

    #[tokio::test]
    async fn generated_tests_have_ten_questions() {
        let client = Arc::new(ScriptedClient::new());
        let test = service(&client).generate_test(&teacher(), " Optics ").await.unwrap();
        assert_eq!(test.topic, "Optics");
        assert_eq!(test.questions.len(), TEACHER_TEST_QUESTIONS);
        assert!(test.offline);
        assert_eq!(client.calls_to(TEST_PATH)[0].body.as_ref().unwrap()["count"], 10);
    }

    #[tokio::test]
    async fn remote_tests_do_not_wait_for_the_fallback_rng() {
        let client = Arc::new(ScriptedClient::new());
        let item = json!({ "q": "?", "options": ["a", "b", "c", "d"], "a": 2 });
        client.respond(TEST_PATH, json!({ "mcq": vec![item; TEACHER_TEST_QUESTIONS] }));
        let s = service(&client);

        let _held = s.rng.lock().await;
        let test = tokio::time::timeout(Duration::from_secs(1), s.generate_test(&teacher(), "Optics"))
            .await
            .expect("generation blocked on the rng lock")
            .unwrap();
        assert!(!test.offline);
        assert_eq!(test.questions.len(), TEACHER_TEST_QUESTIONS);
    }

    #[tokio::test]
    async fn blank_topics_are_rejected() {
        let client = Arc::new(ScriptedClient::new());
        let s = service(&client);
        assert!(matches!(s.search(&teacher(), "").await, Err(AppError::Validation(_))));
        assert!(matches!(s.generate_test(&teacher(), " ").await, Err(AppError::Validation(_))));
        assert!(client.calls().is_empty());
    }
}
