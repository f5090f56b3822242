//! services/assistant/src/app/study.rs
//!
//! The content flows: explain a topic, solve a free-text doubt, draft a
//! lesson plan. Each one follows the same pipeline (backend, language
//! filter, parser) and substitutes the offline explanation when the backend
//! fails or sends nothing.

use crate::adapters::backend::{DoubtPayload, SummaryPayload};
use crate::adapters::AssistantBackend;
use crate::app::credentials::CredentialStore;
use crate::app::language::LanguageFilter;
use crate::config::LearnerProfile;
use crate::error::AppError;
use learning_assistant_core::domain::{ExplanationSection, Note};
use learning_assistant_core::ports::RequestError;
use learning_assistant_core::{local_explanation, parse_explanation, Language};
use tracing::{info, warn};

/// Who is asking, and in which language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub language: Language,
}

impl UserContext {
    pub fn anonymous(language: Language) -> Self {
        Self {
            token: None,
            user_id: None,
            language,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub title: String,
    pub topic: String,
    pub sections: Vec<ExplanationSection>,
    /// True when the sections were generated on-device.
    pub offline: bool,
}

#[derive(Clone)]
pub struct StudyService {
    backend: AssistantBackend,
    filter: LanguageFilter,
    credentials: CredentialStore,
    profile: LearnerProfile,
}

impl StudyService {
    pub fn new(backend: AssistantBackend, credentials: CredentialStore, profile: LearnerProfile) -> Self {
        Self {
            filter: LanguageFilter::new(backend.clone()),
            backend,
            credentials,
            profile,
        }
    }

    pub async fn explain(&self, ctx: &UserContext, topic: &str) -> Result<Explanation, AppError> {
        let topic = required(topic, "Please enter a topic")?;
        let payload = SummaryPayload {
            topic,
            grade: &self.profile.grade,
            board: &self.profile.board,
            lang: ctx.language.code(),
        };
        let result = self.backend.summary(&payload, ctx.token()).await;
        let explanation = self
            .finish(ctx, format!("Explanation — {}", topic), topic, result)
            .await;
        Ok(explanation)
    }

    /// The offline fallback for a doubt uses the question as its topic.
    pub async fn solve_doubt(&self, ctx: &UserContext, question: &str) -> Result<Explanation, AppError> {
        let question = required(question, "Please type your doubt")?;
        let payload = DoubtPayload {
            question,
            grade: &self.profile.grade,
            lang: ctx.language.code(),
        };
        let result = self.backend.doubt(&payload, ctx.token()).await;
        Ok(self
            .finish(ctx, "Doubt — Explained".to_string(), question, result)
            .await)
    }

    pub async fn lesson_plan(&self, ctx: &UserContext, topic: &str) -> Result<Explanation, AppError> {
        let topic = required(topic, "Please enter a topic")?;
        let payload = SummaryPayload {
            topic,
            grade: &self.profile.grade,
            board: &self.profile.board,
            lang: ctx.language.code(),
        };
        let result = self.backend.summary(&payload, ctx.token()).await;
        Ok(self
            .finish(ctx, format!("Lesson Plan — {}", topic), topic, result)
            .await)
    }

    async fn finish(
        &self,
        ctx: &UserContext,
        title: String,
        topic: &str,
        result: Result<String, RequestError>,
    ) -> Explanation {
        let text = match result {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                warn!("Backend returned no content for '{}', using offline explanation", topic);
                None
            }
            Err(e) => {
                warn!("Content request for '{}' failed, using offline explanation: {}", topic, e);
                None
            }
        };

        let (sections, offline) = match text {
            Some(text) => {
                let text = self
                    .filter
                    .ensure(&text, ctx.language.code(), ctx.token())
                    .await;
                (parse_explanation(&text), false)
            }
            None => (local_explanation(topic), true),
        };
        info!("Prepared '{}' with {} sections (offline: {})", title, sections.len(), offline);

        Explanation {
            title,
            topic: topic.to_string(),
            sections,
            offline,
        }
    }

    pub async fn save_note(&self, explanation: &Explanation) -> Result<Note, AppError> {
        Ok(self
            .credentials
            .add_note(&explanation.title, &explanation.topic, &explanation.sections)
            .await?)
    }

    pub async fn notes(&self) -> Result<Vec<Note>, AppError> {
        Ok(self.credentials.notes().await?)
    }
}

fn required<'a>(value: &'a str, message: &str) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(value)
}
