//! services/assistant/src/app/quiz.rs
//!
//! The quiz engine: loads a quiz (remote, or the offline quiz when the backend
//! cannot deliver a well-formed one) and drives the attempt through answering,
//! submission and retry.

use crate::adapters::backend::TestPayload;
use crate::adapters::AssistantBackend;
use crate::app::study::UserContext;
use crate::config::LearnerProfile;
use learning_assistant_core::domain::QuizQuestion;
use learning_assistant_core::ports::RequestError;
use learning_assistant_core::{clamp_question_count, local_quiz, QuizAttempt, QuizError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

/// What a load produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizLoad {
    pub questions: usize,
    /// True when the offline quiz was substituted.
    pub offline: bool,
}

/// Requests `count` questions (already clamped) for `topic`. Callers
/// substitute the offline quiz on any error.
pub async fn request_questions(
    backend: &AssistantBackend,
    profile: &LearnerProfile,
    ctx: &UserContext,
    topic: &str,
    count: usize,
) -> Result<Vec<QuizQuestion>, RequestError> {
    let payload = TestPayload {
        topic,
        count,
        grade: &profile.grade,
        board: &profile.board,
        lang: ctx.language.code(),
    };
    backend.test(&payload, ctx.token()).await.map_err(|e| {
        warn!("Quiz request for '{}' failed, using offline quiz: {}", topic, e);
        e
    })
}

pub struct QuizEngine {
    backend: AssistantBackend,
    profile: LearnerProfile,
    rng: StdRng,
    attempt: Option<QuizAttempt>,
    count: usize,
}

impl QuizEngine {
    pub fn new(backend: AssistantBackend, profile: LearnerProfile) -> Self {
        Self::with_rng(backend, profile, StdRng::from_entropy())
    }

    pub fn with_rng(backend: AssistantBackend, profile: LearnerProfile, rng: StdRng) -> Self {
        Self {
            backend,
            profile,
            rng,
            attempt: None,
            count: 0,
        }
    }

    /// Replaces the current attempt with a fresh one.
    pub async fn load(
        &mut self,
        ctx: &UserContext,
        topic: &str,
        count: usize,
    ) -> Result<QuizLoad, QuizError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(QuizError::EmptyTopic);
        }
        let count = clamp_question_count(count);

        let (questions, offline) =
            match request_questions(&self.backend, &self.profile, ctx, topic, count).await {
                Ok(questions) => (questions, false),
                Err(_) => (local_quiz(topic, count, &mut self.rng), true),
            };
        info!("Loaded {} questions on '{}' (offline: {})", questions.len(), topic, offline);

        let load = QuizLoad {
            questions: questions.len(),
            offline,
        };
        self.attempt = Some(QuizAttempt::new(topic, questions));
        self.count = count;
        Ok(load)
    }

    pub fn attempt(&self) -> Option<&QuizAttempt> {
        self.attempt.as_ref()
    }

    pub fn select_answer(&mut self, question: usize, option: usize) -> Result<bool, QuizError> {
        self.attempt_mut()?.select_answer(question, option)
    }

    pub fn submit(&mut self) -> Result<usize, QuizError> {
        let score = self.attempt_mut()?.submit()?;
        info!("Quiz submitted with score {}", score);
        Ok(score)
    }

    /// Clears the answers of the current attempt without reloading it.
    pub fn reset(&mut self) -> Result<(), QuizError> {
        self.attempt_mut()?.reset_answers();
        Ok(())
    }

    /// Loads a new attempt for the same topic and question count.
    pub async fn retry(&mut self, ctx: &UserContext) -> Result<QuizLoad, QuizError> {
        let topic = self
            .attempt
            .as_ref()
            .map(|attempt| attempt.topic().to_string())
            .ok_or(QuizError::NotLoaded)?;
        let count = self.count;
        self.load(ctx, &topic, count).await
    }

    fn attempt_mut(&mut self) -> Result<&mut QuizAttempt, QuizError> {
        self.attempt.as_mut().ok_or(QuizError::NotLoaded)
    }
}
