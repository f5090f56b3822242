//! services/assistant/src/app/state.rs
//!
//! Defines the application state shared by every front-end command.

use crate::adapters::{AssistantBackend, HttpRequestClient, JsonFileStore, SpeechCapabilities};
use crate::app::auth::AuthOrchestrator;
use crate::app::credentials::CredentialStore;
use crate::app::gate::ActionGate;
use crate::app::local_auth::LocalAuthService;
use crate::app::quiz::QuizEngine;
use crate::app::study::{StudyService, UserContext};
use crate::app::teacher::TeacherService;
use crate::app::voice::VoiceCapture;
use crate::config::{normalize_base_url, Config};
use crate::error::AppError;
use learning_assistant_core::ports::{KeyValueStore, RequestClient};
use learning_assistant_core::Language;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Created once at startup; every service shares the same request client
/// and credential store.
pub struct AppState {
    pub config: Arc<Config>,
    pub client: Arc<dyn RequestClient>,
    pub credentials: CredentialStore,
    pub auth: AuthOrchestrator,
    pub study: StudyService,
    pub teacher: TeacherService,
    pub quiz: Mutex<QuizEngine>,
    pub voice: VoiceCapture,
    pub gate: ActionGate,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        client: Arc<dyn RequestClient>,
        store: Arc<dyn KeyValueStore>,
        speech: SpeechCapabilities,
    ) -> Self {
        let backend = AssistantBackend::new(client.clone());
        let credentials = CredentialStore::new(store);
        let local = Arc::new(LocalAuthService::new(credentials.clone(), config.session_ttl));
        let auth = AuthOrchestrator::remote_then_local(
            backend.clone(),
            local,
            credentials.clone(),
            config.session_ttl,
        );
        let study = StudyService::new(backend.clone(), credentials.clone(), config.profile.clone());
        let teacher = TeacherService::new(backend.clone(), study.clone(), config.profile.clone());
        let quiz = QuizEngine::new(backend, config.profile.clone());

        Self {
            gate: ActionGate::new(config.action_debounce),
            voice: VoiceCapture::new(speech),
            quiz: Mutex::new(quiz),
            teacher,
            study,
            auth,
            credentials,
            client,
            config,
        }
    }

    /// Production wiring: HTTP client, file store in the data directory,
    /// speech disabled.
    pub async fn from_config(config: Arc<Config>) -> Result<Self, AppError> {
        let client = HttpRequestClient::new(&config.api_base_url, config.request_timeout)
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        let store = JsonFileStore::open(&config.data_dir).await?;
        let state = Self::new(
            config,
            Arc::new(client),
            Arc::new(store),
            SpeechCapabilities::disabled(),
        );
        state.bootstrap().await?;
        Ok(state)
    }

    /// Applies persisted settings that override the configuration.
    pub async fn bootstrap(&self) -> Result<(), AppError> {
        if let Some(base) = self.credentials.api_base().await? {
            info!("Using saved API base '{}'", base);
            self.client.set_base_url(&base);
        }
        Ok(())
    }

    pub async fn language(&self) -> Result<Language, AppError> {
        Ok(self
            .credentials
            .language()
            .await?
            .unwrap_or(self.config.default_language))
    }

    pub async fn set_language(&self, language: Language) -> Result<(), AppError> {
        self.credentials.set_language(language).await?;
        info!("Language set to {} (rtl: {})", language.label(), language.is_rtl());
        Ok(())
    }

    pub async fn set_api_base(&self, url: &str) -> Result<String, AppError> {
        if normalize_base_url(url).is_empty() {
            return Err(AppError::Validation("API base URL required".to_string()));
        }
        let clean = self.credentials.set_api_base(url).await?;
        self.client.set_base_url(&clean);
        Ok(clean)
    }

    /// The current user (if the session is still valid) and language.
    pub async fn context(&self) -> Result<UserContext, AppError> {
        let session = self.auth.restore().await?;
        Ok(UserContext {
            token: session.as_ref().map(|s| s.token.clone()),
            user_id: session.map(|s| s.user_id),
            language: self.language().await?,
        })
    }
}
