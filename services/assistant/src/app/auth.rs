//! services/assistant/src/app/auth.rs
//!
//! The auth orchestrator. Login and registration walk an ordered list of
//! providers (remote first, then local) until one succeeds; the orchestrator
//! is the only component that produces and persists a logged-in session.

use crate::adapters::backend::{AssistantBackend, LoginPayload, RegisterPayload};
use crate::app::credentials::CredentialStore;
use crate::app::local_auth::{LocalAuthError, LocalAuthService};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use learning_assistant_core::domain::{Role, Session};
use learning_assistant_core::ports::{PortError, PortResult, RequestError};
use std::sync::Arc;
use tracing::{debug, info, warn};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    Remote,
    Local,
}

#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub session: Session,
    pub source: AuthSource,
}

impl AuthOutcome {
    /// The dashboard the UI should navigate to.
    pub fn destination(&self) -> Role {
        self.session.role
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Remote(#[from] RequestError),
    #[error(transparent)]
    Local(#[from] LocalAuthError),
    #[error("No authentication provider configured")]
    NoProviders,
    #[error("Failed to persist session: {0}")]
    Storage(#[from] PortError),
}

//=========================================================================================
// Providers
//=========================================================================================

#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn source(&self) -> AuthSource;
    async fn login(&self, request: &LoginRequest) -> Result<Session, AuthError>;
    async fn register(&self, request: &RegisterRequest) -> Result<Session, AuthError>;
}

/// Authenticates against the backend's `/auth` endpoints.
pub struct RemoteAuthProvider {
    backend: AssistantBackend,
    session_ttl: Option<Duration>,
}

impl RemoteAuthProvider {
    pub fn new(backend: AssistantBackend, session_ttl: Option<Duration>) -> Self {
        Self { backend, session_ttl }
    }
}

#[async_trait]
impl AuthProvider for RemoteAuthProvider {
    fn source(&self) -> AuthSource {
        AuthSource::Remote
    }

    async fn login(&self, request: &LoginRequest) -> Result<Session, AuthError> {
        let payload = LoginPayload {
            identifier: &request.identifier,
            password: &request.password,
        };
        Ok(self.backend.login(&payload, self.session_ttl).await?)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Session, AuthError> {
        let payload = RegisterPayload {
            email: &request.email,
            password: &request.password,
            role: request.role,
        };
        Ok(self.backend.register(&payload, self.session_ttl).await?)
    }
}

/// Authenticates against the on-device account table.
pub struct LocalAuthProvider {
    service: Arc<LocalAuthService>,
}

impl LocalAuthProvider {
    pub fn new(service: Arc<LocalAuthService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    fn source(&self) -> AuthSource {
        AuthSource::Local
    }

    async fn login(&self, request: &LoginRequest) -> Result<Session, AuthError> {
        Ok(self.service.login(&request.identifier, &request.password).await?)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Session, AuthError> {
        Ok(self
            .service
            .register(&request.email, &request.password, request.role)
            .await?)
    }
}

//=========================================================================================
// The Orchestrator
//=========================================================================================

enum Attempt {
    Login(LoginRequest),
    Register(RegisterRequest),
}

pub struct AuthOrchestrator {
    providers: Vec<Arc<dyn AuthProvider>>,
    credentials: CredentialStore,
}

impl AuthOrchestrator {
    pub fn new(providers: Vec<Arc<dyn AuthProvider>>, credentials: CredentialStore) -> Self {
        Self {
            providers,
            credentials,
        }
    }

    /// The standard chain: the backend first, the device second.
    pub fn remote_then_local(
        backend: AssistantBackend,
        local: Arc<LocalAuthService>,
        credentials: CredentialStore,
        session_ttl: Option<Duration>,
    ) -> Self {
        Self::new(
            vec![
                Arc::new(RemoteAuthProvider::new(backend, session_ttl)),
                Arc::new(LocalAuthProvider::new(local)),
            ],
            credentials,
        )
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Result<AuthOutcome, AuthError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(AuthError::Validation("Email or User ID required".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("Password required".to_string()));
        }
        self.run(Attempt::Login(LoginRequest {
            identifier: identifier.to_string(),
            password: password.to_string(),
        }))
        .await
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<AuthOutcome, AuthError> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(AuthError::Validation("Valid email required".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("Password required".to_string()));
        }
        self.run(Attempt::Register(RegisterRequest {
            email,
            password: password.to_string(),
            role,
        }))
        .await
    }

    async fn run(&self, attempt: Attempt) -> Result<AuthOutcome, AuthError> {
        let mut last_error = AuthError::NoProviders;
        for provider in &self.providers {
            debug!("Auth attempt via {:?}", provider.source());
            let result = match &attempt {
                Attempt::Login(request) => provider.login(request).await,
                Attempt::Register(request) => provider.register(request).await,
            };
            match result {
                Ok(session) => {
                    self.credentials.save_session(&session).await?;
                    info!(
                        "Authenticated user '{}' as {} via {:?}",
                        session.user_id,
                        session.role,
                        provider.source()
                    );
                    return Ok(AuthOutcome {
                        session,
                        source: provider.source(),
                    });
                }
                Err(e) => {
                    warn!("Auth via {:?} failed: {}", provider.source(), e);
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    pub async fn logout(&self) -> PortResult<()> {
        self.credentials.clear_session().await?;
        info!("Logged out");
        Ok(())
    }

    /// The persisted session, unless it has expired (in which case it is removed).
    pub async fn restore(&self) -> PortResult<Option<Session>> {
        let Some(session) = self.credentials.session().await? else {
            return Ok(None);
        };
        if session.is_expired(Utc::now()) {
            info!("Session for user '{}' expired", session.user_id);
            self.credentials.clear_session().await?;
            return Ok(None);
        }
        Ok(Some(session))
    }
}
