//! services/assistant/src/error.rs
//!
//! Defines the primary error type for the entire assistant service.

use crate::app::auth::AuthError;
use crate::app::local_auth::LocalAuthError;
use crate::config::ConfigError;
use learning_assistant_core::ports::{PortError, RequestError};
use learning_assistant_core::QuizError;

/// The primary error type for the `assistant` service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// A classified failure of an outbound request.
    #[error("Request Error: {0}")]
    Request(#[from] RequestError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    LocalAuth(#[from] LocalAuthError),

    #[error(transparent)]
    Quiz(#[from] QuizError),

    /// Input rejected before any work was attempted.
    #[error("{0}")]
    Validation(String),

    /// The same action is already running or was triggered too recently.
    #[error("'{0}' is already in progress")]
    Busy(&'static str),

    /// Represents a standard Input/Output error (e.g., reading the terminal).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
