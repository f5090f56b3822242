//! services/assistant/src/app/local_auth.rs
//!
//! On-device registration and login against the persisted local account
//! table. Used when the remote auth endpoints are unusable; it never touches
//! the network and is the last provider in the chain.

use crate::app::credentials::CredentialStore;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use learning_assistant_core::domain::{LocalAccount, Role, Session};
use learning_assistant_core::ports::PortError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;
use tracing::{error, info};

const MIN_LOCAL_ID: u32 = 10_000_000;
const MAX_LOCAL_ID: u32 = 99_999_999;

#[derive(Debug, thiserror::Error)]
pub enum LocalAuthError {
    #[error("Valid email required")]
    InvalidEmail,
    #[error("Password required")]
    MissingPassword,
    #[error("Email already registered (local)")]
    DuplicateEmail,
    #[error("User not found (local)")]
    UserNotFound,
    #[error("Incorrect password (local)")]
    WrongPassword,
    #[error("Local account storage failed: {0}")]
    Storage(#[from] PortError),
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

pub struct LocalAuthService {
    credentials: CredentialStore,
    /// Also serializes every read-modify-write of the account table.
    rng: Mutex<StdRng>,
    session_ttl: Option<Duration>,
}

impl LocalAuthService {
    pub fn new(credentials: CredentialStore, session_ttl: Option<Duration>) -> Self {
        Self::with_rng(credentials, session_ttl, StdRng::from_entropy())
    }

    pub fn with_rng(credentials: CredentialStore, session_ttl: Option<Duration>, rng: StdRng) -> Self {
        Self {
            credentials,
            rng: Mutex::new(rng),
            session_ttl,
        }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Session, LocalAuthError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(LocalAuthError::InvalidEmail);
        }
        if password.is_empty() {
            return Err(LocalAuthError::MissingPassword);
        }

        let mut rng = self.rng.lock().await;
        let mut accounts = self.credentials.local_accounts().await?;
        if accounts.iter().any(|account| account.email == email) {
            return Err(LocalAuthError::DuplicateEmail);
        }

        let id = loop {
            let candidate = rng.gen_range(MIN_LOCAL_ID..=MAX_LOCAL_ID).to_string();
            if !accounts.iter().any(|account| account.id == candidate) {
                break candidate;
            }
        };

        let account = LocalAccount {
            id,
            email,
            password_hash: hash_password(password)?,
            role,
            created_at: Utc::now(),
        };
        accounts.push(account.clone());
        self.credentials.save_local_accounts(&accounts).await?;
        info!("Registered local account {} ({} accounts)", account.id, accounts.len());

        Ok(account.session(self.session_ttl))
    }

    /// `identifier` is an email when it contains "@", otherwise a numeric id
    /// (non-digits are ignored, so "ID: 1234-5678" works).
    pub async fn login(&self, identifier: &str, password: &str) -> Result<Session, LocalAuthError> {
        let accounts = self.credentials.local_accounts().await?;

        let found = if identifier.contains('@') {
            let email = identifier.trim().to_lowercase();
            accounts.into_iter().find(|account| account.email == email)
        } else {
            let id: String = identifier.chars().filter(char::is_ascii_digit).collect();
            if id.is_empty() {
                None
            } else {
                accounts.into_iter().find(|account| account.id == id)
            }
        };
        let account = found.ok_or(LocalAuthError::UserNotFound)?;

        if password.is_empty() || !verify_password(password, &account.password_hash)? {
            return Err(LocalAuthError::WrongPassword);
        }
        info!("Local login for account {}", account.id);
        Ok(account.session(self.session_ttl))
    }
}

fn hash_password(password: &str) -> Result<String, LocalAuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            LocalAuthError::Hashing(e.to_string())
        })
}

fn verify_password(password: &str, stored_hash: &str) -> Result<bool, LocalAuthError> {
    let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        LocalAuthError::Hashing(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
