//! crates/learning_assistant_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! Types that are persisted through the key-value store derive serde; wire
//! formats of the remote backend live in the adapters instead.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two navigational roles a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }

    /// Lenient parse used for server payloads: anything that is not
    /// "teacher" lands on the student dashboard.
    pub fn from_wire(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// The authenticated identity held by this device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Role,
    pub token: String,
    pub issued_at: DateTime<Utc>,
    /// `None` means the session never expires on the client side.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user_id: String, email: Option<String>, role: Role, token: String) -> Self {
        Self {
            user_id,
            email,
            role,
            token,
            issued_at: Utc::now(),
            expires_at: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.expires_at = ttl.map(|ttl| self.issued_at + ttl);
        self
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    /// The cached user record: the session without its token.
    pub fn user(&self) -> User {
        User {
            id: self.user_id.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }

    pub fn is_local(&self) -> bool {
        self.token.starts_with(LOCAL_TOKEN_PREFIX)
    }
}

/// Prefix of every token minted on-device.
pub const LOCAL_TOKEN_PREFIX: &str = "local-";

// Represents a user - the part of the session shown by the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Role,
}

/// A credential record created and verified entirely on-device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAccount {
    /// 8-digit numeric identifier, unique within the local table.
    pub id: String,
    /// Lower-cased email, unique within the local table.
    pub email: String,
    /// Argon2 PHC string; the plaintext password is never persisted.
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl LocalAccount {
    pub fn session(&self, ttl: Option<Duration>) -> Session {
        Session::new(
            self.id.clone(),
            Some(self.email.clone()),
            self.role,
            format!("{}{}", LOCAL_TOKEN_PREFIX, self.id),
        )
        .with_ttl(ttl)
    }
}

/// One labeled block of an explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationSection {
    pub heading: String,
    pub content: String,
}

impl ExplanationSection {
    pub fn new(heading: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            content: content.into(),
        }
    }
}

/// Every multiple-choice question offers exactly this many options.
pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: [String; OPTIONS_PER_QUESTION],
    pub correct_answer_index: usize,
}

/// A saved explanation, kept most-recent-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub topic: String,
    pub sections: Vec<ExplanationSection>,
}
