//! services/assistant/src/app/credentials.rs
//!
//! The credential store: typed access to every value this client persists
//! (session, cached user, API base, language, local accounts, notes) on top
//! of the `KeyValueStore` port. Every value is stored as a JSON string.

use crate::config::normalize_base_url;
use chrono::Utc;
use learning_assistant_core::domain::{ExplanationSection, LocalAccount, Note, Session, User};
use learning_assistant_core::ports::{KeyValueStore, PortError, PortResult};
use learning_assistant_core::Language;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

pub const K_API: &str = "tm_api_base";
pub const K_TOKEN: &str = "tm_token";
pub const K_USER: &str = "tm_user";
pub const K_SESSION: &str = "tm_session";
pub const K_LANG: &str = "tm_lang";
pub const K_LOCAL_USERS: &str = "tm_local_users";
pub const K_NOTES: &str = "tm_notes";

#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
    notes_lock: Arc<Mutex<()>>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            notes_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Reads a JSON value. A value that no longer parses is treated as unset.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> PortResult<Option<T>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Ignoring malformed value under '{}': {}", key, e);
                Ok(None)
            }
        }
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> PortResult<()> {
        let raw = serde_json::to_string(value).map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.store.set(key, &raw).await
    }

    // --- Session ---

    pub async fn save_session(&self, session: &Session) -> PortResult<()> {
        self.write_json(K_TOKEN, &session.token).await?;
        self.write_json(K_USER, &session.user()).await?;
        self.write_json(K_SESSION, session).await
    }

    pub async fn session(&self) -> PortResult<Option<Session>> {
        self.read_json(K_SESSION).await
    }

    pub async fn token(&self) -> PortResult<Option<String>> {
        self.read_json(K_TOKEN).await
    }

    pub async fn user(&self) -> PortResult<Option<User>> {
        self.read_json(K_USER).await
    }

    pub async fn clear_session(&self) -> PortResult<()> {
        for key in [K_TOKEN, K_USER, K_SESSION] {
            self.store.remove(key).await?;
        }
        Ok(())
    }

    // --- Settings ---

    pub async fn api_base(&self) -> PortResult<Option<String>> {
        Ok(self
            .read_json::<String>(K_API)
            .await?
            .filter(|url| !url.is_empty()))
    }

    /// Stores the normalized base URL and returns it.
    pub async fn set_api_base(&self, url: &str) -> PortResult<String> {
        let clean = normalize_base_url(url);
        self.write_json(K_API, &clean).await?;
        info!("API base set to '{}'", clean);
        Ok(clean)
    }

    pub async fn language(&self) -> PortResult<Option<Language>> {
        Ok(self
            .read_json::<String>(K_LANG)
            .await?
            .and_then(|code| Language::from_code(&code)))
    }

    pub async fn set_language(&self, language: Language) -> PortResult<()> {
        self.write_json(K_LANG, language.code()).await
    }

    // --- Local accounts ---

    pub async fn local_accounts(&self) -> PortResult<Vec<LocalAccount>> {
        Ok(self.read_json(K_LOCAL_USERS).await?.unwrap_or_default())
    }

    /// Replaces the whole local account table.
    pub async fn save_local_accounts(&self, accounts: &[LocalAccount]) -> PortResult<()> {
        self.write_json(K_LOCAL_USERS, accounts).await
    }

    // --- Notes ---

    /// Most recent first.
    pub async fn notes(&self) -> PortResult<Vec<Note>> {
        Ok(self.read_json(K_NOTES).await?.unwrap_or_default())
    }

    pub async fn add_note(
        &self,
        title: &str,
        topic: &str,
        sections: &[ExplanationSection],
    ) -> PortResult<Note> {
        let _guard = self.notes_lock.lock().await;
        let note = Note {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            title: title.to_string(),
            topic: topic.to_string(),
            sections: sections.to_vec(),
        };
        let mut notes = self.notes().await?;
        notes.insert(0, note.clone());
        self.write_json(K_NOTES, &notes).await?;
        info!("Saved note '{}' ({} notes)", note.title, notes.len());
        Ok(note)
    }
}
