//! Keeps generated text in the script of the selected language.

use crate::adapters::AssistantBackend;
use learning_assistant_core::needs_translation;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct LanguageFilter {
    backend: AssistantBackend,
}

impl LanguageFilter {
    pub fn new(backend: AssistantBackend) -> Self {
        Self { backend }
    }

    /// Returns `text` in the target script when possible. Never fails; any
    /// translation problem yields the original text.
    pub async fn ensure(&self, text: &str, language_code: &str, token: Option<&str>) -> String {
        if !needs_translation(text, language_code) {
            return text.to_string();
        }
        debug!("Text is not in the '{}' script, translating", language_code);
        match self.backend.translate(text, language_code, token).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!("Translation to '{}' failed, keeping original: {}", language_code, e);
                text.to_string()
            }
        }
    }
}
