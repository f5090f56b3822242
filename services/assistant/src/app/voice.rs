//! Voice input and read-aloud on top of the speech ports.
//!
//! Only one capture runs at a time. Starting a new capture cancels the one in
//! progress; a cancelled capture yields no text.

use crate::adapters::SpeechCapabilities;
use learning_assistant_core::domain::ExplanationSection;
use learning_assistant_core::ports::{PortError, PortResult};
use learning_assistant_core::{speech_text, Language};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct VoiceCapture {
    speech: SpeechCapabilities,
    current: Mutex<Option<(u64, CancellationToken)>>,
    next_id: AtomicU64,
}

impl VoiceCapture {
    pub fn new(speech: SpeechCapabilities) -> Self {
        Self {
            speech,
            current: Mutex::new(None),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn can_listen(&self) -> bool {
        self.speech.recognizer.is_available()
    }

    pub fn can_speak(&self) -> bool {
        self.speech.synthesizer.is_available()
    }

    /// Listens for one utterance. `Ok(None)` when the capture was cancelled or
    /// nothing was recognized.
    pub async fn capture(&self, language: Language) -> PortResult<Option<String>> {
        if !self.can_listen() {
            return Err(PortError::Unavailable("Speech recognition is not available".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        if let Some((_, previous)) = self.slot().replace((id, token.clone())) {
            debug!("Cancelling the previous voice capture");
            previous.cancel();
        }

        let result = self
            .speech
            .recognizer
            .listen(language.speech_locale(), token.clone())
            .await;

        {
            let mut slot = self.slot();
            if slot.as_ref().is_some_and(|(current, _)| *current == id) {
                *slot = None;
            }
        }

        if token.is_cancelled() {
            info!("Voice capture cancelled");
            return Ok(None);
        }
        Ok(result?.filter(|text| !text.trim().is_empty()))
    }

    pub fn cancel(&self) {
        if let Some((_, token)) = self.slot().take() {
            token.cancel();
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.slot().is_some()
    }

    /// Reads the sections aloud, stopping any utterance still playing.
    pub async fn speak_sections(
        &self,
        sections: &[ExplanationSection],
        language: Language,
    ) -> PortResult<()> {
        let text = speech_text(sections);
        if text.trim().is_empty() {
            return Ok(());
        }
        let synthesizer = &self.speech.synthesizer;
        synthesizer.stop().await?;
        synthesizer.speak(&text, language.speech_locale()).await
    }

    pub async fn stop_speaking(&self) -> PortResult<()> {
        self.speech.synthesizer.stop().await
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<(u64, CancellationToken)>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
