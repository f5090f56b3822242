//! services/assistant/src/adapters/speech.rs
//!
//! Speech capabilities. Builds without a device speech engine select the
//! disabled implementation at startup; callers check `is_available` instead
//! of probing for the engine themselves.

use async_trait::async_trait;
use learning_assistant_core::ports::{
    PortError, PortResult, SpeechRecognizer, SpeechSynthesizer,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Stands in for both speech engines when none is linked into the build.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledSpeech;

#[async_trait]
impl SpeechRecognizer for DisabledSpeech {
    fn is_available(&self) -> bool {
        false
    }

    async fn listen(&self, _locale: &str, _cancel: CancellationToken) -> PortResult<Option<String>> {
        Err(PortError::Unavailable(
            "Speech recognition is not available on this build".to_string(),
        ))
    }
}

#[async_trait]
impl SpeechSynthesizer for DisabledSpeech {
    fn is_available(&self) -> bool {
        false
    }

    async fn speak(&self, _text: &str, _locale: &str) -> PortResult<()> {
        Err(PortError::Unavailable(
            "Text-to-speech is not available on this build".to_string(),
        ))
    }

    async fn stop(&self) -> PortResult<()> {
        Ok(())
    }
}

/// The pair of speech engines chosen at startup.
#[derive(Clone)]
pub struct SpeechCapabilities {
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl SpeechCapabilities {
    pub fn disabled() -> Self {
        Self {
            recognizer: Arc::new(DisabledSpeech),
            synthesizer: Arc::new(DisabledSpeech),
        }
    }
}
