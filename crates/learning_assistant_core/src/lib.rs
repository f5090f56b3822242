pub mod domain;
pub mod explanation;
pub mod fallback;
pub mod language;
pub mod ports;
pub mod quiz;

pub use domain::{
    ExplanationSection, LocalAccount, Note, QuizQuestion, Role, Session, User, LOCAL_TOKEN_PREFIX,
    OPTIONS_PER_QUESTION,
};
pub use explanation::{parse_explanation, speech_text};
pub use fallback::{local_explanation, local_quiz};
pub use language::{needs_translation, Language};
pub use ports::{
    ApiResponse, HttpMethod, KeyValueStore, PortError, PortResult, RequestClient, RequestError,
    SpeechRecognizer, SpeechSynthesizer,
};
pub use quiz::{clamp_question_count, QuizAttempt, QuizError, QuizPhase};
