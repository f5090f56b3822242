pub mod backend;
pub mod http;
pub mod speech;
pub mod store;

pub use backend::AssistantBackend;
pub use http::HttpRequestClient;
pub use speech::{DisabledSpeech, SpeechCapabilities};
pub use store::{JsonFileStore, MemoryStore};
