pub mod auth;
pub mod credentials;
pub mod gate;
pub mod language;
pub mod local_auth;
pub mod quiz;
pub mod state;
pub mod study;
pub mod teacher;
pub mod voice;

#[cfg(test)]
pub mod testing;

pub use state::AppState;
