//! Keeps each logical action single-flight and debounced.

use crate::error::AppError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

pub const EXPLAIN: &str = "explain";
pub const DOUBT: &str = "doubt";
pub const QUIZ: &str = "quiz";
pub const LOGIN: &str = "login";
pub const REGISTER: &str = "register";
pub const LESSON_PLAN: &str = "lesson_plan";
pub const GENERATE_TEST: &str = "generate_test";

struct Entry {
    in_flight: bool,
    last_started: Instant,
}

/// Shared by every action of one process; a one-shot CLI gets a fresh gate per run.
#[derive(Clone)]
pub struct ActionGate {
    entries: Arc<Mutex<HashMap<&'static str, Entry>>>,
    debounce: Duration,
}

/// Marks the action as finished when dropped.
pub struct ActionPermit {
    action: &'static str,
    entries: Arc<Mutex<HashMap<&'static str, Entry>>>,
}

impl ActionGate {
    pub fn new(debounce: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            debounce,
        }
    }

    /// Fails with `Busy` while the action runs or within the debounce
    /// interval of its last start.
    pub fn try_begin(&self, action: &'static str) -> Result<ActionPermit, AppError> {
        let now = Instant::now();
        let mut entries = lock(&self.entries);
        if let Some(entry) = entries.get(action) {
            if entry.in_flight || now.duration_since(entry.last_started) < self.debounce {
                debug!("Rejected '{}' trigger", action);
                return Err(AppError::Busy(action));
            }
        }
        entries.insert(
            action,
            Entry {
                in_flight: true,
                last_started: now,
            },
        );
        Ok(ActionPermit {
            action,
            entries: self.entries.clone(),
        })
    }
}

impl Drop for ActionPermit {
    fn drop(&mut self) {
        if let Some(entry) = lock(&self.entries).get_mut(self.action) {
            entry.in_flight = false;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_call_per_action_at_a_time() {
        let gate = ActionGate::new(Duration::ZERO);
        let permit = gate.try_begin(QUIZ).unwrap();
        assert!(matches!(gate.try_begin(QUIZ), Err(AppError::Busy("quiz"))));
        assert!(gate.try_begin(EXPLAIN).is_ok());
        drop(permit);
        assert!(gate.try_begin(QUIZ).is_ok());
    }

    #[test]
    fn repeated_triggers_are_debounced() {
        let gate = ActionGate::new(Duration::from_secs(60));
        drop(gate.try_begin(LOGIN).unwrap());
        assert!(matches!(gate.try_begin(LOGIN), Err(AppError::Busy(_))));
        assert!(gate.try_begin(REGISTER).is_ok());
    }
}
