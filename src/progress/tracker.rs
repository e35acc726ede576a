//! Habit and Quran trackers.
//!
//! A tracker owns one progress document and mediates every mutation. Each
//! successful mutation writes the whole document back to the local store
//! before returning.

use std::sync::Arc;

use super::stats::{
    completion_stats, day_transition, habit_stats, juz_transition, CompletionStats,
    CompletionTransition, HabitStats,
};
use super::types::{HabitDocument, HabitKey, JuzRecord, MalformedStoredData, QuranDocument};
use crate::storage::schema::{HABIT_TRACKER_KEY, QURAN_TRACKER_KEY};
use crate::storage::LocalStore;

/// Explicit answer to a "reset all progress?" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetConfirmation {
    Confirmed,
    Declined,
}

/// Load a stored document, falling back to a fresh one.
///
/// Returns the document and whether it came from storage.
fn load_or_default<T: Default>(
    store: &dyn LocalStore,
    key: &str,
    parse: impl FnOnce(&str) -> Result<T, MalformedStoredData>,
) -> (T, bool) {
    let raw = match store.get(key) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Failed to read '{}' from local store: {}", key, e);
            None
        }
    };

    match raw.map(|json| parse(&json)) {
        Some(Ok(document)) => (document, true),
        Some(Err(e)) => {
            tracing::warn!("Discarding malformed '{}' document: {}", key, e);
            (T::default(), false)
        }
        None => {
            tracing::debug!("No stored '{}' document, starting fresh", key);
            (T::default(), false)
        }
    }
}

/// Write a serialized document; failures are logged, never surfaced.
fn persist(store: &dyn LocalStore, key: &str, json: Result<String, serde_json::Error>) {
    let result = json
        .map_err(|e| e.to_string())
        .and_then(|json| store.set(key, &json).map_err(|e| e.to_string()));

    if let Err(e) = result {
        tracing::warn!("Failed to persist '{}': {}", key, e);
    }
}

/// Ramadan daily habit tracker.
pub struct HabitTracker {
    store: Arc<dyn LocalStore>,
    document: HabitDocument,
}

impl HabitTracker {
    /// Load the stored document or start fresh. Never fails.
    pub fn initialize(store: Arc<dyn LocalStore>) -> Self {
        let (document, loaded) =
            load_or_default(store.as_ref(), HABIT_TRACKER_KEY, HabitDocument::from_json);

        let tracker = Self { store, document };
        if !loaded {
            tracker.save();
        }
        tracker
    }

    pub fn document(&self) -> &HabitDocument {
        &self.document
    }

    /// Flip one habit on one day.
    ///
    /// Returns `None` (and changes nothing) when `day` is outside 1-30.
    pub fn toggle_habit(&mut self, day: u8, key: HabitKey) -> Option<CompletionTransition> {
        let Some(record) = self.document.day_mut(day) else {
            tracing::debug!("Ignoring toggle for out-of-range day {}", day);
            return None;
        };

        let before = record.habits;
        record.habits.toggle(key);
        let transition = day_transition(&before, &record.habits);

        if transition.became_complete() {
            tracing::info!("Day {} complete", day);
        }

        self.save();
        Some(transition)
    }

    /// Restore every day to all-unchecked. Does nothing unless confirmed.
    pub fn reset_all(&mut self, confirmation: ResetConfirmation) -> bool {
        if confirmation != ResetConfirmation::Confirmed {
            return false;
        }

        self.document = HabitDocument::new();
        self.save();
        tracing::info!("Habit progress reset");
        true
    }

    pub fn stats(&self) -> HabitStats {
        habit_stats(&self.document)
    }

    fn save(&self) {
        persist(self.store.as_ref(), HABIT_TRACKER_KEY, self.document.to_json());
    }
}

/// Quran Juz tracker.
pub struct QuranTracker {
    store: Arc<dyn LocalStore>,
    document: QuranDocument,
}

impl QuranTracker {
    /// Load the stored document or start fresh. Never fails.
    pub fn initialize(store: Arc<dyn LocalStore>) -> Self {
        let (document, loaded) =
            load_or_default(store.as_ref(), QURAN_TRACKER_KEY, QuranDocument::from_json);

        let tracker = Self { store, document };
        if !loaded {
            tracker.save();
        }
        tracker
    }

    pub fn document(&self) -> &QuranDocument {
        &self.document
    }

    pub fn juz(&self, number: u8) -> Option<&JuzRecord> {
        self.document.juz(number)
    }

    pub fn notes(&self, number: u8) -> Option<&str> {
        self.juz(number).map(|j| j.notes.as_str())
    }

    /// Flip the completed flag of one Juz.
    ///
    /// Returns `None` (and changes nothing) when `number` is outside 1-30.
    pub fn toggle_juz(&mut self, number: u8) -> Option<CompletionTransition> {
        let Some(record) = self.document.juz_mut(number) else {
            tracing::debug!("Ignoring toggle for out-of-range juz {}", number);
            return None;
        };

        let before = record.clone();
        record.completed = !record.completed;
        let transition = juz_transition(&before, record);

        self.save();
        Some(transition)
    }

    /// Replace the notes of one Juz verbatim. Returns false for an unknown Juz.
    pub fn set_juz_notes(&mut self, number: u8, text: impl Into<String>) -> bool {
        let Some(record) = self.document.juz_mut(number) else {
            tracing::debug!("Ignoring notes for out-of-range juz {}", number);
            return false;
        };

        record.notes = text.into();
        self.save();
        true
    }

    /// Restore every Juz to incomplete with empty notes. Does nothing unless confirmed.
    pub fn reset_all(&mut self, confirmation: ResetConfirmation) -> bool {
        if confirmation != ResetConfirmation::Confirmed {
            return false;
        }

        self.document = QuranDocument::new();
        self.save();
        tracing::info!("Quran progress reset");
        true
    }

    pub fn stats(&self) -> CompletionStats {
        completion_stats(&self.document)
    }

    fn save(&self) {
        persist(self.store.as_ref(), QURAN_TRACKER_KEY, self.document.to_json());
    }
}
