//! Ramadan habit and Quran progress tracking.
//!
//! - Progress documents (30 days, 30 Juz) with validated storage format
//! - Trackers that mediate mutations and persist after each one
//! - Pure statistics derived from a document snapshot

pub mod stats;
pub mod tracker;
pub mod types;

// Re-exports for convenience
pub use stats::{completion_stats, habit_stats, CompletionStats, CompletionTransition, HabitStats};
pub use tracker::{HabitTracker, QuranTracker, ResetConfirmation};
pub use types::{
    HabitDay, HabitDocument, HabitKey, HabitStatus, JuzRecord, MalformedStoredData,
    QuranDocument, DAYS, JUZ_COUNT,
};
