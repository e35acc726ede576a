//! Derived progress statistics.
//!
//! Everything here is a pure function of a document snapshot, so the numbers
//! always agree with the records after any mutation or reload.

use serde::Serialize;

use super::types::{
    HabitDocument, HabitKey, HabitStatus, JuzRecord, QuranDocument, DAYS, JUZ_COUNT,
};

/// Change in completeness caused by a single mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompletionTransition {
    /// Completeness did not change
    Unchanged,
    /// The last missing piece was filled in
    BecameComplete,
    /// A complete record lost a piece
    BecameIncomplete,
}

impl CompletionTransition {
    /// Classify a change from `was_complete` to `is_complete`.
    pub fn between(was_complete: bool, is_complete: bool) -> Self {
        match (was_complete, is_complete) {
            (false, true) => CompletionTransition::BecameComplete,
            (true, false) => CompletionTransition::BecameIncomplete,
            _ => CompletionTransition::Unchanged,
        }
    }

    pub fn became_complete(&self) -> bool {
        matches!(self, CompletionTransition::BecameComplete)
    }
}

/// Transition between two snapshots of one day.
pub fn day_transition(before: &HabitStatus, after: &HabitStatus) -> CompletionTransition {
    CompletionTransition::between(before.is_complete(), after.is_complete())
}

/// Transition between two snapshots of one Juz.
pub fn juz_transition(before: &JuzRecord, after: &JuzRecord) -> CompletionTransition {
    CompletionTransition::between(before.completed, after.completed)
}

/// Quran completion summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompletionStats {
    pub completed_juz_count: usize,
    /// 0-100
    pub completion_percent: f64,
}

/// Summarize Quran progress.
pub fn completion_stats(document: &QuranDocument) -> CompletionStats {
    let completed_juz_count = document.juz_list().iter().filter(|j| j.completed).count();

    CompletionStats {
        completed_juz_count,
        completion_percent: 100.0 * completed_juz_count as f64 / JUZ_COUNT as f64,
    }
}

/// Habit tracker summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HabitStats {
    /// Checked flags across all days and habits
    pub total_acts_completed: usize,
    /// 0-100
    pub overall_progress_percent: f64,
    /// Days with every habit checked
    pub perfect_day_count: usize,
}

/// Summarize habit progress.
pub fn habit_stats(document: &HabitDocument) -> HabitStats {
    let total_acts_completed: usize = document.days().iter().map(|d| d.completed_count()).sum();
    let perfect_day_count = document.days().iter().filter(|d| d.is_complete()).count();
    let total_possible = DAYS * HabitKey::ALL.len();

    HabitStats {
        total_acts_completed,
        overall_progress_percent: 100.0 * total_acts_completed as f64 / total_possible as f64,
        perfect_day_count,
    }
}

/// Number of days on which `key` is checked.
pub fn habit_count(document: &HabitDocument, key: HabitKey) -> usize {
    document.days().iter().filter(|d| d.habits.get(key)).count()
}
