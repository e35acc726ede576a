//! Ties the trackers to the gamification ledger.
//!
//! Completion transitions reported by the trackers are the only trigger for
//! point awards; badge thresholds come from [`RewardSettings`].

use std::sync::Arc;

use crate::gamification::{BadgeId, GamificationLedger, LedgerEvent};
use crate::progress::stats::habit_count;
use crate::progress::{
    CompletionTransition, HabitKey, HabitTracker, QuranTracker, ResetConfirmation,
};
use crate::storage::{LocalStore, RewardSettings};

/// Result of toggling a habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitOutcome {
    pub day: u8,
    pub transition: CompletionTransition,
    pub events: Vec<LedgerEvent>,
}

impl HabitOutcome {
    /// The toggle filled in the day's last habit.
    pub fn should_celebrate(&self) -> bool {
        self.transition.became_complete()
    }
}

/// Result of toggling a Juz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JuzOutcome {
    pub number: u8,
    pub transition: CompletionTransition,
    pub events: Vec<LedgerEvent>,
}

impl JuzOutcome {
    pub fn should_celebrate(&self) -> bool {
        self.transition.became_complete()
    }
}

/// A user's whole Ramadan journey over one local store.
pub struct Journey {
    habits: HabitTracker,
    quran: QuranTracker,
    ledger: GamificationLedger,
    rewards: RewardSettings,
}

impl Journey {
    /// Load (or start) every document from `store`.
    pub fn open(store: Arc<dyn LocalStore>, rewards: RewardSettings) -> Self {
        Self {
            habits: HabitTracker::initialize(store.clone()),
            quran: QuranTracker::initialize(store.clone()),
            ledger: GamificationLedger::load(store),
            rewards,
        }
    }

    pub fn habits(&self) -> &HabitTracker {
        &self.habits
    }

    pub fn quran(&self) -> &QuranTracker {
        &self.quran
    }

    pub fn ledger(&self) -> &GamificationLedger {
        &self.ledger
    }

    /// Toggle a habit and apply any rewards it earns.
    ///
    /// Points follow the completion event: unchecking a perfect day and
    /// checking it again completes it again and awards
    /// `points_per_perfect_day` a second time. Juz toggles behave the same.
    pub fn toggle_habit(&mut self, day: u8, key: HabitKey) -> Option<HabitOutcome> {
        let transition = self.habits.toggle_habit(day, key)?;
        let mut events = Vec::new();

        if transition.became_complete() {
            events.extend(self.ledger.award_points(self.rewards.points_per_perfect_day as u64));
        }

        let checked = self
            .habits
            .document()
            .day(day)
            .is_some_and(|d| d.habits.get(key));

        if checked && key == HabitKey::Fasting {
            self.unlock_into(BadgeId::FirstFast, &mut events);
        }

        if checked
            && key == HabitKey::Charity
            && habit_count(self.habits.document(), HabitKey::Charity) >= self.rewards.charity_star_acts
        {
            self.unlock_into(BadgeId::CharityStar, &mut events);
        }

        self.sync_counters();

        Some(HabitOutcome {
            day,
            transition,
            events,
        })
    }

    /// Toggle a Juz and apply any rewards it earns.
    pub fn toggle_juz(&mut self, number: u8) -> Option<JuzOutcome> {
        let transition = self.quran.toggle_juz(number)?;
        let mut events = Vec::new();

        if transition.became_complete() {
            events.extend(self.ledger.award_points(self.rewards.points_per_juz as u64));

            if self.quran.stats().completed_juz_count >= self.rewards.quran_seeker_juz {
                self.unlock_into(BadgeId::QuranSeeker, &mut events);
            }
        }

        self.sync_counters();

        Some(JuzOutcome {
            number,
            transition,
            events,
        })
    }

    pub fn set_juz_notes(&mut self, number: u8, text: impl Into<String>) -> bool {
        self.quran.set_juz_notes(number, text)
    }

    /// Record an externally computed streak.
    pub fn set_streak(&mut self, streak: u32) -> Vec<LedgerEvent> {
        self.ledger.set_streak(streak);

        let mut events = Vec::new();
        if streak >= self.rewards.streak_badge_days {
            self.unlock_into(BadgeId::Streak7, &mut events);
        }
        events
    }

    /// Reset both trackers. Points and badges are kept.
    pub fn reset_all(&mut self, confirmation: ResetConfirmation) -> bool {
        let habits = self.habits.reset_all(confirmation);
        let quran = self.quran.reset_all(confirmation);
        self.sync_counters();
        habits && quran
    }

    fn unlock_into(&mut self, badge: BadgeId, events: &mut Vec<LedgerEvent>) {
        if self.ledger.unlock(badge) {
            events.push(LedgerEvent::BadgeUnlocked(badge));
        }
    }

    fn sync_counters(&mut self) {
        let acts = self.habits.stats().total_acts_completed;
        let juz = self.quran.stats().completed_juz_count;
        self.ledger.update_counters(acts, juz);
    }
}
