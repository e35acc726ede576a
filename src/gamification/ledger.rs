//! Points, levels and badges.
//!
//! The ledger is the only writer of [`GamificationStats`]. Every operation
//! ends with a single write of the whole record, so a level-up and the badge
//! it unlocks are always stored together.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::badges::{BadgeId, UnlockedBadge};
use crate::storage::schema::STATS_KEY;
use crate::storage::LocalStore;

/// Points needed per level.
pub const POINTS_PER_LEVEL: u64 = 1000;

/// Level that earns the Ramadan Luminary badge.
pub const LUMINARY_LEVEL: u32 = 10;

/// Level reached with `points` points.
pub fn level_for_points(points: u64) -> u32 {
    u32::try_from(points / POINTS_PER_LEVEL)
        .unwrap_or(u32::MAX)
        .saturating_add(1)
}

/// Persisted gamification state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamificationStats {
    pub points: u64,
    /// Always `level_for_points(points)`; stored for display
    pub level: u32,
    /// Supplied by the caller, never derived here
    pub streak: u32,
    /// In unlock order, at most one per badge id
    pub badges: Vec<UnlockedBadge>,
    #[serde(default)]
    pub total_habits_completed: usize,
    #[serde(default)]
    pub total_juz_completed: usize,
}

impl Default for GamificationStats {
    fn default() -> Self {
        Self {
            points: 0,
            level: 1,
            streak: 0,
            badges: Vec::new(),
            total_habits_completed: 0,
            total_juz_completed: 0,
        }
    }
}

impl GamificationStats {
    pub fn has_badge(&self, id: BadgeId) -> bool {
        self.badges.iter().any(|b| b.id == id)
    }

    /// Points at which the next level starts.
    pub fn next_level_points(&self) -> u64 {
        self.level as u64 * POINTS_PER_LEVEL
    }

    /// Progress through the current level (0-100).
    pub fn level_progress_percent(&self) -> f64 {
        (self.points % POINTS_PER_LEVEL) as f64 / 10.0
    }

    fn unlock(&mut self, id: BadgeId) -> bool {
        if self.has_badge(id) {
            return false;
        }
        self.badges.push(UnlockedBadge::new(id, Utc::now()));
        true
    }
}

/// Something the ledger did in response to a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    PointsAwarded { amount: u64, total: u64 },
    LevelUp { from: u32, to: u32 },
    BadgeUnlocked(BadgeId),
}

/// Gamification state machine backed by the local store.
pub struct GamificationLedger {
    store: Arc<dyn LocalStore>,
    stats: GamificationStats,
}

impl GamificationLedger {
    /// Load stored stats, or start from zero if absent or unreadable.
    pub fn load(store: Arc<dyn LocalStore>) -> Self {
        let stored = match store.get(STATS_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to read gamification stats: {}", e);
                None
            }
        };

        let mut stats = match stored.map(|json| serde_json::from_str::<GamificationStats>(&json)) {
            Some(Ok(stats)) => stats,
            Some(Err(e)) => {
                tracing::warn!("Discarding malformed gamification stats: {}", e);
                GamificationStats::default()
            }
            None => GamificationStats::default(),
        };

        stats.level = level_for_points(stats.points);
        let mut seen = Vec::with_capacity(stats.badges.len());
        stats.badges.retain(|b| {
            let first = !seen.contains(&b.id);
            seen.push(b.id);
            first
        });

        Self { store, stats }
    }

    pub fn stats(&self) -> &GamificationStats {
        &self.stats
    }

    /// Add points, recompute the level and unlock the Luminary badge on reaching it.
    pub fn award_points(&mut self, amount: u64) -> Vec<LedgerEvent> {
        let mut events = Vec::new();
        if amount == 0 {
            return events;
        }

        let previous_level = self.stats.level;
        self.stats.points = self.stats.points.saturating_add(amount);
        self.stats.level = level_for_points(self.stats.points);

        events.push(LedgerEvent::PointsAwarded {
            amount,
            total: self.stats.points,
        });

        if self.stats.level > previous_level {
            tracing::info!("Level up: {} -> {}", previous_level, self.stats.level);
            events.push(LedgerEvent::LevelUp {
                from: previous_level,
                to: self.stats.level,
            });
        }

        if self.stats.level >= LUMINARY_LEVEL && self.stats.unlock(BadgeId::RamadanPro) {
            tracing::info!("Badge unlocked: {}", BadgeId::RamadanPro.as_str());
            events.push(LedgerEvent::BadgeUnlocked(BadgeId::RamadanPro));
        }

        self.save();
        events
    }

    /// Unlock a badge by its catalog id.
    ///
    /// Unknown ids and already-earned badges are ignored.
    pub fn unlock_badge(&mut self, id: &str) -> Option<LedgerEvent> {
        let Some(badge) = BadgeId::parse(id) else {
            tracing::debug!("Ignoring unknown badge '{}'", id);
            return None;
        };
        self.unlock(badge).then_some(LedgerEvent::BadgeUnlocked(badge))
    }

    /// Unlock a catalog badge. Returns true if it was newly earned.
    pub fn unlock(&mut self, id: BadgeId) -> bool {
        if !self.stats.unlock(id) {
            return false;
        }

        tracing::info!("Badge unlocked: {}", id.as_str());
        self.save();
        true
    }

    /// Record the current streak as reported by the caller.
    pub fn set_streak(&mut self, streak: u32) {
        if self.stats.streak != streak {
            self.stats.streak = streak;
            self.save();
        }
    }

    /// Record lifetime habit and Juz completion counts.
    pub fn update_counters(&mut self, total_habits_completed: usize, total_juz_completed: usize) {
        if self.stats.total_habits_completed == total_habits_completed
            && self.stats.total_juz_completed == total_juz_completed
        {
            return;
        }

        self.stats.total_habits_completed = total_habits_completed;
        self.stats.total_juz_completed = total_juz_completed;
        self.save();
    }

    fn save(&self) {
        let result = serde_json::to_string(&self.stats)
            .map_err(|e| e.to_string())
            .and_then(|json| self.store.set(STATS_KEY, &json).map_err(|e| e.to_string()));

        if let Err(e) = result {
            tracing::warn!("Failed to persist gamification stats: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn ledger() -> (Arc<dyn LocalStore>, GamificationLedger) {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let ledger = GamificationLedger::load(store.clone());
        (store, ledger)
    }

    #[test]
    fn test_level_formula() {
        assert_eq!(level_for_points(0), 1);
        assert_eq!(level_for_points(999), 1);
        assert_eq!(level_for_points(1000), 2);
        assert_eq!(level_for_points(9000), 10);
    }

    #[test]
    fn test_level_never_wraps_for_huge_totals() {
        assert_eq!(level_for_points(u64::MAX), u32::MAX);
        assert!(level_for_points(5_000_000_000_000) > level_for_points(4_000_000_000_000));

        let (_store, mut ledger) = ledger();
        ledger.award_points(u64::MAX - 10);
        let before = ledger.stats().level;
        ledger.award_points(1_000);
        assert_eq!(ledger.stats().points, u64::MAX);
        assert!(ledger.stats().level >= before);
    }

    #[test]
    fn test_award_9000_unlocks_luminary_once() {
        let (store, mut ledger) = ledger();

        let events = ledger.award_points(9000);
        assert_eq!(ledger.stats().level, 10);
        assert_eq!(
            events,
            vec![
                LedgerEvent::PointsAwarded {
                    amount: 9000,
                    total: 9000
                },
                LedgerEvent::LevelUp { from: 1, to: 10 },
                LedgerEvent::BadgeUnlocked(BadgeId::RamadanPro),
            ]
        );

        let events = ledger.award_points(1000);
        assert!(!events.contains(&LedgerEvent::BadgeUnlocked(BadgeId::RamadanPro)));
        assert_eq!(
            ledger
                .stats()
                .badges
                .iter()
                .filter(|b| b.id == BadgeId::RamadanPro)
                .count(),
            1
        );

        // Level and badge were written together
        let stored: GamificationStats =
            serde_json::from_str(&store.get(STATS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored.level, 11);
        assert!(stored.has_badge(BadgeId::RamadanPro));
    }

    #[test]
    fn test_points_below_threshold_do_not_unlock() {
        let (_store, mut ledger) = ledger();
        let events = ledger.award_points(8999);
        assert_eq!(ledger.stats().level, 9);
        assert!(!ledger.stats().has_badge(BadgeId::RamadanPro));
        assert_eq!(events.len(), 2);

        assert!(ledger.award_points(0).is_empty());
        assert_eq!(ledger.stats().points, 8999);
    }

    #[test]
    fn test_unlock_badge_is_idempotent() {
        let (_store, mut ledger) = ledger();
        assert_eq!(
            ledger.unlock_badge("first_fast"),
            Some(LedgerEvent::BadgeUnlocked(BadgeId::FirstFast))
        );
        assert_eq!(ledger.unlock_badge("first_fast"), None);
        assert_eq!(ledger.stats().badges.len(), 1);
    }

    #[test]
    fn test_unknown_badge_is_ignored() {
        let (_store, mut ledger) = ledger();
        assert_eq!(ledger.unlock_badge("night_owl"), None);
        assert!(ledger.stats().badges.is_empty());
    }

    #[test]
    fn test_badges_keep_unlock_order() {
        let (_store, mut ledger) = ledger();
        ledger.unlock(BadgeId::CharityStar);
        ledger.unlock(BadgeId::FirstFast);
        ledger.unlock(BadgeId::QuranSeeker);

        let order: Vec<BadgeId> = ledger.stats().badges.iter().map(|b| b.id).collect();
        assert_eq!(
            order,
            vec![BadgeId::CharityStar, BadgeId::FirstFast, BadgeId::QuranSeeker]
        );
    }

    #[test]
    fn test_reload_recomputes_level_and_dedupes() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let stored = GamificationStats {
            points: 2500,
            level: 7,
            streak: 3,
            badges: vec![
                UnlockedBadge::new(BadgeId::FirstFast, now),
                UnlockedBadge::new(BadgeId::FirstFast, now),
            ],
            total_habits_completed: 12,
            total_juz_completed: 2,
        };
        store
            .set(STATS_KEY, &serde_json::to_string(&stored).unwrap())
            .unwrap();

        let ledger = GamificationLedger::load(store);
        assert_eq!(ledger.stats().level, 3);
        assert_eq!(ledger.stats().streak, 3);
        assert_eq!(ledger.stats().badges.len(), 1);
    }

    #[test]
    fn test_malformed_stats_reset_to_initial() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        store.set(STATS_KEY, "{\"points\":-4}").unwrap();

        let ledger = GamificationLedger::load(store);
        assert_eq!(ledger.stats(), &GamificationStats::default());
    }

    #[test]
    fn test_legacy_stats_shape_loads() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        store
            .set(
                STATS_KEY,
                r#"{"points":1200,"level":2,"streak":0,"badges":[{"id":"first_fast","name":"First Fast","description":"Completed your first fast of Ramadan","icon":"🌙","category":"Habits","unlockedAt":"2026-02-19T04:12:00.000Z"}],"totalHabitsCompleted":5,"totalJuzCompleted":1}"#,
            )
            .unwrap();

        let ledger = GamificationLedger::load(store);
        assert_eq!(ledger.stats().points, 1200);
        assert!(ledger.stats().has_badge(BadgeId::FirstFast));
        assert_eq!(ledger.stats().total_habits_completed, 5);
    }

    #[test]
    fn test_level_progress_display() {
        let (_store, mut ledger) = ledger();
        ledger.award_points(2450);
        assert_eq!(ledger.stats().next_level_points(), 3000);
        assert!((ledger.stats().level_progress_percent() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_streak_and_counters_persist() {
        let (store, mut ledger) = ledger();
        ledger.set_streak(4);
        ledger.update_counters(20, 3);

        let reloaded = GamificationLedger::load(store);
        assert_eq!(reloaded.stats().streak, 4);
        assert_eq!(reloaded.stats().total_habits_completed, 20);
        assert_eq!(reloaded.stats().total_juz_completed, 3);
    }
}
