//! Integration tests for a journey persisted in a SQLite file

use std::sync::Arc;
use tempfile::TempDir;

use noornest::gamification::{BadgeId, LedgerEvent};
use noornest::progress::{HabitKey, ResetConfirmation};
use noornest::storage::schema::{HABIT_TRACKER_KEY, QURAN_TRACKER_KEY, STATS_KEY};
use noornest::storage::{LocalStore, RewardSettings, SqliteStore};
use noornest::Journey;

fn open(dir: &TempDir) -> (Arc<SqliteStore>, Journey) {
    let store = Arc::new(SqliteStore::open(&dir.path().join("noornest.db")).unwrap());
    let journey = Journey::open(store.clone(), RewardSettings::default());
    (store, journey)
}

/// Five habits already done on day 5, the sixth completes the day
#[test]
fn test_day_five_completion_persists() {
    let dir = TempDir::new().unwrap();
    {
        let (_, mut journey) = open(&dir);
        for key in &HabitKey::ALL[..5] {
            let outcome = journey.toggle_habit(5, *key).unwrap();
            assert!(!outcome.should_celebrate());
        }

        let outcome = journey.toggle_habit(5, HabitKey::ALL[5]).unwrap();
        assert!(outcome.should_celebrate());
        assert!(outcome
            .events
            .contains(&LedgerEvent::PointsAwarded { amount: 100, total: 100 }));
    }

    // Reopen from disk
    let (_, journey) = open(&dir);
    let day = journey.habits().document().day(5).unwrap();
    assert!(day.is_complete());
    assert_eq!(day.progress_percent(), 100.0);
    assert_eq!(journey.ledger().stats().points, 100);
    assert!(journey.ledger().stats().has_badge(BadgeId::FirstFast));
}

#[test]
fn test_all_documents_written_on_first_open() {
    let dir = TempDir::new().unwrap();
    let (store, _journey) = open(&dir);

    assert!(store.get(HABIT_TRACKER_KEY).unwrap().is_some());
    assert!(store.get(QURAN_TRACKER_KEY).unwrap().is_some());

    let habits: serde_json::Value =
        serde_json::from_str(&store.get(HABIT_TRACKER_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(habits.as_array().unwrap().len(), 30);
    assert_eq!(habits[0]["day"], 1);
    assert_eq!(habits[0]["habits"]["fasting"], false);
}

#[test]
fn test_quran_progress_and_notes_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let (_, mut journey) = open(&dir);
        for number in 1..=5 {
            journey.toggle_juz(number).unwrap();
        }
        assert!(journey.set_juz_notes(3, "Surah Al-Imran reflections"));
        assert!(!journey.set_juz_notes(31, "out of range"));
    }

    let (store, journey) = open(&dir);
    let stats = journey.quran().stats();
    assert_eq!(stats.completed_juz_count, 5);
    assert!((stats.completion_percent - 16.666).abs() < 0.01);
    assert_eq!(journey.quran().notes(3), Some("Surah Al-Imran reflections"));

    let ledger = journey.ledger().stats();
    assert_eq!(ledger.points, 1000);
    assert_eq!(ledger.level, 2);
    assert!(ledger.has_badge(BadgeId::QuranSeeker));
    assert_eq!(ledger.total_juz_completed, 5);

    let raw: serde_json::Value =
        serde_json::from_str(&store.get(STATS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(raw["points"], 1000);
    assert_eq!(raw["badges"][0]["id"], "quran_seeker");
}

#[test]
fn test_reset_clears_progress_but_keeps_rewards() {
    let dir = TempDir::new().unwrap();
    {
        let (_, mut journey) = open(&dir);
        for key in HabitKey::ALL {
            journey.toggle_habit(1, key);
        }
        journey.toggle_juz(1);

        assert!(!journey.reset_all(ResetConfirmation::Declined));
        assert_eq!(journey.habits().stats().total_acts_completed, 6);

        assert!(journey.reset_all(ResetConfirmation::Confirmed));
    }

    let (_, journey) = open(&dir);
    assert_eq!(journey.habits().stats().total_acts_completed, 0);
    assert_eq!(journey.quran().stats().completed_juz_count, 0);
    assert_eq!(journey.ledger().stats().points, 300);
    assert_eq!(journey.ledger().stats().total_habits_completed, 0);
    assert!(journey.ledger().stats().has_badge(BadgeId::FirstFast));
}

#[test]
fn test_corrupt_stored_document_is_replaced() {
    let dir = TempDir::new().unwrap();
    {
        let store = SqliteStore::open(&dir.path().join("noornest.db")).unwrap();
        store.set(HABIT_TRACKER_KEY, "[{\"day\": 1}]").unwrap();
        store.set(QURAN_TRACKER_KEY, "not json").unwrap();
    }

    let (store, journey) = open(&dir);
    assert_eq!(journey.habits().document().days().len(), 30);
    assert_eq!(journey.quran().document().juz_list().len(), 30);

    let raw = store.get(HABIT_TRACKER_KEY).unwrap().unwrap();
    let days: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(days.as_array().unwrap().len(), 30);
}

#[test]
fn test_streak_badge_threshold() {
    let dir = TempDir::new().unwrap();
    let (_, mut journey) = open(&dir);

    assert!(journey.set_streak(6).is_empty());
    assert_eq!(
        journey.set_streak(7),
        vec![LedgerEvent::BadgeUnlocked(BadgeId::Streak7)]
    );
    assert!(journey.set_streak(8).is_empty());
    assert_eq!(journey.ledger().stats().streak, 8);
}
