//! NoorNest - Ramadan Companion
//!
//! Tracks daily habits and Quran reading across the thirty days of Ramadan,
//! rewards progress with points, levels and badges, and mirrors admin-authored
//! printables and traditions from a remote store.

pub mod content;
pub mod gamification;
pub mod journey;
pub mod progress;
pub mod storage;

// Re-export commonly used types
pub use content::{ContentStore, RemoteContentStore, Session};
pub use gamification::GamificationLedger;
pub use journey::Journey;
pub use progress::{HabitTracker, QuranTracker};
pub use storage::config::AppConfig;
pub use storage::{LocalStore, SqliteStore};
