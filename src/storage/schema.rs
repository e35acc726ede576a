//! Database schema definitions for the local progress store.

/// SQL schema for the key-value document table.
pub const SCHEMA: &str = r#"
-- Serialized progress documents, one row per storage key
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Schema version tracking table.
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Storage key for the Ramadan habit tracker document.
pub const HABIT_TRACKER_KEY: &str = "ramadan_tracker_v1";

/// Storage key for the Quran Juz tracker document.
pub const QURAN_TRACKER_KEY: &str = "quran_tracker_v1";

/// Storage key for the gamification ledger.
pub const STATS_KEY: &str = "noornest_stats";
