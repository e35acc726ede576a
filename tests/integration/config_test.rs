//! Integration tests for configuration files

use tempfile::TempDir;

use noornest::storage::config::{load_config_from, save_config_to};
use noornest::storage::AppConfig;

#[test]
fn test_partial_config_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
version = "0.2.0"

[remote]
url = "https://demo.supabase.co"
anon_key = "anon"
"#,
    )
    .unwrap();

    let config = load_config_from(&path).unwrap();
    assert!(config.remote.is_configured());
    assert!(config.remote.realtime_enabled);
    assert_eq!(config.storage.database_file, "noornest.db");
    assert_eq!(config.rewards.points_per_perfect_day, 100);
    assert_eq!(config.rewards.streak_badge_days, 7);
}

#[test]
fn test_reward_overrides_survive_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = AppConfig::default();
    config.rewards.points_per_juz = 250;
    config.rewards.quran_seeker_juz = 10;
    config.remote.realtime_enabled = false;
    save_config_to(&config, &path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded.rewards.points_per_juz, 250);
    assert_eq!(loaded.rewards.quran_seeker_juz, 10);
    assert!(!loaded.remote.realtime_enabled);
    assert!(!loaded.remote.is_configured());
}

#[test]
fn test_unusable_remote_settings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "version = \"0.2.0\"\n[remote]\nurl = \"demo.supabase.co\"\nanon_key = \"anon\"\n",
    )
    .unwrap();

    let config = load_config_from(&path).unwrap();
    assert!(config.remote.connection().is_none());
}
