//! Storage module for local documents and configuration.

pub mod config;
pub mod local_store;
pub mod schema;

pub use config::{AppConfig, ConfigError, RemoteSettings, RewardSettings, StorageSettings};
pub use local_store::{LocalStore, MemoryStore, SqliteStore, StorageError};
