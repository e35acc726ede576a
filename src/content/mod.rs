//! Remote content: printables and traditions managed by admins.
//!
//! Reads are cached and refreshed on realtime change notifications. Writes
//! require an [`AdminCapability`] obtained from a resolved [`Session`].

pub mod auth;
pub mod client;
pub mod realtime;
pub mod store;
pub mod types;

pub use auth::{AdminCapability, Profile, Session, UserRole};
pub use client::{ContentError, RemoteStore, RestClient};
pub use realtime::{ChangeAction, ChangeEvent, ChangeFeed, RealtimeFeed};
pub use store::{ContentStore, RefreshStatus, RemoteContentStore, Subscription};
pub use types::{
    default_printables, default_traditions, filter_printables, CategoryFilter, ContentKind,
    ContentRecord, NewPrintable, NewTradition, Printable, PrintableCategory, Tradition,
};
