//! Gamification module.
//!
//! Points, levels and a fixed catalog of badges, driven by completion
//! events from the trackers.

pub mod badges;
pub mod ledger;

pub use badges::{BadgeCategory, BadgeDefinition, BadgeId, UnlockedBadge, CATALOG};
pub use ledger::{
    level_for_points, GamificationLedger, GamificationStats, LedgerEvent, LUMINARY_LEVEL,
    POINTS_PER_LEVEL,
};
