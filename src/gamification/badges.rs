//! Badge catalog.
//!
//! The set of badges is closed and known at build time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Badge identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BadgeId {
    #[serde(rename = "first_fast")]
    FirstFast,
    #[serde(rename = "quran_seeker")]
    QuranSeeker,
    #[serde(rename = "streak_7")]
    Streak7,
    #[serde(rename = "charity_star")]
    CharityStar,
    #[serde(rename = "ramadan_pro")]
    RamadanPro,
}

impl BadgeId {
    pub const ALL: [BadgeId; 5] = [
        BadgeId::FirstFast,
        BadgeId::QuranSeeker,
        BadgeId::Streak7,
        BadgeId::CharityStar,
        BadgeId::RamadanPro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeId::FirstFast => "first_fast",
            BadgeId::QuranSeeker => "quran_seeker",
            BadgeId::Streak7 => "streak_7",
            BadgeId::CharityStar => "charity_star",
            BadgeId::RamadanPro => "ramadan_pro",
        }
    }

    /// Look up a catalog id. Unknown ids yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        BadgeId::ALL.into_iter().find(|id| id.as_str() == s)
    }

    pub fn definition(&self) -> &'static BadgeDefinition {
        match self {
            BadgeId::FirstFast => &CATALOG[0],
            BadgeId::QuranSeeker => &CATALOG[1],
            BadgeId::Streak7 => &CATALOG[2],
            BadgeId::CharityStar => &CATALOG[3],
            BadgeId::RamadanPro => &CATALOG[4],
        }
    }
}

/// Badge category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BadgeCategory {
    Habits,
    Quran,
    Social,
    Special,
}

/// Static description of a badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeDefinition {
    pub id: BadgeId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: BadgeCategory,
}

/// Every badge that can be earned.
pub const CATALOG: [BadgeDefinition; 5] = [
    BadgeDefinition {
        id: BadgeId::FirstFast,
        name: "First Fast",
        description: "Completed your first fast of Ramadan",
        icon: "🌙",
        category: BadgeCategory::Habits,
    },
    BadgeDefinition {
        id: BadgeId::QuranSeeker,
        name: "Quran Seeker",
        description: "Completed 5 Juz of the Quran",
        icon: "📖",
        category: BadgeCategory::Quran,
    },
    BadgeDefinition {
        id: BadgeId::Streak7,
        name: "Consistent Soul",
        description: "Maintained a 7-day habit streak",
        icon: "🔥",
        category: BadgeCategory::Habits,
    },
    BadgeDefinition {
        id: BadgeId::CharityStar,
        name: "Generous Heart",
        description: "Logged 10 acts of charity",
        icon: "🤝",
        category: BadgeCategory::Social,
    },
    BadgeDefinition {
        id: BadgeId::RamadanPro,
        name: "Ramadan Luminary",
        description: "Reached Level 10",
        icon: "✨",
        category: BadgeCategory::Special,
    },
];

/// A badge the user has earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedBadge {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: BadgeCategory,
    pub unlocked_at: DateTime<Utc>,
}

impl UnlockedBadge {
    /// Stamp a catalog badge as unlocked at `unlocked_at`.
    pub fn new(id: BadgeId, unlocked_at: DateTime<Utc>) -> Self {
        let def = id.definition();
        Self {
            id,
            name: def.name.to_string(),
            description: def.description.to_string(),
            icon: def.icon.to_string(),
            category: def.category,
            unlocked_at,
        }
    }
}
