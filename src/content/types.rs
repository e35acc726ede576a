//! Admin-authored content mirrored from the remote store.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Remote content collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Printables,
    Traditions,
}

impl ContentKind {
    pub const ALL: [ContentKind; 2] = [ContentKind::Printables, ContentKind::Traditions];

    /// Remote table name.
    pub fn table(&self) -> &'static str {
        match self {
            ContentKind::Printables => "printables",
            ContentKind::Traditions => "traditions",
        }
    }

    /// PostgREST ordering for list queries.
    pub fn order(&self) -> &'static str {
        match self {
            ContentKind::Printables => "created_at.desc",
            ContentKind::Traditions => "created_at.asc",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentKind::ALL
            .into_iter()
            .find(|kind| kind.table().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown content kind '{}'", s))
    }
}

/// Printable resource category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrintableCategory {
    Planners,
    Kids,
    Trackers,
    Family,
}

impl PrintableCategory {
    pub const ALL: [PrintableCategory; 4] = [
        PrintableCategory::Planners,
        PrintableCategory::Kids,
        PrintableCategory::Trackers,
        PrintableCategory::Family,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrintableCategory::Planners => "Planners",
            PrintableCategory::Kids => "Kids",
            PrintableCategory::Trackers => "Trackers",
            PrintableCategory::Family => "Family",
        }
    }
}

impl FromStr for PrintableCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrintableCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// Gallery tab selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(PrintableCategory),
}

impl CategoryFilter {
    pub fn matches(&self, category: PrintableCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => *wanted == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

/// Printables visible under `filter`, in their original order.
pub fn filter_printables(items: &[Printable], filter: CategoryFilter) -> Vec<Printable> {
    items
        .iter()
        .filter(|item| filter.matches(item.category))
        .cloned()
        .collect()
}

/// Nullable column: `null` and a missing key both read as the default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Downloadable printable resource (`printables` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Printable {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub category: PrintableCategory,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_premium: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub thumbnail_url: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Ramadan tradition card (`traditions` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tradition {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub icon: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for a printable. The remote assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPrintable {
    pub title: String,
    pub description: String,
    pub category: PrintableCategory,
    pub is_premium: bool,
    pub thumbnail_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

/// Insert payload for a tradition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTradition {
    pub title: String,
    pub description: String,
    pub icon: String,
}

impl Default for NewTradition {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            icon: "✨".to_string(),
        }
    }
}

/// A row type belonging to one content collection.
pub trait ContentRecord: DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: ContentKind;

    fn id(&self) -> &str;

    /// Built-in content shown before the remote has any rows.
    fn defaults() -> Vec<Self>;
}

impl ContentRecord for Printable {
    const KIND: ContentKind = ContentKind::Printables;

    fn id(&self) -> &str {
        &self.id
    }

    fn defaults() -> Vec<Self> {
        default_printables()
    }
}

impl ContentRecord for Tradition {
    const KIND: ContentKind = ContentKind::Traditions;

    fn id(&self) -> &str {
        &self.id
    }

    fn defaults() -> Vec<Self> {
        default_traditions()
    }
}

/// Built-in printables.
pub fn default_printables() -> Vec<Printable> {
    vec![
        Printable {
            id: "p-1".to_string(),
            title: "30-Day Spiritual Planner".to_string(),
            description: "A comprehensive guide to track your prayers, Quran reading, and daily goals."
                .to_string(),
            category: PrintableCategory::Planners,
            is_premium: false,
            thumbnail_url: "https://picsum.photos/seed/planner/400/600".to_string(),
            file_url: Some("#".to_string()),
            created_at: None,
        },
        Printable {
            id: "p-2".to_string(),
            title: "Ramadan Activity Book for Kids".to_string(),
            description: "Engaging puzzles and stories to teach children about the values of fasting."
                .to_string(),
            category: PrintableCategory::Kids,
            is_premium: true,
            thumbnail_url: "https://picsum.photos/seed/kids/400/600".to_string(),
            file_url: Some("#".to_string()),
            created_at: None,
        },
        Printable {
            id: "p-3".to_string(),
            title: "Daily Gratitude Tracker".to_string(),
            description: "Focus on the blessings of each day with this elegant gratitude journal page."
                .to_string(),
            category: PrintableCategory::Trackers,
            is_premium: false,
            thumbnail_url: "https://picsum.photos/seed/tracker/400/600".to_string(),
            file_url: Some("#".to_string()),
            created_at: None,
        },
    ]
}

/// Built-in traditions.
pub fn default_traditions() -> Vec<Tradition> {
    vec![
        Tradition {
            id: "t-1".to_string(),
            title: "Suhoor Together".to_string(),
            description: "Wake before dawn and share the blessed pre-fast meal as a family."
                .to_string(),
            icon: "🌙".to_string(),
            created_at: None,
        },
        Tradition {
            id: "t-2".to_string(),
            title: "Breaking the Fast with Dates".to_string(),
            description: "Open the fast with dates and water, following the Sunnah at sunset."
                .to_string(),
            icon: "🌴".to_string(),
            created_at: None,
        },
        Tradition {
            id: "t-3".to_string(),
            title: "Lanterns of the Last Ten Nights".to_string(),
            description: "Light the home during the final nights while seeking Laylat al-Qadr."
                .to_string(),
            icon: "🏮".to_string(),
            created_at: None,
        },
    ]
}
