//! Progress document types.
//!
//! Both documents always hold exactly 30 records with identities 1..=30.
//! Stored JSON is validated on the way in; anything that does not match the
//! expected shape is rejected as [`MalformedStoredData`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Days in the observance period.
pub const DAYS: usize = 30;

/// Quran divisions.
pub const JUZ_COUNT: usize = 30;

/// One of the six daily devotional acts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitKey {
    Fasting,
    Prayers,
    Taraweeh,
    Quran,
    Dhikr,
    Charity,
}

impl HabitKey {
    /// All habit keys in display order.
    pub const ALL: [HabitKey; 6] = [
        HabitKey::Fasting,
        HabitKey::Prayers,
        HabitKey::Taraweeh,
        HabitKey::Quran,
        HabitKey::Dhikr,
        HabitKey::Charity,
    ];

    /// Stored key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitKey::Fasting => "fasting",
            HabitKey::Prayers => "prayers",
            HabitKey::Taraweeh => "taraweeh",
            HabitKey::Quran => "quran",
            HabitKey::Dhikr => "dhikr",
            HabitKey::Charity => "charity",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            HabitKey::Fasting => "Fasting",
            HabitKey::Prayers => "5 Prayers",
            HabitKey::Taraweeh => "Taraweeh",
            HabitKey::Quran => "Quran",
            HabitKey::Dhikr => "Dhikr",
            HabitKey::Charity => "Charity",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            HabitKey::Fasting => "🌙",
            HabitKey::Prayers => "🕌",
            HabitKey::Taraweeh => "✨",
            HabitKey::Quran => "📖",
            HabitKey::Dhikr => "📿",
            HabitKey::Charity => "🤝",
        }
    }
}

impl fmt::Display for HabitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for HabitKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HabitKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown habit '{}'", s))
    }
}

/// Completion flags for one day.
///
/// Every key is required when deserializing and unknown keys are rejected,
/// so a stored document written under a different habit set fails to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HabitStatus {
    pub fasting: bool,
    pub prayers: bool,
    pub taraweeh: bool,
    pub quran: bool,
    pub dhikr: bool,
    pub charity: bool,
}

impl HabitStatus {
    pub fn get(&self, key: HabitKey) -> bool {
        match key {
            HabitKey::Fasting => self.fasting,
            HabitKey::Prayers => self.prayers,
            HabitKey::Taraweeh => self.taraweeh,
            HabitKey::Quran => self.quran,
            HabitKey::Dhikr => self.dhikr,
            HabitKey::Charity => self.charity,
        }
    }

    fn flag_mut(&mut self, key: HabitKey) -> &mut bool {
        match key {
            HabitKey::Fasting => &mut self.fasting,
            HabitKey::Prayers => &mut self.prayers,
            HabitKey::Taraweeh => &mut self.taraweeh,
            HabitKey::Quran => &mut self.quran,
            HabitKey::Dhikr => &mut self.dhikr,
            HabitKey::Charity => &mut self.charity,
        }
    }

    /// Flip one flag and return its new value.
    pub fn toggle(&mut self, key: HabitKey) -> bool {
        let flag = self.flag_mut(key);
        *flag = !*flag;
        *flag
    }

    /// Number of flags set.
    pub fn completed_count(&self) -> usize {
        HabitKey::ALL.iter().filter(|key| self.get(**key)).count()
    }

    /// True when every habit is checked.
    pub fn is_complete(&self) -> bool {
        self.completed_count() == HabitKey::ALL.len()
    }
}

/// One calendar day of the observance period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HabitDay {
    /// Day number (1-30)
    pub day: u8,
    pub habits: HabitStatus,
}

impl HabitDay {
    pub fn new(day: u8) -> Self {
        Self {
            day,
            habits: HabitStatus::default(),
        }
    }

    pub fn completed_count(&self) -> usize {
        self.habits.completed_count()
    }

    /// Share of this day's habits that are checked (0-100).
    pub fn progress_percent(&self) -> f64 {
        100.0 * self.completed_count() as f64 / HabitKey::ALL.len() as f64
    }

    pub fn is_complete(&self) -> bool {
        self.habits.is_complete()
    }
}

/// Reading progress for one Juz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JuzRecord {
    /// Juz number (1-30)
    pub number: u8,
    pub completed: bool,
    /// Free-form reflection
    #[serde(default)]
    pub notes: String,
}

impl JuzRecord {
    pub fn new(number: u8) -> Self {
        Self {
            number,
            completed: false,
            notes: String::new(),
        }
    }
}

/// Day-by-day habit progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<HabitDay>", into = "Vec<HabitDay>")]
pub struct HabitDocument {
    days: Vec<HabitDay>,
}

impl Default for HabitDocument {
    fn default() -> Self {
        Self {
            days: (1..=DAYS as u8).map(HabitDay::new).collect(),
        }
    }
}

impl HabitDocument {
    /// Fresh document with every habit unchecked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a stored document.
    pub fn from_json(json: &str) -> Result<Self, MalformedStoredData> {
        let days: Vec<HabitDay> = serde_json::from_str(json)
            .map_err(|e| MalformedStoredData::InvalidJson(e.to_string()))?;
        Self::try_from(days)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// All days, ordered 1..=30.
    pub fn days(&self) -> &[HabitDay] {
        &self.days
    }

    pub fn day(&self, day: u8) -> Option<&HabitDay> {
        index_for(day, DAYS).map(|i| &self.days[i])
    }

    pub(crate) fn day_mut(&mut self, day: u8) -> Option<&mut HabitDay> {
        index_for(day, DAYS).map(move |i| &mut self.days[i])
    }
}

impl TryFrom<Vec<HabitDay>> for HabitDocument {
    type Error = MalformedStoredData;

    fn try_from(mut days: Vec<HabitDay>) -> Result<Self, Self::Error> {
        check_identities(days.iter().map(|d| d.day), DAYS)?;
        days.sort_by_key(|d| d.day);
        Ok(Self { days })
    }
}

impl From<HabitDocument> for Vec<HabitDay> {
    fn from(document: HabitDocument) -> Self {
        document.days
    }
}

/// Juz-by-Juz Quran progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<JuzRecord>", into = "Vec<JuzRecord>")]
pub struct QuranDocument {
    juz: Vec<JuzRecord>,
}

impl Default for QuranDocument {
    fn default() -> Self {
        Self {
            juz: (1..=JUZ_COUNT as u8).map(JuzRecord::new).collect(),
        }
    }
}

impl QuranDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a stored document.
    pub fn from_json(json: &str) -> Result<Self, MalformedStoredData> {
        let juz: Vec<JuzRecord> = serde_json::from_str(json)
            .map_err(|e| MalformedStoredData::InvalidJson(e.to_string()))?;
        Self::try_from(juz)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// All Juz records, ordered 1..=30.
    pub fn juz_list(&self) -> &[JuzRecord] {
        &self.juz
    }

    pub fn juz(&self, number: u8) -> Option<&JuzRecord> {
        index_for(number, JUZ_COUNT).map(|i| &self.juz[i])
    }

    pub(crate) fn juz_mut(&mut self, number: u8) -> Option<&mut JuzRecord> {
        index_for(number, JUZ_COUNT).map(move |i| &mut self.juz[i])
    }
}

impl TryFrom<Vec<JuzRecord>> for QuranDocument {
    type Error = MalformedStoredData;

    fn try_from(mut juz: Vec<JuzRecord>) -> Result<Self, Self::Error> {
        check_identities(juz.iter().map(|j| j.number), JUZ_COUNT)?;
        juz.sort_by_key(|j| j.number);
        Ok(Self { juz })
    }
}

impl From<QuranDocument> for Vec<JuzRecord> {
    fn from(document: QuranDocument) -> Self {
        document.juz
    }
}

/// Map a 1-based identity onto a vector index.
fn index_for(id: u8, len: usize) -> Option<usize> {
    let id = id as usize;
    (1..=len).contains(&id).then(|| id - 1)
}

/// Require exactly `expected` records whose identities cover 1..=expected once each.
fn check_identities(
    ids: impl ExactSizeIterator<Item = u8>,
    expected: usize,
) -> Result<(), MalformedStoredData> {
    if ids.len() != expected {
        return Err(MalformedStoredData::WrongLength {
            expected,
            found: ids.len(),
        });
    }

    let mut seen = vec![false; expected];
    for id in ids {
        let index = index_for(id, expected).ok_or(MalformedStoredData::OutOfRange(id))?;
        if seen[index] {
            return Err(MalformedStoredData::Duplicate(id));
        }
        seen[index] = true;
    }

    Ok(())
}

/// A stored document that does not match the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedStoredData {
    #[error("Invalid stored JSON: {0}")]
    InvalidJson(String),

    #[error("Expected {expected} records, found {found}")]
    WrongLength { expected: usize, found: usize },

    #[error("Record identity out of range: {0}")]
    OutOfRange(u8),

    #[error("Duplicate record identity: {0}")]
    Duplicate(u8),
}
