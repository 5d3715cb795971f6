//! Time-control extraction and classification.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::ReviewError;

static TIME_CONTROL_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[TimeControl "([^"]+)"\]"#).expect("valid regex"));

/// Highest base time (seconds) still classified as bullet.
pub const BULLET_MAX_SECONDS: u32 = 60;
/// Highest base time (seconds) still classified as blitz.
pub const BLITZ_MAX_SECONDS: u32 = 300;
/// Highest base time (seconds) still classified as rapid.
pub const RAPID_MAX_SECONDS: u32 = 1800;

/// A `<base>+<increment>` time control, both parts in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeControlSpec {
    pub base_seconds: u32,
    pub increment_seconds: u32,
}

impl TimeControlSpec {
    pub fn new(base_seconds: u32, increment_seconds: u32) -> Self {
        Self {
            base_seconds,
            increment_seconds,
        }
    }

    /// Parses a tag value of the form `<base>+<increment>`.
    ///
    /// Both parts must be plain digits. Anything else (`-`, `1/86400`,
    /// `180`, `180+2+1`, `180++5`, ` 180 + 2`) is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        let (base, increment) = value.split_once('+')?;
        Some(Self::new(seconds(base)?, seconds(increment)?))
    }

    /// Reads the `TimeControl` header of a game record.
    pub fn from_record(record: &str) -> Result<Self, ReviewError> {
        let value = TIME_CONTROL_TAG
            .captures(record)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| ReviewError::MalformedTimeControl("no TimeControl tag".to_string()))?;
        Self::parse(value).ok_or_else(|| ReviewError::MalformedTimeControl(value.to_string()))
    }

    pub fn base_time(&self) -> f64 {
        f64::from(self.base_seconds)
    }

    pub fn increment(&self) -> f64 {
        f64::from(self.increment_seconds)
    }

    /// Class of this time control, decided by base time alone.
    pub fn class(&self) -> TimeControlClass {
        TimeControlClass::classify(self.base_seconds)
    }
}

impl fmt::Display for TimeControlSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.base_seconds, self.increment_seconds)
    }
}

fn seconds(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Extracts the time control of a record, `None` if absent or malformed.
pub fn extract_time_control(record: &str) -> Option<TimeControlSpec> {
    TimeControlSpec::from_record(record).ok()
}

/// Speed category of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TimeControlClass {
    Bullet,
    Blitz,
    Rapid,
    Classic,
}

impl TimeControlClass {
    pub const COUNT: usize = 4;

    /// All classes, fastest first.
    pub const ALL: [TimeControlClass; TimeControlClass::COUNT] = [
        TimeControlClass::Bullet,
        TimeControlClass::Blitz,
        TimeControlClass::Rapid,
        TimeControlClass::Classic,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TimeControlClass::Bullet => "Bullet",
            TimeControlClass::Blitz => "Blitz",
            TimeControlClass::Rapid => "Rapid",
            TimeControlClass::Classic => "Classic",
        }
    }

    /// Classifies a base time in seconds. Boundaries are inclusive.
    pub fn classify(base_seconds: u32) -> Self {
        match base_seconds {
            s if s <= BULLET_MAX_SECONDS => TimeControlClass::Bullet,
            s if s <= BLITZ_MAX_SECONDS => TimeControlClass::Blitz,
            s if s <= RAPID_MAX_SECONDS => TimeControlClass::Rapid,
            _ => TimeControlClass::Classic,
        }
    }
}

impl fmt::Display for TimeControlClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeControlClass {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeControlClass::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ReviewError::InvalidTimeControlClass(s.to_string()))
    }
}
