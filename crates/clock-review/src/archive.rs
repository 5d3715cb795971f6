//! Splitting a multi-game PGN archive into individual game records.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// An `[Event "..."]` tag at the start of a line opens a new game.
static GAME_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\[Event\s+".*?"\]"#).expect("valid regex"));

/// The text of one game, headers and movetext included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord(String);

impl GameRecord {
    /// Wraps record text, trimming surrounding whitespace.
    pub fn new(text: impl AsRef<str>) -> Self {
        GameRecord(text.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Splits an archive into game records, in archive order.
///
/// Each `[Event ...]` tag at a line start begins a record; the tag belongs
/// to the record it opens. Segments are trimmed and empty ones dropped, so
/// an archive without any event tag yields its whole trimmed text as one
/// record (or nothing if it is blank).
pub fn split_archive(archive: &str) -> Vec<GameRecord> {
    let mut bounds: Vec<usize> = Vec::with_capacity(16);
    bounds.push(0);
    bounds.extend(GAME_START.find_iter(archive).map(|m| m.start()));
    bounds.push(archive.len());

    bounds
        .windows(2)
        .map(|w| archive[w[0]..w[1]].trim())
        .filter(|segment| !segment.is_empty())
        .map(GameRecord::new)
        .collect()
}
