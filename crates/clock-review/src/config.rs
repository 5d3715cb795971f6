//! Configuration file loading for archive reviews.
//!
//! Settings are read from `clock-review.toml` in the working directory;
//! every key is optional and command-line flags take precedence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chess_analysis::{AnalysisConfig, SearchLimit};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::side::SideMatch;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Whether engine searches are bounded by time or by depth.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Time,
    Depth,
}

/// Engine search settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    #[serde(default)]
    pub mode: SearchMode,
    /// Search time per position in milliseconds. Defaults to 500.
    #[serde(default = "default_movetime_ms")]
    pub movetime_ms: u64,
    /// Search depth per position. Defaults to 15.
    #[serde(default = "default_depth")]
    pub depth: u32,
}

fn default_movetime_ms() -> u64 {
    500
}

fn default_depth() -> u32 {
    15
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            movetime_ms: default_movetime_ms(),
            depth: default_depth(),
        }
    }
}

impl SearchConfig {
    pub fn limit(&self) -> SearchLimit {
        match self.mode {
            SearchMode::Time => SearchLimit::MoveTime(Duration::from_millis(self.movetime_ms)),
            SearchMode::Depth => SearchLimit::Depth(self.depth),
        }
    }
}

/// Main review configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReviewConfig {
    /// Player whose think times are reviewed.
    #[serde(default)]
    pub player: Option<String>,
    /// Path to the Stockfish engine.
    /// Defaults to "stockfish" (assumes it's in PATH).
    #[serde(default = "default_stockfish_path")]
    pub stockfish_path: String,
    #[serde(default)]
    pub search: SearchConfig,
    /// Opening plies classified as book moves. Defaults to 8.
    #[serde(default = "default_opening_book_plies")]
    pub opening_book_plies: usize,
    /// Number of engine workers. Defaults to the available cores.
    #[serde(default)]
    pub workers: Option<usize>,
    /// Directory the CSV tables are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Require an exact `White`/`Black` tag match for the player.
    #[serde(default)]
    pub strict_side: bool,
}

fn default_stockfish_path() -> String {
    "stockfish".to_string()
}

fn default_opening_book_plies() -> usize {
    8
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            player: None,
            stockfish_path: default_stockfish_path(),
            search: SearchConfig::default(),
            opening_book_plies: default_opening_book_plies(),
            workers: None,
            output_dir: default_output_dir(),
            strict_side: false,
        }
    }
}

impl ReviewConfig {
    /// Loads the configuration from [`Self::config_path()`], or defaults if
    /// the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads the configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Returns `clock-review.toml` in the current working directory.
    pub fn config_path() -> PathBuf {
        PathBuf::from("clock-review.toml")
    }

    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            limit: self.search.limit(),
            opening_book_plies: self.opening_book_plies,
        }
    }

    pub fn side_match(&self) -> SideMatch {
        if self.strict_side {
            SideMatch::StrictTags
        } else {
            SideMatch::Containment
        }
    }
}
