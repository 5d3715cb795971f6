//! Error taxonomy for archive review.

use chess_analysis::AnalyzerError;
use thiserror::Error;

/// Errors raised while reviewing an archive.
///
/// Per-game problems that only exclude a game from the statistics are
/// recoverable; everything else aborts the run. See [`ReviewError::is_fatal`].
#[derive(Error, Debug)]
pub enum ReviewError {
    /// The record has no usable `TimeControl` tag.
    #[error("Malformed or missing time control: {0}")]
    MalformedTimeControl(String),
    /// The reviewed player does not appear in the record.
    #[error("Player name not in PGN: {0}")]
    PlayerNotFound(String),
    /// The game analyzer could not annotate the record.
    #[error("Analysis failed: {0}")]
    AnalysisFailure(String),
    /// A time-control class label outside Bullet, Blitz, Rapid and Classic.
    #[error("Invalid time control class: {0} (valid classes: Bullet, Blitz, Rapid, Classic)")]
    InvalidTimeControlClass(String),
    /// The game analyzer could not be started.
    #[error("Game analyzer unavailable: {0}")]
    AnnotatorUnavailable(String),
    /// Writing a CSV table failed.
    #[error("Failed to write table: {0}")]
    Csv(#[from] csv::Error),
    /// Writing the JSON summary failed.
    #[error("Failed to write summary: {0}")]
    Json(#[from] serde_json::Error),
    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A review worker panicked or its state was poisoned.
    #[error("Review worker failed: {0}")]
    Worker(String),
}

impl ReviewError {
    /// Whether the error must stop the whole run.
    ///
    /// Malformed time controls and analysis failures only exclude the game
    /// they occurred in.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ReviewError::MalformedTimeControl(_) | ReviewError::AnalysisFailure(_)
        )
    }
}

impl From<AnalyzerError> for ReviewError {
    fn from(err: AnalyzerError) -> Self {
        ReviewError::AnalysisFailure(err.to_string())
    }
}
