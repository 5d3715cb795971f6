//! Think-time statistics for PGN archives.
//!
//! Splits an archive into games, keeps the timed games of one player,
//! reconstructs how long each of their moves took from the `[%clk ...]`
//! readings, and groups those think times by move quality and
//! time-control class.
//!
//! # Overview
//!
//! - [`split_archive`] - archive text into [`GameRecord`]s
//! - [`TimeControlSpec`] / [`TimeControlClass`] - `TimeControl` tag and speed class
//! - [`resolve_side`] - which side the player had
//! - [`reconstruct`] - per-move think times from clock readings
//! - [`TimeControlBuckets`] - think times per class and quality
//! - [`review_archive`] - the concurrent review pipeline
//! - [`Report`] / [`CsvExporter`] - console summary and CSV tables

pub mod aggregate;
pub mod archive;
pub mod clock;
pub mod config;
pub mod error;
pub mod report;
pub mod review;
pub mod side;
pub mod time_control;

pub use aggregate::{AggregateBucket, TimeControlBuckets};
pub use archive::{split_archive, GameRecord};
pub use clock::{reconstruct, PlayerTimeline, TimedMove};
pub use config::{ConfigError, ReviewConfig, SearchConfig, SearchMode};
pub use error::ReviewError;
pub use report::{
    export_tables, write_csv, CategorySummary, ClassSummary, CsvExporter, Report, TableSink,
};
pub use review::{
    default_workers, review_archive, review_game, EngineAnnotator, GameAnnotator, PlyAnnotations,
    ReviewOptions, ReviewOutcome,
};
pub use side::{resolve_side, Side, SideMatch};
pub use time_control::{extract_time_control, TimeControlClass, TimeControlSpec};
