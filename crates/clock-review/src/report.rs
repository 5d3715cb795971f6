//! Summary statistics, console rendering and tabular export.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use chess_analysis::MoveQuality;
use serde::Serialize;
use tracing::info;

use crate::aggregate::{AggregateBucket, TimeControlBuckets};
use crate::error::ReviewError;
use crate::review::ReviewOutcome;
use crate::time_control::TimeControlClass;

const RULE: &str = "--------------";

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean think time of one move quality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub quality: MoveQuality,
    pub count: usize,
    pub mean: Option<f64>,
}

impl CategorySummary {
    fn from_times(quality: MoveQuality, times: &[f64]) -> Self {
        Self {
            quality,
            count: times.len(),
            mean: mean(times),
        }
    }
}

impl fmt::Display for CategorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mean {
            Some(mean) => write!(f, "Average time spent for making {}: {:.1}", self.quality, mean),
            None => write!(f, "Average time spent for making {}: No valid data", self.quality),
        }
    }
}

/// Per-category summaries of one analyzed time-control class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    pub class: TimeControlClass,
    pub categories: Vec<CategorySummary>,
}

impl ClassSummary {
    pub fn from_bucket(bucket: &AggregateBucket) -> Self {
        Self {
            class: bucket.class(),
            categories: MoveQuality::ALL
                .into_iter()
                .map(|q| CategorySummary::from_times(q, bucket.times(q)))
                .collect(),
        }
    }

    pub fn category(&self, quality: MoveQuality) -> Option<&CategorySummary> {
        self.categories.iter().find(|c| c.quality == quality)
    }
}

/// The end-of-run report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub games_reviewed: usize,
    pub games_in_archive: usize,
    pub untimed_games: usize,
    pub failed_games: usize,
    pub classes: Vec<ClassSummary>,
}

impl Report {
    /// Summarizes the analyzed buckets. Classes nothing was recorded for
    /// are left out.
    pub fn from_buckets(games_reviewed: usize, buckets: &TimeControlBuckets) -> Self {
        Self {
            games_reviewed,
            games_in_archive: games_reviewed,
            untimed_games: 0,
            failed_games: 0,
            classes: buckets.analyzed().map(ClassSummary::from_bucket).collect(),
        }
    }

    pub fn from_outcome(outcome: &ReviewOutcome) -> Self {
        Self {
            games_in_archive: outcome.split_games,
            untimed_games: outcome.untimed_games,
            failed_games: outcome.failed_games,
            ..Self::from_buckets(outcome.analyzed_games, &outcome.buckets)
        }
    }

    pub fn class(&self, class: TimeControlClass) -> Option<&ClassSummary> {
        self.classes.iter().find(|c| c.class == class)
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), ReviewError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        info!("Wrote summary to {}", path.display());
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Games Reviewed {} {}", RULE, self.games_reviewed, RULE)?;
        if self.games_in_archive != self.games_reviewed {
            writeln!(
                f,
                "({} games in archive: {} untimed, {} failed)",
                self.games_in_archive, self.untimed_games, self.failed_games
            )?;
        }
        for class in &self.classes {
            writeln!(f, "{} {} Games {}", RULE, class.class, RULE)?;
            for category in &class.categories {
                writeln!(f, "{}", category)?;
            }
        }
        Ok(())
    }
}

/// Destination for the per-class think-time tables.
pub trait TableSink {
    fn write_table(&mut self, bucket: &AggregateBucket) -> Result<(), ReviewError>;
}

/// Hands every analyzed bucket to `sink`. Returns the number of tables.
pub fn export_tables(
    buckets: &TimeControlBuckets,
    sink: &mut dyn TableSink,
) -> Result<usize, ReviewError> {
    let mut written = 0;
    for bucket in buckets.analyzed() {
        sink.write_table(bucket)?;
        written += 1;
    }
    Ok(written)
}

/// Writes a bucket as CSV: one column per quality, one observation per
/// cell, shorter columns padded with empty cells.
pub fn write_csv<W: io::Write>(writer: W, bucket: &AggregateBucket) -> Result<(), ReviewError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(MoveQuality::ALL.iter().map(|q| q.as_str()))?;

    for row in 0..bucket.longest_category() {
        let cells = MoveQuality::ALL.iter().map(|&q| {
            bucket
                .times(q)
                .get(row)
                .map(|t| t.to_string())
                .unwrap_or_default()
        });
        csv.write_record(cells)?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes one `<Class>_games.csv` per table into a directory.
#[derive(Debug)]
pub struct CsvExporter {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn file_name(class: TimeControlClass) -> String {
        format!("{}_games.csv", class)
    }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl TableSink for CsvExporter {
    fn write_table(&mut self, bucket: &AggregateBucket) -> Result<(), ReviewError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(Self::file_name(bucket.class()));
        write_csv(BufWriter::new(File::create(&path)?), bucket)?;
        info!("Wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}
