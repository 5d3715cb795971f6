//! The archive review pipeline.
//!
//! Timed games are spread over a pool of blocking workers. Each worker
//! owns one [`GameAnnotator`] (one engine process at a time) and its own
//! [`TimeControlBuckets`]; the buckets are merged once every worker has
//! finished, so no category is ever appended to from two threads.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chess_analysis::{AnalysisConfig, AnalyzerError, GameAnalyzer, MoveQuality};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::aggregate::TimeControlBuckets;
use crate::archive::GameRecord;
use crate::clock::{reconstruct, PlayerTimeline};
use crate::error::ReviewError;
use crate::side::{resolve_side, SideMatch};
use crate::time_control::{extract_time_control, TimeControlClass, TimeControlSpec};

/// Per-ply output of a game analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct PlyAnnotations {
    quality: Vec<MoveQuality>,
    clock: Vec<f64>,
    base_time: f64,
    increment: f64,
}

impl PlyAnnotations {
    /// Builds annotations from parallel per-ply sequences.
    ///
    /// # Errors
    ///
    /// `AnalysisFailure` if the sequences differ in length.
    pub fn new(
        quality: Vec<MoveQuality>,
        clock: Vec<f64>,
        base_time: f64,
        increment: f64,
    ) -> Result<Self, ReviewError> {
        if quality.len() != clock.len() {
            return Err(ReviewError::AnalysisFailure(format!(
                "{} classified plies but {} clock readings",
                quality.len(),
                clock.len()
            )));
        }
        Ok(Self {
            quality,
            clock,
            base_time,
            increment,
        })
    }

    pub fn quality(&self) -> &[MoveQuality] {
        &self.quality
    }

    pub fn clock(&self) -> &[f64] {
        &self.clock
    }

    pub fn base_time(&self) -> f64 {
        self.base_time
    }

    pub fn increment(&self) -> f64 {
        self.increment
    }

    pub fn ply_count(&self) -> usize {
        self.quality.len()
    }
}

/// Produces per-ply annotations for a game record.
pub trait GameAnnotator: Send {
    fn annotate(&mut self, record: &GameRecord) -> Result<PlyAnnotations, ReviewError>;
}

impl<F> GameAnnotator for F
where
    F: FnMut(&GameRecord) -> Result<PlyAnnotations, ReviewError> + Send,
{
    fn annotate(&mut self, record: &GameRecord) -> Result<PlyAnnotations, ReviewError> {
        self(record)
    }
}

/// Annotates games with a UCI engine through [`GameAnalyzer`].
///
/// An engine that fails mid-game is dropped and a fresh one is started for
/// the next game.
pub struct EngineAnnotator {
    engine_path: String,
    config: AnalysisConfig,
    analyzer: Option<GameAnalyzer>,
}

impl EngineAnnotator {
    /// Starts an engine process.
    ///
    /// # Errors
    ///
    /// `AnnotatorUnavailable` if the engine cannot be started.
    pub fn spawn(engine_path: &str, config: AnalysisConfig) -> Result<Self, ReviewError> {
        let mut annotator = Self {
            engine_path: engine_path.to_string(),
            config,
            analyzer: None,
        };
        annotator.analyzer()?;
        Ok(annotator)
    }

    /// The running analyzer, started first if there is none.
    fn analyzer(&mut self) -> Result<&mut GameAnalyzer, ReviewError> {
        let analyzer = match self.analyzer.take() {
            Some(analyzer) => analyzer,
            None => {
                let analyzer = GameAnalyzer::new(&self.engine_path, self.config.clone())
                    .map_err(|e| {
                        ReviewError::AnnotatorUnavailable(format!("{}: {}", self.engine_path, e))
                    })?;
                debug!("Started engine {}", analyzer.engine_name());
                analyzer
            }
        };
        Ok(self.analyzer.insert(analyzer))
    }
}

impl GameAnnotator for EngineAnnotator {
    fn annotate(&mut self, record: &GameRecord) -> Result<PlyAnnotations, ReviewError> {
        let spec = TimeControlSpec::from_record(record.as_str())?;
        let result = self.analyzer()?.analyze_pgn(record.as_str());
        let analysis = match result {
            Ok(analysis) => analysis,
            Err(e @ AnalyzerError::Engine(_)) => {
                warn!("Engine failed, restarting it for the next game: {}", e);
                self.analyzer = None;
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        let clock = analysis
            .clock_per_ply()
            .into_iter()
            .enumerate()
            .map(|(ply, clock)| {
                clock.ok_or_else(|| {
                    ReviewError::AnalysisFailure(format!("ply {} has no clock reading", ply + 1))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        PlyAnnotations::new(
            analysis.quality_per_ply(),
            clock,
            spec.base_time(),
            spec.increment(),
        )
    }
}

/// Settings of one review run.
#[derive(Debug, Clone)]
pub struct ReviewOptions {
    pub player: String,
    pub side_match: SideMatch,
    pub workers: usize,
}

impl ReviewOptions {
    /// Options with containment matching and one worker per available core.
    pub fn new(player: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            side_match: SideMatch::default(),
            workers: default_workers(),
        }
    }
}

/// Number of available cores, at least one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Totals and buckets of a finished run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewOutcome {
    /// Records produced by the archive split.
    pub split_games: usize,
    /// Records without a usable time control.
    pub untimed_games: usize,
    /// Timed records excluded after a recoverable error.
    pub failed_games: usize,
    /// Records that contributed to the buckets.
    pub analyzed_games: usize,
    pub buckets: TimeControlBuckets,
}

impl ReviewOutcome {
    pub fn timed_games(&self) -> usize {
        self.split_games - self.untimed_games
    }
}

/// Reviews one timed game: side resolution, annotation and reconstruction.
pub fn review_game<A>(
    record: &GameRecord,
    spec: TimeControlSpec,
    options: &ReviewOptions,
    annotator: &mut A,
) -> Result<(TimeControlClass, PlayerTimeline), ReviewError>
where
    A: GameAnnotator + ?Sized,
{
    let side = resolve_side(record, &options.player, options.side_match)?;
    let annotations = annotator.annotate(record)?;
    let timeline = reconstruct(
        annotations.quality(),
        annotations.clock(),
        side,
        annotations.base_time(),
        annotations.increment(),
    );

    let negative = timeline.negative_count();
    if negative > 0 {
        warn!(
            "{} of {} moves have a negative think time (clock rose between moves)",
            negative,
            timeline.len()
        );
    }
    Ok((spec.class(), timeline))
}

struct Job {
    number: usize,
    record: GameRecord,
    spec: TimeControlSpec,
}

#[derive(Default)]
struct WorkerTally {
    analyzed: usize,
    failed: usize,
    buckets: TimeControlBuckets,
}

/// Reviews every timed record of an archive.
///
/// `make_annotator` is called once per worker. A fatal error stops the
/// remaining workers and is returned; recoverable errors exclude only the
/// game they occurred in.
pub async fn review_archive<F, A>(
    records: Vec<GameRecord>,
    options: ReviewOptions,
    make_annotator: F,
) -> Result<ReviewOutcome, ReviewError>
where
    F: Fn() -> Result<A, ReviewError> + Send + Sync + 'static,
    A: GameAnnotator + 'static,
{
    let split_games = records.len();
    let mut untimed_games = 0;
    let mut queue = VecDeque::with_capacity(split_games);

    for (index, record) in records.into_iter().enumerate() {
        match extract_time_control(record.as_str()) {
            Some(spec) => queue.push_back(Job {
                number: queue.len() + 1,
                record,
                spec,
            }),
            None => {
                debug!("Game {} has no usable time control, skipping", index + 1);
                untimed_games += 1;
            }
        }
    }

    let timed_games = queue.len();
    let workers = options.workers.max(1).min(timed_games);
    info!(
        "{} of {} games are timed, reviewing with {} workers",
        timed_games, split_games, workers
    );

    let queue = Arc::new(Mutex::new(queue));
    let abort = Arc::new(AtomicBool::new(false));
    let options = Arc::new(options);
    let make_annotator = Arc::new(make_annotator);

    let mut tasks = JoinSet::new();
    for _ in 0..workers {
        let queue = Arc::clone(&queue);
        let abort = Arc::clone(&abort);
        let options = Arc::clone(&options);
        let make_annotator = Arc::clone(&make_annotator);
        tasks.spawn_blocking(move || {
            run_worker(
                &queue,
                &abort,
                &options,
                timed_games,
                make_annotator.as_ref(),
            )
        });
    }

    let mut outcome = ReviewOutcome {
        split_games,
        untimed_games,
        ..ReviewOutcome::default()
    };
    let mut fatal = None;

    while let Some(joined) = tasks.join_next().await {
        let result = joined.unwrap_or_else(|e| Err(ReviewError::Worker(e.to_string())));
        match result {
            Ok(tally) => {
                outcome.analyzed_games += tally.analyzed;
                outcome.failed_games += tally.failed;
                outcome.buckets.merge(tally.buckets);
            }
            Err(e) => {
                abort.store(true, Ordering::SeqCst);
                fatal.get_or_insert(e);
            }
        }
    }

    match fatal {
        Some(e) => Err(e),
        None => Ok(outcome),
    }
}

fn run_worker<F, A>(
    queue: &Mutex<VecDeque<Job>>,
    abort: &AtomicBool,
    options: &ReviewOptions,
    total: usize,
    make_annotator: &F,
) -> Result<WorkerTally, ReviewError>
where
    F: Fn() -> Result<A, ReviewError>,
    A: GameAnnotator,
{
    let mut annotator = make_annotator().inspect_err(|_| abort.store(true, Ordering::SeqCst))?;
    let mut tally = WorkerTally::default();

    while !abort.load(Ordering::SeqCst) {
        let next = queue
            .lock()
            .map_err(|_| ReviewError::Worker("work queue poisoned".to_string()))?
            .pop_front();
        let Some(job) = next else {
            break;
        };

        info!("Reviewing game {}/{}", job.number, total);
        match review_game(&job.record, job.spec, options, &mut annotator) {
            Ok((class, timeline)) => {
                tally.buckets.accumulate(class, &timeline);
                tally.analyzed += 1;
            }
            Err(e) if e.is_fatal() => {
                abort.store(true, Ordering::SeqCst);
                return Err(e);
            }
            Err(e) => {
                warn!("Skipping game {}/{}: {}", job.number, total, e);
                tally.failed += 1;
            }
        }
    }

    Ok(tally)
}
