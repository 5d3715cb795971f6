//! End-to-end review of a small archive with a scripted annotator.
//!
//! Clock readings come from the real PGN parser; move qualities come from a
//! per-event script instead of an engine, so no Stockfish is needed.

use std::collections::HashMap;
use std::sync::Arc;

use chess_analysis::{parse_game, MoveQuality};
use clock_review::{
    export_tables, review_archive, split_archive, CsvExporter, GameAnnotator, GameRecord,
    PlyAnnotations, Report, ReviewError, ReviewOptions, ReviewOutcome, SideMatch,
    TimeControlClass, TimeControlSpec,
};

use MoveQuality::*;

const ARCHIVE: &str = r#"[Event "Blitz one"]
[White "Yoavzz"]
[Black "rival"]
[Result "*"]
[TimeControl "180+2"]

1. e4 {[%clk 0:03:01]} 1... e5 {[%clk 0:03:00]} 2. Nf3 {[%clk 0:02:55]}
2... Nc6 {[%clk 0:02:58]} 3. Bb5 {[%clk 0:02:30]} 3... a6 {[%clk 0:02:50]} *

[Event "Bullet two"]
[White "rival"]
[Black "Yoavzz"]
[Result "*"]
[TimeControl "60+0"]

1. d4 {[%clk 0:00:59]} 1... d5 {[%clk 0:00:58]} 2. c4 {[%clk 0:00:50]}
2... e6 {[%clk 0:00:58]} *

[Event "Daily three"]
[White "Yoavzz"]
[Black "rival"]
[Result "*"]
[TimeControl "1/86400"]

1. e4 e5 *

[Event "Unscripted four"]
[White "Yoavzz"]
[Black "rival"]
[Result "*"]
[TimeControl "600+0"]

1. c4 {[%clk 0:09:58]} 1... e5 {[%clk 0:09:59]} *

[Event "Clockless five"]
[White "Yoavzz"]
[Black "rival"]
[Result "*"]
[TimeControl "600+5"]

1. e4 {[%clk 0:10:00]} 1... e5 2. Nf3 {[%clk 0:09:58]} *
"#;

fn event_name(text: &str) -> &str {
    text.lines()
        .find_map(|line| line.strip_prefix("[Event \""))
        .and_then(|rest| rest.strip_suffix("\"]"))
        .unwrap_or("")
}

#[derive(Clone)]
struct ScriptedAnnotator {
    scripts: Arc<HashMap<&'static str, Vec<MoveQuality>>>,
}

impl ScriptedAnnotator {
    fn new() -> Self {
        let mut scripts = HashMap::new();
        scripts.insert("Blitz one", vec![Book, Book, Best, Good, Blunder, Best]);
        scripts.insert("Bullet two", vec![Best, Best, Mistake, Inaccuracy]);
        scripts.insert("Clockless five", vec![Book, Book, Best]);
        Self {
            scripts: Arc::new(scripts),
        }
    }
}

impl GameAnnotator for ScriptedAnnotator {
    fn annotate(&mut self, record: &GameRecord) -> Result<PlyAnnotations, ReviewError> {
        let spec = TimeControlSpec::from_record(record.as_str())?;
        let game = parse_game(record.as_str())
            .map_err(|e| ReviewError::AnalysisFailure(e.to_string()))?;

        let event = event_name(record.as_str());
        let quality = self
            .scripts
            .get(event)
            .cloned()
            .ok_or_else(|| ReviewError::AnalysisFailure(format!("no script for {}", event)))?;
        let clock = game
            .moves
            .iter()
            .map(|m| {
                m.clock
                    .ok_or_else(|| ReviewError::AnalysisFailure("missing clock".to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        PlyAnnotations::new(quality, clock, spec.base_time(), spec.increment())
    }
}

fn options(workers: usize) -> ReviewOptions {
    ReviewOptions {
        player: "Yoavzz".to_string(),
        side_match: SideMatch::Containment,
        workers,
    }
}

async fn review(archive: &str, workers: usize) -> Result<ReviewOutcome, ReviewError> {
    let annotator = ScriptedAnnotator::new();
    review_archive(split_archive(archive), options(workers), move || {
        Ok(annotator.clone())
    })
    .await
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut values = values.to_vec();
    values.sort_by(f64::total_cmp);
    values
}

#[tokio::test]
async fn test_archive_review_end_to_end() {
    let outcome = review(ARCHIVE, 1).await.unwrap();

    assert_eq!(outcome.split_games, 5);
    assert_eq!(outcome.untimed_games, 1);
    assert_eq!(outcome.failed_games, 2);
    assert_eq!(outcome.analyzed_games, 2);

    let blitz = outcome.buckets.get(TimeControlClass::Blitz);
    assert!(blitz.was_analyzed());
    assert_eq!(blitz.times(Book), &[1.0]);
    assert_eq!(blitz.times(Best), &[8.0]);
    assert_eq!(blitz.times(Blunder), &[27.0]);
    assert_eq!(blitz.observation_count(), 3);

    // The bullet game's second move took zero seconds and is not recorded.
    let bullet = outcome.buckets.get(TimeControlClass::Bullet);
    assert!(bullet.was_analyzed());
    assert_eq!(bullet.times(Best), &[2.0]);
    assert!(bullet.times(Inaccuracy).is_empty());

    assert!(!outcome.buckets.get(TimeControlClass::Rapid).was_analyzed());
    assert!(!outcome.buckets.get(TimeControlClass::Classic).was_analyzed());
}

#[tokio::test]
async fn test_worker_count_does_not_change_results() {
    let archive = ARCHIVE.repeat(4);
    let single = review(&archive, 1).await.unwrap();
    let pooled = review(&archive, 4).await.unwrap();

    assert_eq!(single.analyzed_games, 8);
    assert_eq!(pooled.analyzed_games, single.analyzed_games);
    assert_eq!(pooled.failed_games, single.failed_games);
    assert_eq!(pooled.untimed_games, single.untimed_games);

    for class in TimeControlClass::ALL {
        for quality in MoveQuality::ALL {
            assert_eq!(
                sorted(pooled.buckets.get(class).times(quality)),
                sorted(single.buckets.get(class).times(quality)),
                "{} {}",
                class,
                quality
            );
        }
    }
}

#[tokio::test]
async fn test_missing_player_aborts_review() {
    let archive = format!(
        "{}\n\n[Event \"Someone else\"]\n[White \"alice\"]\n[Black \"bob\"]\n[TimeControl \"60+0\"]\n\n1. e4 *\n",
        ARCHIVE
    );

    let err = review(&archive, 2).await.unwrap_err();

    assert!(matches!(err, ReviewError::PlayerNotFound(ref name) if name == "Yoavzz"));
}

#[tokio::test]
async fn test_report_and_tables() {
    let outcome = review(ARCHIVE, 2).await.unwrap();
    let report = Report::from_outcome(&outcome);

    let text = report.to_string();
    assert!(text.starts_with("-------------- Games Reviewed 2 --------------\n"));
    assert!(text.contains("-------------- Bullet Games --------------"));
    assert!(text.contains("-------------- Blitz Games --------------"));
    assert!(!text.contains("Rapid Games"));
    assert!(text.contains("Average time spent for making blunder: 27.0"));
    assert!(text.contains("Average time spent for making inaccuracy: No valid data"));

    let dir = tempfile::tempdir().unwrap();
    let mut exporter = CsvExporter::new(dir.path());
    assert_eq!(export_tables(&outcome.buckets, &mut exporter).unwrap(), 2);

    let blitz = std::fs::read_to_string(dir.path().join("Blitz_games.csv")).unwrap();
    let lines: Vec<&str> = blitz.lines().collect();
    assert_eq!(lines, vec!["book,best,excellent,good,inaccuracy,mistake,blunder", "1,8,,,,,27"]);
    assert!(dir.path().join("Bullet_games.csv").exists());
    assert!(!dir.path().join("Rapid_games.csv").exists());
}
