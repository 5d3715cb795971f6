//! clock-review - think-time statistics for PGN archives.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chess_analysis::{GameAnalysis, GameAnalyzer};
use clap::{Parser, Subcommand};
use clock_review::{
    default_workers, export_tables, review_archive, split_archive, CsvExporter, EngineAnnotator,
    Report, ReviewConfig, ReviewOptions, SideMatch,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clock-review")]
#[command(about = "Think-time statistics by move quality and time control")]
struct Cli {
    /// Configuration file (defaults to clock-review.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Review every timed game of a player in a PGN archive
    Archive {
        /// PGN archive to review
        pgn: PathBuf,
        /// Player whose think times are reviewed
        #[arg(short, long)]
        player: Option<String>,
        /// Directory for the CSV tables
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Number of engine workers
        #[arg(short, long)]
        workers: Option<usize>,
        /// Require an exact White/Black tag match for the player
        #[arg(long)]
        strict_side: bool,
        /// Also write a JSON summary to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Analyze a single game and print a move-by-move review
    Game {
        /// PGN file; the first game in it is analyzed
        pgn: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ReviewConfig::load_from(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ReviewConfig::load()?,
    };

    match cli.command {
        Commands::Archive {
            pgn,
            player,
            output_dir,
            workers,
            strict_side,
            json,
        } => {
            let player = match player.or_else(|| config.player.clone()) {
                Some(name) if !name.trim().is_empty() => name,
                _ => bail!("no player given (use --player or set `player` in the config)"),
            };
            let options = ReviewOptions {
                player,
                side_match: if strict_side {
                    SideMatch::StrictTags
                } else {
                    config.side_match()
                },
                workers: workers.or(config.workers).unwrap_or_else(default_workers),
            };
            let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());

            run_archive(&config, &pgn, options, &output_dir, json.as_deref()).await
        }
        Commands::Game { pgn } => run_game(&config, &pgn),
    }
}

async fn run_archive(
    config: &ReviewConfig,
    pgn: &Path,
    options: ReviewOptions,
    output_dir: &Path,
    json: Option<&Path>,
) -> anyhow::Result<()> {
    let archive =
        fs::read_to_string(pgn).with_context(|| format!("reading {}", pgn.display()))?;
    let records = split_archive(&archive);
    tracing::info!("Split {} games from {}", records.len(), pgn.display());
    tracing::info!("Reviewing games of {}", options.player);

    let engine_path = config.stockfish_path.clone();
    let analysis = config.analysis_config();
    let outcome = review_archive(records, options, move || {
        EngineAnnotator::spawn(&engine_path, analysis.clone())
    })
    .await?;

    let report = Report::from_outcome(&outcome);
    print!("{}", report);

    let mut exporter = CsvExporter::new(output_dir);
    if export_tables(&outcome.buckets, &mut exporter)? > 0 {
        println!("CSV files saved successfully!");
    }
    if let Some(path) = json {
        report.write_json(path)?;
    }
    Ok(())
}

fn run_game(config: &ReviewConfig, pgn: &Path) -> anyhow::Result<()> {
    let text = fs::read_to_string(pgn).with_context(|| format!("reading {}", pgn.display()))?;
    let Some(record) = split_archive(&text).into_iter().next() else {
        bail!("{} contains no game", pgn.display());
    };

    let mut analyzer = GameAnalyzer::new(&config.stockfish_path, config.analysis_config())?;
    tracing::info!("Analyzing with {}", analyzer.engine_name());
    let analysis = analyzer.analyze_pgn(record.as_str())?;

    print_game(&analysis);
    Ok(())
}

fn print_game(analysis: &GameAnalysis) {
    println!("\n=== Chess Game Analysis ===");
    println!(
        "{} vs {} ({})",
        analysis.white_player.as_deref().unwrap_or("?"),
        analysis.black_player.as_deref().unwrap_or("?"),
        analysis.result.as_deref().unwrap_or("*")
    );
    println!(
        "Accuracy: White - {:.0}%, Black - {:.0}%",
        analysis.white_stats.accuracy_percent, analysis.black_stats.accuracy_percent
    );
    println!(
        "Average Centipawn Loss: White - {:.0}, Black - {:.0}",
        analysis.white_stats.avg_cp_loss, analysis.black_stats.avg_cp_loss
    );

    println!("\n=== Move Analysis ===");
    for (i, mv) in analysis.moves.iter().enumerate() {
        let clock = mv
            .clock
            .map(|c| format!("{:.1}", c))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "Move {}: {} | Score: {} | Classification: {} | Time: {}",
            i + 1,
            mv.san,
            mv.eval_after,
            mv.quality,
            clock
        );
    }

    println!("\n=== Best Move Suggestions ===");
    for (i, mv) in analysis.moves.iter().enumerate() {
        println!("Move {}: {} → Suggested: {}", i + 1, mv.san, mv.best_move);
    }
}
