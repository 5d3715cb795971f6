//! Chess game review with Stockfish integration.
//!
//! This crate reads a PGN game together with its `[%clk ...]` clock
//! annotations, evaluates every position with a UCI engine, and classifies
//! each ply's quality.
//!
//! # Overview
//!
//! - [`parse_game`] - PGN mainline, UCI moves, and per-ply clocks
//! - [`Evaluation`] - Position evaluation (centipawn or mate score)
//! - [`MoveQuality`] - Classification of move quality (Book, Best, Excellent, ...)
//! - [`AnalysisEngine`] - Wrapper for UCI analysis engines like Stockfish
//! - [`GameAnalyzer`] - Analyzes complete games with move quality classification
//!
//! # Example
//!
//! ```ignore
//! use chess_analysis::{AnalysisConfig, GameAnalyzer};
//!
//! let mut analyzer = GameAnalyzer::new("stockfish", AnalysisConfig::default())?;
//! let analysis = analyzer.analyze_pgn(&pgn_text)?;
//! println!("White accuracy: {:.1}%", analysis.white_stats.accuracy_percent);
//! ```

pub mod analyzer;
pub mod clock;
pub mod engine;
pub mod evaluation;
pub mod pgn;
pub mod quality;

pub use analyzer::{AnalysisConfig, AnalyzerError, GameAnalyzer};
pub use clock::parse_clock_comment;
pub use engine::{AnalysisEngine, EngineError, PositionAnalysis, SearchLimit};
pub use evaluation::Evaluation;
pub use pgn::{parse_game, ParsedGame, ParsedMove, PgnError};
pub use quality::{GameAnalysis, MoveAnalysis, MoveQuality, PlayerStats, UnknownQuality};
