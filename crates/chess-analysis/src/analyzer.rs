//! Game analysis with move quality classification.
//!
//! This module provides the [`GameAnalyzer`] for reviewing complete chess
//! games: every ply is classified by centipawn loss against the engine's
//! evaluation and keeps the clock reading recorded in the PGN.

use thiserror::Error;

use crate::engine::{AnalysisEngine, EngineError, PositionAnalysis, SearchLimit};
use crate::pgn::{parse_game, ParsedGame, ParsedMove, PgnError};
use crate::quality::{GameAnalysis, MoveAnalysis, MoveQuality, PlayerStats};

/// Errors that can occur during game analysis.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Error from the analysis engine.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    /// The PGN could not be parsed into a playable game.
    #[error("Invalid game data: {0}")]
    InvalidGame(#[from] PgnError),
}

/// Configuration for game analysis.
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    /// Search limit applied to every position.
    pub limit: SearchLimit,
    /// Number of opening plies classified as book moves.
    pub opening_book_plies: usize,
}

/// Analyzes chess games to classify move quality.
///
/// Uses a UCI-compatible engine (like Stockfish) to evaluate positions
/// and compare played moves against the engine's choice.
pub struct GameAnalyzer {
    engine: AnalysisEngine,
    config: AnalysisConfig,
}

impl GameAnalyzer {
    /// Creates a new game analyzer with the specified engine and configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be started.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use chess_analysis::{GameAnalyzer, AnalysisConfig};
    ///
    /// let analyzer = GameAnalyzer::new("stockfish", AnalysisConfig::default())?;
    /// ```
    pub fn new(engine_path: &str, config: AnalysisConfig) -> Result<Self, AnalyzerError> {
        let engine = AnalysisEngine::new(engine_path)?;
        Ok(Self { engine, config })
    }

    /// Name reported by the underlying engine.
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Parses and analyzes the first game in `pgn`.
    ///
    /// # Errors
    ///
    /// Returns an error if the PGN is not a playable game or the engine fails.
    pub fn analyze_pgn(&mut self, pgn: &str) -> Result<GameAnalysis, AnalyzerError> {
        let game = parse_game(pgn)?;
        self.analyze_game(game)
    }

    /// Analyzes an already parsed game.
    ///
    /// Each of the N+1 positions of an N-ply game is searched once: the
    /// evaluation after ply `i` is the evaluation before ply `i + 1`.
    pub fn analyze_game(&mut self, game: ParsedGame) -> Result<GameAnalysis, AnalyzerError> {
        self.engine.new_game()?;

        let uci_moves = game.uci_moves();
        let mut positions: Vec<PositionAnalysis> = Vec::with_capacity(uci_moves.len() + 1);
        for ply in 0..=uci_moves.len() {
            positions.push(self.engine.analyze_moves(&uci_moves[..ply], self.config.limit)?);
        }

        let moves: Vec<MoveAnalysis> = game
            .moves
            .into_iter()
            .enumerate()
            .map(|(ply, played)| {
                let before = &positions[ply];
                let after = &positions[ply + 1];
                classify_ply(
                    played,
                    before,
                    after,
                    ply < self.config.opening_book_plies,
                )
            })
            .collect();

        let white_stats = PlayerStats::from_moves(moves.iter().step_by(2));
        let black_stats = PlayerStats::from_moves(moves.iter().skip(1).step_by(2));

        Ok(GameAnalysis {
            white_player: game.white,
            black_player: game.black,
            time_control: game.time_control,
            moves,
            white_stats,
            black_stats,
            result: game.result,
        })
    }
}

/// Grades one ply from the mover's perspective.
///
/// `before` is the search of the position the mover faced, `after` the
/// search of the resulting position (seen from the opponent).
fn classify_ply(
    played: ParsedMove,
    before: &PositionAnalysis,
    after: &PositionAnalysis,
    in_book: bool,
) -> MoveAnalysis {
    let eval_before = before.evaluation;
    let eval_after = after.evaluation.flip();
    let cp_loss = (eval_before.to_centipawns() - eval_after.to_centipawns()).max(0);
    let played_best = played.uci == before.best_move;

    MoveAnalysis {
        quality: MoveQuality::classify(cp_loss, played_best, in_book),
        san: played.san,
        uci: played.uci,
        best_move: before.best_move.clone(),
        eval_before,
        eval_after,
        cp_loss,
        clock: played.clock,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Evaluation;

    fn position(best_move: &str, evaluation: Evaluation) -> PositionAnalysis {
        PositionAnalysis {
            best_move: best_move.to_string(),
            evaluation,
            depth: 12,
            nodes: 1000,
            pv: vec![best_move.to_string()],
        }
    }

    fn played(uci: &str) -> ParsedMove {
        ParsedMove {
            san: uci.to_string(),
            uci: uci.to_string(),
            clock: Some(60.0),
        }
    }

    #[test]
    fn test_analysis_config_default() {
        let config = AnalysisConfig::default();
        assert_eq!(config.limit, SearchLimit::default());
        assert_eq!(config.opening_book_plies, 0);
    }

    #[test]
    fn test_classify_ply_best_move() {
        let before = position("e2e4", Evaluation::Centipawns(30));
        let after = position("e7e5", Evaluation::Centipawns(-30));

        let analysis = classify_ply(played("e2e4"), &before, &after, false);

        assert_eq!(analysis.quality, MoveQuality::Best);
        assert_eq!(analysis.cp_loss, 0);
        assert_eq!(analysis.eval_after, Evaluation::Centipawns(30));
        assert_eq!(analysis.clock, Some(60.0));
    }

    #[test]
    fn test_classify_ply_blunder_into_mate() {
        // The mover was slightly better; afterwards the opponent mates in 1.
        let before = position("b8c6", Evaluation::Centipawns(20));
        let after = position("h5f7", Evaluation::Mate(1));

        let analysis = classify_ply(played("g8f6"), &before, &after, false);

        assert_eq!(analysis.quality, MoveQuality::Blunder);
        assert!(analysis.cp_loss > 1000);
    }

    #[test]
    fn test_classify_ply_delivering_mate_is_lossless() {
        let before = position("h5f7", Evaluation::Mate(1));
        let after = position("(none)", Evaluation::Mate(0));

        let analysis = classify_ply(played("h5f7"), &before, &after, false);

        assert_eq!(analysis.quality, MoveQuality::Best);
        assert_eq!(analysis.cp_loss, 0);
    }

    #[test]
    fn test_classify_ply_inside_book_window() {
        let before = position("d2d4", Evaluation::Centipawns(30));
        let after = position("d7d5", Evaluation::Centipawns(60));

        let analysis = classify_ply(played("a2a3"), &before, &after, true);

        assert_eq!(analysis.quality, MoveQuality::Book);
        assert_eq!(analysis.cp_loss, 90);
    }

    #[test]
    fn test_analyzer_error_display() {
        let invalid = AnalyzerError::InvalidGame(PgnError::NoGame);
        let display = invalid.to_string();
        assert!(display.contains("Invalid game data"));
        assert!(display.contains("No game found"));

        let engine = AnalyzerError::Engine(EngineError::InitFailed);
        assert!(engine.to_string().contains("Engine error"));
    }
}
