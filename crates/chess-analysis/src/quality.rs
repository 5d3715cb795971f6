//! Move quality classification and game analysis.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::Evaluation;

/// Upper centipawn-loss bound (inclusive) for an excellent move.
pub const EXCELLENT_MAX_CP_LOSS: i32 = 20;
/// Upper centipawn-loss bound (inclusive) for a good move.
pub const GOOD_MAX_CP_LOSS: i32 = 50;
/// Upper centipawn-loss bound (inclusive) for an inaccuracy.
pub const INACCURACY_MAX_CP_LOSS: i32 = 100;
/// Upper centipawn-loss bound (inclusive) for a mistake. Anything above is a blunder.
pub const MISTAKE_MAX_CP_LOSS: i32 = 250;

/// Classification of move quality based on evaluation loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveQuality {
    /// Known opening theory
    Book,
    /// The best move in the position
    Best,
    /// Excellent move (minimal centipawn loss)
    Excellent,
    /// Good move (small centipawn loss)
    Good,
    /// Inaccuracy (noticeable centipawn loss)
    Inaccuracy,
    /// Mistake (significant centipawn loss)
    Mistake,
    /// Blunder (major centipawn loss)
    Blunder,
}

/// Error returned when a label is not one of the seven move qualities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown move quality: {0}")]
pub struct UnknownQuality(pub String);

impl MoveQuality {
    /// Number of quality labels.
    pub const COUNT: usize = 7;

    /// All labels in canonical order.
    pub const ALL: [MoveQuality; MoveQuality::COUNT] = [
        MoveQuality::Book,
        MoveQuality::Best,
        MoveQuality::Excellent,
        MoveQuality::Good,
        MoveQuality::Inaccuracy,
        MoveQuality::Mistake,
        MoveQuality::Blunder,
    ];

    /// Position of this label in [`MoveQuality::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase label, as used in reports and tables.
    pub const fn as_str(self) -> &'static str {
        match self {
            MoveQuality::Book => "book",
            MoveQuality::Best => "best",
            MoveQuality::Excellent => "excellent",
            MoveQuality::Good => "good",
            MoveQuality::Inaccuracy => "inaccuracy",
            MoveQuality::Mistake => "mistake",
            MoveQuality::Blunder => "blunder",
        }
    }

    /// Classifies a played move.
    ///
    /// Book moves are reported as such regardless of loss. Otherwise the move
    /// is `Best` if it matched the engine's choice or lost nothing, and is
    /// graded by centipawn loss beyond that.
    pub fn classify(cp_loss: i32, played_best: bool, in_book: bool) -> Self {
        if in_book {
            return MoveQuality::Book;
        }
        if played_best || cp_loss <= 0 {
            return MoveQuality::Best;
        }
        match cp_loss {
            l if l <= EXCELLENT_MAX_CP_LOSS => MoveQuality::Excellent,
            l if l <= GOOD_MAX_CP_LOSS => MoveQuality::Good,
            l if l <= INACCURACY_MAX_CP_LOSS => MoveQuality::Inaccuracy,
            l if l <= MISTAKE_MAX_CP_LOSS => MoveQuality::Mistake,
            _ => MoveQuality::Blunder,
        }
    }
}

impl fmt::Display for MoveQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoveQuality {
    type Err = UnknownQuality;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoveQuality::ALL
            .into_iter()
            .find(|q| q.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownQuality(s.to_string()))
    }
}

/// Analysis result for a single move.
#[derive(Debug, Clone, Serialize)]
pub struct MoveAnalysis {
    /// The move as written in the game (SAN)
    pub san: String,
    /// The move that was played (in UCI notation)
    pub uci: String,
    /// The best move according to the engine (UCI)
    pub best_move: String,
    /// Evaluation before the move, from the mover's perspective
    pub eval_before: Evaluation,
    /// Evaluation after the move, from the mover's perspective
    pub eval_after: Evaluation,
    /// Quality classification
    pub quality: MoveQuality,
    /// Centipawn loss from playing this move
    pub cp_loss: i32,
    /// Remaining clock time (seconds) recorded after the move
    pub clock: Option<f64>,
}

/// Statistics for a player's performance in a game.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayerStats {
    /// Total moves analyzed
    pub total_moves: u32,
    /// Moves per quality label, indexed by [`MoveQuality::index`]
    pub counts: [u32; MoveQuality::COUNT],
    /// Average centipawn loss over non-book moves
    pub avg_cp_loss: f64,
    /// Accuracy percentage (0-100)
    pub accuracy_percent: f64,
}

impl PlayerStats {
    /// Builds statistics from one side's moves.
    ///
    /// Per-move accuracy follows the win-probability model: the drop in the
    /// mover's win percentage is mapped onto 0-100 and averaged.
    pub fn from_moves<'a>(moves: impl IntoIterator<Item = &'a MoveAnalysis>) -> Self {
        let mut stats = PlayerStats::default();
        let mut loss_total = 0i64;
        let mut scored = 0u32;
        let mut accuracy_total = 0.0;

        for mv in moves {
            stats.total_moves += 1;
            stats.counts[mv.quality.index()] += 1;
            if mv.quality == MoveQuality::Book {
                continue;
            }
            loss_total += i64::from(mv.cp_loss);
            scored += 1;
            let win_drop =
                (mv.eval_before.win_percent() - mv.eval_after.win_percent()).max(0.0);
            accuracy_total += move_accuracy(win_drop);
        }

        if scored > 0 {
            stats.avg_cp_loss = loss_total as f64 / f64::from(scored);
            stats.accuracy_percent = accuracy_total / f64::from(scored);
        } else if stats.total_moves > 0 {
            stats.accuracy_percent = 100.0;
        }
        stats
    }

    /// Number of moves with the given quality.
    pub fn count(&self, quality: MoveQuality) -> u32 {
        self.counts[quality.index()]
    }
}

fn move_accuracy(win_drop: f64) -> f64 {
    (103.1668 * (-0.04354 * win_drop).exp() - 3.1669).clamp(0.0, 100.0)
}

/// Complete analysis of a chess game.
#[derive(Debug, Clone, Serialize)]
pub struct GameAnalysis {
    /// White player name
    pub white_player: Option<String>,
    /// Black player name
    pub black_player: Option<String>,
    /// Raw `TimeControl` tag value
    pub time_control: Option<String>,
    /// Analysis of each ply
    pub moves: Vec<MoveAnalysis>,
    /// Statistics for white
    pub white_stats: PlayerStats,
    /// Statistics for black
    pub black_stats: PlayerStats,
    /// Game result
    pub result: Option<String>,
}

impl GameAnalysis {
    /// Quality label of every ply, in order.
    pub fn quality_per_ply(&self) -> Vec<MoveQuality> {
        self.moves.iter().map(|m| m.quality).collect()
    }

    /// Recorded clock of every ply, in order.
    pub fn clock_per_ply(&self) -> Vec<Option<f64>> {
        self.moves.iter().map(|m| m.clock).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn analysed(quality: MoveQuality, cp_loss: i32, before: i32, after: i32) -> MoveAnalysis {
        MoveAnalysis {
            san: "e4".to_string(),
            uci: "e2e4".to_string(),
            best_move: "d2d4".to_string(),
            eval_before: Evaluation::Centipawns(before),
            eval_after: Evaluation::Centipawns(after),
            quality,
            cp_loss,
            clock: None,
        }
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(MoveQuality::classify(0, false, false), MoveQuality::Best);
        assert_eq!(MoveQuality::classify(35, true, false), MoveQuality::Best);
        assert_eq!(MoveQuality::classify(20, false, false), MoveQuality::Excellent);
        assert_eq!(MoveQuality::classify(21, false, false), MoveQuality::Good);
        assert_eq!(MoveQuality::classify(50, false, false), MoveQuality::Good);
        assert_eq!(MoveQuality::classify(100, false, false), MoveQuality::Inaccuracy);
        assert_eq!(MoveQuality::classify(250, false, false), MoveQuality::Mistake);
        assert_eq!(MoveQuality::classify(251, false, false), MoveQuality::Blunder);
    }

    #[test]
    fn test_classify_book_wins() {
        assert_eq!(MoveQuality::classify(900, false, true), MoveQuality::Book);
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, quality) in MoveQuality::ALL.iter().enumerate() {
            assert_eq!(quality.index(), i);
        }
    }

    #[test]
    fn test_from_str_round_trips_labels() {
        for quality in MoveQuality::ALL {
            assert_eq!(quality.as_str().parse::<MoveQuality>(), Ok(quality));
        }
        assert_eq!("Blunder".parse::<MoveQuality>(), Ok(MoveQuality::Blunder));
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "brilliant".parse::<MoveQuality>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown move quality: brilliant");
    }

    #[test]
    fn test_serialize_lowercase() {
        let json = serde_json::to_string(&MoveQuality::Inaccuracy).unwrap();
        assert_eq!(json, "\"inaccuracy\"");
    }

    #[test]
    fn test_player_stats_from_moves() {
        let moves = vec![
            analysed(MoveQuality::Book, 0, 20, 20),
            analysed(MoveQuality::Best, 0, 30, 30),
            analysed(MoveQuality::Blunder, 400, 30, -370),
        ];

        let stats = PlayerStats::from_moves(&moves);

        assert_eq!(stats.total_moves, 3);
        assert_eq!(stats.count(MoveQuality::Book), 1);
        assert_eq!(stats.count(MoveQuality::Best), 1);
        assert_eq!(stats.count(MoveQuality::Blunder), 1);
        assert!((stats.avg_cp_loss - 200.0).abs() < 1e-9);
        assert!(stats.accuracy_percent < 100.0);
        assert!(stats.accuracy_percent > 40.0);
    }

    #[test]
    fn test_player_stats_empty() {
        let stats = PlayerStats::from_moves(std::iter::empty());
        assert_eq!(stats.total_moves, 0);
        assert_eq!(stats.accuracy_percent, 0.0);
    }

    #[test]
    fn test_perfect_moves_are_fully_accurate() {
        let moves = vec![analysed(MoveQuality::Best, 0, 50, 50)];
        let stats = PlayerStats::from_moves(&moves);
        assert!((stats.accuracy_percent - 100.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_classification_never_improves_with_loss(a in 1i32..2000, b in 1i32..2000) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                MoveQuality::classify(low, false, false) <= MoveQuality::classify(high, false, false)
            );
        }

        #[test]
        fn prop_accuracy_is_a_percentage(losses in prop::collection::vec(0i32..1500, 1..40)) {
            let moves: Vec<MoveAnalysis> = losses
                .iter()
                .map(|&loss| analysed(MoveQuality::classify(loss, false, false), loss, 0, -loss))
                .collect();

            let stats = PlayerStats::from_moves(&moves);

            prop_assert!((0.0..=100.0).contains(&stats.accuracy_percent));
            prop_assert!(stats.avg_cp_loss >= 0.0);
        }
    }
}
