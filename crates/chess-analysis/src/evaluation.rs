//! Chess position evaluation types.

use serde::Serialize;

/// Centipawn value assigned to a forced mate before distance adjustment.
pub const MATE_SCORE: i32 = 10_000;

/// Represents a chess position evaluation.
///
/// Evaluations follow the UCI convention: they are always reported from the
/// perspective of the side to move. Evaluations can be either centipawn
/// scores (for normal positions) or mate scores (when a forced mate is found).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Evaluation {
    /// Centipawn evaluation (positive = side to move is better)
    Centipawns(i32),
    /// Mate in N moves (positive = side to move mates, zero or negative = side to move is mated)
    Mate(i32),
}

impl Evaluation {
    /// Builds an evaluation from the `score cp` / `score mate` fields of a UCI
    /// info line. A mate score takes precedence over a centipawn score.
    pub fn from_uci_score(cp: Option<i32>, mate: Option<i32>) -> Option<Self> {
        match (cp, mate) {
            (_, Some(m)) => Some(Evaluation::Mate(m)),
            (Some(c), None) => Some(Evaluation::Centipawns(c)),
            (None, None) => None,
        }
    }

    /// Returns the same evaluation seen from the opponent's side.
    pub fn flip(self) -> Self {
        match self {
            Evaluation::Centipawns(cp) => Evaluation::Centipawns(-cp),
            // Mated (0) flips to "has mated", which sorts above every mate-in-N.
            Evaluation::Mate(0) => Evaluation::Centipawns(MATE_SCORE),
            Evaluation::Mate(n) => Evaluation::Mate(-n),
        }
    }

    /// Collapses the evaluation onto a single centipawn scale.
    ///
    /// Mate in N maps to `MATE_SCORE - 10 * N`, being mated in N maps to
    /// `-(MATE_SCORE - 10 * N)`, so shorter mates score further from zero.
    pub fn to_centipawns(self) -> i32 {
        match self {
            Evaluation::Centipawns(cp) => cp,
            Evaluation::Mate(n) if n > 0 => MATE_SCORE - 10 * n.min(MATE_SCORE / 20),
            Evaluation::Mate(n) => -(MATE_SCORE - 10 * n.saturating_neg().min(MATE_SCORE / 20)),
        }
    }

    /// Win probability (0-100) for the side this evaluation belongs to.
    pub fn win_percent(self) -> f64 {
        let cp = f64::from(self.to_centipawns().clamp(-1000, 1000));
        50.0 + 50.0 * (2.0 / (1.0 + (-0.003_682_08 * cp).exp()) - 1.0)
    }
}

impl std::fmt::Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => write!(f, "{:+.2}", f64::from(*cp) / 100.0),
            Evaluation::Mate(n) => write!(f, "#{}", n),
        }
    }
}
