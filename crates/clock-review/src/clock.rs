//! Think-time reconstruction from clock readings.

use chess_analysis::MoveQuality;
use serde::Serialize;

use crate::side::Side;

/// One of the reviewed player's moves, with the seconds spent on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimedMove {
    pub quality: MoveQuality,
    pub think_time: f64,
}

/// The reviewed player's moves of one game, in play order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerTimeline {
    moves: Vec<TimedMove>,
}

impl PlayerTimeline {
    pub fn moves(&self) -> &[TimedMove] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Moves whose computed think time is negative.
    ///
    /// Happens when a clock reading exceeds the running clock, e.g. with
    /// time added by the opponent.
    pub fn negative_count(&self) -> usize {
        self.moves.iter().filter(|m| m.think_time < 0.0).count()
    }
}

impl FromIterator<TimedMove> for PlayerTimeline {
    fn from_iter<I: IntoIterator<Item = TimedMove>>(iter: I) -> Self {
        PlayerTimeline {
            moves: iter.into_iter().collect(),
        }
    }
}

/// Reconstructs how long `side` spent on each of its moves.
///
/// The running clock starts at `base_time + increment`. For each of the
/// side's plies the think time is `running - stamp`, after which the clock
/// becomes `stamp + increment`. `quality` and `clock` are parallel per-ply
/// sequences; plies past the shorter of the two are ignored.
pub fn reconstruct(
    quality: &[MoveQuality],
    clock: &[f64],
    side: Side,
    base_time: f64,
    increment: f64,
) -> PlayerTimeline {
    let mut running = base_time + increment;

    quality
        .iter()
        .zip(clock)
        .enumerate()
        .filter(|(ply, _)| side.owns_ply(*ply))
        .map(|(_, (&quality, &stamp))| {
            let think_time = running - stamp;
            running = stamp + increment;
            TimedMove {
                quality,
                think_time,
            }
        })
        .collect()
}
