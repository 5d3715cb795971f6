//! PGN game parsing for review.
//!
//! Reads a single game with `pgn-reader`, replays the mainline on a
//! `shakmaty` position to obtain UCI moves for the engine, and attaches the
//! `[%clk ...]` annotation following each ply to that ply.

use std::ops::ControlFlow;

use pgn_reader::{Outcome, RawComment, RawTag, Reader, SanPlus, Skip, Visitor};
use shakmaty::{CastlingMode, Chess, Position};
use thiserror::Error;

use crate::clock::parse_clock_comment;

/// Errors that can occur while parsing a PGN game.
#[derive(Error, Debug)]
pub enum PgnError {
    /// The PGN text could not be read.
    #[error("Failed to read PGN: {0}")]
    Read(#[from] std::io::Error),
    /// The text contained no game.
    #[error("No game found in PGN text")]
    NoGame,
    /// A mainline move was not legal in the position reached so far.
    #[error("Illegal move {san} at ply {ply}")]
    IllegalMove {
        /// 1-based ply number of the offending move.
        ply: usize,
        /// The move as written in the PGN.
        san: String,
    },
}

/// One mainline ply of a parsed game.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMove {
    /// The move as written in the PGN (SAN with check suffix).
    pub san: String,
    /// The move in UCI notation (e.g., "e2e4").
    pub uci: String,
    /// Remaining clock time in seconds recorded after this ply, if annotated.
    pub clock: Option<f64>,
}

/// A game read from PGN text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedGame {
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,
    /// Raw value of the `TimeControl` tag.
    pub time_control: Option<String>,
    /// Mainline plies in playing order.
    pub moves: Vec<ParsedMove>,
}

impl ParsedGame {
    /// UCI moves of the mainline, in order.
    pub fn uci_moves(&self) -> Vec<String> {
        self.moves.iter().map(|m| m.uci.clone()).collect()
    }
}

/// Parses the first game contained in `pgn`.
///
/// # Errors
///
/// Returns [`PgnError::NoGame`] when the text holds no game and
/// [`PgnError::IllegalMove`] when a mainline move cannot be played.
pub fn parse_game(pgn: &str) -> Result<ParsedGame, PgnError> {
    let mut reader = Reader::new(pgn.as_bytes());
    match reader.read_game(&mut GameParser)? {
        Some(result) => result,
        None => Err(PgnError::NoGame),
    }
}

#[derive(Default)]
struct Tags {
    white: Option<String>,
    black: Option<String>,
    result: Option<String>,
    time_control: Option<String>,
}

struct Mainline {
    tags: Tags,
    pos: Chess,
    moves: Vec<ParsedMove>,
    outcome: Option<String>,
}

struct GameParser;

impl Visitor for GameParser {
    type Tags = Tags;
    type Movetext = Mainline;
    type Output = Result<ParsedGame, PgnError>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(Tags::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        key: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let slot = match key {
            b"White" => &mut tags.white,
            b"Black" => &mut tags.black,
            b"Result" => &mut tags.result,
            b"TimeControl" => &mut tags.time_control,
            _ => return ControlFlow::Continue(()),
        };

        // First occurrence wins.
        if slot.is_none() {
            *slot = Some(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(Mainline {
            tags,
            pos: Chess::default(),
            moves: Vec::with_capacity(128),
            outcome: None,
        })
    }

    fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn san(&mut self, mainline: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        let ply = mainline.moves.len() + 1;
        let mv = match san_plus.san.to_move(&mainline.pos) {
            Ok(mv) => mv,
            Err(_) => {
                return ControlFlow::Break(Err(PgnError::IllegalMove {
                    ply,
                    san: san_plus.to_string(),
                }))
            }
        };

        let uci = mv.to_uci(CastlingMode::Standard).to_string();
        mainline.pos.play_unchecked(mv);
        mainline.moves.push(ParsedMove {
            san: san_plus.to_string(),
            uci,
            clock: None,
        });
        ControlFlow::Continue(())
    }

    fn comment(
        &mut self,
        mainline: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        let text = String::from_utf8_lossy(comment.as_bytes());
        if let (Some(last), Some(clock)) = (mainline.moves.last_mut(), parse_clock_comment(&text)) {
            last.clock = Some(clock);
        }
        ControlFlow::Continue(())
    }

    fn outcome(
        &mut self,
        mainline: &mut Self::Movetext,
        outcome: Outcome,
    ) -> ControlFlow<Self::Output> {
        mainline.outcome = Some(outcome.to_string());
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, mainline: Self::Movetext) -> Self::Output {
        let Mainline {
            tags,
            moves,
            outcome,
            ..
        } = mainline;

        Ok(ParsedGame {
            white: tags.white,
            black: tags.black,
            result: tags.result.or(outcome),
            time_control: tags.time_control,
            moves,
        })
    }
}
