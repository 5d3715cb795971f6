//! Which side of a game the reviewed player had.

use std::fmt;

use serde::Serialize;

use crate::archive::GameRecord;
use crate::error::ReviewError;

/// The first mover (White) or the second mover (Black).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    First,
    Second,
}

impl Side {
    /// Ply parity of this side's moves (0-based plies).
    pub const fn parity(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }

    /// Whether the 0-based `ply` was played by this side.
    pub fn owns_ply(self, ply: usize) -> bool {
        ply % 2 == self.parity()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::First => f.write_str("white"),
            Side::Second => f.write_str("black"),
        }
    }
}

/// How a player name is matched against a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SideMatch {
    /// The name must appear anywhere in the record. An exact `White` tag
    /// selects the first side, anything else the second.
    #[default]
    Containment,
    /// The name must equal the `White` or `Black` tag value.
    StrictTags,
}

/// Resolves the side `player` had in `record`.
pub fn resolve_side(
    record: &GameRecord,
    player: &str,
    mode: SideMatch,
) -> Result<Side, ReviewError> {
    let text = record.as_str();
    let white_tag = format!("[White \"{}\"]", player);

    match mode {
        SideMatch::Containment => {
            if !text.contains(player) {
                return Err(ReviewError::PlayerNotFound(player.to_string()));
            }
            if text.contains(&white_tag) {
                Ok(Side::First)
            } else {
                Ok(Side::Second)
            }
        }
        SideMatch::StrictTags => {
            if text.contains(&white_tag) {
                Ok(Side::First)
            } else if text.contains(&format!("[Black \"{}\"]", player)) {
                Ok(Side::Second)
            } else {
                Err(ReviewError::PlayerNotFound(player.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(white: &str, black: &str) -> GameRecord {
        GameRecord::new(format!(
            "[Event \"Live Chess\"]\n[White \"{}\"]\n[Black \"{}\"]\n[TimeControl \"180+2\"]\n\n1. e4 e5 *",
            white, black
        ))
    }

    #[test]
    fn test_player_as_white() {
        let game = record("Yoavzz", "opponent");
        assert_eq!(resolve_side(&game, "Yoavzz", SideMatch::Containment).unwrap(), Side::First);
        assert_eq!(resolve_side(&game, "Yoavzz", SideMatch::StrictTags).unwrap(), Side::First);
    }

    #[test]
    fn test_player_as_black() {
        let game = record("opponent", "Yoavzz");
        assert_eq!(resolve_side(&game, "Yoavzz", SideMatch::Containment).unwrap(), Side::Second);
        assert_eq!(resolve_side(&game, "Yoavzz", SideMatch::StrictTags).unwrap(), Side::Second);
    }

    #[test]
    fn test_player_missing() {
        let game = record("alice", "bob");
        let err = resolve_side(&game, "Yoavzz", SideMatch::Containment).unwrap_err();
        assert!(matches!(err, ReviewError::PlayerNotFound(ref name) if name == "Yoavzz"));
        assert!(resolve_side(&game, "Yoavzz", SideMatch::StrictTags).is_err());
    }

    #[test]
    fn test_containment_matches_name_outside_tags() {
        // A name found only in an annotation is still attributed to the second side.
        let game = GameRecord::new(
            "[Event \"Live Chess\"]\n[White \"alice\"]\n[Black \"bob\"]\n\n1. e4 { Yoavzz watching } *",
        );
        assert_eq!(resolve_side(&game, "Yoavzz", SideMatch::Containment).unwrap(), Side::Second);
        assert!(resolve_side(&game, "Yoavzz", SideMatch::StrictTags).is_err());
    }

    #[test]
    fn test_containment_matches_name_prefix() {
        let game = record("Yoavzz2", "opponent");
        assert_eq!(resolve_side(&game, "Yoavzz", SideMatch::Containment).unwrap(), Side::Second);
        assert!(resolve_side(&game, "Yoavzz", SideMatch::StrictTags).is_err());
    }

    #[test]
    fn test_side_owns_alternating_plies() {
        assert!(Side::First.owns_ply(0));
        assert!(!Side::First.owns_ply(1));
        assert!(Side::Second.owns_ply(1));
        assert!(Side::Second.owns_ply(5));
        assert_eq!(Side::Second.to_string(), "black");
    }
}
