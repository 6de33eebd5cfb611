//! Rock-Paper-Scissors moves and result lookup.

use crate::protocol::GameResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A revealed move. "No move yet" is `Option::<Move>::None`, never a variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    Rock = 1,
    Paper = 2,
    Scissors = 3,
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// Position in the ordered enumeration (0 is reserved for "no move")
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Inverse of `ordinal`
    pub fn from_ordinal(ordinal: u8) -> Option<Move> {
        match ordinal {
            1 => Some(Move::Rock),
            2 => Some(Move::Paper),
            3 => Some(Move::Scissors),
            _ => None,
        }
    }

    /// Check if this move beats the other
    pub fn beats(&self, other: &Move) -> bool {
        lookup_session_result(*self, *other) == GameResult::InitiatorWins
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Rock => write!(f, "rock"),
            Move::Paper => write!(f, "paper"),
            Move::Scissors => write!(f, "scissors"),
        }
    }
}

impl FromStr for Move {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rock" => Ok(Move::Rock),
            "paper" => Ok(Move::Paper),
            "scissors" => Ok(Move::Scissors),
            other => Err(format!("unknown move: {}", other)),
        }
    }
}

/// Result of `a` (initiator) against `b` (challenged).
///
/// `(a - b + 3) mod 3` over the ordinals: 0 is a draw, 1 means `a` wins,
/// 2 means `b` wins.
pub fn lookup_session_result(a: Move, b: Move) -> GameResult {
    match (a.ordinal() + 3 - b.ordinal()) % 3 {
        0 => GameResult::Draw,
        1 => GameResult::InitiatorWins,
        _ => GameResult::ChallengedWins,
    }
}
