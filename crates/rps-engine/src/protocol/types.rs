//! Protocol types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a game engine created by the hub
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineId(Uuid);

impl EngineId {
    /// Create a new random engine ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EngineId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for EngineId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Debug for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EngineId({})", self.0)
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a session, seen from the initiator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    InitiatorWins,
    ChallengedWins,
    Draw,
}

impl GameResult {
    /// Signed encoding: +1 initiator wins, 0 draw, -1 challenged wins
    pub fn as_i8(&self) -> i8 {
        match self {
            GameResult::InitiatorWins => 1,
            GameResult::Draw => 0,
            GameResult::ChallengedWins => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::InitiatorWins => "initiator wins",
            GameResult::ChallengedWins => "challenged wins",
            GameResult::Draw => "draw",
        }
    }

    /// The winning side, if any
    pub fn winner(&self) -> Option<Player> {
        match self {
            GameResult::InitiatorWins => Some(Player::Initiator),
            GameResult::ChallengedWins => Some(Player::Challenged),
            GameResult::Draw => None,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Side of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Player {
    Initiator,
    Challenged,
}

impl Player {
    /// Get the opponent
    pub fn opponent(&self) -> Player {
        match self {
            Player::Initiator => Player::Challenged,
            Player::Challenged => Player::Initiator,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Initiator => write!(f, "initiator"),
            Player::Challenged => write!(f, "challenged"),
        }
    }
}
