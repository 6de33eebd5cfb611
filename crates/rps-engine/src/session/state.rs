//! Session records and their derived phase.

use crate::crypto::Commitment;
use crate::games::Move;
use crate::protocol::Player;
use chrono::{DateTime, Utc};
use rps_core::AccountId;
use serde::{Deserialize, Serialize};

/// Lifecycle phase, derived from which fields are filled in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No record under this identifier
    Empty,
    /// Initiator staked and committed, waiting for the challenged party
    Initiated,
    /// Both parties staked and committed, nobody revealed yet
    Accepted,
    /// Exactly one party revealed
    PartiallyRevealed,
}

/// A live session. Concluded sessions are removed, not kept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    pub initiator: AccountId,
    pub challenged: AccountId,
    /// Locked by each party
    pub stake: u64,
    pub initiator_commitment: Commitment,
    pub challenged_commitment: Option<Commitment>,
    pub initiator_move: Option<Move>,
    pub challenged_move: Option<Move>,
    pub expires_at: DateTime<Utc>,
}

impl GameSession {
    pub(crate) fn new(
        initiator: AccountId,
        challenged: AccountId,
        stake: u64,
        initiator_commitment: Commitment,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            initiator,
            challenged,
            stake,
            initiator_commitment,
            challenged_commitment: None,
            initiator_move: None,
            challenged_move: None,
            expires_at,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.challenged_commitment.is_none() {
            SessionPhase::Initiated
        } else if self.initiator_move.is_some() || self.challenged_move.is_some() {
            SessionPhase::PartiallyRevealed
        } else {
            SessionPhase::Accepted
        }
    }

    /// Which side `account` plays, if it takes part at all
    pub fn player_of(&self, account: &AccountId) -> Option<Player> {
        if *account == self.initiator {
            Some(Player::Initiator)
        } else if *account == self.challenged {
            Some(Player::Challenged)
        } else {
            None
        }
    }

    pub fn account_of(&self, player: Player) -> AccountId {
        match player {
            Player::Initiator => self.initiator,
            Player::Challenged => self.challenged,
        }
    }

    pub fn commitment_of(&self, player: Player) -> Option<Commitment> {
        match player {
            Player::Initiator => Some(self.initiator_commitment),
            Player::Challenged => self.challenged_commitment,
        }
    }

    pub fn move_of(&self, player: Player) -> Option<Move> {
        match player {
            Player::Initiator => self.initiator_move,
            Player::Challenged => self.challenged_move,
        }
    }

    pub(crate) fn set_move(&mut self, player: Player, mv: Move) {
        match player {
            Player::Initiator => self.initiator_move = Some(mv),
            Player::Challenged => self.challenged_move = Some(mv),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
