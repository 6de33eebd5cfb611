//! Audit events emitted by every state-changing hub operation.

use crate::crypto::SessionId;
use crate::games::Move;
use crate::protocol::{EngineId, GameResult, Player};
use chrono::{DateTime, Utc};
use rps_core::AccountId;
use serde::{Deserialize, Serialize};

/// What happened. Balances are the post-operation spendable balances of the
/// accounts involved, so a listener can follow the ledger without reading it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HubEvent {
    Deposited {
        account: AccountId,
        amount: u64,
        balance: u64,
    },
    Withdrawn {
        account: AccountId,
        amount: u64,
        balance: u64,
    },
    ExpirationPeriodChanged {
        previous_secs: i64,
        new_secs: i64,
    },
    EngineCreated {
        engine: EngineId,
    },
    SessionCreated {
        engine: EngineId,
        session_id: SessionId,
        initiator: AccountId,
        challenged: AccountId,
        stake: u64,
        expires_at: DateTime<Utc>,
        initiator_balance: u64,
    },
    SessionAccepted {
        engine: EngineId,
        session_id: SessionId,
        challenged: AccountId,
        expires_at: DateTime<Utc>,
        challenged_balance: u64,
    },
    MoveRevealed {
        engine: EngineId,
        session_id: SessionId,
        player: Player,
        account: AccountId,
        revealed: Move,
    },
    SessionSettled {
        engine: EngineId,
        session_id: SessionId,
        result: GameResult,
        initiator: AccountId,
        challenged: AccountId,
        initiator_balance: u64,
        challenged_balance: u64,
    },
    SessionCancelled {
        engine: EngineId,
        session_id: SessionId,
        cancelled_by: AccountId,
        initiator: AccountId,
        challenged: AccountId,
        initiator_balance: u64,
        challenged_balance: u64,
    },
}

impl HubEvent {
    /// Session the event belongs to, if any
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            HubEvent::SessionCreated { session_id, .. }
            | HubEvent::SessionAccepted { session_id, .. }
            | HubEvent::MoveRevealed { session_id, .. }
            | HubEvent::SessionSettled { session_id, .. }
            | HubEvent::SessionCancelled { session_id, .. } => Some(*session_id),
            _ => None,
        }
    }
}

/// An event with its position in the hub's log
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: HubEvent,
}
