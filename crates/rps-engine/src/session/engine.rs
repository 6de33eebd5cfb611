//! Session state machine.
//!
//! ```text
//! EMPTY -> INITIATED -> ACCEPTED -> (PARTIALLY_REVEALED) -> settled | cancelled -> EMPTY
//! ```
//!
//! Every operation validates first and touches the ledger before the session
//! map, so a rejected call changes nothing.

use super::state::{GameSession, SessionPhase};
use crate::crypto::{Commitment, SessionId};
use crate::error::{HubError, HubResult};
use crate::games::{lookup_session_result, Move};
use crate::ledger::BalanceLedger;
use crate::protocol::{EngineId, GameResult, Player};
use chrono::{DateTime, Duration, Utc};
use rps_core::{AccountId, Salt, Secret};
use std::collections::HashMap;

/// Who is calling, when, and how long the next phase may last
#[derive(Clone, Copy, Debug)]
pub struct TxContext {
    pub caller: AccountId,
    pub now: DateTime<Utc>,
    pub expiration_period: Duration,
}

impl TxContext {
    fn deadline(&self) -> HubResult<DateTime<Utc>> {
        self.now
            .checked_add_signed(self.expiration_period)
            .ok_or(HubError::Overflow)
    }
}

/// Result of a successful reveal
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Move stored, waiting for the opponent's reveal
    Pending { player: Player },
    /// Both moves known; stakes paid out and the session cleared
    Settled {
        player: Player,
        session: GameSession,
        result: GameResult,
    },
}

/// Result of a successful cancel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cancellation {
    /// The session as it was before being cleared
    pub session: GameSession,
    /// Escrow releases applied to the ledger
    pub payouts: Vec<(AccountId, u64)>,
}

/// One game contract: a set of sessions sharing a ledger held elsewhere
#[derive(Clone, Debug, Default)]
pub struct SessionEngine {
    id: EngineId,
    sessions: HashMap<SessionId, GameSession>,
}

impl SessionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> EngineId {
        self.id
    }

    pub fn session(&self, session_id: &SessionId) -> Option<&GameSession> {
        self.sessions.get(session_id)
    }

    pub fn phase(&self, session_id: &SessionId) -> SessionPhase {
        self.sessions
            .get(session_id)
            .map_or(SessionPhase::Empty, GameSession::phase)
    }

    /// Number of sessions currently holding stakes
    pub fn open_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Open a session against `challenged`, locking the caller's stake.
    pub fn init_session(
        &mut self,
        ledger: &mut BalanceLedger,
        ctx: &TxContext,
        challenged: AccountId,
        stake: u64,
        salt: &Salt,
        commitment: Commitment,
    ) -> HubResult<SessionId> {
        if ctx.caller == challenged {
            return Err(HubError::InvalidParticipants);
        }
        let session_id = SessionId::derive(&ctx.caller, &challenged, salt);
        if self.sessions.contains_key(&session_id) {
            return Err(HubError::SessionAlreadyExists(session_id));
        }
        let expires_at = ctx.deadline()?;

        ledger.stake_lock(ctx.caller, stake)?;
        self.sessions.insert(
            session_id,
            GameSession::new(ctx.caller, challenged, stake, commitment, expires_at),
        );

        tracing::debug!(
            "Engine {} opened session {:?} ({} vs {}, stake {})",
            self.id,
            session_id,
            ctx.caller,
            challenged,
            stake
        );
        Ok(session_id)
    }

    /// Accept an initiated session, locking the challenged party's stake.
    pub fn accept_session(
        &mut self,
        ledger: &mut BalanceLedger,
        ctx: &TxContext,
        session_id: &SessionId,
        commitment: Commitment,
    ) -> HubResult<()> {
        let session = self
            .sessions
            .get_mut(session_id)
            .ok_or(HubError::NotInitiated(*session_id))?;

        if session.challenged_commitment.is_some() {
            return Err(HubError::NotInitiated(*session_id));
        }
        if ctx.caller != session.challenged {
            return Err(HubError::Unauthorized(ctx.caller));
        }
        if session.is_expired(ctx.now) {
            return Err(HubError::SessionExpired(*session_id));
        }
        let expires_at = ctx.deadline()?;

        ledger.stake_lock(ctx.caller, session.stake)?;
        session.challenged_commitment = Some(commitment);
        session.expires_at = expires_at;

        tracing::debug!("Engine {} session {:?} accepted", self.id, session_id);
        Ok(())
    }

    /// Reveal the caller's move. The second reveal settles the session.
    pub fn reveal_session_move(
        &mut self,
        ledger: &mut BalanceLedger,
        ctx: &TxContext,
        session_id: &SessionId,
        secret: &Secret,
        mv: Move,
    ) -> HubResult<RevealOutcome> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or(HubError::NoSuchSession(*session_id))?;

        let player = session
            .player_of(&ctx.caller)
            .ok_or(HubError::Unauthorized(ctx.caller))?;
        let commitment = session
            .commitment_of(player)
            .filter(|_| session.challenged_commitment.is_some())
            .ok_or(HubError::NotInitiated(*session_id))?;
        if session.move_of(player).is_some() {
            return Err(HubError::AlreadyRevealed(*session_id));
        }
        if session.is_expired(ctx.now) {
            return Err(HubError::SessionExpired(*session_id));
        }
        if !commitment.verify(session_id, secret, mv) {
            return Err(HubError::CommitmentMismatch);
        }

        let Some(opponent_move) = session.move_of(player.opponent()) else {
            if let Some(session) = self.sessions.get_mut(session_id) {
                session.set_move(player, mv);
            }
            return Ok(RevealOutcome::Pending { player });
        };

        let (initiator_move, challenged_move) = match player {
            Player::Initiator => (mv, opponent_move),
            Player::Challenged => (opponent_move, mv),
        };
        let result = lookup_session_result(initiator_move, challenged_move);
        ledger.release_all(&settlement_payouts(session, result)?)?;

        let mut session = self
            .sessions
            .remove(session_id)
            .ok_or(HubError::NoSuchSession(*session_id))?;
        session.set_move(player, mv);

        tracing::debug!(
            "Engine {} session {:?} settled: {}",
            self.id,
            session_id,
            result
        );
        Ok(RevealOutcome::Settled {
            player,
            session,
            result,
        })
    }

    /// Close an expired session and return the stakes it holds.
    ///
    /// Before acceptance only the initiator's stake is locked and it goes
    /// back. After acceptance a party that revealed collects both stakes from
    /// one that did not; if nobody revealed, both are refunded.
    pub fn cancel_session(
        &mut self,
        ledger: &mut BalanceLedger,
        ctx: &TxContext,
        session_id: &SessionId,
    ) -> HubResult<Cancellation> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or(HubError::NoSuchSession(*session_id))?;

        if session.player_of(&ctx.caller).is_none() {
            return Err(HubError::Unauthorized(ctx.caller));
        }
        if !session.is_expired(ctx.now) {
            return Err(HubError::NotExpired(*session_id));
        }

        let payouts = cancellation_payouts(session)?;
        ledger.release_all(&payouts)?;

        let session = self
            .sessions
            .remove(session_id)
            .ok_or(HubError::NoSuchSession(*session_id))?;

        tracing::debug!(
            "Engine {} session {:?} cancelled by {}",
            self.id,
            session_id,
            ctx.caller
        );
        Ok(Cancellation { session, payouts })
    }
}

fn pot(session: &GameSession) -> HubResult<u64> {
    session.stake.checked_mul(2).ok_or(HubError::Overflow)
}

fn settlement_payouts(
    session: &GameSession,
    result: GameResult,
) -> HubResult<Vec<(AccountId, u64)>> {
    Ok(match result.winner() {
        Some(winner) => vec![(session.account_of(winner), pot(session)?)],
        None => vec![
            (session.initiator, session.stake),
            (session.challenged, session.stake),
        ],
    })
}

fn cancellation_payouts(session: &GameSession) -> HubResult<Vec<(AccountId, u64)>> {
    if session.challenged_commitment.is_none() {
        return Ok(vec![(session.initiator, session.stake)]);
    }
    match (session.initiator_move, session.challenged_move) {
        (None, None) => Ok(vec![
            (session.initiator, session.stake),
            (session.challenged, session.stake),
        ]),
        (Some(_), None) => Ok(vec![(session.initiator, pot(session)?)]),
        (None, Some(_)) => Ok(vec![(session.challenged, pot(session)?)]),
        (Some(a), Some(b)) => settlement_payouts(session, lookup_session_result(a, b)),
    }
}
