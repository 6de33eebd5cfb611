//! The hub: one ledger, one owner, many game engines.
//!
//! Callers identify themselves with an `AccountId` on every operation. The hub
//! builds the transaction context (caller, current time, expiration period),
//! forwards to the engine, and records an audit event for every change.

use crate::config::HubConfig;
use crate::crypto::{Commitment, SessionId};
use crate::error::{HubError, HubResult};
use crate::events::{EventRecord, HubEvent};
use crate::games::Move;
use crate::ledger::BalanceLedger;
use crate::protocol::EngineId;
use crate::session::{Cancellation, GameSession, RevealOutcome, SessionEngine, TxContext};
use chrono::{DateTime, Duration, Utc};
use rps_core::{AccountId, FundsTransfer, Salt, Secret};
use std::collections::HashMap;
use std::sync::Arc;

pub struct Hub {
    config: HubConfig,
    ledger: BalanceLedger,
    engines: HashMap<EngineId, SessionEngine>,
    /// Creation order of `engines`
    engine_order: Vec<EngineId>,
    transfer: Arc<dyn FundsTransfer>,
    /// Simulated current time (for timeout testing)
    current_time: Option<DateTime<Utc>>,
    events: Vec<EventRecord>,
    next_sequence: u64,
}

impl Hub {
    pub fn new(config: HubConfig, transfer: Arc<dyn FundsTransfer>) -> Self {
        Self {
            config,
            ledger: BalanceLedger::new(),
            engines: HashMap::new(),
            engine_order: Vec::new(),
            transfer,
            current_time: None,
            events: Vec::new(),
            next_sequence: 0,
        }
    }

    /// A hub with exactly one engine: the ledger is effectively embedded in a
    /// single game.
    pub fn standalone(config: HubConfig, transfer: Arc<dyn FundsTransfer>) -> (Self, EngineId) {
        let mut hub = Self::new(config, transfer);
        let engine = hub.add_engine();
        (hub, engine)
    }

    // Time

    /// Get current time (real or simulated)
    pub fn now(&self) -> DateTime<Utc> {
        self.current_time.unwrap_or_else(Utc::now)
    }

    /// Owner-only. Advance simulated time by seconds. Returns the new time.
    pub fn advance_time(
        &mut self,
        caller: AccountId,
        seconds: i64,
    ) -> HubResult<DateTime<Utc>> {
        self.config.ensure_owner(caller)?;
        if seconds < 0 {
            return Err(HubError::InvalidTimeStep);
        }
        let next = Duration::try_seconds(seconds)
            .and_then(|step| self.now().checked_add_signed(step))
            .ok_or(HubError::Overflow)?;
        self.current_time = Some(next);
        Ok(next)
    }

    /// Pin simulated time
    pub fn set_time(&mut self, at: DateTime<Utc>) {
        self.current_time = Some(at);
    }

    // Admin

    pub fn owner(&self) -> AccountId {
        self.config.owner()
    }

    pub fn session_expiration_period(&self) -> Duration {
        self.config.session_expiration_period()
    }

    /// Owner-only. Applies to deadlines set from now on.
    pub fn change_session_expiration_period(
        &mut self,
        caller: AccountId,
        new_secs: u64,
    ) -> HubResult<()> {
        let previous = self
            .config
            .change_session_expiration_period(caller, new_secs)?;
        self.record(HubEvent::ExpirationPeriodChanged {
            previous_secs: previous.num_seconds(),
            new_secs: self.config.session_expiration_period().num_seconds(),
        });
        Ok(())
    }

    /// Owner-only. Creates a new game engine backed by this hub's ledger.
    pub fn create_rock_paper_scissors(&mut self, caller: AccountId) -> HubResult<EngineId> {
        self.config.ensure_owner(caller)?;
        Ok(self.add_engine())
    }

    fn add_engine(&mut self) -> EngineId {
        let engine = SessionEngine::new();
        let id = engine.id();
        self.engines.insert(id, engine);
        self.engine_order.push(id);
        self.record(HubEvent::EngineCreated { engine: id });
        id
    }

    pub fn engine_ids(&self) -> &[EngineId] {
        &self.engine_order
    }

    pub fn engine(&self, engine: &EngineId) -> HubResult<&SessionEngine> {
        self.engines
            .get(engine)
            .ok_or(HubError::NoSuchEngine(*engine))
    }

    // Ledger

    pub fn ledger(&self) -> &BalanceLedger {
        &self.ledger
    }

    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.ledger.balance_of(account)
    }

    pub fn deposit(&mut self, caller: AccountId, amount: u64) -> HubResult<u64> {
        let balance = self.ledger.deposit(caller, amount)?;
        self.record(HubEvent::Deposited {
            account: caller,
            amount,
            balance,
        });
        Ok(balance)
    }

    pub fn withdraw(&mut self, caller: AccountId, amount: u64) -> HubResult<u64> {
        let balance = self
            .ledger
            .withdraw(caller, amount, self.transfer.as_ref())?;
        self.record(HubEvent::Withdrawn {
            account: caller,
            amount,
            balance,
        });
        Ok(balance)
    }

    // Sessions

    /// Identifier a session between these accounts with this salt would get
    pub fn session_id(initiator: &AccountId, challenged: &AccountId, salt: &Salt) -> SessionId {
        SessionId::derive(initiator, challenged, salt)
    }

    /// Commitment a player submits for `mv` in `session_id`
    pub fn move_hash(session_id: &SessionId, secret: &Secret, mv: Move) -> Commitment {
        Commitment::new(session_id, secret, mv)
    }

    pub fn game_session(
        &self,
        engine: &EngineId,
        session_id: &SessionId,
    ) -> HubResult<Option<&GameSession>> {
        Ok(self.engine(engine)?.session(session_id))
    }

    pub fn init_session(
        &mut self,
        engine: &EngineId,
        caller: AccountId,
        challenged: AccountId,
        stake: u64,
        salt: &Salt,
        commitment: Commitment,
    ) -> HubResult<SessionId> {
        let ctx = self.tx(caller);
        let session_engine = self
            .engines
            .get_mut(engine)
            .ok_or(HubError::NoSuchEngine(*engine))?;

        let session_id = session_engine.init_session(
            &mut self.ledger,
            &ctx,
            challenged,
            stake,
            salt,
            commitment,
        )?;
        let expires_at = session_engine
            .session(&session_id)
            .map_or(ctx.now, |s| s.expires_at);

        self.record(HubEvent::SessionCreated {
            engine: *engine,
            session_id,
            initiator: caller,
            challenged,
            stake,
            expires_at,
            initiator_balance: self.ledger.balance_of(&caller),
        });
        Ok(session_id)
    }

    pub fn accept_session(
        &mut self,
        engine: &EngineId,
        caller: AccountId,
        session_id: &SessionId,
        commitment: Commitment,
    ) -> HubResult<()> {
        let ctx = self.tx(caller);
        let session_engine = self
            .engines
            .get_mut(engine)
            .ok_or(HubError::NoSuchEngine(*engine))?;

        session_engine.accept_session(&mut self.ledger, &ctx, session_id, commitment)?;
        let expires_at = session_engine
            .session(session_id)
            .map_or(ctx.now, |s| s.expires_at);

        self.record(HubEvent::SessionAccepted {
            engine: *engine,
            session_id: *session_id,
            challenged: caller,
            expires_at,
            challenged_balance: self.ledger.balance_of(&caller),
        });
        Ok(())
    }

    pub fn reveal_session_move(
        &mut self,
        engine: &EngineId,
        caller: AccountId,
        session_id: &SessionId,
        secret: &Secret,
        mv: Move,
    ) -> HubResult<RevealOutcome> {
        let ctx = self.tx(caller);
        let session_engine = self
            .engines
            .get_mut(engine)
            .ok_or(HubError::NoSuchEngine(*engine))?;

        let outcome =
            session_engine.reveal_session_move(&mut self.ledger, &ctx, session_id, secret, mv)?;

        let player = match &outcome {
            RevealOutcome::Pending { player } | RevealOutcome::Settled { player, .. } => *player,
        };
        self.record(HubEvent::MoveRevealed {
            engine: *engine,
            session_id: *session_id,
            player,
            account: caller,
            revealed: mv,
        });

        if let RevealOutcome::Settled {
            session, result, ..
        } = &outcome
        {
            self.record(HubEvent::SessionSettled {
                engine: *engine,
                session_id: *session_id,
                result: *result,
                initiator: session.initiator,
                challenged: session.challenged,
                initiator_balance: self.ledger.balance_of(&session.initiator),
                challenged_balance: self.ledger.balance_of(&session.challenged),
            });
        }
        Ok(outcome)
    }

    pub fn cancel_session(
        &mut self,
        engine: &EngineId,
        caller: AccountId,
        session_id: &SessionId,
    ) -> HubResult<Cancellation> {
        let ctx = self.tx(caller);
        let session_engine = self
            .engines
            .get_mut(engine)
            .ok_or(HubError::NoSuchEngine(*engine))?;

        let cancellation = session_engine.cancel_session(&mut self.ledger, &ctx, session_id)?;

        let session = &cancellation.session;
        self.record(HubEvent::SessionCancelled {
            engine: *engine,
            session_id: *session_id,
            cancelled_by: caller,
            initiator: session.initiator,
            challenged: session.challenged,
            initiator_balance: self.ledger.balance_of(&session.initiator),
            challenged_balance: self.ledger.balance_of(&session.challenged),
        });
        Ok(cancellation)
    }

    // Events

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Drain the event log (sequence numbers keep counting)
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    fn tx(&self, caller: AccountId) -> TxContext {
        TxContext {
            caller,
            now: self.now(),
            expiration_period: self.config.session_expiration_period(),
        }
    }

    fn record(&mut self, event: HubEvent) {
        tracing::info!("Hub event #{}: {:?}", self.next_sequence, event);
        self.events.push(EventRecord {
            sequence: self.next_sequence,
            at: self.now(),
            event,
        });
        self.next_sequence += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rps_core::MockFundsTransfer;

    fn hub() -> (Hub, AccountId, MockFundsTransfer) {
        let owner = AccountId::new();
        let transfer = MockFundsTransfer::new();
        let hub = Hub::new(
            HubConfig::with_default_period(owner),
            Arc::new(transfer.clone()),
        );
        (hub, owner, transfer)
    }

    #[test]
    fn test_only_owner_creates_engines() {
        let (mut hub, owner, _) = hub();
        let mallory = AccountId::new();

        assert_eq!(
            hub.create_rock_paper_scissors(mallory),
            Err(HubError::Unauthorized(mallory))
        );
        let engine = hub.create_rock_paper_scissors(owner).unwrap();

        assert_eq!(hub.engine_ids(), &[engine]);
        assert!(matches!(
            hub.events().last().map(|r| &r.event),
            Some(HubEvent::EngineCreated { .. })
        ));
    }

    #[test]
    fn test_unknown_engine() {
        let (mut hub, _, _) = hub();
        let alice = AccountId::new();
        let engine = EngineId::new();
        let salt = Salt::random();
        let id = Hub::session_id(&alice, &AccountId::new(), &salt);

        assert_eq!(
            hub.game_session(&engine, &id),
            Err(HubError::NoSuchEngine(engine))
        );
        assert_eq!(
            hub.cancel_session(&engine, alice, &id),
            Err(HubError::NoSuchEngine(engine))
        );
    }

    #[test]
    fn test_withdraw_goes_to_external_wallet() {
        let (mut hub, _, transfer) = hub();
        let alice = AccountId::new();

        hub.deposit(alice, 499).unwrap();
        assert_eq!(hub.withdraw(alice, 499).unwrap(), 0);

        assert_eq!(transfer.wallet_balance(&alice), 499);
        assert_eq!(hub.balance_of(&alice), 0);
    }

    #[test]
    fn test_change_period_records_event() {
        let (mut hub, owner, _) = hub();

        hub.change_session_expiration_period(owner, 9 * 24 * 3600)
            .unwrap();

        assert_eq!(hub.session_expiration_period(), Duration::days(9));
        assert_eq!(
            hub.events().last().map(|r| r.event.clone()),
            Some(HubEvent::ExpirationPeriodChanged {
                previous_secs: 6 * 3600,
                new_secs: 9 * 24 * 3600,
            })
        );
    }

    #[test]
    fn test_failed_operation_records_nothing() {
        let (mut hub, _, _) = hub();
        let alice = AccountId::new();

        assert!(hub.withdraw(alice, 1).is_err());
        assert!(hub.events().is_empty());
    }

    #[test]
    fn test_simulated_time() {
        let (mut hub, owner, _) = hub();
        let start = Utc::now();
        hub.set_time(start);
        hub.advance_time(owner, 3600).unwrap();

        assert_eq!(hub.now(), start + Duration::hours(1));
    }

    #[test]
    fn test_only_owner_moves_time_forward() {
        let (mut hub, owner, _) = hub();
        let alice = AccountId::new();
        let start = Utc::now();
        hub.set_time(start);

        assert_eq!(
            hub.advance_time(alice, 3600),
            Err(HubError::Unauthorized(alice))
        );
        assert_eq!(hub.advance_time(owner, -1), Err(HubError::InvalidTimeStep));
        assert_eq!(hub.now(), start);
    }

    #[test]
    fn test_event_sequence_survives_drain() {
        let (mut hub, _, _) = hub();
        let alice = AccountId::new();

        hub.deposit(alice, 1).unwrap();
        let drained = hub.take_events();
        hub.deposit(alice, 1).unwrap();

        assert_eq!(drained[0].sequence, 0);
        assert_eq!(hub.events()[0].sequence, 1);
    }

    #[test]
    fn test_standalone_has_one_engine() {
        let (hub, engine) = Hub::standalone(
            HubConfig::with_default_period(AccountId::new()),
            Arc::new(MockFundsTransfer::new()),
        );
        assert_eq!(hub.engine_ids(), &[engine]);
    }
}
