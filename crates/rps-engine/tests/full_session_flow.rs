//! Integration tests for the full session flow.
//!
//! These tests drive the hub the way an external caller would: deposit,
//! open a session, accept, reveal or let it expire, and read balances back.

use rps_engine::{
    lookup_session_result, AccountId, EngineId, GameResult, Hub, HubConfig, HubError, HubEvent,
    MockFundsTransfer, Move, RevealOutcome, Salt, Secret, SessionPhase,
    DEFAULT_SESSION_EXPIRATION_SECS,
};
use std::sync::Arc;

const INITIAL_BALANCE: u64 = 1000;
const STAKE: u64 = 500;
const PERIOD: i64 = DEFAULT_SESSION_EXPIRATION_SECS as i64;

struct Table {
    hub: Hub,
    engine: EngineId,
    owner: AccountId,
    alice: AccountId,
    bob: AccountId,
    transfer: MockFundsTransfer,
}

/// Hub with one engine and Alice and Bob funded with 1000 each
fn setup() -> Table {
    let owner = AccountId::new();
    let alice = AccountId::new();
    let bob = AccountId::new();
    let transfer = MockFundsTransfer::new();

    let mut hub = Hub::new(
        HubConfig::new(owner, DEFAULT_SESSION_EXPIRATION_SECS).unwrap(),
        Arc::new(transfer.clone()),
    );
    hub.set_time(chrono::Utc::now());
    hub.deposit(alice, INITIAL_BALANCE).unwrap();
    hub.deposit(bob, INITIAL_BALANCE).unwrap();
    let engine = hub.create_rock_paper_scissors(owner).unwrap();

    Table {
        hub,
        engine,
        owner,
        alice,
        bob,
        transfer,
    }
}

struct Opened {
    session_id: rps_engine::SessionId,
    salt: Salt,
    alice_secret: Secret,
}

fn open(table: &mut Table, alice_move: Move) -> Opened {
    let salt = Salt::random();
    let alice_secret = Secret::random();
    let session_id = Hub::session_id(&table.alice, &table.bob, &salt);
    let commitment = Hub::move_hash(&session_id, &alice_secret, alice_move);

    let opened = table
        .hub
        .init_session(
            &table.engine,
            table.alice,
            table.bob,
            STAKE,
            &salt,
            commitment,
        )
        .unwrap();
    assert_eq!(opened, session_id);

    Opened {
        session_id,
        salt,
        alice_secret,
    }
}

fn accept(table: &mut Table, opened: &Opened, bob_move: Move) -> Secret {
    let bob_secret = Secret::random();
    let commitment = Hub::move_hash(&opened.session_id, &bob_secret, bob_move);
    table
        .hub
        .accept_session(&table.engine, table.bob, &opened.session_id, commitment)
        .unwrap();
    bob_secret
}

#[test]
fn test_result_table() {
    assert_eq!(lookup_session_result(Move::Paper, Move::Rock).as_i8(), 1);
    assert_eq!(lookup_session_result(Move::Paper, Move::Paper).as_i8(), 0);
    assert_eq!(lookup_session_result(Move::Paper, Move::Scissors).as_i8(), -1);
    assert_eq!(lookup_session_result(Move::Rock, Move::Rock).as_i8(), 0);
    assert_eq!(lookup_session_result(Move::Rock, Move::Paper).as_i8(), -1);
    assert_eq!(lookup_session_result(Move::Rock, Move::Scissors).as_i8(), 1);
    assert_eq!(lookup_session_result(Move::Scissors, Move::Rock).as_i8(), -1);
    assert_eq!(lookup_session_result(Move::Scissors, Move::Paper).as_i8(), 1);
    assert_eq!(lookup_session_result(Move::Scissors, Move::Scissors).as_i8(), 0);
}

#[test]
fn test_deposit_and_withdraw_accounting() {
    let mut table = setup();

    table.hub.deposit(table.bob, 2000).unwrap();
    assert_eq!(table.hub.balance_of(&table.bob), 3000);

    table.hub.withdraw(table.bob, 700).unwrap();
    assert_eq!(table.hub.balance_of(&table.bob), 2300);
    assert_eq!(table.transfer.wallet_balance(&table.bob), 700);

    let result = table.hub.withdraw(table.bob, 2301);
    assert!(matches!(result, Err(HubError::InsufficientFunds { .. })));
    assert_eq!(table.hub.balance_of(&table.bob), 2300);
    assert!(table.hub.ledger().is_consistent());
}

#[test]
fn test_rejected_withdrawal_keeps_balance() {
    let mut table = setup();
    table.transfer.reject(table.alice);

    let result = table.hub.withdraw(table.alice, 400);

    assert!(matches!(result, Err(HubError::TransferFailed(_))));
    assert_eq!(table.hub.balance_of(&table.alice), INITIAL_BALANCE);
    assert_eq!(table.transfer.wallet_balance(&table.alice), 0);
}

#[test]
fn test_init_session_debits_stake() {
    let mut table = setup();
    let opened = open(&mut table, Move::Scissors);

    let session = table
        .hub
        .game_session(&table.engine, &opened.session_id)
        .unwrap()
        .unwrap();
    assert_eq!(session.stake, STAKE);
    assert_eq!(session.initiator, table.alice);
    assert_eq!(session.challenged, table.bob);
    assert!(session.expires_at > table.hub.now());
    assert_eq!(
        table.hub.balance_of(&table.alice),
        INITIAL_BALANCE - STAKE
    );
}

#[test]
fn test_reinit_is_rejected_and_session_unchanged() {
    let mut table = setup();
    let opened = open(&mut table, Move::Scissors);
    let before = table
        .hub
        .game_session(&table.engine, &opened.session_id)
        .unwrap()
        .cloned();

    table.hub.advance_time(table.owner, 60).unwrap();
    let commitment = Hub::move_hash(&opened.session_id, &opened.alice_secret, Move::Scissors);
    let result = table.hub.init_session(
        &table.engine,
        table.alice,
        table.bob,
        STAKE,
        &opened.salt,
        commitment,
    );

    assert_eq!(
        result,
        Err(HubError::SessionAlreadyExists(opened.session_id))
    );
    let after = table
        .hub
        .game_session(&table.engine, &opened.session_id)
        .unwrap()
        .cloned();
    assert_eq!(after, before);
    assert_eq!(
        table.hub.balance_of(&table.alice),
        INITIAL_BALANCE - STAKE
    );
}

#[test]
fn test_reveal_before_counterpart_commitment() {
    let mut table = setup();
    let opened = open(&mut table, Move::Scissors);
    let before = table
        .hub
        .game_session(&table.engine, &opened.session_id)
        .unwrap()
        .cloned();

    let result = table.hub.reveal_session_move(
        &table.engine,
        table.alice,
        &opened.session_id,
        &opened.alice_secret,
        Move::Scissors,
    );

    assert_eq!(result, Err(HubError::NotInitiated(opened.session_id)));
    let after = table
        .hub
        .game_session(&table.engine, &opened.session_id)
        .unwrap()
        .cloned();
    assert_eq!(after, before);
}

#[test]
fn test_cancel_immediately_after_init_fails() {
    let mut table = setup();
    let opened = open(&mut table, Move::Scissors);

    let result = table
        .hub
        .cancel_session(&table.engine, table.alice, &opened.session_id);

    assert_eq!(result, Err(HubError::NotExpired(opened.session_id)));
    assert_eq!(
        table.hub.engine(&table.engine).unwrap().phase(&opened.session_id),
        SessionPhase::Initiated
    );
}

#[test]
fn test_cancel_after_expiration_refunds_initiator() {
    let mut table = setup();
    let opened = open(&mut table, Move::Scissors);

    table.hub.advance_time(table.owner, PERIOD).unwrap();
    table
        .hub
        .cancel_session(&table.engine, table.alice, &opened.session_id)
        .unwrap();

    assert_eq!(
        table
            .hub
            .game_session(&table.engine, &opened.session_id)
            .unwrap(),
        None
    );
    assert_eq!(table.hub.balance_of(&table.alice), INITIAL_BALANCE);
    assert!(table.hub.ledger().is_consistent());
}

#[test]
fn test_cannot_cancel_right_after_late_accept() {
    let mut table = setup();
    let opened = open(&mut table, Move::Scissors);

    table.hub.advance_time(table.owner, PERIOD - 1).unwrap();
    accept(&mut table, &opened, Move::Paper);
    table.hub.advance_time(table.owner, 1).unwrap();

    let result = table
        .hub
        .cancel_session(&table.engine, table.bob, &opened.session_id);
    assert_eq!(result, Err(HubError::NotExpired(opened.session_id)));
}

#[test]
fn test_initiator_wins_end_to_end() {
    let mut table = setup();
    let opened = open(&mut table, Move::Scissors);
    let bob_secret = accept(&mut table, &opened, Move::Paper);

    let first = table
        .hub
        .reveal_session_move(
            &table.engine,
            table.alice,
            &opened.session_id,
            &opened.alice_secret,
            Move::Scissors,
        )
        .unwrap();
    assert!(matches!(first, RevealOutcome::Pending { .. }));

    let second = table
        .hub
        .reveal_session_move(
            &table.engine,
            table.bob,
            &opened.session_id,
            &bob_secret,
            Move::Paper,
        )
        .unwrap();
    assert!(matches!(
        second,
        RevealOutcome::Settled {
            result: GameResult::InitiatorWins,
            ..
        }
    ));

    assert_eq!(table.hub.balance_of(&table.alice), 1500);
    assert_eq!(table.hub.balance_of(&table.bob), 500);
    assert_eq!(
        table
            .hub
            .game_session(&table.engine, &opened.session_id)
            .unwrap(),
        None
    );
    assert!(table.hub.ledger().is_consistent());
}

#[test]
fn test_silent_challenged_forfeits_end_to_end() {
    let mut table = setup();
    let opened = open(&mut table, Move::Rock);
    accept(&mut table, &opened, Move::Paper);

    table
        .hub
        .reveal_session_move(
            &table.engine,
            table.alice,
            &opened.session_id,
            &opened.alice_secret,
            Move::Rock,
        )
        .unwrap();

    table.hub.advance_time(table.owner, PERIOD).unwrap();
    table
        .hub
        .cancel_session(&table.engine, table.alice, &opened.session_id)
        .unwrap();

    assert_eq!(table.hub.balance_of(&table.alice), 1500);
    assert_eq!(table.hub.balance_of(&table.bob), 500);
    assert!(table.hub.ledger().is_consistent());
}

#[test]
fn test_engines_share_the_ledger() {
    let mut table = setup();
    let second = table.hub.create_rock_paper_scissors(table.owner).unwrap();

    let salt = Salt::random();
    let session_id = Hub::session_id(&table.alice, &table.bob, &salt);
    let commitment = Hub::move_hash(&session_id, &Secret::random(), Move::Rock);

    table
        .hub
        .init_session(&table.engine, table.alice, table.bob, 600, &salt, commitment)
        .unwrap();
    // Same identifier in another engine is a separate session, but the
    // remaining 400 cannot cover a second 600 stake.
    let result = table
        .hub
        .init_session(&second, table.alice, table.bob, 600, &salt, commitment);

    assert!(matches!(result, Err(HubError::InsufficientFunds { .. })));
    assert_eq!(table.hub.ledger().escrowed(), 600);
}

#[test]
fn test_events_trace_the_session() {
    let mut table = setup();
    let opened = open(&mut table, Move::Paper);
    let bob_secret = accept(&mut table, &opened, Move::Paper);
    table
        .hub
        .reveal_session_move(
            &table.engine,
            table.bob,
            &opened.session_id,
            &bob_secret,
            Move::Paper,
        )
        .unwrap();
    table
        .hub
        .reveal_session_move(
            &table.engine,
            table.alice,
            &opened.session_id,
            &opened.alice_secret,
            Move::Paper,
        )
        .unwrap();

    let session_events: Vec<_> = table
        .hub
        .events()
        .iter()
        .filter(|r| r.event.session_id() == Some(opened.session_id))
        .map(|r| r.event.clone())
        .collect();

    assert_eq!(session_events.len(), 5);
    assert!(matches!(session_events[0], HubEvent::SessionCreated { .. }));
    assert!(matches!(session_events[1], HubEvent::SessionAccepted { .. }));
    assert!(matches!(session_events[2], HubEvent::MoveRevealed { .. }));
    assert!(matches!(session_events[3], HubEvent::MoveRevealed { .. }));
    assert_eq!(
        session_events[4],
        HubEvent::SessionSettled {
            engine: table.engine,
            session_id: opened.session_id,
            result: GameResult::Draw,
            initiator: table.alice,
            challenged: table.bob,
            initiator_balance: INITIAL_BALANCE,
            challenged_balance: INITIAL_BALANCE,
        }
    );
}
