//! RPS Engine Library
//!
//! This crate provides the balance ledger, the commit-reveal session engine,
//! result computation and the hub that ties them together for two-party
//! Rock-Paper-Scissors wagers.

pub mod config;
pub mod crypto;
pub mod error;
pub mod events;
pub mod games;
pub mod hub;
pub mod ledger;
pub mod protocol;
pub mod session;

pub use config::{HubConfig, DEFAULT_SESSION_EXPIRATION_SECS};
pub use crypto::{Commitment, SessionId};
pub use error::{HubError, HubResult};
pub use events::{EventRecord, HubEvent};
pub use games::{lookup_session_result, Move};
pub use hub::Hub;
pub use ledger::BalanceLedger;
pub use protocol::{EngineId, GameResult, Player};
pub use rps_core::{AccountId, FundsTransfer, MockFundsTransfer, Salt, Secret};
pub use session::{Cancellation, GameSession, RevealOutcome, SessionEngine, SessionPhase, TxContext};
