//! Two-party commit-reveal sessions.

mod engine;
mod state;

pub use engine::{Cancellation, RevealOutcome, SessionEngine, TxContext};
pub use state::{GameSession, SessionPhase};
