//! Cryptographic primitives for the session protocol.
//!
//! This module provides:
//! - SessionId, derived from both participants and the initiator's salt
//! - Commitment, binding a session, a secret and a move for commit-reveal

mod commitment;
mod session_id;

pub use commitment::Commitment;
pub use session_id::SessionId;
