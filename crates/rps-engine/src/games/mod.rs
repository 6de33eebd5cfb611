//! Game definitions and logic.

mod rps;

pub use rps::{lookup_session_result, Move};
