//! Protocol types.

mod types;

pub use types::{EngineId, GameResult, Player};
