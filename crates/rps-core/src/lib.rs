//! RPS Core Library
//!
//! Shared primitives for the Rock-Paper-Scissors wagering hub:
//! - Account identifiers
//! - Cryptographic primitives (Secret, Salt)
//! - FundsTransfer trait and MockFundsTransfer

pub mod account;
pub mod crypto;
pub mod transfer;

pub use account::AccountId;
pub use crypto::{CryptoError, Salt, Secret};
pub use transfer::{FundsTransfer, MockFundsTransfer, TransferError};
