//! Cryptographic primitives shared by the hub crates.
//!
//! This module provides:
//! - Secret, the hidden half of a move commitment
//! - Salt, the per-session randomness mixed into session identifiers
//! - hex (de)serialization helpers for 32-byte values

mod hex_bytes;
mod secret;

pub use hex_bytes::{decode_32, serde_32, CryptoError};
pub use secret::{Salt, Secret};
