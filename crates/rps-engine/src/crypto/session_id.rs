//! Session identifiers.

use rps_core::crypto::{decode_32, serde_32, CryptoError};
use rps_core::{AccountId, Salt};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

const SESSION_ID_TAG: &[u8] = b"rps-hub/session-id/v1";

/// Session identifier = H(tag || initiator || challenged || salt)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(#[serde(with = "serde_32")] [u8; 32]);

impl SessionId {
    /// Derive the identifier of a session between two accounts
    pub fn derive(initiator: &AccountId, challenged: &AccountId, salt: &Salt) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(SESSION_ID_TAG);
        hasher.update(initiator.as_bytes());
        hasher.update(challenged.as_bytes());
        hasher.update(salt.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for SessionId {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_32(s).map(Self)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
