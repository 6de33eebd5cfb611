//! Move commitments for the commit-reveal scheme.

use super::SessionId;
use crate::games::Move;
use rps_core::crypto::{decode_32, serde_32, CryptoError};
use rps_core::Secret;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

const COMMITMENT_TAG: &[u8] = b"rps-hub/commitment/v1";

/// Commitment = H(tag || session_id || secret || move)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commitment(#[serde(with = "serde_32")] [u8; 32]);

impl Commitment {
    /// Commit to `mv` within `session_id`
    pub fn new(session_id: &SessionId, secret: &Secret, mv: Move) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(COMMITMENT_TAG);
        hasher.update(session_id.as_bytes());
        hasher.update(secret.as_bytes());
        hasher.update([mv.ordinal()]);
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

    /// Verify that the given session, secret and move produce this commitment
    pub fn verify(&self, session_id: &SessionId, secret: &Secret, mv: Move) -> bool {
        *self == Self::new(session_id, secret, mv)
    }
}

impl FromStr for Commitment {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_32(s).map(Self)
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
