use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Fixed output length of the commitment scheme, in bytes.
pub const COMMITMENT_LEN: usize = 32;

/// An opaque biometric commitment produced by the external capture
/// subsystem. Stands in for a biometric sample; never contains raw
/// biometric data, and is never logged or printed in full. Bytes are
/// zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct BiometricCommitment([u8; COMMITMENT_LEN]);

impl BiometricCommitment {
    /// Validate and wrap raw commitment bytes.
    ///
    /// Rejects inputs that are not exactly [`COMMITMENT_LEN`] bytes, and
    /// degenerate values (all-zero, all-0xFF) that no honest commitment
    /// scheme emits.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != COMMITMENT_LEN {
            return Err(CryptoError::InvalidCommitmentFormat {
                expected: COMMITMENT_LEN,
                actual: bytes.len(),
            });
        }

        let mut buf = [0u8; COMMITMENT_LEN];
        buf.copy_from_slice(bytes);

        if buf.iter().all(|&b| b == 0x00) || buf.iter().all(|&b| b == 0xFF) {
            return Err(CryptoError::DegenerateCommitment);
        }

        Ok(Self(buf))
    }

    /// The raw commitment bytes. Callers must not log or persist these.
    pub fn as_bytes(&self) -> &[u8; COMMITMENT_LEN] {
        &self.0
    }
}

// Redacted: commitment bytes must never reach logs or error messages.
impl fmt::Debug for BiometricCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BiometricCommitment(<{} bytes redacted>)", COMMITMENT_LEN)
    }
}

/// Key under which a commitment is tracked in the duplicate index.
///
/// A BLAKE3 hash of the commitment under its own domain tag, so the index
/// never holds raw commitments and its keys cannot collide by
/// construction with DID digests.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitmentKey(pub [u8; 32]);

impl CommitmentKey {
    /// Full hex form, for durable audit records.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Abbreviated hex form used in logs and error messages.
    pub fn abbrev(&self) -> String {
        format!("{}…", hex::encode(&self.0[..4]))
    }
}

impl fmt::Debug for CommitmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitmentKey({})", self.abbrev())
    }
}

// Display is the abbreviated form; full keys are opt-in via to_hex.
impl fmt::Display for CommitmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbrev())
    }
}
