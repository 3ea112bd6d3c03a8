//! Unum Crypto — Biometric commitment validation and deterministic DID
//! derivation for the Unum identity engine.
//!
//! The derivation here is the load-bearing determinism guarantee: the
//! same commitment and network must map to the same DID on any machine,
//! for the lifetime of the system. The hash (BLAKE3), the domain tags,
//! and the multibase alphabet are therefore frozen constants.

pub mod commitment;
pub mod derivation;
pub mod error;
pub mod hashing;

pub use commitment::{BiometricCommitment, CommitmentKey, COMMITMENT_LEN};
pub use derivation::{commitment_key, derive_did};
pub use error::CryptoError;
pub use hashing::{hash, Hash};
