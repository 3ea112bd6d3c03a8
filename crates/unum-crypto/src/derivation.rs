//! Deterministic DID derivation.
//!
//! `derive_did` is a pure function: identical commitment + network yields
//! the identical DID on every invocation, on every machine. The digest
//! deliberately covers nothing else — no wallet address, device
//! identifier, or timestamp may ever enter the hash input, which is what
//! retired the legacy wallet-embedded identifier format.

use unum_core::types::{Did, Network};

use crate::commitment::{BiometricCommitment, CommitmentKey};

/// Domain-separation tag for DID derivation. Frozen: changing it breaks
/// determinism for every issued DID.
const DERIVATION_DOMAIN: &str = "unum:did:derive:v1";

/// Domain-separation tag for duplicate-index keys. Distinct from the DID
/// domain so index keys and DID digests can never coincide.
const INDEX_KEY_DOMAIN: &str = "unum:index:key:v1";

/// Derive the DID for a validated commitment on the given network.
///
/// Digest input is `domain || 0x00 || network-tag || 0x00 || commitment`;
/// the NUL delimiters terminate the variable-width tokens (neither tag
/// contains NUL). The digest is rendered as multibase base58btc.
pub fn derive_did(commitment: &BiometricCommitment, network: Network) -> Did {
    let mut hasher = blake3::Hasher::new();
    hasher.update(DERIVATION_DOMAIN.as_bytes());
    hasher.update(&[0x00]);
    hasher.update(network.as_str().as_bytes());
    hasher.update(&[0x00]);
    hasher.update(commitment.as_bytes());
    let digest = hasher.finalize();

    Did::from_parts(network, &multibase_encode(digest.as_bytes()))
}

/// Derive the duplicate-index key for a commitment.
pub fn commitment_key(commitment: &BiometricCommitment) -> CommitmentKey {
    let mut hasher = blake3::Hasher::new();
    hasher.update(INDEX_KEY_DOMAIN.as_bytes());
    hasher.update(&[0x00]);
    hasher.update(commitment.as_bytes());
    CommitmentKey(*hasher.finalize().as_bytes())
}

/// Multibase base58btc: `z` prefix + Bitcoin-alphabet base58.
fn multibase_encode(digest: &[u8]) -> String {
    format!("z{}", bs58::encode(digest).into_string())
}
