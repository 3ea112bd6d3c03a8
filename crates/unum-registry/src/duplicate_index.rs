use std::fmt;

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use unum_core::types::Did;
use unum_crypto::CommitmentKey;
use uuid::Uuid;

use crate::error::RegistryError;

/// Token identifying an in-flight or finalized reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservationToken(pub Uuid);

impl ReservationToken {
    /// Mint a fresh token.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ReservationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReservationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a duplicate-index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationState {
    /// Claimed for an enrollment whose document is not yet anchored.
    Pending,
    /// Enrollment anchored; the commitment key is permanently taken.
    Committed,
    /// Reservation rolled back; the key is available again.
    Released,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    did: Did,
    token: ReservationToken,
    state: ReservationState,
    reserved_at: DateTime<Utc>,
}

/// The uniqueness-enforcing store keyed by commitment (and, independently,
/// by DID). This is the Sybil-resistance gate: a person who re-enrolls,
/// even through a different controller, reproduces the same commitment
/// key and is rejected here.
///
/// `reserve` is a single atomic compare-and-insert against the commitment
/// key (the `DashMap` entry holds the shard lock for the whole claim), so
/// concurrent reservations for the same key never both succeed.
pub struct DuplicateIndex {
    by_commitment: DashMap<CommitmentKey, IndexEntry>,
    by_did: DashMap<Did, CommitmentKey>,
    by_token: DashMap<ReservationToken, CommitmentKey>,
}

impl DuplicateIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            by_commitment: DashMap::new(),
            by_did: DashMap::new(),
            by_token: DashMap::new(),
        }
    }

    /// Atomically claim the DID/commitment pair for an enrollment.
    ///
    /// Exactly one caller wins a race for the same commitment key; the
    /// rest observe `DuplicateCommitment`. A DID already live under a
    /// *different* commitment key is an integrity fault
    /// (`CollisionDetected`), surfaced distinctly so operators
    /// investigate instead of reading it as ordinary Sybil behavior.
    pub fn reserve(
        &self,
        did: &Did,
        key: CommitmentKey,
    ) -> Result<ReservationToken, RegistryError> {
        // DID-side check, independent of the commitment-side slot.
        if let Some(existing_key) = self.by_did.get(did).map(|entry| *entry.value()) {
            if existing_key != key && self.is_live(&existing_key) {
                tracing::error!(
                    did = %did,
                    "distinct commitments derived the same DID; halting enrollment"
                );
                return Err(RegistryError::CollisionDetected(did.clone()));
            }
        }

        let token = ReservationToken::new();
        let entry = IndexEntry {
            did: did.clone(),
            token,
            state: ReservationState::Pending,
            reserved_at: Utc::now(),
        };

        match self.by_commitment.entry(key) {
            Entry::Occupied(mut occupied) => match occupied.get().state {
                ReservationState::Pending | ReservationState::Committed => {
                    if occupied.get().did != *did {
                        // Same index key from a different enrollment's
                        // commitment: the key domain itself collided.
                        tracing::error!(
                            key = %key,
                            "commitment key collision across distinct DIDs"
                        );
                        return Err(RegistryError::CollisionDetected(
                            occupied.get().did.clone(),
                        ));
                    }
                    return Err(RegistryError::DuplicateCommitment(key));
                }
                ReservationState::Released => {
                    occupied.insert(entry);
                }
            },
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
            }
        }

        self.by_did.insert(did.clone(), key);
        self.by_token.insert(token, key);

        tracing::debug!(did = %did, key = %key, token = %token, "reservation created");
        Ok(token)
    }

    /// Finalize a reservation once its document is durably anchored.
    ///
    /// Retrying commit with the same token on an already-committed entry
    /// is an `Ok` no-op (crash between commit and acknowledgement); any
    /// token not matching a live entry is `UnknownReservation`.
    pub fn commit(&self, token: ReservationToken) -> Result<(), RegistryError> {
        let key = self
            .by_token
            .get(&token)
            .map(|entry| *entry.value())
            .ok_or(RegistryError::UnknownReservation(token))?;

        let mut entry = self
            .by_commitment
            .get_mut(&key)
            .ok_or(RegistryError::UnknownReservation(token))?;

        if entry.token != token {
            return Err(RegistryError::UnknownReservation(token));
        }

        match entry.state {
            ReservationState::Pending => {
                entry.state = ReservationState::Committed;
                tracing::info!(did = %entry.did, key = %key, "reservation committed");
                Ok(())
            }
            ReservationState::Committed => Ok(()),
            ReservationState::Released => Err(RegistryError::UnknownReservation(token)),
        }
    }

    /// Roll back a reservation that failed to anchor, freeing the
    /// commitment key for retry. Idempotent: unknown and already-released
    /// tokens are `Ok`. A committed entry can never be released.
    pub fn release(&self, token: ReservationToken) -> Result<(), RegistryError> {
        let Some(key) = self.by_token.get(&token).map(|entry| *entry.value()) else {
            return Ok(());
        };

        let Some(mut entry) = self.by_commitment.get_mut(&key) else {
            return Ok(());
        };

        if entry.token != token {
            // Superseded by a newer reservation for the same key.
            return Ok(());
        }

        match entry.state {
            ReservationState::Pending => {
                entry.state = ReservationState::Released;
                let did = entry.did.clone();
                drop(entry);

                self.by_did.remove_if(&did, |_, mapped| *mapped == key);
                self.by_token.remove(&token);
                tracing::debug!(did = %did, key = %key, "reservation released");
                Ok(())
            }
            ReservationState::Released => Ok(()),
            ReservationState::Committed => Err(RegistryError::UnknownReservation(token)),
        }
    }

    /// Garbage-collect Pending reservations older than `max_age` back to
    /// Released, so a crashed worker cannot block a commitment key
    /// forever. Returns the number of reservations swept.
    pub fn sweep_expired(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let mut swept = 0;

        // The entry's shard lock is held across the side-map cleanup, so
        // a racing reserve for the same key cannot interleave between the
        // state flip and the removal of its DID/token mappings.
        for mut entry in self.by_commitment.iter_mut() {
            if entry.state == ReservationState::Pending && entry.reserved_at < cutoff {
                entry.state = ReservationState::Released;
                let key = *entry.key();
                let did = entry.did.clone();
                let token = entry.token;

                self.by_did.remove_if(&did, |_, mapped| *mapped == key);
                self.by_token.remove(&token);
                tracing::warn!(did = %did, key = %key, "expired reservation swept");
                swept += 1;
            }
        }

        swept
    }

    /// Current state of the entry for a commitment key, if any.
    pub fn state_of(&self, key: &CommitmentKey) -> Option<ReservationState> {
        self.by_commitment.get(key).map(|entry| entry.state)
    }

    /// Whether a commitment key has a committed enrollment.
    pub fn is_committed(&self, key: &CommitmentKey) -> bool {
        self.state_of(key) == Some(ReservationState::Committed)
    }

    /// The DID committed for a commitment key, if any.
    pub fn committed_did(&self, key: &CommitmentKey) -> Option<Did> {
        self.by_commitment.get(key).and_then(|entry| {
            (entry.state == ReservationState::Committed).then(|| entry.did.clone())
        })
    }

    /// Whether a DID has a committed enrollment.
    pub fn did_is_committed(&self, did: &Did) -> bool {
        self.by_did
            .get(did)
            .map(|entry| *entry.value())
            .map(|key| self.is_committed(&key))
            .unwrap_or(false)
    }

    /// Number of entries (any state) in the index.
    pub fn len(&self) -> usize {
        self.by_commitment.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.by_commitment.is_empty()
    }

    fn is_live(&self, key: &CommitmentKey) -> bool {
        matches!(
            self.state_of(key),
            Some(ReservationState::Pending | ReservationState::Committed)
        )
    }
}

impl Default for DuplicateIndex {
    fn default() -> Self {
        Self::new()
    }
}
