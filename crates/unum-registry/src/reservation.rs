use std::sync::Arc;

use unum_core::types::Did;
use unum_crypto::CommitmentKey;

use crate::duplicate_index::{DuplicateIndex, ReservationToken};
use crate::error::RegistryError;

/// RAII handle for an in-flight reservation.
///
/// Dropping an armed guard releases the reservation, so an enrollment
/// future cancelled at any await point rolls its claim back instead of
/// leaving a `Pending` entry behind. Callers disarm the guard once the
/// reservation has been committed.
#[must_use = "dropping an armed guard releases the reservation"]
pub struct ReservationGuard {
    index: Arc<DuplicateIndex>,
    token: ReservationToken,
    armed: bool,
}

impl ReservationGuard {
    /// Reserve the DID/commitment pair and guard the resulting token.
    pub fn acquire(
        index: Arc<DuplicateIndex>,
        did: &Did,
        key: CommitmentKey,
    ) -> Result<Self, RegistryError> {
        let token = index.reserve(did, key)?;
        Ok(Self {
            index,
            token,
            armed: true,
        })
    }

    /// The token this guard protects.
    pub fn token(&self) -> ReservationToken {
        self.token
    }

    /// Take ownership of the token and stop guarding it. Called after a
    /// successful commit.
    pub fn disarm(mut self) -> ReservationToken {
        self.armed = false;
        self.token
    }
}

impl Drop for ReservationGuard {
    fn drop(&mut self) {
        if self.armed {
            if let Err(error) = self.index.release(self.token) {
                tracing::warn!(token = %self.token, error = %error, "guard release failed");
            } else {
                tracing::debug!(token = %self.token, "reservation released by guard");
            }
        }
    }
}
