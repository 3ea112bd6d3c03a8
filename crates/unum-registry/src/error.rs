use unum_core::types::{Controller, Did};
use unum_crypto::CommitmentKey;

use crate::duplicate_index::ReservationToken;

/// Registry errors: uniqueness conflicts, lifecycle conflicts, and
/// integrity faults.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("commitment already enrolled under key {0}")]
    DuplicateCommitment(CommitmentKey),

    #[error("unknown or stale reservation: {0}")]
    UnknownReservation(ReservationToken),

    #[error("derivation collision: {0} already bound to a different commitment")]
    CollisionDetected(Did),

    #[error("unknown identity: {0}")]
    UnknownIdentity(Did),

    #[error("identity already recorded: {0}")]
    IdentityExists(Did),

    #[error("identity already revoked: {0}")]
    AlreadyRevoked(Did),

    #[error("identity revoked: {0}")]
    IdentityRevoked(Did),

    #[error("controller {controller} is not authorized for {did}")]
    UnauthorizedController { controller: Controller, did: Did },

    #[error("controller {controller} already bound to active identity {did}")]
    ControllerInUse { controller: Controller, did: Did },

    #[error("controller set must not be empty")]
    EmptyControllerSet,

    #[error("core error: {0}")]
    Core(#[from] unum_core::CoreError),
}
