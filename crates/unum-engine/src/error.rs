use std::fmt;

use unum_anchor::AnchorError;
use unum_core::CoreError;
use unum_crypto::CryptoError;
use unum_registry::RegistryError;

/// Which taxonomy bucket a rejection falls into, so the calling layer can
/// choose between "you are already enrolled", "please retry", and
/// "contact support".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed or unsupported input; rejected synchronously, no state
    /// change. Not retryable with the same input.
    Input,
    /// The request conflicts with existing state (duplicate enrollment,
    /// revoked identity, unauthorized controller). Final; no state change.
    Conflict,
    /// Infrastructure trouble while anchoring. Retrying the same request
    /// later is safe.
    Transient,
    /// An invariant the system is built on was observed broken. Requires
    /// operator investigation, not a retry.
    Integrity,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "Input"),
            Self::Conflict => write!(f, "Conflict"),
            Self::Transient => write!(f, "Transient"),
            Self::Integrity => write!(f, "Integrity"),
        }
    }
}

/// Errors surfaced by the enrollment engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("anchor error: {0}")]
    Anchor(#[from] AnchorError),
}

impl EngineError {
    /// Classify the error for the calling layer.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Core(_) | Self::Crypto(_) => ErrorCategory::Input,
            Self::Registry(error) => registry_category(error),
            Self::Anchor(AnchorError::RetriesExhausted { .. }) => ErrorCategory::Transient,
            Self::Anchor(AnchorError::Registry(error)) => registry_category(error),
        }
    }

    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }
}

fn registry_category(error: &RegistryError) -> ErrorCategory {
    match error {
        RegistryError::DuplicateCommitment(_)
        | RegistryError::AlreadyRevoked(_)
        | RegistryError::IdentityRevoked(_)
        | RegistryError::UnauthorizedController { .. }
        | RegistryError::ControllerInUse { .. }
        | RegistryError::UnknownReservation(_)
        | RegistryError::IdentityExists(_) => ErrorCategory::Conflict,
        RegistryError::UnknownIdentity(_)
        | RegistryError::EmptyControllerSet
        | RegistryError::Core(_) => ErrorCategory::Input,
        RegistryError::CollisionDetected(_) => ErrorCategory::Integrity,
    }
}
