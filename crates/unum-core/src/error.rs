use crate::identity_state::IdentityState;
use crate::types::SchemaVersion;

/// Core engine errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: IdentityState,
        to: IdentityState,
    },

    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error("unknown schema version: {0}")]
    UnknownSchemaVersion(String),

    #[error("metadata version mismatch for schema {version}: {detail}")]
    MetadataVersionMismatch {
        version: SchemaVersion,
        detail: String,
    },

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
