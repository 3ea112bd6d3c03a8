/// Commitment validation and derivation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid commitment format: expected {expected} bytes, got {actual}")]
    InvalidCommitmentFormat { expected: usize, actual: usize },

    #[error("degenerate commitment value rejected")]
    DegenerateCommitment,
}
