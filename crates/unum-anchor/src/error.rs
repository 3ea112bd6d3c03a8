use unum_registry::RegistryError;

/// A single submission attempt's failure. All variants are retryable
/// within the gateway's attempt budget.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SubmitError {
    #[error("submission timed out")]
    Timeout,

    #[error("submission rejected: {0}")]
    Rejected(String),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Anchoring errors surfaced to the enrollment pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AnchorError {
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: SubmitError },

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}
