use std::sync::Arc;
use std::time::Duration;

use unum_core::config::AnchorConfig;
use unum_core::document::MetadataDocument;
use unum_registry::{DuplicateIndex, ReservationToken};

use crate::error::{AnchorError, SubmitError};
use crate::submitter::{Confirmation, LedgerSubmitter};

/// Drives ledger submission with bounded retries and reconciles the
/// outcome with the duplicate index.
///
/// Enrollment documents ride a reservation: confirmation commits it,
/// retry exhaustion releases it so the commitment key becomes available
/// again instead of leaking a permanently pending entry. Update documents
/// (rotation, revocation) carry no reservation and only get the retry
/// envelope.
pub struct AnchorGateway {
    submitter: Arc<dyn LedgerSubmitter>,
    index: Arc<DuplicateIndex>,
    config: AnchorConfig,
}

impl AnchorGateway {
    /// Create a gateway over the given submitter and index.
    pub fn new(
        submitter: Arc<dyn LedgerSubmitter>,
        index: Arc<DuplicateIndex>,
        config: AnchorConfig,
    ) -> Self {
        Self {
            submitter,
            index,
            config,
        }
    }

    /// Anchor an enrollment document, then commit its reservation.
    /// On retry exhaustion the reservation is released before the error
    /// is returned.
    pub async fn anchor_enrollment(
        &self,
        document: &MetadataDocument,
        token: ReservationToken,
    ) -> Result<Confirmation, AnchorError> {
        match self.submit_with_retry(document).await {
            Ok(confirmation) => {
                self.index.commit(token)?;
                Ok(confirmation)
            }
            Err(error) => {
                if let Err(release_error) = self.index.release(token) {
                    tracing::error!(
                        token = %token,
                        error = %release_error,
                        "failed to release reservation after anchoring failure"
                    );
                }
                Err(error)
            }
        }
    }

    /// Anchor a successor document for an already-issued identity.
    pub async fn anchor_update(
        &self,
        document: &MetadataDocument,
    ) -> Result<Confirmation, AnchorError> {
        self.submit_with_retry(document).await
    }

    async fn submit_with_retry(
        &self,
        document: &MetadataDocument,
    ) -> Result<Confirmation, AnchorError> {
        let timeout = Duration::from_millis(self.config.submit_timeout_ms);
        let mut last = SubmitError::Timeout;

        for attempt in 1..=self.config.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.backoff(attempt)).await;
            }

            match tokio::time::timeout(timeout, self.submitter.submit(document)).await {
                Ok(Ok(confirmation)) => {
                    tracing::debug!(
                        did = %document.did,
                        tx_ref = %confirmation.tx_ref,
                        attempt,
                        "submission confirmed"
                    );
                    return Ok(confirmation);
                }
                Ok(Err(error)) => {
                    tracing::warn!(did = %document.did, attempt, error = %error, "submission failed");
                    last = error;
                }
                Err(_elapsed) => {
                    tracing::warn!(did = %document.did, attempt, "submission timed out");
                    last = SubmitError::Timeout;
                }
            }
        }

        Err(AnchorError::RetriesExhausted {
            attempts: self.config.max_attempts,
            last,
        })
    }

    /// Exponential backoff: base, 2*base, 4*base, ... (shift capped so
    /// large attempt counts cannot overflow).
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = (attempt - 2).min(10);
        Duration::from_millis(self.config.backoff_base_ms << exponent)
    }
}
