use std::sync::Arc;

use chrono::{Duration, Utc};
use unum_anchor::{AnchorGateway, LedgerSubmitter};
use unum_core::config::EngineConfig;
use unum_core::document::{MetadataBuilder, MetadataDocument};
use unum_core::identity_state::IdentityState;
use unum_core::types::{Controller, ControllerSet, Did, Network, RevocationReason, SchemaVersion};
use unum_crypto::{commitment_key, derive_did, BiometricCommitment};
use unum_registry::{
    DuplicateIndex, IdentityRecord, IdentityStore, LedgerEvent, RegistryError, ReservationGuard,
    RevocationLedger, RevocationRecord,
};

use crate::error::EngineError;

/// The enrollment engine: issues identities deterministically from
/// biometric commitments and enforces that one commitment can only ever
/// hold one identity.
pub struct EnrollmentEngine {
    config: EngineConfig,
    index: Arc<DuplicateIndex>,
    store: Arc<IdentityStore>,
    ledger: RevocationLedger,
    gateway: AnchorGateway,
}

impl EnrollmentEngine {
    /// Create an engine over the given submission collaborator.
    pub fn new(config: EngineConfig, submitter: Arc<dyn LedgerSubmitter>) -> Self {
        let index = Arc::new(DuplicateIndex::new());
        let store = Arc::new(IdentityStore::new());
        let ledger = RevocationLedger::new(Arc::clone(&index), Arc::clone(&store));
        let gateway = AnchorGateway::new(submitter, Arc::clone(&index), config.anchor.clone());

        Self {
            config,
            index,
            store,
            ledger,
            gateway,
        }
    }

    /// Enroll a person: validate the commitment, derive the DID, claim
    /// the uniqueness slot, anchor the metadata document, and record the
    /// identity.
    ///
    /// A re-enrollment of the same commitment — even through a different
    /// controller — reproduces the same commitment key and fails with
    /// `DuplicateCommitment`. Any failure or cancellation between
    /// reservation and commit resolves to release.
    pub async fn enroll(
        &self,
        raw_commitment: &[u8],
        network: &str,
        controller: Controller,
    ) -> Result<Did, EngineError> {
        let network = Network::parse(network)?;
        let commitment = BiometricCommitment::from_bytes(raw_commitment)?;

        let did = derive_did(&commitment, network);
        let key = commitment_key(&commitment);

        // Fail fast before claiming anything; the binding below re-checks.
        if let Some(owner) = self.store.controller_owner(&controller) {
            if owner != did {
                return Err(RegistryError::ControllerInUse {
                    controller,
                    did: owner,
                }
                .into());
            }
        }

        let guard = ReservationGuard::acquire(Arc::clone(&self.index), &did, key)?;

        let enrolled_at = Utc::now();
        let controllers = ControllerSet::from_vec(vec![controller]);
        let document = MetadataBuilder::new(SchemaVersion::CURRENT)
            .did(did.clone())
            .controllers(controllers.clone())
            .enrolled_at(enrolled_at)
            .build()?;

        self.store.bind_controllers(&did, &controllers)?;

        match self.gateway.anchor_enrollment(&document, guard.token()).await {
            Ok(confirmation) => {
                guard.disarm();
                self.store.insert_record(IdentityRecord {
                    did: did.clone(),
                    controllers,
                    enrolled_at,
                    state: IdentityState::Active,
                    schema_version: SchemaVersion::CURRENT,
                    revoked_at: None,
                })?;
                self.store.append_document(&did, document);

                tracing::info!(
                    did = %did,
                    key = %key,
                    tx_ref = %confirmation.tx_ref,
                    "identity enrolled"
                );
                Ok(did)
            }
            Err(error) => {
                self.store.unbind_controllers(&did, &controllers);
                // The gateway already released; the guard drop is a no-op.
                Err(error.into())
            }
        }
    }

    /// Permanently revoke an identity. `acting` must be in the current
    /// controller set. The successor document (with `revokedAt`) is
    /// anchored before the record is returned.
    pub async fn revoke_identity(
        &self,
        did: &Did,
        acting: &Controller,
        reason: RevocationReason,
    ) -> Result<RevocationRecord, EngineError> {
        let record = self
            .store
            .get(did)
            .ok_or_else(|| RegistryError::UnknownIdentity(did.clone()))?;
        if record.state == IdentityState::Active && !record.controllers.contains(acting) {
            return Err(RegistryError::UnauthorizedController {
                controller: acting.clone(),
                did: did.clone(),
            }
            .into());
        }

        let revocation = self.ledger.revoke(did, reason, Utc::now())?;
        self.gateway.anchor_update(&revocation.document).await?;
        self.store.append_document(did, revocation.document.clone());

        Ok(revocation)
    }

    /// Replace an identity's controller set. `acting` must be in the
    /// current set; the identity must not be revoked.
    pub async fn rotate_controllers(
        &self,
        did: &Did,
        acting: &Controller,
        new_controllers: Vec<Controller>,
    ) -> Result<MetadataDocument, EngineError> {
        let new_set = ControllerSet::from_vec(new_controllers);
        let document = self.ledger.rotate_controllers(did, new_set, acting)?;

        self.gateway.anchor_update(&document).await?;
        self.store.append_document(did, document.clone());

        Ok(document)
    }

    /// The identity record for a DID, if one has been committed.
    pub fn identity(&self, did: &Did) -> Option<IdentityRecord> {
        self.store.get(did)
    }

    /// Whether a commitment already holds a committed identity.
    pub fn is_enrolled(&self, raw_commitment: &[u8]) -> Result<bool, EngineError> {
        let commitment = BiometricCommitment::from_bytes(raw_commitment)?;
        Ok(self.index.is_committed(&commitment_key(&commitment)))
    }

    /// Anchored-document history for a DID, oldest first.
    pub fn document_history(&self, did: &Did) -> Vec<MetadataDocument> {
        self.store.history(did)
    }

    /// Append-only audit events for a DID.
    pub fn ledger_history(&self, did: &Did) -> Vec<LedgerEvent> {
        self.ledger.history(did)
    }

    /// Garbage-collect reservations that outlived the configured maximum
    /// pending age. Returns the number swept.
    pub fn sweep_reservations(&self) -> usize {
        self.index
            .sweep_expired(Duration::seconds(self.config.reservation.max_pending_secs))
    }

    /// Number of committed identities.
    pub fn enrolled_count(&self) -> usize {
        self.store.count()
    }
}
