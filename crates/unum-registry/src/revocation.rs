use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use unum_core::document::{MetadataBuilder, MetadataDocument};
use unum_core::identity_state::{IdentityEvent, IdentityStateMachine};
use unum_core::types::{Controller, ControllerSet, Did, RevocationReason, SchemaVersion};

use crate::duplicate_index::DuplicateIndex;
use crate::error::RegistryError;
use crate::identity_store::IdentityStore;

/// Record of a revocation, including the successor metadata document to
/// anchor. Once appended, never edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevocationRecord {
    pub did: Did,
    pub reason: RevocationReason,
    pub revoked_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
    pub document: MetadataDocument,
}

/// An append-only entry in an identity's audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// The identity was permanently deactivated.
    Revoked {
        did: Did,
        reason: RevocationReason,
        revoked_at: DateTime<Utc>,
        recorded_at: DateTime<Utc>,
    },
    /// The controller set was replaced while the identity stayed active.
    ControllersRotated {
        did: Did,
        previous: ControllerSet,
        current: ControllerSet,
        acting: Controller,
        rotated_at: DateTime<Utc>,
    },
}

/// Tracks logical revocation and controller-rotation events for issued
/// identities. The only mutator of identity lifecycle state after
/// issuance; every change appends an event, nothing is ever edited or
/// deleted. Right-to-erasure is permanent logical revocation plus
/// off-ledger PII removal, never deletion of the DID or its history.
pub struct RevocationLedger {
    index: Arc<DuplicateIndex>,
    store: Arc<IdentityStore>,
    events: DashMap<Did, Vec<LedgerEvent>>,
}

impl RevocationLedger {
    /// Create a ledger over the given index and store.
    pub fn new(index: Arc<DuplicateIndex>, store: Arc<IdentityStore>) -> Self {
        Self {
            index,
            store,
            events: DashMap::new(),
        }
    }

    /// Permanently revoke an identity.
    ///
    /// Fails with `UnknownIdentity` if the DID has no committed entry in
    /// the duplicate index, `AlreadyRevoked` if the identity is already
    /// terminal. Returns the revocation record carrying the successor
    /// document for anchoring.
    pub fn revoke(
        &self,
        did: &Did,
        reason: RevocationReason,
        revoked_at: DateTime<Utc>,
    ) -> Result<RevocationRecord, RegistryError> {
        if !self.index.did_is_committed(did) {
            return Err(RegistryError::UnknownIdentity(did.clone()));
        }
        let record = self
            .store
            .get(did)
            .ok_or_else(|| RegistryError::UnknownIdentity(did.clone()))?;

        if record.state.is_final() {
            return Err(RegistryError::AlreadyRevoked(did.clone()));
        }
        IdentityStateMachine::transition(record.state, IdentityEvent::Revoke)?;

        self.store.mark_revoked(did, revoked_at)?;

        let document = MetadataBuilder::new(SchemaVersion::CURRENT)
            .did(did.clone())
            .controllers(record.controllers)
            .enrolled_at(record.enrolled_at)
            .revoked_at(revoked_at)
            .build()?;

        let recorded_at = Utc::now();
        let revocation = RevocationRecord {
            did: did.clone(),
            reason: reason.clone(),
            revoked_at,
            recorded_at,
            document,
        };

        self.events
            .entry(did.clone())
            .or_default()
            .push(LedgerEvent::Revoked {
                did: did.clone(),
                reason: reason.clone(),
                revoked_at,
                recorded_at,
            });

        tracing::info!(did = %did, reason = %reason, "identity revoked");
        Ok(revocation)
    }

    /// Replace an identity's controller set.
    ///
    /// Fails with `UnauthorizedController` unless `acting` is currently
    /// in the identity's controller set, `IdentityRevoked` if the
    /// identity is terminal, and `ControllerInUse` if a new controller is
    /// bound to another active identity. Returns the successor document
    /// for anchoring.
    pub fn rotate_controllers(
        &self,
        did: &Did,
        new_controllers: ControllerSet,
        acting: &Controller,
    ) -> Result<MetadataDocument, RegistryError> {
        if !self.index.did_is_committed(did) {
            return Err(RegistryError::UnknownIdentity(did.clone()));
        }
        let record = self
            .store
            .get(did)
            .ok_or_else(|| RegistryError::UnknownIdentity(did.clone()))?;

        if record.state.is_final() {
            return Err(RegistryError::IdentityRevoked(did.clone()));
        }
        if !record.controllers.contains(acting) {
            return Err(RegistryError::UnauthorizedController {
                controller: acting.clone(),
                did: did.clone(),
            });
        }
        if new_controllers.is_empty() {
            return Err(RegistryError::EmptyControllerSet);
        }
        IdentityStateMachine::transition(record.state, IdentityEvent::RotateControllers)?;

        self.store.bind_controllers(did, &new_controllers)?;
        let dropped = ControllerSet::from_vec(
            record
                .controllers
                .iter()
                .filter(|c| !new_controllers.contains(c))
                .cloned()
                .collect(),
        );
        self.store.unbind_controllers(did, &dropped);
        self.store.set_controllers(did, new_controllers.clone())?;

        let document = MetadataBuilder::new(SchemaVersion::CURRENT)
            .did(did.clone())
            .controllers(new_controllers.clone())
            .enrolled_at(record.enrolled_at)
            .build()?;

        self.events
            .entry(did.clone())
            .or_default()
            .push(LedgerEvent::ControllersRotated {
                did: did.clone(),
                previous: record.controllers,
                current: new_controllers,
                acting: acting.clone(),
                rotated_at: Utc::now(),
            });

        tracing::info!(did = %did, acting = %acting, "controllers rotated");
        Ok(document)
    }

    /// The append-only event history for an identity, oldest first.
    pub fn history(&self, did: &Did) -> Vec<LedgerEvent> {
        self.events
            .get(did)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Number of events recorded for an identity.
    pub fn event_count(&self, did: &Did) -> usize {
        self.events.get(did).map(|entry| entry.len()).unwrap_or(0)
    }
}
