use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use unum_core::document::MetadataDocument;
use unum_core::identity_state::{IdentityEvent, IdentityState, IdentityStateMachine};
use unum_core::types::{Controller, ControllerSet, Did, SchemaVersion};

use crate::error::RegistryError;

/// The logical record of an issued identity. Created once per unique
/// commitment; never deleted — revocation is logical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub did: Did,
    pub controllers: ControllerSet,
    pub enrolled_at: DateTime<Utc>,
    pub state: IdentityState,
    pub schema_version: SchemaVersion,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// In-memory store of committed identity records, the controller→identity
/// binding, and the per-DID document history.
///
/// A controller may belong to at most one active identity at a time; an
/// identity may have many controllers. Bindings are claimed before an
/// enrollment anchors and dropped again on failure or revocation.
pub struct IdentityStore {
    records: DashMap<Did, IdentityRecord>,
    by_controller: DashMap<Controller, Did>,
    documents: DashMap<Did, Vec<MetadataDocument>>,
}

impl IdentityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            by_controller: DashMap::new(),
            documents: DashMap::new(),
        }
    }

    /// Claim every controller in `controllers` for `did`.
    ///
    /// A controller already bound to a different identity fails the whole
    /// claim with `ControllerInUse`; controllers claimed earlier in the
    /// same call are unwound before returning.
    pub fn bind_controllers(
        &self,
        did: &Did,
        controllers: &ControllerSet,
    ) -> Result<(), RegistryError> {
        let mut claimed: Vec<Controller> = Vec::new();

        for controller in controllers.iter() {
            match self.by_controller.entry(controller.clone()) {
                Entry::Occupied(occupied) => {
                    if occupied.get() != did {
                        let owner = occupied.get().clone();
                        drop(occupied);
                        for unwind in &claimed {
                            self.by_controller
                                .remove_if(unwind, |_, mapped| mapped == did);
                        }
                        return Err(RegistryError::ControllerInUse {
                            controller: controller.clone(),
                            did: owner,
                        });
                    }
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(did.clone());
                    claimed.push(controller.clone());
                }
            }
        }

        Ok(())
    }

    /// Drop the binding for every controller in `controllers` that maps
    /// to `did`.
    pub fn unbind_controllers(&self, did: &Did, controllers: &ControllerSet) {
        for controller in controllers.iter() {
            self.by_controller
                .remove_if(controller, |_, mapped| mapped == did);
        }
    }

    /// The identity a controller is currently bound to, if any.
    pub fn controller_owner(&self, controller: &Controller) -> Option<Did> {
        self.by_controller
            .get(controller)
            .map(|entry| entry.value().clone())
    }

    /// Record a freshly committed identity.
    pub fn insert_record(&self, record: IdentityRecord) -> Result<(), RegistryError> {
        let did = record.did.clone();
        match self.records.entry(did.clone()) {
            Entry::Occupied(_) => Err(RegistryError::IdentityExists(did)),
            Entry::Vacant(vacant) => {
                tracing::info!(did = %did, "identity recorded");
                vacant.insert(record);
                Ok(())
            }
        }
    }

    /// Fetch an identity record.
    pub fn get(&self, did: &Did) -> Option<IdentityRecord> {
        self.records.get(did).map(|entry| entry.value().clone())
    }

    /// Replace the controller set on a record. Bindings are managed by
    /// the caller via bind/unbind.
    pub fn set_controllers(
        &self,
        did: &Did,
        controllers: ControllerSet,
    ) -> Result<(), RegistryError> {
        let mut record = self
            .records
            .get_mut(did)
            .ok_or_else(|| RegistryError::UnknownIdentity(did.clone()))?;
        record.controllers = controllers;
        Ok(())
    }

    /// Flip a record to Revoked and drop its controller bindings, freeing
    /// the controllers for other identities.
    pub fn mark_revoked(
        &self,
        did: &Did,
        revoked_at: DateTime<Utc>,
    ) -> Result<(), RegistryError> {
        let controllers = {
            let mut record = self
                .records
                .get_mut(did)
                .ok_or_else(|| RegistryError::UnknownIdentity(did.clone()))?;
            record.state =
                IdentityStateMachine::transition(record.state, IdentityEvent::Revoke)?;
            record.revoked_at = Some(revoked_at);
            record.controllers.clone()
        };

        self.unbind_controllers(did, &controllers);
        Ok(())
    }

    /// Append an anchored document to the identity's history.
    pub fn append_document(&self, did: &Did, document: MetadataDocument) {
        self.documents.entry(did.clone()).or_default().push(document);
    }

    /// Full anchored-document history, oldest first.
    pub fn history(&self, did: &Did) -> Vec<MetadataDocument> {
        self.documents
            .get(did)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// The most recently anchored document for an identity.
    pub fn latest_document(&self, did: &Did) -> Option<MetadataDocument> {
        self.documents
            .get(did)
            .and_then(|entry| entry.value().last().cloned())
    }

    /// Number of recorded identities.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no identities.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for IdentityStore {
    fn default() -> Self {
        Self::new()
    }
}
