use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Controller, ControllerSet, Did, SchemaVersion};

/// The versioned identity document anchored on the ledger.
///
/// Wire form is camelCase JSON. Once anchored, a document is never
/// mutated; rotation and revocation append successor documents for the
/// same DID. Older schema versions remain parseable forever, and future
/// versions only add fields, so unknown fields are tolerated on parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDocument {
    /// Schema version this document was assembled under.
    pub version: SchemaVersion,
    /// The identity this document describes.
    pub did: Did,
    /// Ordered controller set (exactly one entry under schema 1.0).
    pub controllers: ControllerSet,
    /// Enrollment timestamp. Absent in legacy 1.0 documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrolled_at: Option<DateTime<Utc>>,
    /// Revocation timestamp. Present only once the identity is revoked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl MetadataDocument {
    /// Whether this document records a revoked identity.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Serialize to the canonical wire form.
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a document of any supported schema version.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Assembles a [`MetadataDocument`], enforcing version-specific required
/// fields. All version branching lives here; there is no per-version type
/// hierarchy. Pure assembly — the builder never consults the duplicate
/// index or any other state.
#[derive(Debug, Clone)]
pub struct MetadataBuilder {
    version: SchemaVersion,
    did: Option<Did>,
    controllers: ControllerSet,
    enrolled_at: Option<DateTime<Utc>>,
    revoked_at: Option<DateTime<Utc>>,
}

impl MetadataBuilder {
    /// Start a document for the given schema version.
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            did: None,
            controllers: ControllerSet::new(),
            enrolled_at: None,
            revoked_at: None,
        }
    }

    /// Set the subject DID.
    pub fn did(mut self, did: Did) -> Self {
        self.did = Some(did);
        self
    }

    /// Append one controller.
    pub fn controller(mut self, controller: Controller) -> Self {
        self.controllers.insert(controller);
        self
    }

    /// Replace the controller set.
    pub fn controllers(mut self, controllers: ControllerSet) -> Self {
        self.controllers = controllers;
        self
    }

    /// Set the enrollment timestamp (schema 1.1 and later).
    pub fn enrolled_at(mut self, at: DateTime<Utc>) -> Self {
        self.enrolled_at = Some(at);
        self
    }

    /// Set the revocation timestamp (schema 1.1 and later).
    pub fn revoked_at(mut self, at: DateTime<Utc>) -> Self {
        self.revoked_at = Some(at);
        self
    }

    /// Validate the field combination against the requested version and
    /// assemble the document.
    pub fn build(self) -> Result<MetadataDocument, CoreError> {
        let did = self.did.ok_or_else(|| CoreError::MissingField("did".into()))?;

        if self.controllers.is_empty() {
            return Err(CoreError::MissingField("controllers".into()));
        }

        match self.version {
            SchemaVersion::V1_0 => {
                if self.controllers.len() > 1 {
                    return Err(CoreError::MetadataVersionMismatch {
                        version: self.version,
                        detail: format!(
                            "schema 1.0 admits exactly one controller, got {}",
                            self.controllers.len()
                        ),
                    });
                }
                if self.enrolled_at.is_some() {
                    return Err(CoreError::MetadataVersionMismatch {
                        version: self.version,
                        detail: "schema 1.0 has no enrollment timestamp field".into(),
                    });
                }
                if self.revoked_at.is_some() {
                    return Err(CoreError::MetadataVersionMismatch {
                        version: self.version,
                        detail: "schema 1.0 has no revocation slot".into(),
                    });
                }
            }
            SchemaVersion::V1_1 => {
                if self.enrolled_at.is_none() {
                    return Err(CoreError::MetadataVersionMismatch {
                        version: self.version,
                        detail: "schema 1.1 requires an enrollment timestamp".into(),
                    });
                }
            }
        }

        Ok(MetadataDocument {
            version: self.version,
            did,
            controllers: self.controllers,
            enrolled_at: self.enrolled_at,
            revoked_at: self.revoked_at,
        })
    }
}
