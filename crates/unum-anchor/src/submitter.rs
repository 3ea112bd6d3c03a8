use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use unum_core::document::MetadataDocument;
use unum_core::types::Did;
use uuid::Uuid;

use crate::error::SubmitError;

/// Acknowledgement that a document is durably on the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Confirmation {
    /// Ledger transaction reference for the anchored document.
    pub tx_ref: String,
    /// When the submission was confirmed.
    pub confirmed_at: DateTime<Utc>,
    /// Which submitter produced the confirmation.
    pub submitter_id: String,
}

/// Transaction-submission boundary.
///
/// Each implementation bridges the engine to a concrete anchoring rail
/// (a chain node, a submission service, an in-process ledger for tests).
#[async_trait]
pub trait LedgerSubmitter: Send + Sync {
    /// Submit a metadata document for anchoring. May suspend for the
    /// duration of ledger submission; callers bound it with a timeout.
    async fn submit(&self, document: &MetadataDocument) -> Result<Confirmation, SubmitError>;

    /// Return the unique identifier of this submitter (e.g. "mem-ledger").
    fn submitter_id(&self) -> &str;
}

/// In-process, instantly-confirming ledger.
///
/// Stores every anchored document per DID in submission order. Useful for
/// tests and for local development without a chain connection.
pub struct InMemoryLedger {
    /// DID -> (tx_ref, document) in anchoring order.
    anchored: DashMap<Did, Vec<(String, MetadataDocument)>>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            anchored: DashMap::new(),
        }
    }

    /// All documents anchored for a DID, oldest first.
    pub fn documents(&self, did: &Did) -> Vec<MetadataDocument> {
        self.anchored
            .get(did)
            .map(|entry| entry.iter().map(|(_, doc)| doc.clone()).collect())
            .unwrap_or_default()
    }

    /// The most recently anchored document for a DID.
    pub fn latest(&self, did: &Did) -> Option<MetadataDocument> {
        self.anchored
            .get(did)
            .and_then(|entry| entry.last().map(|(_, doc)| doc.clone()))
    }

    /// Total number of anchored documents across all DIDs.
    pub fn anchored_count(&self) -> usize {
        self.anchored.iter().map(|entry| entry.len()).sum()
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerSubmitter for InMemoryLedger {
    async fn submit(&self, document: &MetadataDocument) -> Result<Confirmation, SubmitError> {
        let tx_ref = format!("mem-{}", Uuid::now_v7());
        self.anchored
            .entry(document.did.clone())
            .or_default()
            .push((tx_ref.clone(), document.clone()));

        tracing::info!(did = %document.did, tx_ref = %tx_ref, "document anchored");
        Ok(Confirmation {
            tx_ref,
            confirmed_at: Utc::now(),
            submitter_id: self.submitter_id().to_string(),
        })
    }

    fn submitter_id(&self) -> &str {
        "mem-ledger"
    }
}
