//! Unum Anchor — hands finished, duplicate-checked metadata documents to
//! the external transaction-submission collaborator and reconciles the
//! outcome with the duplicate index: commit on confirmation, release on
//! retry exhaustion.

pub mod error;
pub mod gateway;
pub mod submitter;

pub use error::{AnchorError, SubmitError};
pub use gateway::AnchorGateway;
pub use submitter::{Confirmation, InMemoryLedger, LedgerSubmitter};
