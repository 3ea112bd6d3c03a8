//! Unum Registry — the shared mutable state of the identity engine:
//! the duplicate-prevention index (the Sybil-resistance gate), the
//! committed identity records, and the append-only revocation ledger.
//!
//! The duplicate index is the single source of truth for uniqueness.
//! Registration follows a reserve → anchor → commit protocol; every
//! failure or cancellation path resolves to release, so a commitment key
//! can never be leaked into a permanently pending state.

pub mod duplicate_index;
pub mod error;
pub mod identity_store;
pub mod reservation;
pub mod revocation;

pub use duplicate_index::{DuplicateIndex, ReservationState, ReservationToken};
pub use error::RegistryError;
pub use identity_store::{IdentityRecord, IdentityStore};
pub use reservation::ReservationGuard;
pub use revocation::{LedgerEvent, RevocationLedger, RevocationRecord};
