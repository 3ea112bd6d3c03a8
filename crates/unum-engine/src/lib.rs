//! Unum Engine — the deterministic identity derivation and
//! duplicate-prevention engine.
//!
//! Control flow for an enrollment: commitment validation → DID
//! derivation → duplicate-index reservation → metadata assembly → ledger
//! anchoring → reservation commit. Later updates (controller rotation,
//! revocation) run through the append-only revocation ledger and anchor
//! successor documents for the same DID.

pub mod engine;
pub mod error;
pub mod telemetry;

pub use engine::EnrollmentEngine;
pub use error::{EngineError, ErrorCategory};
pub use telemetry::init_tracing;
