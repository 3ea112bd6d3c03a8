//! Unum Core — Fundamental types, identity lifecycle, metadata schema,
//! and configuration for the Unum identity engine.

pub mod config;
pub mod document;
pub mod error;
pub mod identity_state;
pub mod types;

pub use config::{AnchorConfig, EngineConfig, LoggingConfig, ReservationConfig};
pub use document::{MetadataBuilder, MetadataDocument};
pub use error::CoreError;
pub use identity_state::{IdentityEvent, IdentityState, IdentityStateMachine};
pub use types::{Controller, ControllerSet, Did, Network, RevocationReason, SchemaVersion};
