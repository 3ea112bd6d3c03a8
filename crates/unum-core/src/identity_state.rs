use std::fmt;

use crate::error::CoreError;

/// The lifecycle states of an issued identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum IdentityState {
    /// Identity is live; controllers may act for it.
    Active,
    /// Identity has been logically revoked. Final state.
    Revoked,
}

impl IdentityState {
    /// Whether this is a final (terminal) state.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Revoked)
    }
}

impl fmt::Display for IdentityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Revoked => write!(f, "Revoked"),
        }
    }
}

/// Events that trigger identity state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityEvent {
    /// The controller set is replaced. The identity stays active; a new
    /// metadata document version is appended.
    RotateControllers,
    /// The identity is permanently deactivated.
    Revoke,
}

/// Manages identity state transitions.
///
/// Valid transitions:
/// - Active → Active (RotateControllers)
/// - Active → Revoked (Revoke)
///
/// No transition leaves Revoked.
pub struct IdentityStateMachine;

impl IdentityStateMachine {
    /// Attempt a state transition based on an event.
    /// Returns the new state on success, or an error for invalid transitions.
    pub fn transition(
        current: IdentityState,
        event: IdentityEvent,
    ) -> Result<IdentityState, CoreError> {
        let new_state = match (current, event) {
            (IdentityState::Active, IdentityEvent::RotateControllers) => IdentityState::Active,
            (IdentityState::Active, IdentityEvent::Revoke) => IdentityState::Revoked,
            _ => {
                let target = match event {
                    IdentityEvent::RotateControllers => IdentityState::Active,
                    IdentityEvent::Revoke => IdentityState::Revoked,
                };
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    to: target,
                });
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            event = ?event,
            "identity state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: IdentityState, event: IdentityEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
