//! Checked transitions for the editor session lifecycle.
//!
//! `EditorSession` never assigns its [`SessionState`](super::SessionState)
//! directly; every move goes through [`StateMachine::transition_to`]. A save
//! issued while loading, or a rebind racing a close, therefore fails with a
//! `state_transition` validation error (reported as
//! `InvalidStateTransition`) and leaves the bound surface untouched.

use super::ValidationError;

/// Field name carried by the error of a rejected transition.
pub const TRANSITION_FIELD: &str = "state_transition";

/// A lifecycle enum with an explicit one-step transition table.
///
/// Only `valid_transitions` is required; the lookup and the checked
/// transition derive from it. Implementors with a hot path may override
/// `can_transition_to` with a `matches!` table, as long as both agree.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// States reachable from `self` in one step.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Whether `target` is one step away from `self`.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Returns `target` if the move is allowed.
    ///
    /// # Errors
    ///
    /// `ValidationError` on field [`TRANSITION_FIELD`] naming both states.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                TRANSITION_FIELD,
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// A state with no way out. A session never has one: even `Destroyed`
    /// can be rebound.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionState;

    /// Uses only the default lookup, unlike `SessionState`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum SaveRequest {
        Pending,
        Sent,
        Settled,
    }

    impl StateMachine for SaveRequest {
        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                SaveRequest::Pending => vec![SaveRequest::Sent],
                SaveRequest::Sent => vec![SaveRequest::Settled],
                SaveRequest::Settled => vec![],
            }
        }
    }

    #[test]
    fn default_lookup_follows_the_table() {
        assert!(SaveRequest::Pending.can_transition_to(&SaveRequest::Sent));
        assert!(!SaveRequest::Pending.can_transition_to(&SaveRequest::Settled));
        assert!(SaveRequest::Settled.is_terminal());
    }

    #[test]
    fn save_from_ready_is_allowed() {
        assert_eq!(
            SessionState::Ready.transition_to(SessionState::Saving),
            Ok(SessionState::Saving)
        );
    }

    #[test]
    fn save_while_loading_names_both_states() {
        let err = SessionState::Loading
            .transition_to(SessionState::Saving)
            .unwrap_err();
        assert_eq!(err.field(), TRANSITION_FIELD);
        let message = err.to_string();
        assert!(message.contains("Loading"), "{message}");
        assert!(message.contains("Saving"), "{message}");
    }
}
