//! SessionState enum for the editor session lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle state of an editor session.
///
/// ```text
/// Uninitialized --bind--> Loading --content set--> Ready <--> Saving
///        any state --bind / locale change--> Loading
///        any state --close--> Destroyed --bind--> Loading
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    Saving,
    Destroyed,
}

impl SessionState {
    /// Returns true if the editable surface accepts mutations.
    ///
    /// The surface stays interactive while a save is in flight.
    pub fn is_editable(&self) -> bool {
        matches!(self, SessionState::Ready | SessionState::Saving)
    }
}

impl StateMachine for SessionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionState::*;
        matches!(
            (self, target),
            (Uninitialized, Loading)
                | (Uninitialized, Destroyed)
                | (Loading, Loading)
                | (Loading, Ready)
                | (Loading, Destroyed)
                | (Ready, Loading)
                | (Ready, Saving)
                | (Ready, Destroyed)
                | (Saving, Ready)
                | (Saving, Loading)
                | (Saving, Destroyed)
                | (Destroyed, Loading)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionState::*;
        match self {
            Uninitialized => vec![Loading, Destroyed],
            Loading => vec![Loading, Ready, Destroyed],
            Ready => vec![Loading, Saving, Destroyed],
            Saving => vec![Ready, Loading, Destroyed],
            Destroyed => vec![Loading],
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Uninitialized => "Uninitialized",
            SessionState::Loading => "Loading",
            SessionState::Ready => "Ready",
            SessionState::Saving => "Saving",
            SessionState::Destroyed => "Destroyed",
        };
        write!(f, "{}", s)
    }
}
