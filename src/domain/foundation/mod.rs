//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, the session lifecycle state machine and
//! error types that form the vocabulary of the editing core.

mod errors;
mod ids;
mod session_state;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::DocumentId;
pub use session_state::SessionState;
pub use state_machine::{StateMachine, TRANSITION_FIELD};
pub use timestamp::Timestamp;
