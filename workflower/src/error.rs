//! Error handling for the workflower engine.
//!
//! Setup-time misconfiguration is fatal and surfaces as [`WorkflowerError`].
//! Transition-time failures are *reported* to the host's error sink and
//! converted into boolean results instead; see
//! [`TransitionErrorKind`](crate::host::TransitionErrorKind).

use thiserror::Error;
use workflower_config::ConfigError;

/// Result type alias for engine operations.
pub type WorkflowerResult<T> = Result<T, WorkflowerError>;

/// Fatal errors raised by the engine.
#[derive(Debug, Error)]
pub enum WorkflowerError {
    /// Missing or invalid configuration, detected at manager construction.
    #[error("workflower configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A trigger was requested for an event with no allowed flow.
    #[error("no allowed transition for event `{event}` from state `{state}`")]
    NoTransitionAllowed { event: String, state: String },
}

impl WorkflowerError {
    pub fn no_transition_allowed(event: impl Into<String>, state: impl Into<String>) -> Self {
        WorkflowerError::NoTransitionAllowed {
            event: event.into(),
            state: state.into(),
        }
    }
}

/// Errors produced while evaluating a guard.
///
/// Guards gate boolean predicates, so these never escape the engine's query
/// operations: `transition_possible` logs them and treats the guard as
/// failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("malformed guard expression `{expression}`: {reason}")]
    Malformed { expression: String, reason: String },

    /// The expression referenced an accessor outside the configured
    /// allow-list. Expressions resolve arbitrary identifiers against the
    /// host, so anything undeclared is refused rather than dispatched.
    #[error("guard accessor `{name}` is not on the configured allow-list")]
    AccessorNotAllowed { name: String },

    /// The host does not expose the referenced accessor.
    #[error("host does not expose guard accessor `{name}`")]
    AccessorUnsupported { name: String },
}
