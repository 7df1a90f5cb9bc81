//! The host entity contract.
//!
//! The engine never owns the entity it drives; it consumes this trait. A
//! host exposes its workflow id, current state and sequence, applies
//! attribute patches, accumulates error reports, and answers capability
//! probes for guard accessors and hooks. Capability probing is explicit:
//! returning `None` / [`HookDispatch::NotSupported`] means "this host has
//! no such member", which is never a fault.

use thiserror::Error;

/// Named-value patch applied to a host on a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePatch {
    /// Name of the state attribute being written (from configuration).
    pub attribute: String,
    /// New state value.
    pub state: String,
    /// New sequence value, already resolved against the downgrade rule.
    pub sequence: i64,
}

/// Outcome of dispatching a hook by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookDispatch {
    /// The host has no hook of that name; a no-op, never a failure.
    NotSupported,
    /// The hook ran to completion.
    Completed,
}

/// Fault raised by host-side code: a hook body or attribute application.
///
/// Faults are caught by the engine, reported to the host's error sink and
/// converted into a `false` transition result; they never propagate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HostFault(String);

impl HostFault {
    pub fn new(message: impl Into<String>) -> Self {
        HostFault(message.into())
    }
}

/// Classification of a reported transition failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionErrorKind {
    /// Guard failed, or the destination equals the current state.
    PreconditionNotMet,
    /// A hook or the attribute patch faulted mid-transition.
    TransitionFailed,
}

/// Contract a stateful entity implements to be driven by the engine.
pub trait WorkflowHost {
    /// Identifier selecting the definition set. May be empty, in which
    /// case the configured default workflow id applies.
    fn workflow_id(&self) -> &str;

    /// Current state string.
    fn workflow_state(&self) -> &str;

    /// Current optimistic version.
    fn sequence(&self) -> i64;

    /// Apply a patch atomically from the host's perspective.
    fn assign_attributes(&mut self, patch: AttributePatch) -> Result<(), HostFault>;

    /// Accumulate an error report keyed by the state attribute name.
    /// Implementations accumulate, they do not raise.
    fn report_error(&mut self, attribute: &str, kind: TransitionErrorKind);

    /// Probe-and-read a zero-argument boolean accessor. `None` means the
    /// host does not expose an accessor of that name.
    fn guard_accessor(&self, name: &str) -> Option<bool> {
        let _ = name;
        None
    }

    /// Probe-and-invoke a zero-argument hook.
    fn invoke_hook(&mut self, name: &str) -> Result<HookDispatch, HostFault> {
        let _ = name;
        Ok(HookDispatch::NotSupported)
    }
}

/// Accumulating `(attribute, kind)` error sink hosts can embed to satisfy
/// [`WorkflowHost::report_error`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorReports {
    reports: Vec<(String, TransitionErrorKind)>,
}

impl ErrorReports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, attribute: impl Into<String>, kind: TransitionErrorKind) {
        self.reports.push((attribute.into(), kind));
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn last(&self) -> Option<&(String, TransitionErrorKind)> {
        self.reports.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, TransitionErrorKind)> {
        self.reports.iter()
    }

    pub fn clear(&mut self) {
        self.reports.clear();
    }
}
