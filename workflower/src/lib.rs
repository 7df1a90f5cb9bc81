//! # Workflower — guarded workflow transitions for stateful entities
//!
//! Workflower augments an arbitrary stateful entity with a declarative
//! finite-state workflow. Named events move the entity between states; each
//! transition is gated by a state/sequence match and an optional condition,
//! wrapped by optional before/after hooks, and annotated with role metadata
//! for permission derivation.
//!
//! The moving parts:
//!
//! - [`TransitionDefinition`] — one potential transition, as produced by a
//!   [`WorkflowSource`].
//! - [`Flow`] — runtime wrapper adding guard evaluation, hook dispatch and
//!   attribute-patch computation.
//! - [`Manager`] — a single-pass snapshot that resolves candidate and
//!   allowed transitions for one host and executes them.
//! - [`compute_abilities`] — derives a role → event permission map from
//!   definition metadata.
//!
//! The entity implements [`WorkflowHost`]; configuration is an explicit
//! [`WorkflowerConfig`] value.
//!
//! ## Example
//!
//! ```rust
//! use workflower::{
//!     AttributePatch, HostFault, InMemoryWorkflowSource, Manager, TransitionDefinition,
//!     TransitionErrorKind, WorkflowHost, WorkflowerConfig,
//! };
//!
//! struct Document {
//!     workflow_id: String,
//!     workflow_state: String,
//!     sequence: i64,
//! }
//!
//! impl WorkflowHost for Document {
//!     fn workflow_id(&self) -> &str {
//!         &self.workflow_id
//!     }
//!     fn workflow_state(&self) -> &str {
//!         &self.workflow_state
//!     }
//!     fn sequence(&self) -> i64 {
//!         self.sequence
//!     }
//!     fn assign_attributes(&mut self, patch: AttributePatch) -> Result<(), HostFault> {
//!         self.workflow_state = patch.state;
//!         self.sequence = patch.sequence;
//!         Ok(())
//!     }
//!     fn report_error(&mut self, _attribute: &str, _kind: TransitionErrorKind) {}
//! }
//!
//! let mut source = InMemoryWorkflowSource::new();
//! source.insert(
//!     "1",
//!     vec![TransitionDefinition::new("saved", "submitted", "submit", 1)],
//! );
//!
//! let mut document = Document {
//!     workflow_id: "1".to_string(),
//!     workflow_state: "saved".to_string(),
//!     sequence: 1,
//! };
//!
//! let manager = Manager::new(&document, &source, WorkflowerConfig::default()).unwrap();
//! assert_eq!(manager.allowed_events(), ["submit".to_string()]);
//!
//! assert_eq!(manager.trigger("submit", &mut document).unwrap(), true);
//! assert_eq!(document.workflow_state, "submitted");
//! assert_eq!(document.sequence, 1);
//! ```

pub mod abilities;
pub mod definition;
pub mod error;
pub mod expr;
pub mod flow;
pub mod host;
pub mod manager;
pub mod source;

pub use abilities::compute_abilities;
pub use definition::{ConditionType, DefinitionMetadata, TransitionDefinition};
pub use error::{GuardError, WorkflowerError, WorkflowerResult};
pub use expr::GuardExpr;
pub use flow::Flow;
pub use host::{
    AttributePatch, ErrorReports, HookDispatch, HostFault, TransitionErrorKind, WorkflowHost,
};
pub use manager::Manager;
pub use source::{InMemoryWorkflowSource, WorkflowSource};

// Re-export the configuration crate's surface.
pub use workflower_config::{ConfigError, WorkflowerConfig};
