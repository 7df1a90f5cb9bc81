//! Transition definitions: the declarative records a workflow source
//! produces.
//!
//! A definition describes one potential transition — from-state, to-state,
//! event name, the optimistic sequence it expects, an optional guard and
//! optional hook overrides. Definitions are plain serde values so sources
//! can load them from JSON documents, databases or fixtures without the
//! engine caring.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Evaluation strategy for a definition's guard condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    /// `condition` is a boolean expression over host accessors.
    Expression,
    /// `condition` names a single zero-argument host accessor.
    Method,
}

/// Free-form definition metadata. `roles` is the only key the engine
/// interprets (for ability derivation); everything else is preserved
/// untouched for callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_downgrade_sequence() -> i64 {
    -1
}

/// One potential transition, immutable once loaded.
///
/// `event` is expected to be unique within a workflow id's candidate set
/// for a given state and sequence; the engine does not enforce this, it
/// simply dispatches to the first match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDefinition {
    /// Source state this definition applies from.
    pub state: String,

    /// Destination state.
    pub transition_into: String,

    /// Logical transition name.
    pub event: String,

    /// Optimistic version the host is expected to be at.
    pub sequence: i64,

    /// Sequence written on apply instead of `sequence`. The sentinel `-1`
    /// means "no downgrade": the forward sequence is reused.
    #[serde(default = "default_downgrade_sequence")]
    pub downgrade_sequence: i64,

    /// Guard accessor name or boolean expression, per `condition_type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_type: Option<ConditionType>,

    /// Explicit before-hook name; defaults to `before_workflow_<event>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_transition: Option<String>,

    /// Explicit after-hook name; defaults to `after_workflow_<event>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_transition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DefinitionMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,

    /// Defaults to `workflow_id` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation_id: Option<String>,
}

impl TransitionDefinition {
    pub fn new(
        state: impl Into<String>,
        transition_into: impl Into<String>,
        event: impl Into<String>,
        sequence: i64,
    ) -> Self {
        TransitionDefinition {
            state: state.into(),
            transition_into: transition_into.into(),
            event: event.into(),
            sequence,
            downgrade_sequence: default_downgrade_sequence(),
            condition: None,
            condition_type: None,
            before_transition: None,
            after_transition: None,
            metadata: None,
            workflow_id: None,
            deviation_id: None,
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>, kind: ConditionType) -> Self {
        self.condition = Some(condition.into());
        self.condition_type = Some(kind);
        self
    }

    pub fn with_downgrade_sequence(mut self, downgrade_sequence: i64) -> Self {
        self.downgrade_sequence = downgrade_sequence;
        self
    }

    pub fn with_before_hook(mut self, name: impl Into<String>) -> Self {
        self.before_transition = Some(name.into());
        self
    }

    pub fn with_after_hook(mut self, name: impl Into<String>) -> Self {
        self.after_transition = Some(name.into());
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let metadata = self.metadata.get_or_insert_with(DefinitionMetadata::default);
        metadata.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    /// Role names this definition grants, empty when the metadata carries
    /// none.
    pub fn roles(&self) -> &[String] {
        self.metadata
            .as_ref()
            .and_then(|m| m.roles.as_deref())
            .unwrap_or(&[])
    }

    /// Deviation id, falling back to the workflow id when absent.
    pub fn resolved_deviation_id(&self) -> Option<&str> {
        self.deviation_id
            .as_deref()
            .or(self.workflow_id.as_deref())
    }

    /// Candidate filter: does this definition apply from the given host
    /// snapshot? True when the states match and the definition expects the
    /// current or the next sequence.
    pub fn applies_from(&self, state: &str, sequence: i64) -> bool {
        self.state == state && (self.sequence == sequence || self.sequence == sequence + 1)
    }
}
