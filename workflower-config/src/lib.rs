//! Configuration for the workflower transition engine.
//!
//! A [`WorkflowerConfig`] is an explicit value handed to the engine at
//! construction time. It carries everything that used to live as ambient
//! per-type settings in older workflow integrations: the name of the host
//! attribute that stores the current state, the fallback workflow id, the
//! initial-state table, and the allow-list of accessor names that guard
//! expressions may reference.
//!
//! Configurations can be built in code or loaded from TOML:
//!
//! ```toml
//! state_attribute = "workflow_state"
//! default_workflow_id = "1"
//! default_initial_state = "saved"
//! guard_accessors = ["approved", "rejected"]
//!
//! [initial_states]
//! "2" = "drafted"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while building or validating a configuration.
///
/// These are fatal: the engine refuses to construct a manager from an
/// invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("workflow state attribute name can't be blank")]
    BlankStateAttribute,

    #[error("no workflow id: the host carries none and no default_workflow_id is configured")]
    MissingWorkflowId,

    #[error("invalid workflower configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize workflower configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

fn default_state_attribute() -> String {
    "workflow_state".to_string()
}

fn default_initial_state() -> String {
    "saved".to_string()
}

/// Per-host-type configuration for the transition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowerConfig {
    /// Name of the host attribute holding the current state. Used both as
    /// the key of attribute patches and as the key of error reports.
    #[serde(default = "default_state_attribute")]
    pub state_attribute: String,

    /// Workflow id used when the host does not carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_workflow_id: Option<String>,

    /// Initial state for workflow ids with no entry in `initial_states`.
    #[serde(default = "default_initial_state")]
    pub default_initial_state: String,

    /// Accessor names that guard expressions are allowed to reference.
    /// An expression mentioning anything outside this set fails its guard.
    #[serde(default)]
    pub guard_accessors: BTreeSet<String>,

    /// Per-workflow-id initial state overrides.
    #[serde(default)]
    pub initial_states: BTreeMap<String, String>,
}

impl Default for WorkflowerConfig {
    fn default() -> Self {
        WorkflowerConfig {
            state_attribute: default_state_attribute(),
            default_workflow_id: None,
            default_initial_state: default_initial_state(),
            guard_accessors: BTreeSet::new(),
            initial_states: BTreeMap::new(),
        }
    }
}

impl WorkflowerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from a TOML document.
    pub fn from_toml_str(input: &str) -> ConfigResult<Self> {
        let config: WorkflowerConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration back to TOML.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn with_state_attribute(mut self, name: impl Into<String>) -> Self {
        self.state_attribute = name.into();
        self
    }

    pub fn with_default_workflow_id(mut self, workflow_id: impl Into<String>) -> Self {
        self.default_workflow_id = Some(workflow_id.into());
        self
    }

    pub fn with_default_initial_state(mut self, state: impl Into<String>) -> Self {
        self.default_initial_state = state.into();
        self
    }

    /// Override the initial state for one workflow id.
    pub fn with_initial_state(
        mut self,
        workflow_id: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        self.initial_states.insert(workflow_id.into(), state.into());
        self
    }

    /// Declare accessor names that guard expressions may call on the host.
    pub fn allow_guard_accessors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.guard_accessors.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn accessor_allowed(&self, name: &str) -> bool {
        self.guard_accessors.contains(name)
    }

    /// Initial state for a workflow id, falling back to the default.
    pub fn initial_state_for(&self, workflow_id: &str) -> &str {
        self.initial_states
            .get(workflow_id)
            .map(String::as_str)
            .unwrap_or(&self.default_initial_state)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.state_attribute.trim().is_empty() {
            return Err(ConfigError::BlankStateAttribute);
        }
        if self.guard_accessors.is_empty() {
            log::debug!("no guard accessors declared; expression guards will not resolve");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_convention() {
        let config = WorkflowerConfig::default();
        assert_eq!(config.state_attribute, "workflow_state");
        assert_eq!(config.default_initial_state, "saved");
        assert_eq!(config.default_workflow_id, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_state_attribute_is_rejected() {
        let config = WorkflowerConfig::default().with_state_attribute("  ");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BlankStateAttribute)
        ));
    }

    #[test]
    fn initial_state_lookup_prefers_override() {
        let config = WorkflowerConfig::default()
            .with_initial_state("2", "drafted")
            .with_default_initial_state("saved");
        assert_eq!(config.initial_state_for("2"), "drafted");
        assert_eq!(config.initial_state_for("1"), "saved");
    }

    #[test]
    fn toml_round_trip() {
        let config = WorkflowerConfig::default()
            .with_default_workflow_id("1")
            .with_initial_state("2", "drafted")
            .allow_guard_accessors(["approved", "rejected"]);

        let rendered = config.to_toml_string().unwrap();
        let reparsed = WorkflowerConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(config, reparsed);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config = WorkflowerConfig::from_toml_str("default_workflow_id = \"9\"").unwrap();
        assert_eq!(config.state_attribute, "workflow_state");
        assert_eq!(config.default_workflow_id.as_deref(), Some("9"));
        assert!(config.guard_accessors.is_empty());
    }

    #[test]
    fn accessor_allow_list() {
        let config = WorkflowerConfig::default().allow_guard_accessors(["approved"]);
        assert!(config.accessor_allowed("approved"));
        assert!(!config.accessor_allowed("rejected"));
    }
}
