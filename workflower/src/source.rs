//! Workflow definition sources.
//!
//! A source supplies the ordered definition list for each workflow id. The
//! engine performs no caching of its own, so a source only has to be
//! deterministic for a fixed id within one resolution pass; where the
//! definitions come from (a JSON document, a database table, a fixture) is
//! the source's business.

use crate::definition::TransitionDefinition;
use std::collections::BTreeMap;

pub trait WorkflowSource {
    /// All known workflows: workflow id to ordered definition list.
    fn workflows(&self) -> BTreeMap<String, Vec<TransitionDefinition>>;

    /// Ordered definitions for one workflow id; empty when unknown.
    fn workflows_for_id(&self, workflow_id: &str) -> Vec<TransitionDefinition> {
        self.workflows().remove(workflow_id).unwrap_or_default()
    }
}

/// Map-backed source, loadable from a JSON object of the shape
/// `{ "<workflow id>": [ <definition>, ... ], ... }`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowSource {
    workflows: BTreeMap<String, Vec<TransitionDefinition>>,
}

impl InMemoryWorkflowSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let workflows: BTreeMap<String, Vec<TransitionDefinition>> = serde_json::from_str(json)?;
        let mut source = InMemoryWorkflowSource::default();
        for (workflow_id, definitions) in workflows {
            source.insert(workflow_id, definitions);
        }
        Ok(source)
    }

    /// Register the definition list for a workflow id, stamping the id onto
    /// definitions that don't carry one.
    pub fn insert(
        &mut self,
        workflow_id: impl Into<String>,
        mut definitions: Vec<TransitionDefinition>,
    ) {
        let workflow_id = workflow_id.into();
        for definition in &mut definitions {
            if definition.workflow_id.is_none() {
                definition.workflow_id = Some(workflow_id.clone());
            }
        }
        self.workflows.insert(workflow_id, definitions);
    }

    pub fn workflow_ids(&self) -> impl Iterator<Item = &str> {
        self.workflows.keys().map(String::as_str)
    }
}

impl WorkflowSource for InMemoryWorkflowSource {
    fn workflows(&self) -> BTreeMap<String, Vec<TransitionDefinition>> {
        self.workflows.clone()
    }

    fn workflows_for_id(&self, workflow_id: &str) -> Vec<TransitionDefinition> {
        self.workflows.get(workflow_id).cloned().unwrap_or_default()
    }
}
