//! The resolution and execution engine.
//!
//! A [`Manager`] is a single-pass snapshot: it captures the host's workflow
//! id, state and sequence at construction, resolves the candidate and
//! allowed transitions once, and is discarded after an accepted transition.
//! Construct a fresh manager to observe the host's new snapshot.

use crate::error::{WorkflowerError, WorkflowerResult};
use crate::flow::Flow;
use crate::host::{HostFault, TransitionErrorKind, WorkflowHost};
use crate::source::WorkflowSource;
use std::collections::BTreeMap;
use workflower_config::{ConfigError, WorkflowerConfig};

#[derive(Debug)]
pub struct Manager {
    config: WorkflowerConfig,
    workflow_id: String,
    current_state: String,
    current_sequence: i64,
    flows: Vec<Flow>,
    candidates: Vec<Flow>,
    allowed_transitions: Vec<Flow>,
    /// Event name to index into `allowed_transitions`, built once so
    /// `trigger`/`can_trigger` dispatch without rescanning.
    event_index: BTreeMap<String, usize>,
    events: Vec<String>,
    allowed_events: Vec<String>,
}

impl Manager {
    /// Build a manager for one host snapshot.
    ///
    /// Fails only on configuration problems: an invalid configuration, or a
    /// host without a workflow id when no default is configured. An empty
    /// definition list is not an error; such a manager simply allows
    /// nothing.
    pub fn new<H, S>(host: &H, source: &S, config: WorkflowerConfig) -> WorkflowerResult<Self>
    where
        H: WorkflowHost,
        S: WorkflowSource + ?Sized,
    {
        config.validate()?;
        let workflow_id = if host.workflow_id().is_empty() {
            config
                .default_workflow_id
                .clone()
                .ok_or(ConfigError::MissingWorkflowId)?
        } else {
            host.workflow_id().to_string()
        };

        let current_state = host.workflow_state().to_string();
        let current_sequence = host.sequence();

        let flows: Vec<Flow> = source
            .workflows_for_id(&workflow_id)
            .into_iter()
            .map(Flow::new)
            .collect();

        let mut candidates: Vec<Flow> = flows
            .iter()
            .filter(|flow| {
                flow.definition()
                    .applies_from(&current_state, current_sequence)
            })
            .cloned()
            .collect();
        // Stable: candidates at the same sequence keep source order.
        candidates.sort_by_key(Flow::sequence);

        let events = flows.iter().map(|flow| flow.event().to_string()).collect();

        let allowed_transitions: Vec<Flow> = candidates
            .iter()
            .filter(|flow| Self::possible(&config, flow, host))
            .cloned()
            .collect();
        let mut event_index = BTreeMap::new();
        for (index, flow) in allowed_transitions.iter().enumerate() {
            event_index.entry(flow.event().to_string()).or_insert(index);
        }
        let allowed_events = allowed_transitions
            .iter()
            .map(|flow| flow.event().to_string())
            .collect();

        log::debug!(
            "workflow {}: state `{}` sequence {}: {} definitions, {} candidates, {} allowed",
            workflow_id,
            current_state,
            current_sequence,
            flows.len(),
            candidates.len(),
            allowed_transitions.len(),
        );

        Ok(Manager {
            config,
            workflow_id,
            current_state,
            current_sequence,
            flows,
            candidates,
            allowed_transitions,
            event_index,
            events,
            allowed_events,
        })
    }

    pub fn config(&self) -> &WorkflowerConfig {
        &self.config
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    /// Host state captured at construction.
    pub fn current_state(&self) -> &str {
        &self.current_state
    }

    /// Host sequence captured at construction.
    pub fn current_sequence(&self) -> i64 {
        self.current_sequence
    }

    /// All flows built for this workflow id, unfiltered.
    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    /// Flows matching the host's state at the current or next sequence,
    /// ascending by sequence.
    pub fn candidates(&self) -> &[Flow] {
        &self.candidates
    }

    /// Candidates whose guard passed and whose destination differs from the
    /// current state, as of construction.
    pub fn allowed_transitions(&self) -> &[Flow] {
        &self.allowed_transitions
    }

    /// Event names of all flows.
    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// Event names of the allowed transitions.
    pub fn allowed_events(&self) -> &[String] {
        &self.allowed_events
    }

    /// Initial state for this manager's workflow id.
    pub fn initial_state(&self) -> &str {
        self.config.initial_state_for(&self.workflow_id)
    }

    /// Pure predicate: could this flow be executed against the host right
    /// now? Never mutates, never reports; guard evaluation errors are
    /// logged and count as "no".
    pub fn transition_possible<H: WorkflowHost>(&self, flow: &Flow, host: &H) -> bool {
        Self::possible(&self.config, flow, host)
    }

    fn possible<H: WorkflowHost>(config: &WorkflowerConfig, flow: &Flow, host: &H) -> bool {
        if host.workflow_state() == flow.transition_into() {
            return false;
        }
        match flow.guard_satisfied(host, config) {
            Ok(satisfied) => satisfied,
            Err(err) => {
                log::warn!("guard for event `{}` did not evaluate: {}", flow.event(), err);
                false
            }
        }
    }

    /// Execute a flow against the host.
    ///
    /// Returns `true` on success. A failed precondition or a host fault is
    /// reported to the host's error sink (keyed by the configured state
    /// attribute) and yields `false`; faults never propagate.
    pub fn process_transition<H: WorkflowHost>(&self, flow: &Flow, host: &mut H) -> bool {
        if !self.transition_possible(flow, host) {
            host.report_error(
                &self.config.state_attribute,
                TransitionErrorKind::PreconditionNotMet,
            );
            return false;
        }

        match self.apply(flow, host) {
            Ok(()) => true,
            Err(fault) => {
                log::warn!("transition `{}` failed: {}", flow.event(), fault);
                host.report_error(
                    &self.config.state_attribute,
                    TransitionErrorKind::TransitionFailed,
                );
                false
            }
        }
    }

    fn apply<H: WorkflowHost>(&self, flow: &Flow, host: &mut H) -> Result<(), HostFault> {
        flow.invoke_before_hook(host)?;
        host.assign_attributes(flow.attribute_patch(&self.config))?;
        flow.invoke_after_hook(host)?;
        Ok(())
    }

    /// Whether `event` names an allowed transition that is still possible.
    pub fn can_trigger<H: WorkflowHost>(&self, event: &str, host: &H) -> bool {
        match self.flow_for_event(event) {
            Some(flow) => self.transition_possible(flow, host),
            None => false,
        }
    }

    /// Execute the allowed transition named by `event`.
    ///
    /// Errors with [`WorkflowerError::NoTransitionAllowed`] when no allowed
    /// flow carries that event name; otherwise behaves like
    /// [`process_transition`](Self::process_transition).
    pub fn trigger<H: WorkflowHost>(&self, event: &str, host: &mut H) -> WorkflowerResult<bool> {
        let flow = self
            .flow_for_event(event)
            .ok_or_else(|| WorkflowerError::no_transition_allowed(event, &self.current_state))?;
        Ok(self.process_transition(flow, host))
    }

    fn flow_for_event(&self, event: &str) -> Option<&Flow> {
        self.event_index
            .get(event)
            .map(|&index| &self.allowed_transitions[index])
    }
}
