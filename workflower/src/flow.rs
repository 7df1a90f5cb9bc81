//! Runtime wrapper around one transition definition.
//!
//! A [`Flow`] adds everything the engine needs at resolution time: derived
//! action names, guard evaluation, hook-name derivation and dispatch, and
//! the attribute patch a successful transition writes. Flows are stateless
//! beyond the definition they wrap and live only for one manager pass.

use crate::definition::{ConditionType, TransitionDefinition};
use crate::error::GuardError;
use crate::expr::GuardExpr;
use crate::host::{AttributePatch, HookDispatch, HostFault, WorkflowHost};
use workflower_config::WorkflowerConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    definition: TransitionDefinition,
    trigger_action_name: String,
    boolean_action_name: String,
}

impl Flow {
    pub fn new(definition: TransitionDefinition) -> Self {
        let trigger_action_name = format!("trigger_{}", definition.event);
        let boolean_action_name = format!("can_{}", definition.event);
        Flow {
            definition,
            trigger_action_name,
            boolean_action_name,
        }
    }

    pub fn definition(&self) -> &TransitionDefinition {
        &self.definition
    }

    pub fn event(&self) -> &str {
        &self.definition.event
    }

    pub fn state(&self) -> &str {
        &self.definition.state
    }

    pub fn transition_into(&self) -> &str {
        &self.definition.transition_into
    }

    pub fn sequence(&self) -> i64 {
        self.definition.sequence
    }

    pub fn downgrade_sequence(&self) -> i64 {
        self.definition.downgrade_sequence
    }

    /// Generated action name `trigger_<event>`.
    pub fn trigger_action_name(&self) -> &str {
        &self.trigger_action_name
    }

    /// Generated action name `can_<event>`.
    pub fn boolean_action_name(&self) -> &str {
        &self.boolean_action_name
    }

    /// Explicit before-hook name, or the `before_workflow_<event>`
    /// convention.
    pub fn before_hook_name(&self) -> String {
        self.definition
            .before_transition
            .clone()
            .unwrap_or_else(|| format!("before_workflow_{}", self.definition.event))
    }

    /// Explicit after-hook name, or the `after_workflow_<event>`
    /// convention.
    pub fn after_hook_name(&self) -> String {
        self.definition
            .after_transition
            .clone()
            .unwrap_or_else(|| format!("after_workflow_{}", self.definition.event))
    }

    /// Evaluate this flow's guard against a host snapshot.
    ///
    /// Expression conditions are parsed with [`GuardExpr`] and resolve
    /// accessors at evaluation time, restricted to the allow-list in
    /// `config.guard_accessors`. Method conditions call the named accessor
    /// when the host exposes it and pass unconditionally when it does not.
    /// No condition means the guard passes.
    pub fn guard_satisfied<H: WorkflowHost>(
        &self,
        host: &H,
        config: &WorkflowerConfig,
    ) -> Result<bool, GuardError> {
        match (&self.definition.condition_type, &self.definition.condition) {
            (Some(ConditionType::Expression), Some(condition)) => {
                let expr = GuardExpr::parse(condition)?;
                expr.eval(&mut |name| {
                    if !config.accessor_allowed(name) {
                        return Err(GuardError::AccessorNotAllowed {
                            name: name.to_string(),
                        });
                    }
                    host.guard_accessor(name)
                        .ok_or_else(|| GuardError::AccessorUnsupported {
                            name: name.to_string(),
                        })
                })
            }
            (_, Some(condition)) => Ok(host.guard_accessor(condition).unwrap_or(true)),
            _ => Ok(true),
        }
    }

    /// Invoke the before hook; a no-op when the host has no such hook.
    pub fn invoke_before_hook<H: WorkflowHost>(
        &self,
        host: &mut H,
    ) -> Result<HookDispatch, HostFault> {
        host.invoke_hook(&self.before_hook_name())
    }

    /// Invoke the after hook; a no-op when the host has no such hook.
    pub fn invoke_after_hook<H: WorkflowHost>(
        &self,
        host: &mut H,
    ) -> Result<HookDispatch, HostFault> {
        host.invoke_hook(&self.after_hook_name())
    }

    /// The patch a successful transition writes: the destination state
    /// under the configured attribute name, and the downgrade sequence when
    /// one is set, else the forward sequence.
    pub fn attribute_patch(&self, config: &WorkflowerConfig) -> AttributePatch {
        let sequence = if self.definition.downgrade_sequence < 0 {
            self.definition.sequence
        } else {
            self.definition.downgrade_sequence
        };
        AttributePatch {
            attribute: config.state_attribute.clone(),
            state: self.definition.transition_into.clone(),
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TransitionErrorKind;
    use pretty_assertions::assert_eq;

    struct GuardHost {
        approved: bool,
        rejected: bool,
    }

    impl WorkflowHost for GuardHost {
        fn workflow_id(&self) -> &str {
            "1"
        }
        fn workflow_state(&self) -> &str {
            "review"
        }
        fn sequence(&self) -> i64 {
            1
        }
        fn assign_attributes(&mut self, _patch: AttributePatch) -> Result<(), HostFault> {
            Ok(())
        }
        fn report_error(&mut self, _attribute: &str, _kind: TransitionErrorKind) {}
        fn guard_accessor(&self, name: &str) -> Option<bool> {
            match name {
                "approved" => Some(self.approved),
                "rejected" => Some(self.rejected),
                _ => None,
            }
        }
    }

    fn config() -> WorkflowerConfig {
        WorkflowerConfig::default().allow_guard_accessors(["approved", "rejected"])
    }

    fn flow(definition: TransitionDefinition) -> Flow {
        Flow::new(definition)
    }

    #[test]
    fn action_names_derive_from_event() {
        let flow = flow(TransitionDefinition::new("saved", "submitted", "submit", 1));
        assert_eq!(flow.trigger_action_name(), "trigger_submit");
        assert_eq!(flow.boolean_action_name(), "can_submit");
    }

    #[test]
    fn hook_names_fall_back_to_convention() {
        let flow = flow(TransitionDefinition::new("saved", "submitted", "submit", 1));
        assert_eq!(flow.before_hook_name(), "before_workflow_submit");
        assert_eq!(flow.after_hook_name(), "after_workflow_submit");

        let flow = self::flow(
            TransitionDefinition::new("saved", "submitted", "submit", 1)
                .with_before_hook("lock_record")
                .with_after_hook("notify_submitters"),
        );
        assert_eq!(flow.before_hook_name(), "lock_record");
        assert_eq!(flow.after_hook_name(), "notify_submitters");
    }

    #[test]
    fn expression_guard_resolves_accessors_at_evaluation_time() {
        let flow = flow(
            TransitionDefinition::new("review", "approved", "approve", 1).with_condition(
                "approved && ! rejected",
                ConditionType::Expression,
            ),
        );
        let host = GuardHost {
            approved: true,
            rejected: false,
        };
        assert_eq!(flow.guard_satisfied(&host, &config()), Ok(true));

        let host = GuardHost {
            approved: true,
            rejected: true,
        };
        assert_eq!(flow.guard_satisfied(&host, &config()), Ok(false));
    }

    #[test]
    fn expression_guard_refuses_undeclared_accessors() {
        let flow = flow(
            TransitionDefinition::new("review", "approved", "approve", 1)
                .with_condition("approved", ConditionType::Expression),
        );
        let host = GuardHost {
            approved: true,
            rejected: false,
        };
        // Same expression, empty allow-list.
        assert_eq!(
            flow.guard_satisfied(&host, &WorkflowerConfig::default()),
            Err(GuardError::AccessorNotAllowed {
                name: "approved".to_string()
            })
        );
    }

    #[test]
    fn method_guard_calls_accessor_when_exposed() {
        let flow = flow(
            TransitionDefinition::new("review", "approved", "approve", 1)
                .with_condition("approved", ConditionType::Method),
        );
        let host = GuardHost {
            approved: false,
            rejected: false,
        };
        assert_eq!(flow.guard_satisfied(&host, &config()), Ok(false));
    }

    #[test]
    fn method_guard_passes_when_host_lacks_accessor() {
        let flow = flow(
            TransitionDefinition::new("review", "approved", "approve", 1)
                .with_condition("archived", ConditionType::Method),
        );
        let host = GuardHost {
            approved: false,
            rejected: false,
        };
        assert_eq!(flow.guard_satisfied(&host, &config()), Ok(true));
    }

    #[test]
    fn no_condition_passes_unconditionally() {
        let flow = flow(TransitionDefinition::new("saved", "submitted", "submit", 1));
        let host = GuardHost {
            approved: false,
            rejected: false,
        };
        assert_eq!(flow.guard_satisfied(&host, &config()), Ok(true));
    }

    #[test]
    fn attribute_patch_applies_downgrade_rule() {
        let config = config();
        let forward = flow(TransitionDefinition::new("saved", "submitted", "submit", 3));
        assert_eq!(
            forward.attribute_patch(&config),
            AttributePatch {
                attribute: "workflow_state".to_string(),
                state: "submitted".to_string(),
                sequence: 3,
            }
        );

        let downgrade = flow(
            TransitionDefinition::new("submitted", "saved", "reopen", 3)
                .with_downgrade_sequence(1),
        );
        assert_eq!(downgrade.attribute_patch(&config).sequence, 1);

        // 0 is a legal downgrade target; only negative values are the
        // "no downgrade" sentinel.
        let to_zero = flow(
            TransitionDefinition::new("submitted", "saved", "reset", 3)
                .with_downgrade_sequence(0),
        );
        assert_eq!(to_zero.attribute_patch(&config).sequence, 0);
    }
}
