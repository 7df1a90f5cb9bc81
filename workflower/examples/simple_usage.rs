//! Simple usage example for the workflower engine.
//!
//! This example drives a document record through a two-step approval
//! workflow: definitions come from a JSON document, guards from a boolean
//! expression over the record's accessors, and abilities from role
//! metadata.

use workflower::{
    compute_abilities, AttributePatch, ErrorReports, HookDispatch, HostFault,
    InMemoryWorkflowSource, Manager, TransitionErrorKind, WorkflowHost, WorkflowerConfig,
    WorkflowerError,
};

/// A document record the engine drives. In a real application this would
/// be a persisted entity; hooks and accessors are ordinary methods on it.
struct Document {
    workflow_id: String,
    workflow_state: String,
    sequence: i64,
    approved: bool,
    rejected: bool,
    errors: ErrorReports,
}

impl Document {
    fn new() -> Self {
        Document {
            workflow_id: "1".to_string(),
            workflow_state: "saved".to_string(),
            sequence: 1,
            approved: false,
            rejected: false,
            errors: ErrorReports::new(),
        }
    }
}

impl WorkflowHost for Document {
    fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    fn workflow_state(&self) -> &str {
        &self.workflow_state
    }

    fn sequence(&self) -> i64 {
        self.sequence
    }

    fn assign_attributes(&mut self, patch: AttributePatch) -> Result<(), HostFault> {
        self.workflow_state = patch.state;
        self.sequence = patch.sequence;
        Ok(())
    }

    fn report_error(&mut self, attribute: &str, kind: TransitionErrorKind) {
        self.errors.add(attribute, kind);
    }

    fn guard_accessor(&self, name: &str) -> Option<bool> {
        match name {
            "approved" => Some(self.approved),
            "rejected" => Some(self.rejected),
            _ => None,
        }
    }

    fn invoke_hook(&mut self, name: &str) -> Result<HookDispatch, HostFault> {
        if name == "after_workflow_submit" {
            println!("  (hook) document submitted, notifying reviewers");
            Ok(HookDispatch::Completed)
        } else {
            Ok(HookDispatch::NotSupported)
        }
    }
}

fn definitions() -> InMemoryWorkflowSource {
    InMemoryWorkflowSource::from_json(
        r#"{
            "1": [
                {
                    "state": "saved",
                    "transition_into": "submitted",
                    "event": "submit",
                    "sequence": 1,
                    "metadata": {"roles": ["author"]}
                },
                {
                    "state": "submitted",
                    "transition_into": "accepted",
                    "event": "accept",
                    "sequence": 2,
                    "condition": "approved && ! rejected",
                    "condition_type": "expression",
                    "metadata": {"roles": ["manager"]}
                },
                {
                    "state": "submitted",
                    "transition_into": "saved",
                    "event": "reopen",
                    "sequence": 2,
                    "downgrade_sequence": 1,
                    "metadata": {"roles": ["manager"]}
                }
            ]
        }"#,
    )
    .expect("definition document is well-formed")
}

fn config() -> WorkflowerConfig {
    WorkflowerConfig::default()
        .with_default_workflow_id("1")
        .allow_guard_accessors(["approved", "rejected"])
}

fn main() -> Result<(), WorkflowerError> {
    println!("=== Workflower Demo ===\n");

    let source = definitions();
    let mut document = Document::new();

    println!("1. Submitting");
    println!("-------------");
    let manager = Manager::new(&document, &source, config())?;
    println!("Initial state: {}", document.workflow_state);
    println!("Allowed events: {:?}", manager.allowed_events());

    manager.trigger("submit", &mut document)?;
    println!("✓ New state: {}\n", document.workflow_state);

    println!("2. Guarded acceptance");
    println!("---------------------");
    // Not approved yet: the expression guard blocks the transition.
    let manager = Manager::new(&document, &source, config())?;
    println!(
        "Can accept before approval? {}",
        manager.can_trigger("accept", &document)
    );

    document.approved = true;
    let manager = Manager::new(&document, &source, config())?;
    println!(
        "Can accept after approval?  {}",
        manager.can_trigger("accept", &document)
    );
    manager.trigger("accept", &mut document)?;
    println!("✓ Final state: {} (sequence {})\n", document.workflow_state, document.sequence);

    println!("3. Abilities from role metadata");
    println!("-------------------------------");
    for (role, events) in compute_abilities(&source) {
        println!("{} may trigger {:?}", role, events);
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_happy_path() {
        let source = definitions();
        let mut document = Document::new();

        let manager = Manager::new(&document, &source, config()).unwrap();
        assert!(manager.trigger("submit", &mut document).unwrap());

        document.approved = true;
        let manager = Manager::new(&document, &source, config()).unwrap();
        assert!(manager.trigger("accept", &mut document).unwrap());
        assert_eq!(document.workflow_state, "accepted");
    }
}
