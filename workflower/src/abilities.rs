//! Role-to-event ability derivation.
//!
//! Definitions may carry a `roles` list in their metadata. Scanning every
//! definition across every workflow id yields a permission map suitable for
//! feeding an authorization layer: which events may a given role trigger,
//! anywhere in the definition set.

use crate::definition::TransitionDefinition;
use crate::source::WorkflowSource;
use std::collections::BTreeMap;

/// Compute the role → event-names map for everything `source` knows.
///
/// Definitions without role metadata contribute nothing; duplicate
/// definitions (the same record reachable under several workflow ids) are
/// counted once, and each role's event list is de-duplicated while keeping
/// first-seen order. Empty when no definition carries roles.
pub fn compute_abilities<S>(source: &S) -> BTreeMap<String, Vec<String>>
where
    S: WorkflowSource + ?Sized,
{
    let mut seen: Vec<TransitionDefinition> = Vec::new();
    for (_, definitions) in source.workflows() {
        for definition in definitions {
            if !seen.contains(&definition) {
                seen.push(definition);
            }
        }
    }

    let mut abilities: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for definition in seen.iter().filter(|d| !d.roles().is_empty()) {
        for role in definition.roles() {
            let events = abilities.entry(role.clone()).or_default();
            if !events.iter().any(|event| event == &definition.event) {
                events.push(definition.event.clone());
            }
        }
    }
    abilities
}
