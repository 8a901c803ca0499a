//! The Constraint Solver: decides whether admitting candidate step `c`
//! right now would push any matching constraint's "non-healthy" count
//! above its `max_unavailable`.
//!
//! Each constraint is checked by direct counting rather than a general
//! 0-1 SAT/ILP procedure — equivalent for the tiny per-constraint
//! cardinalities this core deals with, and far simpler to read.

use std::collections::HashMap;

use fleet_step::{Constraint, Step};
use fleet_types::{Status, StepId};

/// Whether `candidate` may transition to `Running` given the current
/// status of every registered step. `registry` and `statuses` must be a
/// coherent snapshot (the caller holds the ready-queue lock while calling
/// this, so no step's status can change mid-scan).
pub fn admits(
    candidate: &Step,
    constraints: &[Constraint],
    registry: &HashMap<StepId, Step>,
    statuses: &HashMap<StepId, Status>,
) -> bool {
    if candidate.labels.is_empty() {
        return true;
    }

    for constraint in constraints {
        let key = &constraint.selector.key;
        // A wildcard selector (`location=*`) is a template instantiated per
        // distinct value observed: the cap applies within the group of
        // steps sharing the *candidate's* concrete value, not across every
        // value the wildcard could match (per-location caps, not one
        // pooled cap across all locations).
        let Some(candidate_value) = candidate.labels.get(key.as_str()) else {
            continue;
        };
        if !constraint.selector.matches(key, candidate_value) {
            continue;
        }

        let matching_ids: Vec<&StepId> = registry
            .values()
            .filter(|step| step.labels.get(key.as_str()) == Some(candidate_value))
            .map(|step| &step.id)
            .collect();

        let down_count = matching_ids
            .iter()
            .filter(|id| {
                if ***id == candidate.id {
                    // Simulating admission: treat the candidate as Running
                    // regardless of its actually-stored status.
                    true
                } else {
                    statuses.get(**id).is_some_and(Status::is_down)
                }
            })
            .count() as u32;

        if down_count > constraint.max_unavailable {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_step::{Selector, StepBuilder};

    fn registry_of(steps: &[Step]) -> HashMap<StepId, Step> {
        steps.iter().map(|s| (s.id.clone(), s.clone())).collect()
    }

    #[test]
    fn admits_unlabelled_steps_unconditionally() {
        let candidate = StepBuilder::new("a").build();
        assert!(admits(&candidate, &[], &HashMap::new(), &HashMap::new()));
    }

    #[test]
    fn cardinality_one_constraint_blocks_a_second_concurrent_admission() {
        let a = StepBuilder::new("a").label("type", "web").build();
        let b = StepBuilder::new("b").label("type", "web").build();
        let registry = registry_of(&[a.clone(), b.clone()]);
        let constraints = vec![Constraint::new(Selector::new("type", "web"), 1)];

        let mut statuses = HashMap::new();
        statuses.insert("a".to_string(), Status::Running);

        assert!(!admits(&b, &constraints, &registry, &statuses));
    }

    #[test]
    fn cardinality_one_constraint_admits_when_nothing_else_is_down() {
        let a = StepBuilder::new("a").label("type", "web").build();
        let b = StepBuilder::new("b").label("type", "web").build();
        let registry = registry_of(&[a.clone(), b.clone()]);
        let constraints = vec![Constraint::new(Selector::new("type", "web"), 1)];
        let statuses = HashMap::new();

        assert!(admits(&b, &constraints, &registry, &statuses));
    }

    #[test]
    fn multiple_constraints_are_all_enforced() {
        let web_dc1_a = StepBuilder::new("w1").label("type", "web").label("location", "dc1").build();
        let web_dc1_b = StepBuilder::new("w2").label("type", "web").label("location", "dc1").build();
        let web_dc2_a = StepBuilder::new("w3").label("type", "web").label("location", "dc2").build();
        let candidate = StepBuilder::new("w4").label("type", "web").label("location", "dc2").build();

        let registry = registry_of(&[web_dc1_a, web_dc1_b, web_dc2_a.clone(), candidate.clone()]);
        let constraints = vec![
            Constraint::new(Selector::new("type", "web"), 2),
            Constraint::new(Selector::new("location", "*"), 1),
        ];

        let mut statuses = HashMap::new();
        statuses.insert("w3".to_string(), Status::Running);

        // dc2 already has one running (w3); admitting the candidate (also
        // dc2) would push the location=dc2 bucket to 2 > max_unavailable=1.
        assert!(!admits(&candidate, &constraints, &registry, &statuses));
    }
}
