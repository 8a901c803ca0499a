//! DAG-validity rules over a Step tree: every `depends_on` id must name a
//! step that actually exists in the tree, and the `depends_on` edges taken
//! together must not form a cycle.

use std::collections::{HashMap, HashSet};

use fleet_types::StepId;

use crate::step::Step;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DagError {
    #[error("step `{step}` depends on unknown step `{dependency}`")]
    UnknownDependency { step: StepId, dependency: StepId },
    #[error("dependency cycle: {}", .cycle.join(" -> "))]
    Cycle { cycle: Vec<StepId> },
}

/// Validate every `depends_on` edge reachable from `root`: references must
/// resolve within the tree, and the edges must be acyclic.
pub fn validate_dag(root: &Step) -> Result<(), DagError> {
    let steps = root.flatten();
    let by_id: HashMap<&StepId, &Step> = steps.iter().map(|s| (&s.id, *s)).collect();

    for step in &steps {
        for dep in &step.depends_on {
            if !by_id.contains_key(dep) {
                return Err(DagError::UnknownDependency {
                    step: step.id.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }

    detect_cycle(&by_id)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

fn detect_cycle(by_id: &HashMap<&StepId, &Step>) -> Result<(), DagError> {
    let mut marks: HashMap<&StepId, Mark> = HashMap::new();
    let mut visited: HashSet<&StepId> = HashSet::new();

    for &id in by_id.keys() {
        if visited.contains(id) {
            continue;
        }
        let mut path = Vec::new();
        visit(id, by_id, &mut marks, &mut visited, &mut path)?;
    }
    Ok(())
}

fn visit<'a>(
    id: &'a StepId,
    by_id: &HashMap<&'a StepId, &'a Step>,
    marks: &mut HashMap<&'a StepId, Mark>,
    visited: &mut HashSet<&'a StepId>,
    path: &mut Vec<&'a StepId>,
) -> Result<(), DagError> {
    if let Some(Mark::Done) = marks.get(id) {
        return Ok(());
    }
    if let Some(Mark::InProgress) = marks.get(id) {
        let start = path.iter().position(|p| *p == id).unwrap_or(0);
        let mut cycle: Vec<StepId> = path[start..].iter().map(|s| (**s).clone()).collect();
        cycle.push(id.clone());
        return Err(DagError::Cycle { cycle });
    }

    marks.insert(id, Mark::InProgress);
    path.push(id);
    if let Some(step) = by_id.get(id) {
        for dep in &step.depends_on {
            visit(dep, by_id, marks, visited, path)?;
        }
    }
    path.pop();
    marks.insert(id, Mark::Done);
    visited.insert(id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::SkipAction;
    use crate::builder::StepBuilder;

    #[test]
    fn acyclic_plan_is_valid() {
        let root = StepBuilder::new("root")
            .action(SkipAction)
            .children_serially([
                StepBuilder::new("a").action(SkipAction).build(),
                StepBuilder::new("b").action(SkipAction).build(),
            ])
            .build();
        validate_dag(&root).unwrap();
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let root = StepBuilder::new("root")
            .action(SkipAction)
            .children([StepBuilder::new("a").action(SkipAction).depends_on_id("ghost").build()])
            .build();
        let err = validate_dag(&root).unwrap_err();
        assert_eq!(err, DagError::UnknownDependency { step: "a".into(), dependency: "ghost".into() });
    }

    #[test]
    fn direct_cycle_is_rejected() {
        let root = StepBuilder::new("root")
            .action(SkipAction)
            .children([
                StepBuilder::new("a").action(SkipAction).depends_on_id("b").build(),
                StepBuilder::new("b").action(SkipAction).depends_on_id("a").build(),
            ])
            .build();
        assert!(matches!(validate_dag(&root), Err(DagError::Cycle { .. })));
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let root = StepBuilder::new("root")
            .action(SkipAction)
            .children([StepBuilder::new("a").action(SkipAction).depends_on_id("a").build()])
            .build();
        assert!(matches!(validate_dag(&root), Err(DagError::Cycle { .. })));
    }
}
