//! The Step value type: a node in the execution DAG.

use std::collections::BTreeSet;

use fleet_runtime::Action;
use fleet_types::{FailurePolicy, Labels, StepId};

use crate::actions::NoneAction;

/// A node in the execution DAG. `children` form a tree, not a graph;
/// cross-subtree ordering is expressed separately via `depends_on`.
#[derive(Clone)]
pub struct Step {
    pub id: StepId,
    pub description: String,
    pub action: Box<dyn Action>,
    /// When true, direct children may run concurrently; when false they
    /// run in declared order with a synthetic dependency edge from each
    /// to its predecessor (installed by the builder, see
    /// [`crate::builder::StepBuilder::children_serially`]).
    pub parallel: bool,
    pub on_failure: FailurePolicy,
    pub timeout: u64,
    pub retry_interval: u64,
    pub children: Vec<Step>,
    pub depends_on: BTreeSet<StepId>,
    /// Hint to external persistence layers; opaque to the core.
    pub can_resume: bool,
    pub labels: Labels,
}

impl Step {
    /// All steps are immutable trees; cloning the action requires that
    /// `Action` objects be deep-cloned via `clone_action`, which is why
    /// `Step` cannot simply `#[derive(Clone)]` its `Box<dyn Action>` field
    /// without the blanket impl in `fleet_runtime::action`.
    pub fn new_with_defaults(id: impl Into<StepId>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            action: Box::new(NoneAction),
            parallel: false,
            on_failure: FailurePolicy::Propagate,
            timeout: 0,
            retry_interval: 0,
            children: Vec::new(),
            depends_on: BTreeSet::new(),
            can_resume: true,
            labels: Labels::new(),
        }
    }

    /// Every step in the subtree rooted at `self`, `self` included,
    /// depth-first.
    pub fn flatten(&self) -> Vec<&Step> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.flatten());
        }
        out
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("action", &self.action.name())
            .field("parallel", &self.parallel)
            .field("on_failure", &self.on_failure)
            .field("children", &self.children)
            .field("depends_on", &self.depends_on)
            .field("labels", &self.labels)
            .finish()
    }
}
