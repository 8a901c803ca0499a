//! Fluent step construction, mirroring the upstream `steps.New()...Build()`
//! builder but with Rust-idiomatic consuming `self` methods instead of a
//! mutable receiver chained across separate statements.

use fleet_runtime::Action;
use fleet_types::{FailurePolicy, StepId};

use crate::step::Step;

/// Builds a [`Step`] starting from safe defaults (`action = none`,
/// `on_failure = propagate`, `parallel = false`, `can_resume = true`,
/// empty labels/deps/children) and decorated field-by-field.
pub struct StepBuilder {
    step: Step,
}

impl StepBuilder {
    pub fn new(id: impl Into<StepId>) -> Self {
        Self { step: Step::new_with_defaults(id) }
    }

    /// Start building a step with a freshly generated UUID-shaped id, for
    /// callers that don't care to name their own (e.g. a CLI constructing
    /// a synthetic root around a loaded plan).
    pub fn new_generated() -> Self {
        Self::new(fleet_types::new_step_id())
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.step.description = description.into();
        self
    }

    pub fn action(mut self, action: impl Action + 'static) -> Self {
        self.step.action = Box::new(action);
        self
    }

    pub fn action_boxed(mut self, action: Box<dyn Action>) -> Self {
        self.step.action = action;
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.step.labels.insert(key.into(), value.into());
        self
    }

    pub fn labels(mut self, labels: impl IntoIterator<Item = (String, String)>) -> Self {
        self.step.labels.extend(labels);
        self
    }

    pub fn parallel(mut self) -> Self {
        self.step.parallel = true;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.step.parallel = false;
        self
    }

    pub fn on_failure(mut self, policy: FailurePolicy) -> Self {
        self.step.on_failure = policy;
        self
    }

    /// Convenience equivalent to the upstream `ExitOnFailure()`.
    pub fn exit_on_failure(self) -> Self {
        self.on_failure(FailurePolicy::Propagate)
    }

    pub fn retry_on_failure(self, retry_interval_secs: u64) -> Self {
        let mut builder = self.on_failure(FailurePolicy::Retry);
        builder.step.retry_interval = retry_interval_secs;
        builder
    }

    pub fn ignore_on_failure(self) -> Self {
        self.on_failure(FailurePolicy::Ignore)
    }

    pub fn timeout(mut self, secs: u64) -> Self {
        self.step.timeout = secs;
        self
    }

    pub fn disable_resume(mut self) -> Self {
        self.step.can_resume = false;
        self
    }

    pub fn resume(mut self, can_resume: bool) -> Self {
        self.step.can_resume = can_resume;
        self
    }

    /// Append children that may run concurrently with each other.
    pub fn children(mut self, children: impl IntoIterator<Item = Step>) -> Self {
        self.step.children.extend(children);
        self
    }

    /// Append children that must run in declared order: each child after
    /// the first gets an implicit dependency on its immediately preceding
    /// sibling.
    pub fn children_serially(mut self, children: impl IntoIterator<Item = Step>) -> Self {
        let mut previous_id: Option<StepId> = None;
        for mut child in children {
            if let Some(prev) = &previous_id {
                child.depends_on.insert(prev.clone());
            }
            previous_id = Some(child.id.clone());
            self.step.children.push(child);
        }
        self
    }

    pub fn depends_on_id(mut self, id: impl Into<StepId>) -> Self {
        self.step.depends_on.insert(id.into());
        self
    }

    pub fn depends_on_ids(mut self, ids: impl IntoIterator<Item = StepId>) -> Self {
        self.step.depends_on.extend(ids);
        self
    }

    pub fn depends_on_step(self, step: &Step) -> Self {
        self.depends_on_id(step.id.clone())
    }

    pub fn build(self) -> Step {
        self.step
    }
}

impl Step {
    /// Start building a step with the given id.
    pub fn builder(id: impl Into<StepId>) -> StepBuilder {
        StepBuilder::new(id)
    }
}
