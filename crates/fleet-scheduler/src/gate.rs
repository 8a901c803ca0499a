//! The Dependency Gate: "are all of this step's declared dependencies
//! `Done`, and none of them `Failed`?"

use std::collections::HashMap;

use fleet_step::Step;
use fleet_types::{Status, StepId};

/// Outcome of asking the gate about one queued step.
pub enum GateDecision {
    /// Every dependency is `Done`; the step may proceed to the constraint
    /// solver.
    Clear,
    /// At least one dependency has not yet settled; the step stays queued,
    /// reported as blocked by these IDs.
    Waiting { blocked_by: Vec<StepId> },
    /// A dependency terminated `Failed`; this step can never become
    /// eligible and must itself be marked `Failed`.
    DependencyFailed { dependency: StepId },
}

pub fn evaluate(step: &Step, statuses: &HashMap<StepId, Status>) -> GateDecision {
    let mut waiting = Vec::new();
    for dependency in &step.depends_on {
        match statuses.get(dependency) {
            Some(Status::Done) => continue,
            Some(Status::Failed) => {
                return GateDecision::DependencyFailed { dependency: dependency.clone() };
            }
            _ => waiting.push(dependency.clone()),
        }
    }
    if waiting.is_empty() {
        GateDecision::Clear
    } else {
        GateDecision::Waiting { blocked_by: waiting }
    }
}
