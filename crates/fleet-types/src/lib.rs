//! Shared scalar types used across the scheduler core.
//!
//! Kept deliberately tiny and dependency-free (beyond `serde`) so that
//! `fleet-runtime` and `fleet-step` can both depend on it without creating
//! a cycle between the Action contract and the Step value type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque, process-unique identifier for a step. UUID-shaped strings are
/// acceptable but not required; the scheduler only ever compares for
/// equality.
pub type StepId = String;

/// Generate a fresh process-unique step ID, for callers that don't want to
/// name their own.
pub fn new_step_id() -> StepId {
    uuid::Uuid::new_v4().to_string()
}

/// Label map carried by a step; the domain over which constraints match.
pub type Labels = BTreeMap<String, String>;

/// Per-step lifecycle state.
///
/// `Blocked` is a transient, scheduler-derived view used only for
/// reporting (`QueueStatus`); the ground-truth transition set is
/// `Queued -> Running -> (Done | Failed)` with a `Queued` re-entry on
/// retry. Once a step reaches `Done` or `Failed` its status is immutable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Queued,
    Blocked,
    Running,
    Done,
    Failed,
}

impl Status {
    /// `Running` or `Failed` count as "non-healthy" for constraint purposes.
    pub fn is_down(&self) -> bool {
        matches!(self, Status::Running | Status::Failed)
    }

    /// `Queued` or `Done` count as "up" for constraint purposes.
    pub fn is_up(&self) -> bool {
        matches!(self, Status::Queued | Status::Done)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Done | Status::Failed)
    }
}

/// What the scheduler does when a step's action returns an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Mark the step (and anything depending on it) `Failed`, and surface
    /// a fatal error from the scheduler's top-level `run()` once the run
    /// quiesces. The default.
    #[default]
    Propagate,
    /// Increment the step's retry counter, re-queue it, and wait
    /// `retry_interval` seconds before it becomes eligible again.
    Retry,
    /// Mark the step `Failed` but let unrelated steps keep running; the
    /// scheduler does not treat this as fatal.
    Ignore,
}
