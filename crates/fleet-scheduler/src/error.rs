//! The scheduler's error taxonomy, as a single closed enum so callers can
//! match on failure kind instead of parsing strings. Nothing in this
//! crate's public signatures is `anyhow::Error`; that conversion happens
//! at the CLI boundary.

use fleet_types::StepId;

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("dependency cycle: {}", .cycle.join(" -> "))]
    PlanCycle { cycle: Vec<StepId> },

    #[error("step `{step}` depends on unknown step `{dependency}`")]
    UnknownDependency { step: StepId, dependency: StepId },

    #[error("step `{step}` failed")]
    ActionFailed {
        step: StepId,
        #[source]
        source: anyhow::Error,
    },

    #[error("step `{step}` never became eligible: dependency `{dependency}` failed")]
    DependencyFailed { step: StepId, dependency: StepId },

    #[error("plan is malformed JSON")]
    DeserializationError {
        #[source]
        source: serde_json::Error,
    },

    #[error("plan references unknown action tag `{tag}`")]
    UnknownAction { tag: String },
}

impl From<fleet_step::PlanJsonError> for SchedulerError {
    fn from(err: fleet_step::PlanJsonError) -> Self {
        match err {
            fleet_step::PlanJsonError::UnknownAction(_step, tag) => SchedulerError::UnknownAction { tag },
            fleet_step::PlanJsonError::Serde(source) => SchedulerError::DeserializationError { source },
            other => SchedulerError::DeserializationError {
                source: <serde_json::Error as serde::de::Error>::custom(other.to_string()),
            },
        }
    }
}
