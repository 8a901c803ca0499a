//! JSON (and, by extension, YAML) round-trip for a [`Step`] tree. An
//! action's own fields are flattened directly alongside the step's own
//! fields, keyed by its `action` tag; dispatch back from JSON to a
//! concrete `Box<dyn Action>` goes through
//! [`crate::actions::action_from_tag`].

use std::collections::BTreeSet;

use fleet_types::{FailurePolicy, Labels, StepId};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::actions::action_from_tag;
use crate::step::Step;

const RESERVED_FIELDS: &[&str] = &[
    "id",
    "description",
    "action",
    "parallel",
    "on-failure",
    "timeout",
    "retry-interval",
    "steps",
    "dependencies",
    "can-resume",
    "labels",
];

#[derive(Debug, Error)]
pub enum PlanJsonError {
    #[error("plan step is not a JSON object")]
    NotAnObject,
    #[error("plan step is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("plan step `{0}` has unknown action tag `{1}`")]
    UnknownAction(String, String),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// Serialize a step tree to its JSON value.
pub fn to_value(step: &Step) -> Value {
    let mut map = Map::new();
    map.insert("id".into(), Value::String(step.id.clone()));
    if !step.description.is_empty() {
        map.insert("description".into(), Value::String(step.description.clone()));
    }
    map.insert("action".into(), Value::String(step.action.name().to_string()));
    if let Value::Object(payload) = step.action.payload() {
        for (key, value) in payload {
            map.insert(key, value);
        }
    }
    map.insert("parallel".into(), Value::Bool(step.parallel));
    map.insert(
        "on-failure".into(),
        serde_json::to_value(&step.on_failure).expect("FailurePolicy always serializes"),
    );
    if step.timeout != 0 {
        map.insert("timeout".into(), Value::from(step.timeout));
    }
    if step.retry_interval != 0 {
        map.insert("retry-interval".into(), Value::from(step.retry_interval));
    }
    if !step.children.is_empty() {
        map.insert(
            "steps".into(),
            Value::Array(step.children.iter().map(to_value).collect()),
        );
    }
    if !step.depends_on.is_empty() {
        map.insert(
            "dependencies".into(),
            Value::Array(step.depends_on.iter().cloned().map(Value::String).collect()),
        );
    }
    map.insert("can-resume".into(), Value::Bool(step.can_resume));
    if !step.labels.is_empty() {
        map.insert(
            "labels".into(),
            serde_json::to_value(&step.labels).expect("Labels always serializes"),
        );
    }
    Value::Object(map)
}

/// Serialize a step tree to a pretty-printed JSON string.
pub fn to_json_string(step: &Step) -> Result<String, PlanJsonError> {
    Ok(serde_json::to_string_pretty(&to_value(step))?)
}

/// Parse a step tree from a previously-serialized JSON value.
pub fn from_value(value: &Value) -> Result<Step, PlanJsonError> {
    let obj = value.as_object().ok_or(PlanJsonError::NotAnObject)?;

    let id: StepId = obj
        .get("id")
        .and_then(Value::as_str)
        .ok_or(PlanJsonError::MissingField("id"))?
        .to_string();
    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let tag = obj
        .get("action")
        .and_then(Value::as_str)
        .ok_or(PlanJsonError::MissingField("action"))?;

    let mut extra = Map::new();
    for (key, value) in obj {
        if !RESERVED_FIELDS.contains(&key.as_str()) {
            extra.insert(key.clone(), value.clone());
        }
    }
    let action = action_from_tag(tag, extra)
        .ok_or_else(|| PlanJsonError::UnknownAction(id.clone(), tag.to_string()))?;

    let parallel = obj.get("parallel").and_then(Value::as_bool).unwrap_or(false);
    let on_failure: FailurePolicy = match obj.get("on-failure") {
        Some(v) => serde_json::from_value(v.clone())?,
        None => FailurePolicy::Propagate,
    };
    let timeout = obj.get("timeout").and_then(Value::as_u64).unwrap_or(0);
    let retry_interval = obj.get("retry-interval").and_then(Value::as_u64).unwrap_or(0);
    let can_resume = obj.get("can-resume").and_then(Value::as_bool).unwrap_or(true);

    let children = match obj.get("steps") {
        Some(Value::Array(items)) => items.iter().map(from_value).collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };
    let depends_on: BTreeSet<StepId> = match obj.get("dependencies") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        _ => BTreeSet::new(),
    };
    let labels: Labels = match obj.get("labels") {
        Some(v) => serde_json::from_value(v.clone())?,
        None => Labels::new(),
    };

    Ok(Step {
        id,
        description,
        action,
        parallel,
        on_failure,
        timeout,
        retry_interval,
        children,
        depends_on,
        can_resume,
        labels,
    })
}

/// Parse a step tree from a JSON string.
pub fn from_json_str(raw: &str) -> Result<Step, PlanJsonError> {
    let value: Value = serde_json::from_str(raw)?;
    from_value(&value)
}
