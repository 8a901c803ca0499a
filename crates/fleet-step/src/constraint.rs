//! Constraints: "at most K non-healthy" rules over the set of steps
//! matching a label selector, and the three-source precedence merge
//! (deployment-declared < CLI-provided < built-in defaults-with-absent-
//! override).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A (label-key, label-value) pair. `value == "*"` matches any value for
/// that key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Selector {
    pub key: String,
    pub value: String,
}

impl Selector {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    /// Whether this selector matches a concrete `(key, value)` label pair.
    pub fn matches(&self, key: &str, value: &str) -> bool {
        self.key == key && (self.value == "*" || value == "*" || self.value == value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Constraint {
    pub selector: Selector,
    pub max_unavailable: u32,
}

impl Constraint {
    pub fn new(selector: Selector, max_unavailable: u32) -> Self {
        Self { selector, max_unavailable }
    }

    /// The built-in default inserted unless a deployment/CLI constraint
    /// already covers `(_, host)`.
    pub fn default_host_constraint() -> Self {
        Self::new(Selector::new("_", "host"), 1)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConstraintParseError {
    #[error("constraint string `{0}` is not of the form labelKey=labelValue:constraintType=value")]
    Malformed(String),
    #[error("constraint string `{0}` has unknown constraint type `{1}` (only `maxUnavailable` is supported)")]
    UnknownConstraintType(String, String),
    #[error("constraint string `{0}` has a non-integer maxUnavailable value")]
    InvalidValue(String),
}

/// Parse a CLI-provided constraint string of the form
/// `labelKey=labelValue:constraintType=value`, e.g.
/// `location=dc1:maxUnavailable=2`.
pub fn parse_cli_constraint(raw: &str) -> Result<Constraint, ConstraintParseError> {
    let (selector_part, constraint_part) = raw
        .split_once(':')
        .ok_or_else(|| ConstraintParseError::Malformed(raw.to_string()))?;
    let (key, value) = selector_part
        .split_once('=')
        .ok_or_else(|| ConstraintParseError::Malformed(raw.to_string()))?;
    let (constraint_type, value_str) = constraint_part
        .split_once('=')
        .ok_or_else(|| ConstraintParseError::Malformed(raw.to_string()))?;
    if constraint_type != "maxUnavailable" {
        return Err(ConstraintParseError::UnknownConstraintType(raw.to_string(), constraint_type.to_string()));
    }
    let max_unavailable: u32 = value_str
        .parse()
        .map_err(|_| ConstraintParseError::InvalidValue(raw.to_string()))?;
    Ok(Constraint::new(Selector::new(key, value), max_unavailable))
}

/// Merge `low_priority` constraints (e.g. deployment-declared) with
/// `high_priority` constraints (e.g. CLI-provided), following the rule:
/// a higher-priority constraint with a more specific value wins over a
/// lower-priority one with `"*"` for the same key; two constraints with
/// the same `(key, value)` collapse to the higher-priority definition;
/// everything else from both sides is kept.
///
/// Both the specific-overrides-wildcard and same-(key,value)-takes-later
/// rules are reachable here; neither collapses into dead code.
pub fn merge(low_priority: &[Constraint], high_priority: &[Constraint]) -> Vec<Constraint> {
    let mut result: Vec<Constraint> = high_priority.to_vec();

    for low in low_priority {
        let superseded = high_priority.iter().any(|high| {
            if high.selector.key != low.selector.key {
                return false;
            }
            // Same (key, value): high wins outright.
            if high.selector.value == low.selector.value {
                return true;
            }
            // High is a wildcard for this key: it already covers every
            // value, including `low`'s specific one.
            if high.selector.value == "*" {
                return true;
            }
            // Low is a wildcard and high is a more specific value for the
            // same key: the higher-priority specific constraint wins for
            // that value.
            if low.selector.value == "*" {
                return true;
            }
            // Both specific and distinct: unrelated values, low is kept.
            false
        });
        if !superseded {
            result.push(low.clone());
        }
    }
    result
}

/// Insert the built-in `{_=host -> max_unavailable=1}` default unless an
/// existing constraint already covers `(_, host)` (exact or wildcard).
pub fn with_builtin_default(mut constraints: Vec<Constraint>) -> Vec<Constraint> {
    let already_covered = constraints
        .iter()
        .any(|c| c.selector.matches("_", "host"));
    if !already_covered {
        constraints.push(Constraint::default_host_constraint());
    }
    constraints
}
