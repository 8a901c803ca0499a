//! Per-host metadata, produced by the (external, out-of-scope) declarative
//! evaluator and passed through to action bodies unmodified.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single target host. The core never interprets these fields itself;
/// they exist so action bodies have somewhere to read host metadata from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Host {
    pub name: String,
    pub target_host: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The host inventory handed to every action's `run`.
pub type HostMap = BTreeMap<String, Host>;
