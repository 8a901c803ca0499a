//! Placeholder bodies for the built-in action kinds whose real
//! implementation is an external collaborator (the remote-execution
//! subsystem, out of scope for this crate). These exist so a plan
//! containing e.g. a `build` or `deploy-switch` step can be constructed,
//! scheduled, and JSON round-tripped by this crate's own test suite
//! without requiring the real remote-exec machinery to be linked in.
//!
//! Extra JSON fields present on the wire are preserved verbatim so
//! round-trip is lossless even though this crate does not interpret them.

use fleet_cache::ArtefactCache;
use fleet_runtime::{Action, CancelToken, HostMap, Options};
use serde_json::{Map, Value};

/// Every built-in tag whose body is external. Each instance carries its
/// own tag, so one struct covers all of them.
pub const OPAQUE_TAGS: &[&str] = &[
    "build",
    "push",
    "deploy-boot",
    "deploy-dry-activate",
    "deploy-switch",
    "deploy-test",
    "local-command",
    "remote-command",
    "local-request",
    "remote-request",
    "is-online",
    "reboot",
    "get-sudo-password",
    "eval-deployment",
    "delay",
];

#[derive(Debug, Clone)]
pub struct OpaqueAction {
    tag: &'static str,
    extra: Map<String, Value>,
}

impl OpaqueAction {
    pub fn new(tag: &'static str, extra: Map<String, Value>) -> Self {
        Self { tag, extra }
    }

    /// Look up the `'static` tag string for a matching known opaque name,
    /// so callers don't need to leak their own strings.
    pub fn tag_for(name: &str) -> Option<&'static str> {
        OPAQUE_TAGS.iter().copied().find(|t| *t == name)
    }
}

impl Action for OpaqueAction {
    fn name(&self) -> &'static str {
        self.tag
    }

    fn run(
        &self,
        _cancel: &CancelToken,
        _options: &Options,
        _hosts: &HostMap,
        _cache: &ArtefactCache,
    ) -> anyhow::Result<()> {
        tracing::debug!(action = self.tag, "opaque action invoked (body is an external collaborator)");
        Ok(())
    }

    fn payload(&self) -> Value {
        Value::Object(self.extra.clone())
    }

    fn clone_action(&self) -> Box<dyn Action> {
        Box::new(self.clone())
    }
}
