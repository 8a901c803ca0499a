//! The `Action` contract: the single polymorphic capability a step carries.
//! Bodies are external collaborators (build, push, deploy-switch,
//! remote-command, ...); the scheduler only ever calls through this trait.

use fleet_cache::ArtefactCache;

use crate::cancel::CancelToken;
use crate::host::HostMap;
use crate::options::Options;

/// An action is opaque to the scheduler beyond its stable `name()` tag
/// (used for serialization dispatch, see `fleet_step::serde_plan`) and its
/// `run` body. `run` may block for an unbounded time and perform arbitrary
/// I/O; it must be safe to invoke concurrently across different step
/// instances sharing the same `ArtefactCache`.
pub trait Action: Send + Sync {
    /// Stable tag used for JSON serialization dispatch, e.g. `"build"`,
    /// `"deploy-switch"`, `"none"`.
    fn name(&self) -> &'static str;

    /// Execute the action body. `cancel` is best-effort cooperative
    /// cancellation; `options` and `hosts` are read-only references to the
    /// run's configuration and inventory; `cache` is the shared artefact
    /// store.
    fn run(
        &self,
        cancel: &CancelToken,
        options: &Options,
        hosts: &HostMap,
        cache: &ArtefactCache,
    ) -> anyhow::Result<()>;

    /// The action's own fields, to be flattened into the step's JSON
    /// representation alongside `id`/`description`/etc. Inert actions
    /// (`none`/`gate`/`wrapper`/`skip`) return `Value::Null`, which
    /// flattens to nothing.
    fn payload(&self) -> serde_json::Value;

    /// Deep-clone into a fresh boxed trait object, so `Step` can derive
    /// `Clone` without requiring `Action: Clone` (which would not be
    /// object-safe).
    fn clone_action(&self) -> Box<dyn Action>;
}

impl Clone for Box<dyn Action> {
    fn clone(&self) -> Self {
        self.clone_action()
    }
}

impl std::fmt::Debug for dyn Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action").field("name", &self.name()).finish()
    }
}
