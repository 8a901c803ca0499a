//! The external interface surface the scheduler core exposes to action
//! bodies and to whatever loads its configuration.
//!
//! Everything in this crate is a *contract*: the concrete action bodies
//! (build/push/deploy-switch/remote-command/...), the host inventory, and
//! the config loader are all external collaborators, out of scope for this
//! core. The core only needs to know their shapes.

mod action;
mod cancel;
mod host;
mod options;

pub use action::Action;
pub use cancel::CancelToken;
pub use fleet_cache::ArtefactCache;
pub use host::{Host, HostMap};
pub use options::{DeploySwitchAction, Options};
