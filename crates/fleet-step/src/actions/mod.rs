mod inert;
mod opaque;
mod registry;

pub use inert::{GateAction, NoneAction, SkipAction, WrapperAction};
pub use opaque::{OpaqueAction, OPAQUE_TAGS};
pub use registry::action_from_tag;
