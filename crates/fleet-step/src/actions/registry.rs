//! Tag-keyed dispatch for deserialization. Hand-written rather than
//! reflection-based: a name-tagged sum over heterogeneous structs becomes
//! a closed match here, so unknown tags fail cleanly and deterministically
//! instead of silently deserializing into a wrong shape.

use fleet_runtime::Action;
use serde_json::{Map, Value};

use super::inert::{GateAction, NoneAction, SkipAction, WrapperAction};
use super::opaque::OpaqueAction;

/// Construct the `Action` matching a wire tag plus its flattened extra
/// fields. Returns `None` for a tag this core does not recognize; callers
/// turn that into a `DeserializationError::UnknownAction`.
pub fn action_from_tag(tag: &str, extra: Map<String, Value>) -> Option<Box<dyn Action>> {
    match tag {
        "none" => Some(Box::new(NoneAction)),
        "gate" => Some(Box::new(GateAction)),
        "wrapper" => Some(Box::new(WrapperAction)),
        "skip" => Some(Box::new(SkipAction)),
        _ => OpaqueAction::tag_for(tag).map(|t| Box::new(OpaqueAction::new(t, extra)) as Box<dyn Action>),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_every_built_in_tag() {
        let tags = [
            "none", "gate", "wrapper", "skip", "build", "push", "deploy-boot",
            "deploy-dry-activate", "deploy-switch", "deploy-test", "local-command",
            "remote-command", "local-request", "remote-request", "is-online", "reboot",
            "get-sudo-password", "eval-deployment", "delay",
        ];
        for tag in tags {
            let action = action_from_tag(tag, Map::new()).unwrap_or_else(|| panic!("tag `{tag}` not recognized"));
            assert_eq!(action.name(), tag);
        }
    }

    #[test]
    fn unknown_tag_is_none() {
        assert!(action_from_tag("totally-made-up", Map::new()).is_none());
    }
}
