//! The four structural, no-op action kinds. Their `run` never touches the
//! cache or the outside world — they exist purely to shape the DAG (a
//! grouping node, a synchronization gate, a serialization wrapper, or a
//! deliberately-skipped step).

use fleet_cache::ArtefactCache;
use fleet_runtime::{Action, CancelToken, HostMap, Options};
use serde_json::Value;

macro_rules! inert_action {
    ($name:ident, $tag:literal) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Action for $name {
            fn name(&self) -> &'static str {
                $tag
            }

            fn run(
                &self,
                _cancel: &CancelToken,
                _options: &Options,
                _hosts: &HostMap,
                _cache: &ArtefactCache,
            ) -> anyhow::Result<()> {
                Ok(())
            }

            fn payload(&self) -> Value {
                Value::Null
            }

            fn clone_action(&self) -> Box<dyn Action> {
                Box::new(*self)
            }
        }
    };
}

inert_action!(NoneAction, "none");
inert_action!(GateAction, "gate");
inert_action!(WrapperAction, "wrapper");
inert_action!(SkipAction, "skip");

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_runtime::ArtefactCache;

    #[test]
    fn inert_actions_are_ok_noops() {
        let cache = ArtefactCache::new("test");
        let cancel = CancelToken::new();
        let options = Options::default();
        let hosts = HostMap::new();
        for action in [
            Box::new(NoneAction) as Box<dyn Action>,
            Box::new(GateAction),
            Box::new(WrapperAction),
            Box::new(SkipAction),
        ] {
            action.run(&cancel, &options, &hosts, &cache).unwrap();
            assert_eq!(action.payload(), Value::Null);
        }
        assert!(cache.snapshot().is_empty());
    }
}
