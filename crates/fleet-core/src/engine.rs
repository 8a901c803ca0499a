//! The facade that ties plan loading, constraint merging, DOT/plan-only
//! early exits, and the scheduler together into the single entry point a
//! CLI (or any other caller) needs.

use std::sync::Arc;

use anyhow::Context;
use fleet_cache::ArtefactCache;
use fleet_events::EventBus;
use fleet_runtime::{HostMap, Options};
use fleet_scheduler::Scheduler;
use fleet_step::{merge_constraints, parse_cli_constraint, to_dot, to_json_string, with_builtin_default, Constraint, Step};

/// Constructs a [`Scheduler`] run from an already-loaded plan, merging the
/// three constraint sources in the priority order spec'd for the rewrite:
/// deployment-declared, then CLI-provided, then the built-in default.
pub struct Engine {
    events: Arc<EventBus>,
    cache: Arc<ArtefactCache>,
    constraints: Vec<Constraint>,
    options: Arc<Options>,
    hosts: Arc<HostMap>,
}

impl Engine {
    /// `declared_constraints` are whatever a deployment's own configuration
    /// names (out of scope here: produced by the external evaluator).
    /// `options.constraints` holds the CLI-provided overrides, still in
    /// their raw `labelKey=labelValue:constraintType=value` form.
    pub fn new(declared_constraints: Vec<Constraint>, options: Options, hosts: HostMap) -> anyhow::Result<Self> {
        let cli_constraints = options
            .constraints
            .iter()
            .map(|raw| parse_cli_constraint(raw))
            .collect::<Result<Vec<_>, _>>()
            .context("parsing --constraint flags")?;

        let merged = merge_constraints(&declared_constraints, &cli_constraints);
        let constraints = with_builtin_default(merged);

        Ok(Self {
            events: Arc::new(EventBus::new()),
            cache: Arc::new(ArtefactCache::new("fleetplan")),
            constraints,
            options: Arc::new(options),
            hosts: Arc::new(hosts),
        })
    }

    pub fn events(&self) -> Arc<EventBus> {
        self.events.clone()
    }

    /// Run `root` to completion, honoring `plan_only` and `dot_file` as
    /// early exits, and translating the scheduler's outcome into the exit
    /// code spec'd in §6 (`0` success, `1` fatal scheduler error).
    pub fn run(&self, root: Step) -> anyhow::Result<i32> {
        if let Some(dot_file) = &self.options.dot_file {
            std::fs::write(dot_file, to_dot(&root)).with_context(|| format!("writing DOT output to {dot_file}"))?;
        }

        if self.options.plan_only {
            println!("{}", to_json_string(&root).context("serializing plan")?);
            return Ok(0);
        }

        let scheduler = Scheduler::new(
            self.events.clone(),
            self.cache.clone(),
            self.constraints.clone(),
            self.options.clone(),
            self.hosts.clone(),
        );

        match scheduler.run(root) {
            Ok(()) => Ok(0),
            Err(err) => {
                tracing::error!(error = %err, "plan run ended with a fatal scheduler error");
                Ok(1)
            }
        }
    }
}
