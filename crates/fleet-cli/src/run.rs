//! `run` and `show` subcommand bodies.

use std::path::Path;

use anyhow::Context;
use fleet_runtime::{HostMap, Options};

use crate::RunArgs;

pub fn show(plan: &Path) -> anyhow::Result<()> {
    let step = fleet_core::load_plan(plan)?;
    println!("{}", fleet_step::to_json_string(&step)?);
    Ok(())
}

pub fn execute(args: RunArgs) -> anyhow::Result<i32> {
    let mut options = match &args.config {
        Some(path) => fleet_core::load_options(path)?,
        None => Options::default(),
    };
    if args.dry_run {
        options.dry_run = true;
    }
    if args.plan_only {
        options.plan_only = true;
    }
    if args.json_out {
        options.json_out = true;
    }
    if !args.constraints.is_empty() {
        options.constraints = args.constraints;
    }
    if let Some(dot_file) = &args.dot_file {
        options.dot_file = Some(dot_file.display().to_string());
    }

    let step = fleet_core::load_plan(&args.plan)?;
    // Deployment-declared constraints live in the (out-of-scope) external
    // evaluator's own config; this CLI has no such source, so it merges
    // only the CLI-provided set against the built-in default.
    let engine = fleet_core::Engine::new(Vec::new(), options, HostMap::new()).context("constructing engine")?;
    engine.run(step)
}
