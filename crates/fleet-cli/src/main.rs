mod run;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

const LONG_ABOUT: &str = "\
fleetplan - constraint-aware DAG planner/executor for fleet-wide deploys.

Run `fleetplan run <plan.json|plan.yaml>` to execute a plan, or
`fleetplan show <plan.json|plan.yaml>` to inspect its parsed structure
without running anything.

Repeat `--constraint labelKey=labelValue:constraintType=value` to cap
how many steps matching a label may be simultaneously non-healthy; CLI
constraints take priority over whatever a plan's own config declares.
";

#[derive(Parser, Debug)]
#[command(name = "fleetplan", version = version_string(), about = "Fleet-wide DAG planner/executor", long_about = LONG_ABOUT)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run a plan file to completion.
    Run(RunArgs),
    /// Parse a plan file and print its structure (debug).
    Show { plan: PathBuf },
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Plan file, JSON or YAML.
    plan: PathBuf,
    /// Config file (YAML/JSON/TOML) supplying the base `Options`.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Repeatable `labelKey=labelValue:constraintType=value` constraint.
    #[arg(long = "constraint", num_args = 0..)]
    constraints: Vec<String>,
    #[arg(long)]
    dry_run: bool,
    #[arg(long)]
    plan_only: bool,
    #[arg(long)]
    json_out: bool,
    /// Write the plan's DAG to this path as Graphviz DOT before running.
    #[arg(long)]
    dot_file: Option<PathBuf>,
}

fn version_string() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\nBuild Host: ",
        env!("TARGET"),
        "\nBuild Commit: ",
        env!("GIT_HASH"),
        "\nBuild Time: ",
        env!("BUILD_TIME")
    )
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();
    let cli = Cli::parse();
    let exit_code = match cli.cmd {
        Cmd::Show { plan } => run::show(&plan).map(|()| 0),
        Cmd::Run(args) => run::execute(args),
    }?;
    std::process::exit(exit_code);
}
