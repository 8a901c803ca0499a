//! Plan loading, option loading, and the `Engine` facade: the glue that
//! turns a plan file and a config file into a finished scheduler run.

mod config;
mod engine;
mod plan;

pub use config::load_options;
pub use engine::Engine;
pub use plan::load_plan;
