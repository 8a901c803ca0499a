//! Step value type, fluent builder, DAG validity rules, constraint
//! parsing/merging, and JSON/DOT export for the scheduler's execution
//! tree.

pub mod actions;
pub mod builder;
pub mod constraint;
pub mod dag;
pub mod dot;
pub mod serde_plan;
pub mod step;

pub use builder::StepBuilder;
pub use constraint::{
    merge as merge_constraints, parse_cli_constraint, with_builtin_default, Constraint,
    ConstraintParseError, Selector,
};
pub use dag::{validate_dag, DagError};
pub use dot::to_dot;
pub use serde_plan::{from_json_str, from_value, to_json_string, to_value, PlanJsonError};
pub use step::Step;
