//! Scheduling-relevant options consumed from an external configuration
//! loader (CLI flags, a config file, or both merged). Fields beyond the
//! ones the scheduler itself reads (`dry_run`,
//! `plan_only`, `json_out`, `constraints`, `dot_file`) are opaque to the
//! core and exist only so action bodies have somewhere to read them from.

use serde::{Deserialize, Serialize};

/// Which activation action a `deploy-*` step should perform. Opaque to the
/// scheduler; read by the (external) deploy action body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DeploySwitchAction {
    DryActivate,
    Test,
    #[default]
    Switch,
    Boot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Options {
    /// Actions may no-op; the scheduler still admits and traces as usual.
    #[serde(default)]
    pub dry_run: bool,
    /// When set, the scheduler is not started: the plan is emitted and
    /// the process exits.
    #[serde(default)]
    pub plan_only: bool,
    /// Selects event-stream-as-JSON over an interactive UI.
    #[serde(default)]
    pub json_out: bool,
    /// Raw `labelKey=labelValue:constraintType=value` strings, parsed by
    /// `fleet_step::constraint::parse_cli_constraint` and merged with
    /// deployment-declared constraints (CLI-provided has priority).
    #[serde(default)]
    pub constraints: Vec<String>,

    #[serde(default)]
    pub select_glob: Option<String>,
    #[serde(default)]
    pub select_tags: Vec<String>,
    #[serde(default)]
    pub select_every: Option<u32>,
    #[serde(default)]
    pub select_skip: Option<u32>,
    #[serde(default)]
    pub select_limit: Option<u32>,
    #[serde(default)]
    pub ordering_tags: Vec<String>,

    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub ask_for_sudo_passwd: bool,
    #[serde(default)]
    pub pass_cmd: Option<String>,
    #[serde(default)]
    pub skip_health_checks: bool,
    #[serde(default)]
    pub skip_pre_deploy_checks: bool,
    #[serde(default)]
    pub deploy_reboot: bool,
    #[serde(default)]
    pub deploy_upload_secrets: bool,
    #[serde(default)]
    pub deploy_switch_action: DeploySwitchAction,
    #[serde(default)]
    pub execute_command: Vec<String>,

    /// When set, emit the DAG in Graphviz DOT form to this path before
    /// execution.
    #[serde(default)]
    pub dot_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_constraints_and_is_not_dry_run() {
        let opts = Options::default();
        assert!(opts.constraints.is_empty());
        assert!(!opts.dry_run);
        assert_eq!(opts.deploy_switch_action, DeploySwitchAction::Switch);
    }

    #[test]
    fn deserializes_partial_json_with_defaults() {
        let opts: Options = serde_json::from_str(r#"{"dry_run": true, "constraints": ["location=dc1:maxUnavailable=2"]}"#).unwrap();
        assert!(opts.dry_run);
        assert_eq!(opts.constraints, vec!["location=dc1:maxUnavailable=2"]);
        assert!(!opts.json_out);
    }
}
