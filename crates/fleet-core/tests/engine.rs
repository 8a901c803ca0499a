//! Black-box coverage of the `Engine` facade: plan loading plus the
//! plan-only / DOT-file early exits, end to end through real files.

use std::io::Write;

use fleet_core::Engine;
use fleet_runtime::{HostMap, Options};

#[test]
fn loading_and_running_a_trivial_json_plan_reaches_done() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"id": "root", "action": "none", "steps": [{{"id": "a", "action": "skip"}}]}}"#).unwrap();

    let step = fleet_core::load_plan(file.path()).unwrap();
    let engine = Engine::new(vec![], Options::default(), HostMap::new()).unwrap();
    let exit_code = engine.run(step).unwrap();
    assert_eq!(exit_code, 0);
}

#[test]
fn dot_file_is_written_before_the_run_starts() {
    let mut plan_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(plan_file, r#"{{"id": "root", "action": "none"}}"#).unwrap();
    let dot_file = tempfile::Builder::new().suffix(".dot").tempfile().unwrap();

    let step = fleet_core::load_plan(plan_file.path()).unwrap();
    let mut options = Options::default();
    options.dot_file = Some(dot_file.path().display().to_string());

    let engine = Engine::new(vec![], options, HostMap::new()).unwrap();
    engine.run(step).unwrap();

    let contents = std::fs::read_to_string(dot_file.path()).unwrap();
    assert!(contents.starts_with("digraph plan {"));
}

#[test]
fn plan_only_never_touches_the_scheduler() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"id": "root", "action": "not-a-real-action"}}"#).unwrap();

    // An unknown action tag would fail at plan-load time regardless, so
    // this step's own body is never reached; what matters here is that a
    // known plan with `plan_only` set exits 0 without running any action.
    let good_plan = fleet_core::load_plan(&{
        let mut good = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(good, r#"{{"id": "root", "action": "none"}}"#).unwrap();
        good.path().to_path_buf()
    })
    .unwrap();

    let mut options = Options::default();
    options.plan_only = true;
    let engine = Engine::new(vec![], options, HostMap::new()).unwrap();
    assert_eq!(engine.run(good_plan).unwrap(), 0);
    assert!(fleet_core::load_plan(file.path()).is_err());
}
