//! Loading a plan (a [`Step`] tree) from a JSON or YAML file on disk.

use std::path::Path;

use anyhow::Context;
use fleet_step::Step;

/// Read and parse a plan file. The format is chosen by extension: `.yaml`
/// / `.yml` parse as YAML, everything else as JSON — both feed the same
/// `serde_json::Value`-based round-trip in `fleet_step::serde_plan`, since
/// YAML is a structural superset of the JSON plan shape.
pub fn load_plan(path: &Path) -> anyhow::Result<Step> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading plan file {}", path.display()))?;
    let is_yaml = matches!(path.extension().and_then(|ext| ext.to_str()), Some("yaml") | Some("yml"));

    let value: serde_json::Value = if is_yaml {
        serde_yaml::from_str(&text).with_context(|| format!("parsing YAML plan {}", path.display()))?
    } else {
        serde_json::from_str(&text).with_context(|| format!("parsing JSON plan {}", path.display()))?
    };

    fleet_step::from_value(&value).with_context(|| format!("building step tree from {}", path.display()))
}
