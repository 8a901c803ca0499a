//! Loading [`Options`] from a YAML/JSON/TOML file. CLI flags layered on
//! top of a loaded file always win; that merge happens in the CLI binary,
//! not here — this module only turns bytes on disk into a base `Options`.

use std::path::Path;

use anyhow::Context;
use fleet_runtime::Options;

/// Read `path` and parse it as `Options`, choosing the format by
/// extension (`.yaml`/`.yml` → YAML, `.toml` → TOML, everything else →
/// JSON).
pub fn load_options(path: &Path) -> anyhow::Result<Options> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading config file {}", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&text).with_context(|| format!("parsing YAML config {}", path.display()))
        }
        Some("toml") => toml::from_str(&text).with_context(|| format!("parsing TOML config {}", path.display())),
        _ => serde_json::from_str(&text).with_context(|| format!("parsing JSON config {}", path.display())),
    }
}
