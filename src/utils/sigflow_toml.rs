//! Load `.sigflow.toml` (CLI only). Lib does not use this; callers pass [`SignOpts`](crate::SignOpts) directly.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::{Item, Opts};

#[derive(Debug, Deserialize)]
pub(crate) struct SigflowToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    seeds: Option<Vec<SeedValue>>,
    workers: Option<usize>,
    delimiter: Option<String>,
    latency: Option<bool>,
    json: Option<bool>,
    verbose: Option<bool>,
}

/// A seed in the file: `seeds = [0, 1, "abc"]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedValue {
    Int(i64),
    Text(String),
}

impl From<&SeedValue> for Item {
    fn from(v: &SeedValue) -> Self {
        match v {
            SeedValue::Int(n) => Item::Int(*n),
            SeedValue::Text(s) => Item::Text(s.clone()),
        }
    }
}

/// Load the default config file from `dir` if present. Returns None if missing or unparsable (warns).
pub(crate) fn load_sigflow_toml(dir: &Path) -> Option<SigflowToml> {
    let path = dir.join(crate::utils::PackagePaths::get().config_filename());
    if !path.is_file() {
        return None;
    }
    read_sigflow_toml(&path)
        .map_err(|e| log::warn!("{:#}", e))
        .ok()
}

/// Read and parse an explicit config file. Errors are returned, not skipped.
pub(crate) fn read_sigflow_toml(path: &Path) -> Result<SigflowToml> {
    let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($set:expr, $opts:expr, $set_field:ident => $opts_field:ident) => {
        if let Some(v) = $set.$set_field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
pub(crate) fn apply_file_to_opts(file: &SigflowToml, opts: &mut Opts) {
    let set = &file.settings;
    if let Some(ref seeds) = set.seeds {
        opts.seeds = seeds.iter().map(Item::from).collect();
    }
    if let Some(n) = set.workers {
        opts.workers = Some(n);
    }
    if let Some(ref d) = set.delimiter {
        opts.delimiter = d.clone();
    }
    apply_file_opt!(set, opts, latency => latency);
    apply_file_opt!(set, opts, json => json);
    apply_file_opt!(set, opts, verbose => verbose);
}
