//! Configuration loading from deadgraph.toml.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::{GraphError, IoResultExt};
use crate::reachability::Containment;

/// File name looked up in the configuration directory.
pub const CONFIG_FILE: &str = "deadgraph.toml";

/// Main configuration structure for deadgraph.toml.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DeadgraphConfig {
    /// Fully-qualified entry-point names.
    pub entry_points: Option<Vec<String>>,
    /// Regex patterns; matching dead declarations are not reported.
    pub ignore: Option<Vec<String>>,
    /// Containment mode for reachability.
    pub containment: Option<Containment>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

impl DeadgraphConfig {
    pub fn wants_json(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

/// Compile regex patterns, naming the offending one on failure.
pub fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            let p = p.as_ref();
            Regex::new(p).with_context(|| format!("Invalid ignore pattern '{}'", p))
        })
        .collect()
}

/// Parses configuration text. Failures are `GraphError::Config`.
pub fn parse_config(content: &str) -> Result<DeadgraphConfig> {
    parse_config_at(content, Path::new(CONFIG_FILE))
}

fn parse_config_at(content: &str, path: &Path) -> Result<DeadgraphConfig> {
    toml::from_str(content)
        .map_err(|e| GraphError::config(path, e.message().to_string()).into())
}

/// Loads configuration from deadgraph.toml if it exists.
pub fn load_config(dir: &Path) -> Result<Option<DeadgraphConfig>> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).with_path(&path)?;
    Ok(Some(parse_config_at(&content, &path)?))
}
