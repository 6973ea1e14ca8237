//! CLI configuration file

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

/// Settings read from the `--config` file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Pretty-print mapped output
    #[serde(default)]
    pub pretty: bool,

    /// Log filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            log_filter: default_log_filter(),
        }
    }
}

impl CliConfig {
    /// Parse configuration from YAML
    pub fn parse(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse configuration")
    }

    /// Load configuration from `path`.
    ///
    /// Returns `None` when the file does not exist, so callers fall back to
    /// [`CliConfig::default`].
    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?;
        Self::parse(&content).map(Some)
    }
}
