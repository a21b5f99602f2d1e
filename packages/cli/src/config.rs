use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "hcledit.config.json";

/// hcledit configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Write results back to the input file instead of stdout
    #[serde(default)]
    pub update: bool,

    /// Collapse blank lines left behind by `rm` commands
    #[serde(default = "default_tidy_after_remove")]
    pub tidy_after_remove: bool,
}

fn default_tidy_after_remove() -> bool {
    true
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content).map_err(|e| {
                anyhow::anyhow!("Invalid config file {}: {}", config_path.display(), e)
            })?;
            tracing::debug!(path = %config_path.display(), ?config, "loaded config");
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            update: false,
            tidy_after_remove: default_tidy_after_remove(),
        }
    }
}
