use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI configuration, read from `<home>/config.yaml` with environment and
/// flag overrides on top. `<home>` is `$LEADMATE_HOME` or `~/.leadmate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
        }
    }
}

impl Config {
    pub fn home_dir() -> anyhow::Result<PathBuf> {
        if let Ok(dir) = std::env::var("LEADMATE_HOME") {
            return Ok(PathBuf::from(dir));
        }
        home::home_dir()
            .map(|h| h.join(".leadmate"))
            .context("home directory not found: set LEADMATE_HOME")
    }

    /// Read the config file if present; a missing file means defaults.
    pub fn load(api_url_override: Option<&str>) -> anyhow::Result<Self> {
        let path = Self::home_dir()?.join("config.yaml");
        let mut config = if path.exists() {
            let data = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_yaml::from_str(&data)
                .with_context(|| format!("invalid config at {}", path.display()))?
        } else {
            Self::default()
        };
        if let Some(url) = api_url_override {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml() {
        let config: Config = serde_yaml::from_str("api_url: https://lm.example.com\n").unwrap();
        assert_eq!(config.api_url, "https://lm.example.com");
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.api_url, "http://localhost:8000");
    }
}
