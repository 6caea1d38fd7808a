//! Configuration file support for logmodel.
//!
//! logmodel reads two configuration file locations:
//! - Global: `~/.logmodel/config.toml` - User-wide defaults
//! - Project: `.logmodel/config.toml` - Overrides for one directory
//!
//! Project config takes precedence over global config, and command line
//! flags take precedence over both.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// logmodel configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How models are printed
    pub output: OutputConfig,

    /// How logs are replayed
    pub replay: ReplayConfig,
}

/// How `show` prints a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tree,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tree" => Ok(OutputFormat::Tree),
            "json" => Ok(OutputFormat::Json),
            other => bail!("unknown output format `{}` (expected `tree` or `json`)", other),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Tree => write!(f, "tree"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Output-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format for `show`
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output
    pub pretty: Option<bool>,
}

/// Replay-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Exit non-zero when the model has errors (default: true)
    pub strict: Option<bool>,

    /// Include messages when printing the tree
    pub show_messages: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.output.format.is_some() {
            self.output.format = other.output.format;
        }
        if other.output.pretty.is_some() {
            self.output.pretty = other.output.pretty;
        }
        if other.replay.strict.is_some() {
            self.replay.strict = other.replay.strict;
        }
        if other.replay.show_messages.is_some() {
            self.replay.show_messages = other.replay.show_messages;
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.output.format.unwrap_or_default()
    }

    pub fn pretty(&self) -> bool {
        self.output.pretty.unwrap_or(false)
    }

    pub fn strict(&self) -> bool {
        self.replay.strict.unwrap_or(true)
    }

    pub fn show_messages(&self) -> bool {
        self.replay.show_messages.unwrap_or(false)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.logmodel/config.toml)
/// 2. Global config (~/.logmodel/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    // Project config overrides global
    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global logmodel config directory (~/.logmodel).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".logmodel"))
}

/// Get the global config path (~/.logmodel/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.logmodel/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".logmodel").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.format(), OutputFormat::Tree);
        assert!(!config.pretty());
        assert!(config.strict());
        assert!(!config.show_messages());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[output]
format = "json"
pretty = true

[replay]
strict = false
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.format(), OutputFormat::Json);
        assert!(config.pretty());
        assert!(!config.strict());
        assert_eq!(config.replay.show_messages, None);
    }

    #[test]
    fn test_config_rejects_unknown_format() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[output]\nformat = \"xml\"\n").unwrap();

        assert!(Config::load(&config_path).is_err());
        assert_eq!(Config::load_or_default(&config_path).format(), OutputFormat::Tree);
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.output.format = Some(OutputFormat::Json);
        base.replay.strict = Some(false);

        let mut override_cfg = Config::default();
        override_cfg.replay.strict = Some(true);

        base.merge(override_cfg);

        assert_eq!(base.format(), OutputFormat::Json); // Not overridden
        assert!(base.strict());
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = project_config_path(tmp.path());
        std::fs::create_dir_all(project_path.parent().unwrap()).unwrap();

        std::fs::write(
            &global_path,
            "[output]\nformat = \"json\"\npretty = true\n",
        )
        .unwrap();
        std::fs::write(&project_path, "[output]\npretty = false\n").unwrap();

        let config = load_config(Some(&global_path), &project_path);

        assert_eq!(config.format(), OutputFormat::Json);
        assert!(!config.pretty());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
