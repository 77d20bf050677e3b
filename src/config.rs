use eyre::{Context, ContextCompat, Result};
use ifdef_pp::{Definitions, Value};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Effective configuration for a preprocessing run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Names visible to `//@ifdef` and `//@ifndef`
    #[serde(default)]
    pub defines: Definitions,
}

impl Config {
    /// Load configuration from a file path
    ///
    /// An explicit path must exist. Without one, the usual locations are
    /// searched and a missing file yields the default configuration.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let config_file = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(eyre::eyre!("Config file not found: {}", path.display()));
                }
                path.clone()
            }
            None => Self::default_config_path()?,
        };

        if config_file.exists() {
            Self::load_file(&config_file)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse a configuration file, as JSON for `.json` and YAML otherwise
    fn load_file(config_file: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_file)
            .with_context(|| format!("Failed to read config file: {}", config_file.display()))?;

        let is_json = config_file
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", config_file.display()))?
        } else if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", config_file.display()))?
        };

        Ok(config)
    }

    /// Get the default configuration file path
    fn default_config_path() -> Result<PathBuf> {
        // Look for config files in order of preference
        let candidates = vec![
            PathBuf::from(".ifdef.yaml"),
            PathBuf::from(".ifdef.yml"),
            PathBuf::from("ifdef.yaml"),
            PathBuf::from("ifdef.yml"),
            PathBuf::from("ifdef.json"),
        ];

        for candidate in candidates {
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        // If no config file found, return default location
        let config_dir = dirs::config_local_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .context("Could not determine config directory")?;

        Ok(config_dir.join("ifdef-pp").join("config.yaml"))
    }

    /// Apply `-D` definitions, then `-U` removals
    pub fn apply_overrides(&mut self, defines: &[(String, Option<String>)], undefines: &[String]) {
        for (name, value) in defines {
            let value = match value {
                Some(raw) => parse_define_value(raw),
                None => Value::Bool(true),
            };
            self.defines.define(name.clone(), value);
        }

        for name in undefines {
            self.defines.undefine(name);
        }
    }
}

/// Parse a command-line value: boolean, then integer, then float, else string
pub fn parse_define_value(value: &str) -> Value {
    if let Ok(bool_val) = value.parse::<bool>() {
        return Value::Bool(bool_val);
    }

    if let Ok(int_val) = value.parse::<i64>() {
        return Value::Int(int_val);
    }

    if let Ok(float_val) = value.parse::<f64>() {
        return Value::Float(float_val);
    }

    Value::String(value.to_string())
}
