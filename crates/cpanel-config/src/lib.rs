//! Configuration management for the control panel.
//!
//! Parses `cpanel.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `host.host`
//! - `panel.bind_host`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override development host address.
    pub host: Option<String>,
    /// Override development host port.
    pub port: Option<u16>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "cpanel.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Development host configuration.
    pub host: HostConfig,
    /// Control panel configuration.
    pub panel: PanelConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Development host configuration.
///
/// Only used by the standalone host shipped with the CLI; an embedding
/// host server brings its own address.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Host address.
    pub host: String,
    /// Host port.
    pub port: u16,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
        }
    }
}

impl HostConfig {
    /// Local URL browsers use to reach the host (the `urls.local` option).
    #[must_use]
    pub fn local_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Control panel configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Address the control panel server binds to.
    pub bind_host: String,
    /// First port considered by port discovery.
    pub port_start: u16,
    /// Last port considered by port discovery (inclusive).
    pub port_end: u16,
    /// Timeout for URL reachability checks, in seconds.
    pub verify_timeout_secs: u64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".to_owned(),
            port_start: 3001,
            port_end: 3100,
            verify_timeout_secs: 5,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`host.host`").
        field: String,
        /// Error message (e.g., "${`CPANEL_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `cpanel.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.host.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.host.port = port;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_host()?;
        self.validate_panel()?;
        Ok(())
    }

    fn validate_host(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.host.host, "host.host")?;
        if self.host.port == 0 {
            return Err(ConfigError::Validation("host.port cannot be 0".to_owned()));
        }
        Ok(())
    }

    fn validate_panel(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.panel.bind_host, "panel.bind_host")?;

        if self.panel.port_start == 0 {
            return Err(ConfigError::Validation(
                "panel.port_start cannot be 0".to_owned(),
            ));
        }
        if self.panel.port_start > self.panel.port_end {
            return Err(ConfigError::Validation(format!(
                "panel.port_start ({}) cannot exceed panel.port_end ({})",
                self.panel.port_start, self.panel.port_end
            )));
        }
        if self.panel.verify_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "panel.verify_timeout_secs must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.host.host = expand::expand_env(&self.host.host, "host.host")?;
        self.panel.bind_host = expand::expand_env(&self.panel.bind_host, "panel.bind_host")?;
        Ok(())
    }
}
