//! Configuration management for the RAX filesystem server
//!
//! All values are startup configuration: the allowed directory set is fixed
//! for the lifetime of the process.

use config::{Config, Environment, File};
use log::{info, warn};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage::validation::{AllowedRoots, expand_home};

const DEFAULT_SWEEP_SECS: u64 = 60;

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    // ═══ NETWORK (Environment Override Supported) ═══
    /// IP address the HTTP listener binds to
    pub bind_address: String,

    /// Port for the HTTP listener
    pub port: u16,

    // ═══ ACCESS (Environment Override Supported) ═══
    /// Directory trees every operation is confined to
    pub allowed_directories: Vec<String>,

    // ═══ MAINTENANCE ═══
    /// Interval between sweeps of expired delete confirmations
    #[serde(default = "default_sweep_secs")]
    pub confirmation_sweep_secs: u64,
}

fn default_sweep_secs() -> u64 {
    DEFAULT_SWEEP_SECS
}

/// `RAX_FS_*` overrides; `RAX_FS_ALLOWED_DIRECTORIES` is a comma-separated list
fn environment() -> Environment {
    Environment::with_prefix("RAX_FS")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("allowed_directories")
}

impl ServerConfig {
    /// Build a configuration directly, bypassing file loading
    pub fn new(bind_address: impl Into<String>, port: u16, allowed_directories: Vec<String>) -> Self {
        Self {
            bind_address: bind_address.into(),
            port,
            allowed_directories,
            confirmation_sweep_secs: DEFAULT_SWEEP_SECS,
        }
    }

    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        // Try deployment path first, then development path
        let config_paths = ["rax-fs-server/config", "config"];

        let mut last_error = None;

        for config_path in &config_paths {
            match Config::builder()
                .add_source(File::with_name(config_path))
                .add_source(environment())
                .build()
            {
                Ok(settings) => {
                    let config: ServerConfig = settings.try_deserialize()?;
                    config.validate()?;
                    info!("Loaded configuration from {config_path}.toml");
                    return Ok(config);
                }
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            config::ConfigError::Message(format!(
                "No configuration found. Tried: {config_paths:?}"
            ))
        }))
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.allowed_directories.is_empty() {
            return Err(config::ConfigError::Message(
                "allowed_directories must name at least one directory".into(),
            ));
        }

        if self.allowed_directories.iter().any(|d| d.trim().is_empty()) {
            return Err(config::ConfigError::Message(
                "allowed_directories cannot contain empty entries".into(),
            ));
        }

        if self.confirmation_sweep_secs == 0 {
            return Err(config::ConfigError::Message(
                "confirmation_sweep_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as a socket address string
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get the sweep interval as a Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.confirmation_sweep_secs)
    }

    /// Resolve the configured directories into canonical allowed roots.
    ///
    /// Missing directories are skipped with a warning; having none left is an error.
    pub fn allowed_roots(&self) -> Result<AllowedRoots, config::ConfigError> {
        let mut roots: Vec<PathBuf> = Vec::new();

        for raw in &self.allowed_directories {
            let expanded = expand_home(raw.trim());
            match expanded.canonicalize() {
                Ok(canonical) if canonical.is_dir() => {
                    if !roots.contains(&canonical) {
                        info!("Allowed directory: {}", canonical.display());
                        roots.push(canonical);
                    }
                }
                Ok(canonical) => {
                    warn!("Skipping allowed directory {}: not a directory", canonical.display());
                }
                Err(e) => {
                    warn!("Skipping allowed directory {raw}: {e}");
                }
            }
        }

        if roots.is_empty() {
            return Err(config::ConfigError::Message(
                "none of the allowed_directories exist".into(),
            ));
        }

        Ok(AllowedRoots::new(roots))
    }
}
