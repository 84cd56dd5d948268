//! Configuration system for Beacon.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $BEACON_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/beacon/config.toml
//!   3. ~/.config/beacon/config.toml

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Legacy toggle name for trusting the forwarded-for header.
pub const LEGACY_FORWARDED_ENV: &str = "USE_FORWARDED_FOR";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    pub server: ServerConfig,
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP API binds to.
    pub listen: SocketAddr,
    /// Attribute requests to the X-Forwarded-For client instead of the
    /// TCP peer. Only enable behind a reverse proxy that sets the header.
    pub trust_forwarded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Seconds an announcement stays listed without being refreshed.
    pub lifetime_secs: u64,
    /// Seconds between eviction sweeps. Must be shorter than the lifetime.
    pub sweep_interval_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 80)),
            trust_forwarded: false,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            lifetime_secs: 3600,
            sweep_interval_secs: 180,
        }
    }
}

impl RegistryConfig {
    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.lifetime_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
        .join("beacon")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl BeaconConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_file(&Self::file_path())?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parse the file at `path`, or return defaults if it does not exist.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("BEACON_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Reject settings the sweeper cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let registry = &self.registry;
        if registry.lifetime_secs == 0 {
            return Err(ConfigError::Invalid("registry.lifetime_secs must be > 0".into()));
        }
        if registry.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "registry.sweep_interval_secs must be > 0".into(),
            ));
        }
        if registry.sweep_interval_secs >= registry.lifetime_secs {
            return Err(ConfigError::Invalid(format!(
                "registry.sweep_interval_secs ({}) must be shorter than registry.lifetime_secs ({})",
                registry.sweep_interval_secs, registry.lifetime_secs
            )));
        }
        Ok(())
    }

    /// Apply BEACON_* overrides read through `lookup`.
    ///
    /// Values that fail to parse leave the current setting untouched.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("BEACON_SERVER__LISTEN") {
            if let Ok(addr) = v.parse() {
                self.server.listen = addr;
            }
        }
        if let Some(v) = lookup(LEGACY_FORWARDED_ENV) {
            self.server.trust_forwarded = parse_flag(&v);
        }
        if let Some(v) = lookup("BEACON_SERVER__TRUST_FORWARDED") {
            self.server.trust_forwarded = parse_flag(&v);
        }
        if let Some(v) = lookup("BEACON_REGISTRY__LIFETIME_SECS") {
            if let Ok(secs) = v.parse() {
                self.registry.lifetime_secs = secs;
            }
        }
        if let Some(v) = lookup("BEACON_REGISTRY__SWEEP_INTERVAL_SECS") {
            if let Ok(secs) = v.parse() {
                self.registry.sweep_interval_secs = secs;
            }
        }
    }
}

fn parse_flag(v: &str) -> bool {
    let v = v.trim();
    v.eq_ignore_ascii_case("true") || v == "1"
}
