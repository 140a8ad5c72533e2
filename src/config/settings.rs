use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::dns::Credentials;

pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub cloudflare: CloudflareConfig,
    #[serde(default)]
    pub targets: TargetsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Unset means the HTTP client waits on the provider indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_seconds: Option<u64>,
}

fn default_interval() -> u64 {
    300 // 5 minutes
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_base() -> String {
    CLOUDFLARE_API_BASE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudflareConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ips_file: Option<PathBuf>,
}

/// Values supplied on the command line or through the environment.
/// Anything set here wins over the settings file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub email: Option<String>,
    pub api_key: Option<String>,
    pub zone_id: Option<String>,
    pub domains_file: Option<PathBuf>,
    pub ips_file: Option<PathBuf>,
    pub interval_seconds: Option<u64>,
    pub log_level: Option<String>,
}

impl Settings {
    /// Load settings from `path`, or from the default location when it exists.
    /// With neither, every field takes its default.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::config_path();
                if !default_path.exists() {
                    return Ok(Settings::default());
                }
                default_path
            }
        };

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        Ok(settings)
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn config_dir() -> PathBuf {
        #[cfg(unix)]
        {
            PathBuf::from("/etc/dnsrotate")
        }
        #[cfg(windows)]
        {
            PathBuf::from(r"C:\ProgramData\dnsrotate")
        }
    }

    pub fn apply(&mut self, overrides: Overrides) {
        let cf = &mut self.cloudflare;
        cf.email = overrides.email.or(cf.email.take());
        cf.api_key = overrides.api_key.or(cf.api_key.take());
        cf.zone_id = overrides.zone_id.or(cf.zone_id.take());

        let targets = &mut self.targets;
        targets.domains_file = overrides.domains_file.or(targets.domains_file.take());
        targets.ips_file = overrides.ips_file.or(targets.ips_file.take());

        if let Some(interval) = overrides.interval_seconds {
            self.daemon.interval_seconds = interval;
        }
        if let Some(level) = overrides.log_level {
            self.daemon.log_level = level;
        }
    }

    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let cf = &self.cloudflare;
        Ok(Credentials {
            email: required(&cf.email, "cloudflare.email")?,
            api_key: required(&cf.api_key, "cloudflare.api_key")?,
            zone_id: required(&cf.zone_id, "cloudflare.zone_id")?,
        })
    }

    pub fn interval(&self) -> Result<Duration, ConfigError> {
        match self.daemon.interval_seconds {
            0 => Err(ConfigError::InvalidInterval),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.daemon.request_timeout_seconds.map(Duration::from_secs)
    }

    pub fn domains_file(&self) -> Result<&Path, ConfigError> {
        self.targets
            .domains_file
            .as_deref()
            .ok_or(ConfigError::MissingSetting("targets.domains_file"))
    }

    pub fn ips_file(&self) -> Result<&Path, ConfigError> {
        self.targets
            .ips_file
            .as_deref()
            .ok_or(ConfigError::MissingSetting("targets.ips_file"))
    }

    /// Copy suitable for display, with the API key masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.cloudflare.api_key.is_some() {
            copy.cloudflare.api_key = Some("<REDACTED>".to_string());
        }
        copy
    }
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::MissingSetting(name)),
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
            log_level: default_log_level(),
            request_timeout_seconds: None,
        }
    }
}

impl Default for CloudflareConfig {
    fn default() -> Self {
        Self {
            email: None,
            api_key: None,
            zone_id: None,
            api_base: default_api_base(),
        }
    }
}
