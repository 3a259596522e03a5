//! Runtime configuration.
//!
//! Loaded from JSON. Lookup order: explicit path, `BUNDLESCOPE_CONFIG`,
//! then `<config dir>/bundlescope/config.json`. A missing file yields the
//! defaults; a malformed one is an error.

use crate::error::{BundlescopeError, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_ENV_VAR: &str = "BUNDLESCOPE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundlescopeConfig {
    pub cache: CacheConfig,
    pub render: RenderConfig,
    pub logging: LoggingConfig,
    /// Bundle files or directories loaded at start-up
    pub bundles: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Resolved asset sets, one per request fingerprint
    pub request_capacity: usize,
    /// Rendered tags, one per asset and location
    pub content_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            request_capacity: 512,
            content_capacity: 2048,
        }
    }
}

impl CacheConfig {
    pub fn request_capacity(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.request_capacity).ok_or_else(|| {
            BundlescopeError::Config("cache.request_capacity must be greater than zero".into())
        })
    }

    pub fn content_capacity(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.content_capacity).ok_or_else(|| {
            BundlescopeError::Config("cache.content_capacity must be greater than zero".into())
        })
    }
}

/// Which location wins when an asset declares both
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationPolicy {
    #[default]
    RemoteFirst,
    LocalFirst,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub location_policy: LocationPolicy,
    /// Prefix between the request context path and a local location
    pub local_prefix: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            location_policy: LocationPolicy::RemoteFirst,
            local_prefix: "/static".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the rolling log files, `~/.bundlescope/logs` when unset
    pub dir: Option<PathBuf>,
    /// Filter directives used when `RUST_LOG` is not set
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            filter: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn log_dir(&self) -> PathBuf {
        match &self.dir {
            Some(dir) => dir.clone(),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".bundlescope")
                .join("logs"),
        }
    }
}

impl BundlescopeConfig {
    /// `<config dir>/bundlescope/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bundlescope").join("config.json"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&content)?;
        config.validate()?;

        // relative paths are relative to the config file
        if let Some(base) = path.parent() {
            let paths = config.bundles.iter_mut().chain(config.logging.dir.as_mut());
            for relative in paths.filter(|p| p.is_relative()) {
                *relative = base.join(&*relative);
            }
        }

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .or_else(Self::default_path);

        match candidate {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.cache.request_capacity()?;
        self.cache.content_capacity()?;
        Ok(())
    }
}
