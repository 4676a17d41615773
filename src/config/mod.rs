//! Configuration: server address and login credentials

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::api::Endpoints;
use crate::auth::{Credentials, SessionOptions};
use crate::error::{Error, Result};

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_revocations() -> u32 {
    crate::auth::session::DEFAULT_MAX_REVOCATIONS
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base server URL, e.g. `https://api.example.com`
    pub base_server: String,
    /// Login account
    pub account: String,
    /// Account secret (the file is written with owner-only permissions)
    pub secret: String,
    /// Login department
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dept_id: Option<String>,
    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Consecutive session revocations answered with a fresh login
    #[serde(default = "default_max_revocations")]
    pub max_revocations: u32,
}

impl Config {
    pub fn new(
        base_server: impl Into<String>,
        account: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            base_server: base_server.into(),
            account: account.into(),
            secret: secret.into(),
            dept_id: None,
            timeout_secs: default_timeout_secs(),
            max_revocations: default_max_revocations(),
        }
    }

    /// Get config file path in the platform config directory
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "insight", "insight-session")
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from `path`, or from the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        let content = fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::parse(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.endpoints()?;
        if self.account.trim().is_empty() {
            return Err(Error::Config("account must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// Save configuration to `path`, or to the default location
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        self.validate()?;
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        // Set restrictive permissions on config file (contains the secret)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, perms)
                .map_err(|e| Error::Config(format!("Failed to set config permissions: {}", e)))?;
        }

        Ok(path)
    }

    pub fn endpoints(&self) -> Result<Endpoints> {
        Endpoints::new(&self.base_server)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            account: self.account.clone(),
            secret: self.secret.clone(),
            dept_id: self.dept_id.clone().filter(|d| !d.is_empty()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            max_revocations: self.max_revocations,
        }
    }
}
