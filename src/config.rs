//! Configuration for the registry connection, credentials and side-effect files

use crate::error::handlers::ValidationErrorHandler;
use crate::error::{HarborError, Result};
use crate::image::reference::DEFAULT_DOMAIN_LOG;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

fn default_insecure() -> bool {
    true
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_domain_log() -> Option<PathBuf> {
    Some(PathBuf::from(DEFAULT_DOMAIN_LOG))
}

/// Registry connection settings
///
/// `address` is the bare `host[:port]` used both for API calls and as the
/// prefix of image names handed to the container engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub address: String,
    /// Use https for API calls
    #[serde(default)]
    pub tls: bool,
    /// Accept invalid certificates and hostnames (self-signed internal registries)
    #[serde(default = "default_insecure")]
    pub insecure: bool,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl RegistryConfig {
    pub fn new(address: String) -> Self {
        Self {
            address,
            tls: false,
            insecure: default_insecure(),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn scheme(&self) -> &'static str {
        if self.tls { "https" } else { "http" }
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// `<scheme>://<address>/`
    pub fn site_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!("{}://{}/", self.scheme(), self.address))?)
    }

    /// `<scheme>://<address>/api/`
    pub fn api_url(&self) -> Result<Url> {
        Ok(self.site_url()?.join("api/")?)
    }

    /// `<scheme>://<address>/c/login`
    pub fn login_url(&self) -> Result<Url> {
        Ok(self.site_url()?.join("c/login")?)
    }

    pub fn validate(&self) -> Result<()> {
        ValidationErrorHandler::validate_registry_address(&self.address)?;
        ValidationErrorHandler::validate_timeout(self.timeout)?;
        Ok(())
    }
}

/// Registry credentials, used for the API login and forwarded to the engine
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl AuthConfig {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }

    pub fn validate(&self) -> Result<()> {
        ValidationErrorHandler::validate_credentials(&self.username, &self.password)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub registry: RegistryConfig,
    pub auth: AuthConfig,
    /// Where stripped registry domains are appended; `None` disables the log
    #[serde(default = "default_domain_log")]
    pub domain_log: Option<PathBuf>,
    #[serde(default)]
    pub verbose: bool,
}

impl AppConfig {
    pub fn new(registry: RegistryConfig, auth: AuthConfig) -> Self {
        Self {
            registry,
            auth,
            domain_log: default_domain_log(),
            verbose: false,
        }
    }

    /// Load a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            HarborError::Io(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            HarborError::Parse(format!("Invalid config {}: {}", path.display(), e))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.registry.validate()?;
        self.auth.validate()?;
        Ok(())
    }
}
