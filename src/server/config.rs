//! Configuration loading for plenariod.
//!
//! Configuration is loaded from TOML with the following resolution order:
//! 1. `--config <path>` (CLI flag; must exist)
//! 2. `./plenario.toml` (working directory)
//! 3. `~/.plenario/config.toml` (user)
//! 4. `/etc/plenario/config.toml` (system)
//! 5. built-in defaults
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.plenario/secrets.toml` (user, must be 0600)
//! 2. `/etc/plenario/secrets.toml` (system, must be 0600)
//!
//! Each secret falls back to an environment variable when absent.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::realtime::{DEFAULT_CAMARA_BASE_URL, DEFAULT_SENADO_BASE_URL, RealTimeConfig};
use crate::store::file::DEFAULT_STORE_PATH;
use crate::store::remote::DEFAULT_COLLECTION;
use crate::{PlenarioError, Result};

/// Daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub survey: SurveyConfig,
    #[serde(default)]
    pub realtime: RealTimeSection,
    #[serde(default)]
    pub llm: LlmConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:3000).
    #[serde(default = "default_address")]
    pub address: String,
    /// Frontend build directory served for unmatched paths.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            static_dir: None,
        }
    }
}

fn default_address() -> String {
    "0.0.0.0:3000".to_string()
}

/// `[cache]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Reply lifetime in seconds (default: 300).
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_ttl() -> u64 {
    300
}

impl CacheSection {
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig::new().ttl(Duration::from_secs(self.ttl_secs))
    }
}

/// Which survey backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyBackend {
    #[default]
    File,
    Firestore,
}

/// `[survey]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyConfig {
    #[serde(default)]
    pub backend: SurveyBackend,
    /// File backend location (default: data/nps-responses.json).
    #[serde(default = "default_survey_path")]
    pub path: PathBuf,
    /// Firestore collection (default: nps_responses).
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Firestore project; required for the firestore backend.
    #[serde(default)]
    pub project_id: Option<String>,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            backend: SurveyBackend::default(),
            path: default_survey_path(),
            collection: default_collection(),
            project_id: None,
        }
    }
}

fn default_survey_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

/// `[realtime]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RealTimeSection {
    /// Per-source timeout in seconds (default: 5).
    #[serde(default = "default_realtime_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_camara_url")]
    pub camara_base_url: String,
    #[serde(default = "default_senado_url")]
    pub senado_base_url: String,
}

impl Default for RealTimeSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_realtime_timeout(),
            camara_base_url: default_camara_url(),
            senado_base_url: default_senado_url(),
        }
    }
}

fn default_realtime_timeout() -> u64 {
    5
}

fn default_camara_url() -> String {
    DEFAULT_CAMARA_BASE_URL.to_string()
}

fn default_senado_url() -> String {
    DEFAULT_SENADO_BASE_URL.to_string()
}

impl RealTimeSection {
    pub fn to_realtime_config(&self) -> RealTimeConfig {
        RealTimeConfig::new()
            .camara_base_url(&self.camara_base_url)
            .senado_base_url(&self.senado_base_url)
            .timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// `[llm]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmConfig {
    /// Gemini model id (default: gemini-2.0-flash).
    #[serde(default)]
    pub model: Option<String>,
    /// API base URL override.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Request timeout in seconds (default: 60).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Secrets (API keys and tokens).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub gemini: Option<ApiKeySecret>,
    #[serde(default)]
    pub firestore: Option<TokenSecret>,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

/// A bearer token secret.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSecret {
    pub access_token: String,
}

const GEMINI_ENV_VAR: &str = "GEMINI_API_KEY";
const FIRESTORE_ENV_VAR: &str = "FIRESTORE_ACCESS_TOKEN";
const PORT_ENV_VAR: &str = "PORT";

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Falls back to defaults when no file exists; an explicit path that
    /// does not exist is an error. `PORT` overrides the bind port.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path)?,
            None => Config::default(),
        };
        if let Ok(port) = std::env::var(PORT_ENV_VAR) {
            config.server.apply_port(&port)?;
        }
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PlenarioError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            PlenarioError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path. `None` means "use defaults".
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(PlenarioError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        let local = PathBuf::from("plenario.toml");
        if local.exists() {
            return Ok(Some(local));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".plenario").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/plenario/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}

impl ServerConfig {
    /// Replace the port of `address`, keeping the host.
    fn apply_port(&mut self, port: &str) -> Result<()> {
        let port: u16 = port.trim().parse().map_err(|_| {
            PlenarioError::Configuration(format!("Invalid {PORT_ENV_VAR} value: {port:?}"))
        })?;
        let host = self
            .address
            .rsplit_once(':')
            .map_or(self.address.as_str(), |(host, _)| host);
        self.address = format!("{host}:{port}");
        Ok(())
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Returns empty secrets if no file exists (env vars may still apply).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".plenario").join("secrets.toml");
            if user_secrets.exists() {
                Self::check_permissions(&user_secrets)?;
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/plenario/secrets.toml");
        if system_secrets.exists() {
            Self::check_permissions(&system_secrets)?;
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PlenarioError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            PlenarioError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            PlenarioError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(PlenarioError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// Gemini API key, falling back to `GEMINI_API_KEY`.
    pub fn gemini_api_key(&self) -> Option<String> {
        self.gemini
            .as_ref()
            .map(|s| s.api_key.clone())
            .or_else(|| non_empty_env(GEMINI_ENV_VAR))
    }

    /// Firestore bearer token, falling back to `FIRESTORE_ACCESS_TOKEN`.
    pub fn firestore_access_token(&self) -> Option<String> {
        self.firestore
            .as_ref()
            .map(|s| s.access_token.clone())
            .or_else(|| non_empty_env(FIRESTORE_ENV_VAR))
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
