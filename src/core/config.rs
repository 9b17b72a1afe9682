use crate::core::kernel::signer::Credentials;
use crate::core::types::Region;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;
use tracing::warn;

/// Canonical REST root for the global venue
pub const GLOBAL_BASE_URL: &str = "https://ftx.com/api/";
/// REST root for the US venue
pub const US_BASE_URL: &str = "https://ftx.us/api/";

#[derive(Debug, Clone)]
pub struct FtxConfig {
    pub api_key: Secret<String>,
    pub secret_key: Secret<String>,
    pub subaccount: Option<String>,
    pub region: Region,
    pub base_url: Option<String>,
}

// Custom Serialize implementation - never expose secrets in serialization
impl Serialize for FtxConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("FtxConfig", 5)?;
        state.serialize_field("api_key", "[REDACTED]")?;
        state.serialize_field("secret_key", "[REDACTED]")?;
        state.serialize_field("subaccount", &self.subaccount)?;
        state.serialize_field("region", &self.region)?;
        state.serialize_field("base_url", &self.base_url)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for FtxConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct FtxConfigHelper {
            api_key: String,
            secret_key: String,
            #[serde(default)]
            subaccount: Option<String>,
            #[serde(default)]
            region: Region,
            #[serde(default)]
            base_url: Option<String>,
        }

        let helper = FtxConfigHelper::deserialize(deserializer)?;
        Ok(Self {
            api_key: Secret::new(helper.api_key),
            secret_key: Secret::new(helper.secret_key),
            subaccount: helper.subaccount,
            region: helper.region,
            base_url: helper.base_url,
        })
    }
}

impl FtxConfig {
    /// Create a new configuration with API credentials
    #[must_use]
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key: Secret::new(api_key),
            secret_key: Secret::new(secret_key),
            subaccount: None,
            region: Region::Global,
            base_url: None,
        }
    }

    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `{PREFIX}_API_KEY` (e.g., `FTX_API_KEY`)
    /// - `{PREFIX}_SECRET_KEY`
    /// - `{PREFIX}_SUBACCOUNT` (optional)
    /// - `{PREFIX}_US` (optional, defaults to false)
    /// - `{PREFIX}_BASE_URL` (optional)
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let prefix = prefix.to_uppercase();
        let api_key_var = format!("{}_API_KEY", prefix);
        let secret_key_var = format!("{}_SECRET_KEY", prefix);

        let api_key = env::var(&api_key_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(api_key_var))?;
        let secret_key = env::var(&secret_key_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(secret_key_var))?;

        let us_var = format!("{}_US", prefix);
        let region = match env::var(&us_var) {
            Ok(value) => {
                if value.parse::<bool>().map_err(|_| {
                    ConfigError::InvalidConfiguration(format!(
                        "{} must be true or false, got '{}'",
                        us_var, value
                    ))
                })? {
                    Region::Us
                } else {
                    Region::Global
                }
            }
            Err(_) => Region::Global,
        };

        Ok(Self {
            api_key: Secret::new(api_key),
            secret_key: Secret::new(secret_key),
            subaccount: env::var(format!("{}_SUBACCOUNT", prefix))
                .ok()
                .filter(|s| !s.is_empty()),
            region,
            base_url: env::var(format!("{}_BASE_URL", prefix)).ok(),
        })
    }

    /// Create configuration from .env file and environment variables
    ///
    /// **Security Warning**: Never commit .env files to version control!
    #[cfg(feature = "env-file")]
    pub fn from_env_file(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(prefix, ".env")
    }

    /// Create configuration from a specific .env file path
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(prefix: &str, env_file_path: &str) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(()) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // No .env file, fall back to the process environment
            }
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Self::from_env(prefix)
    }

    /// Configuration for public market data only
    #[must_use]
    pub fn read_only() -> Self {
        Self::new(String::new(), String::new())
    }

    /// Check if this configuration has valid credentials for authenticated operations
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.api_key.expose_secret().is_empty() && !self.secret_key.expose_secret().is_empty()
    }

    #[must_use]
    pub fn subaccount(mut self, subaccount: String) -> Self {
        self.subaccount = Some(subaccount);
        self
    }

    #[must_use]
    pub const fn region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Set custom base URL
    #[must_use]
    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Get API key (use carefully - exposes secret)
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Get secret key (use carefully - exposes secret)
    pub fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }

    /// Signing context for this configuration
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.api_key().to_string(), self.secret_key().to_string())
            .with_subaccount(self.subaccount.clone())
            .with_region(self.region)
    }

    /// REST root to send requests to, see [`select_base_url`]
    pub fn resolve_base_url(&self) -> String {
        select_base_url(self.base_url.as_deref(), self.region)
    }
}

/// Pick the REST root for a region.
///
/// No base URL, or the canonical global one, maps to the regional host. A
/// custom base URL is kept as given, with a warning when it is combined with
/// the US region since the regional host cannot be derived from it. The
/// result always ends with `/`.
pub fn select_base_url(base_url: Option<&str>, region: Region) -> String {
    let regional = match region {
        Region::Global => GLOBAL_BASE_URL,
        Region::Us => US_BASE_URL,
    };

    let selected = match base_url {
        None => regional.to_string(),
        Some(url) if url.trim_end_matches('/') == GLOBAL_BASE_URL.trim_end_matches('/') => {
            regional.to_string()
        }
        Some(url) => {
            if region == Region::Us {
                warn!(
                    base_url = url,
                    "Custom base URL with US region; regional host not applied"
                );
            }
            url.to_string()
        }
    };

    if selected.ends_with('/') {
        selected
    } else {
        format!("{}/", selected)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
