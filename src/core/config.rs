use secrecy::{ExposeSecret, Secret};
use serde::{Serialize, Serializer};
use std::env;

/// Root URL of the Last.fm web service. Every request goes to this single
/// endpoint; the `method` parameter selects the operation.
pub const DEFAULT_BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";

/// API credentials and transport settings for a [`crate::Client`].
///
/// The API key and shared secret are obtained from the Last.fm developer
/// account page. The shared secret is only ever fed into the request signer
/// and is never sent over the wire.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: Secret<String>,
    pub api_secret: Secret<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

// Custom Serialize implementation - never expose secrets in serialization
impl Serialize for ClientConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ClientConfig", 5)?;
        state.serialize_field("api_key", "[REDACTED]")?;
        state.serialize_field("api_secret", "[REDACTED]")?;
        state.serialize_field("base_url", &self.base_url)?;
        state.serialize_field("timeout_seconds", &self.timeout_seconds)?;
        state.serialize_field("user_agent", &self.user_agent)?;
        state.end()
    }
}

impl ClientConfig {
    /// Create a new configuration with API credentials
    #[must_use]
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key: Secret::new(api_key),
            api_secret: Secret::new(api_secret),
            base_url: None,
            timeout_seconds: 30,
            user_agent: "lastkit/0.1".to_string(),
        }
    }

    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `LASTFM_API_KEY`
    /// - `LASTFM_API_SECRET`
    /// - `LASTFM_BASE_URL` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("LASTFM_API_KEY")
            .map_err(|_| ConfigError::MissingEnvironmentVariable("LASTFM_API_KEY".to_string()))?;

        let api_secret = env::var("LASTFM_API_SECRET").map_err(|_| {
            ConfigError::MissingEnvironmentVariable("LASTFM_API_SECRET".to_string())
        })?;

        let base_url = env::var("LASTFM_BASE_URL").ok();

        let mut config = Self::new(api_key, api_secret);
        config.base_url = base_url;
        Ok(config)
    }

    /// Create configuration from a .env file and environment variables
    ///
    /// Loads environment variables from the given file if it exists, then
    /// reads the configuration using the standard variable names.
    ///
    /// **Security Warning**: Never commit .env files to version control!
    #[cfg(feature = "env-file")]
    pub fn from_env_file(env_file_path: &str) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(_) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // .env file doesn't exist, continue with system env vars
            }
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Self::from_env()
    }

    /// Check if this configuration carries usable credentials
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.api_key.expose_secret().is_empty() && !self.api_secret.expose_secret().is_empty()
    }

    /// Set a custom base URL (useful for pointing at a test server)
    #[must_use]
    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Set the default request timeout
    #[must_use]
    pub const fn timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set the user agent string
    #[must_use]
    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Resolved base URL for the transport
    #[must_use]
    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Get API key (use carefully - exposes secret)
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Get shared secret (use carefully - exposes secret)
    pub fn api_secret(&self) -> &str {
        self.api_secret.expose_secret()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_secrets_when_serialized() {
        let config = ClientConfig::new("key".to_string(), "secret".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("[REDACTED]"));
        assert!(!json.contains("secret"));
    }

    #[test]
    fn default_base_url_applies_when_unset() {
        let config = ClientConfig::new("key".to_string(), "secret".to_string());
        assert_eq!(config.effective_base_url(), DEFAULT_BASE_URL);

        let config = config.base_url("http://localhost:8080/2.0/".to_string());
        assert_eq!(config.effective_base_url(), "http://localhost:8080/2.0/");
    }

    #[test]
    fn empty_credentials_are_detected() {
        let config = ClientConfig::new(String::new(), String::new());
        assert!(!config.has_credentials());

        let config = ClientConfig::new("k".to_string(), "s".to_string());
        assert!(config.has_credentials());
    }
}
