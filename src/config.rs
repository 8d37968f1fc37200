//! Configuration management

use std::{env, path::Path};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Platform OAuth credentials and redirect target
    pub oauth: OAuthConfig,
    /// Session cookie configuration
    pub session: SessionConfig,
    /// Platform endpoint base URLs
    pub api: ApiConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// TLS certificate/key files (PEM)
    pub tls: TlsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            tls: TlsConfig::default(),
        }
    }
}

/// TLS material, read once at startup. Missing files are fatal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// PEM certificate path
    pub cert: String,
    /// PEM private key path
    pub key: String,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert: "srv.cert".to_string(),
            key: "srv.key".to_string(),
        }
    }
}

/// Platform OAuth client credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Client ID issued by the platform
    pub client_id: String,
    /// Client secret issued by the platform
    pub client_secret: String,
    /// Redirect URI registered with the platform
    pub redirect_uri: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "https://localhost:8080/callback".to_string(),
        }
    }
}

impl OAuthConfig {
    /// Whether both credentials are present
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session cookie
    pub cookie_name: String,
    /// Session expiry after inactivity, in seconds
    pub inactivity_timeout_secs: u64,
    /// Mark the session cookie `Secure` (disable only for local plain-HTTP testing)
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "ne_console_session".to_string(),
            inactivity_timeout_secs: 3600,
            secure_cookie: true,
        }
    }
}

/// Platform endpoint base URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL for the sign-in page
    pub auth_base_url: String,
    /// Base URL for API and token-exchange calls
    pub api_base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            auth_base_url: "https://base.next-engine.org".to_string(),
            api_base_url: "https://api.next-engine.org".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Load a local .env before reading environment variables
        dotenvy::dotenv().ok();

        let mut figment = Figment::new();

        // Load from file if provided
        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        // Merge environment variables (NE_CONSOLE_ prefix)
        figment = figment.merge(Env::prefixed("NE_CONSOLE_").split("__"));

        let mut config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        // Bare CLIENT_ID/CLIENT_SECRET are the platform's documented contract
        if config.oauth.client_id.is_empty() {
            if let Ok(id) = env::var("CLIENT_ID") {
                config.oauth.client_id = id;
            }
        }
        if config.oauth.client_secret.is_empty() {
            if let Ok(secret) = env::var("CLIENT_SECRET") {
                config.oauth.client_secret = secret;
            }
        }

        Ok(config)
    }
}
