//! Server configuration
//!
//! Loaded from the environment at startup; command-line flags override
//! individual fields through the `with_*` builders.

use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, warn};

/// Which store backs the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Process-local store, lost on restart
    #[default]
    Memory,
    /// MongoDB via `MONGODB_URI`
    Mongo,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "mongo" | "mongodb" => Ok(Self::Mongo),
            other => Err(format!("unknown store backend '{other}'")),
        }
    }
}

impl Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Mongo => "mongo",
        })
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Variable present but unparseable
    #[error("invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// Required variable absent
    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub mongodb_uri: String,
    pub mongodb_db_name: String,
    /// Hex Ed25519 public key of the identity provider
    pub identity_public_key: Option<String>,
    pub identity_issuer: String,
    pub token_leeway_secs: u64,
    pub cors_origins: Vec<String>,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            store: StoreBackend::Memory,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_db_name: "surveyapp".to_string(),
            identity_public_key: None,
            identity_issuer: survey_auth::DEFAULT_ISSUER.to_string(),
            token_leeway_secs: survey_auth::DEFAULT_LEEWAY_SECS,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:3001".to_string(),
            ],
            log_json: false,
        }
    }
}

impl ServerConfig {
    /// Load from process environment, falling back to defaults
    ///
    /// # Errors
    /// `ConfigError::Invalid` when a variable is set but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment
    ///
    /// # Errors
    /// `ConfigError::Invalid` when a variable is set but unparseable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            host: lookup("SURVEY_BIND_HOST").unwrap_or(defaults.host),
            port: try_load(&lookup, "PORT", defaults.port)?,
            store: try_load(&lookup, "SURVEY_STORE", defaults.store)?,
            mongodb_uri: lookup("MONGODB_URI").unwrap_or(defaults.mongodb_uri),
            mongodb_db_name: lookup("MONGODB_DB_NAME").unwrap_or(defaults.mongodb_db_name),
            identity_public_key: lookup("SURVEY_IDENTITY_PUBLIC_KEY")
                .filter(|key| !key.trim().is_empty()),
            identity_issuer: lookup("SURVEY_IDENTITY_ISSUER").unwrap_or(defaults.identity_issuer),
            token_leeway_secs: try_load(
                &lookup,
                "SURVEY_TOKEN_LEEWAY_SECS",
                defaults.token_leeway_secs,
            )?,
            cors_origins: lookup("SURVEY_CORS_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or(defaults.cors_origins),
            log_json: try_load(&lookup, "SURVEY_LOG_JSON", defaults.log_json)?,
        })
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: StoreBackend) -> Self {
        self.store = store;
        self
    }

    #[must_use]
    pub fn with_mongodb(mut self, uri: impl Into<String>, db_name: impl Into<String>) -> Self {
        self.mongodb_uri = uri.into();
        self.mongodb_db_name = db_name.into();
        self
    }

    #[must_use]
    pub fn with_identity_public_key(mut self, key: impl Into<String>) -> Self {
        self.identity_public_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_identity_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.identity_issuer = issuer.into();
        self
    }

    #[must_use]
    pub fn with_token_leeway(mut self, leeway_secs: u64) -> Self {
        self.token_leeway_secs = leeway_secs;
        self
    }

    #[must_use]
    pub fn with_cors_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cors_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_log_json(mut self, log_json: bool) -> Self {
        self.log_json = log_json;
        self
    }

    /// `host:port` to bind
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The identity public key, required to serve
    ///
    /// # Errors
    /// `ConfigError::Missing` when unset.
    pub fn require_identity_public_key(&self) -> Result<&str, ConfigError> {
        self.identity_public_key
            .as_deref()
            .ok_or(ConfigError::Missing("SURVEY_IDENTITY_PUBLIC_KEY"))
    }
}

fn try_load<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        debug!("{key} not set, using default: {default}");
        return Ok(default);
    };

    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }
    })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
