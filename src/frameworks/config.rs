use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::use_cases::interceptor::UnauthorizedPolicy;
use crate::use_cases::route_guard::DEFAULT_LOGIN_ROUTE;

// Runtime client settings (not per-user state).

pub const CONFIG_PATH_VAR: &str = "APPOINTMENT_CLIENT_CONFIG";
pub const API_URL_VAR: &str = "APPOINTMENT_API_URL";
pub const REQUEST_TIMEOUT_VAR: &str = "APPOINTMENT_REQUEST_TIMEOUT_MS";
pub const RETRY_ON_UNAUTHORIZED_VAR: &str = "APPOINTMENT_RETRY_ON_UNAUTHORIZED";
pub const SESSION_FILE_VAR: &str = "APPOINTMENT_SESSION_FILE";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid {name} value {value:?}")]
    InvalidValue { name: &'static str, value: String },
    #[error("invalid base url {value:?}: {reason}")]
    InvalidBaseUrl { value: String, reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
    pub unauthorized_policy: UnauthorizedPolicy,
    pub login_route: String,
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            unauthorized_policy: UnauthorizedPolicy::default(),
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            session_file: None,
        }
    }
}

// Every field optional so a file only needs what it overrides.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    base_url: Option<String>,
    request_timeout_ms: Option<u64>,
    unauthorized_policy: Option<UnauthorizedPolicy>,
    login_route: Option<String>,
    session_file: Option<PathBuf>,
}

impl ClientConfig {
    // Defaults, then the optional file, then process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let contents = match path {
            Some(path) => Some(std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?),
            None => None,
        };
        Self::from_sources(contents.as_deref(), |name| std::env::var(name).ok())
    }

    pub fn from_sources(
        toml_source: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(source) = toml_source {
            let file: FileConfig = toml::from_str(source)?;
            if let Some(base_url) = file.base_url {
                config.base_url = base_url;
            }
            if let Some(timeout) = file.request_timeout_ms {
                config.request_timeout_ms = timeout;
            }
            if let Some(policy) = file.unauthorized_policy {
                config.unauthorized_policy = policy;
            }
            if let Some(route) = file.login_route {
                config.login_route = route;
            }
            if file.session_file.is_some() {
                config.session_file = file.session_file;
            }
        }

        if let Some(base_url) = env(API_URL_VAR) {
            config.base_url = base_url;
        }
        if let Some(raw) = env(REQUEST_TIMEOUT_VAR) {
            config.request_timeout_ms = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: REQUEST_TIMEOUT_VAR,
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = env(RETRY_ON_UNAUTHORIZED_VAR) {
            config.unauthorized_policy = parse_retry_flag(&raw)?;
        }
        if let Some(path) = env(SESSION_FILE_VAR).filter(|path| !path.trim().is_empty()) {
            config.session_file = Some(PathBuf::from(path));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        let parsed = Url::parse(&self.base_url).map_err(|err| ConfigError::InvalidBaseUrl {
            value: self.base_url.clone(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                value: self.base_url.clone(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                name: "request_timeout_ms",
                value: "0".to_string(),
            });
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        Ok(())
    }
}

fn parse_retry_flag(raw: &str) -> Result<UnauthorizedPolicy, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(UnauthorizedPolicy::RefreshAndRetryOnce),
        "0" | "false" | "no" | "off" => Ok(UnauthorizedPolicy::PassThrough),
        _ => Err(ConfigError::InvalidValue {
            name: RETRY_ON_UNAUTHORIZED_VAR,
            value: raw.to_string(),
        }),
    }
}
