use axum::http::HeaderValue;
use std::env;
use thiserror::Error;
use url::Url;

/// Default body limit, matching the 256kb JSON limit of the original deployment.
pub const DEFAULT_MAX_REQUEST_SIZE_BYTES: usize = 256 * 1024;
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ENVIRONMENT: &str = "development";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing {0} in env")]
    Missing(&'static str),

    #[error("Invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Free-form environment name reported by /health
    pub environment: String,
    pub port: u16,
    pub supabase: SupabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Clone)]
pub struct SupabaseConfig {
    pub url: Url,
    pub service_role_key: String,
}

// Keep the service key out of logs and panics.
impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_str())
            .field("service_role_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub max_request_size_bytes: usize,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Empty means any origin is allowed
    pub cors_origins: Vec<HeaderValue>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_request_size_bytes: DEFAULT_MAX_REQUEST_SIZE_BYTES,
            enable_request_logging: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values are treated the same as unset ones
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let url = get("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let service_role_key =
            get("SUPABASE_SERVICE_ROLE").ok_or(ConfigError::Missing("SUPABASE_SERVICE_ROLE"))?;

        let url = parse_base_url(url.trim())?;

        let environment = get("APP_ENV")
            .or_else(|| get("NODE_ENV"))
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        let port = match get("PORT") {
            Some(v) => parse_value("PORT", &v)?,
            None => DEFAULT_PORT,
        };

        let mut api = ApiConfig::default();
        if let Some(v) = get("API_MAX_REQUEST_SIZE_BYTES") {
            api.max_request_size_bytes = parse_value("API_MAX_REQUEST_SIZE_BYTES", &v)?;
        }
        if let Some(v) = get("API_ENABLE_REQUEST_LOGGING") {
            api.enable_request_logging = parse_value("API_ENABLE_REQUEST_LOGGING", &v)?;
        }

        let cors_origins = match get("SECURITY_CORS_ORIGINS") {
            Some(v) => v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(parse_origin)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            environment,
            port,
            supabase: SupabaseConfig {
                url,
                service_role_key,
            },
            api,
            security: SecurityConfig { cors_origins },
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        name: "SUPABASE_URL",
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Invalid {
            name: "SUPABASE_URL",
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    // Url::join replaces the last path segment unless the base ends in '/'
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// An allowed CORS origin: `scheme://host[:port]` over http(s)
fn parse_origin(raw: &str) -> Result<HeaderValue, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "SECURITY_CORS_ORIGINS",
        reason: format!("'{}': {}", raw, reason),
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }

    HeaderValue::from_str(raw).map_err(|e| invalid(e.to_string()))
}

fn parse_value<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: format!("'{}': {}", raw, e),
    })
}
