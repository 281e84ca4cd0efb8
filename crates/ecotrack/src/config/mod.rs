use rust_decimal::Decimal;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub backend: BackendConfig,
    pub rewards: RewardConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::parse(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var_or("APP_LOG_LEVEL", "info");
        let format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat(raw))?,
            Err(_) => LogFormat::Compact,
        };

        let products_url = base_url_var("ECOTRACK_PRODUCTS_URL", "http://localhost:8000")?;
        let auth_url = base_url_var("ECOTRACK_AUTH_URL", "http://localhost:5000")?;
        let timeout_secs = var_or("ECOTRACK_HTTP_TIMEOUT_SECS", "10")
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidTimeout)?;

        let flat_rate = match env::var("ECOTRACK_REWARD_RATE") {
            Ok(raw) => Decimal::from_str(raw.trim())
                .ok()
                .filter(|rate| !rate.is_sign_negative())
                .ok_or(ConfigError::InvalidRewardRate(raw))?,
            Err(_) => RewardConfig::DEFAULT_FLAT_RATE,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            backend: BackendConfig {
                products_url,
                auth_url,
                request_timeout: Duration::from_secs(timeout_secs),
            },
            rewards: RewardConfig { flat_rate },
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn base_url_var(name: &'static str, default: &str) -> Result<String, ConfigError> {
    let raw = var_or(name, default);
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidBaseUrl { name, value: raw })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing output controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Base URLs for the external product and authentication services.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub products_url: String,
    pub auth_url: String,
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            products_url: "http://localhost:8000".to_string(),
            auth_url: "http://localhost:5000".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RewardConfig {
    pub flat_rate: Decimal,
}

impl RewardConfig {
    /// 12% of the product price.
    pub const DEFAULT_FLAT_RATE: Decimal = Decimal::from_parts(12, 0, 0, false, 2);
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            flat_rate: Self::DEFAULT_FLAT_RATE,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidBaseUrl { name: &'static str, value: String },
    InvalidTimeout,
    InvalidRewardRate(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'pretty', got '{value}'")
            }
            ConfigError::InvalidBaseUrl { name, value } => {
                write!(f, "{name} must be an http(s) URL, got '{value}'")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "ECOTRACK_HTTP_TIMEOUT_SECS must be a whole number of seconds")
            }
            ConfigError::InvalidRewardRate(value) => write!(
                f,
                "ECOTRACK_REWARD_RATE must be a non-negative decimal, got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
