use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::leave::{LeaveLimitsError, LeaveTypeLimits, SessionCutoffs};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
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
    pub leave: LeavePolicyConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let format = match environment {
            AppEnvironment::Development => LogFormat::Pretty,
            AppEnvironment::Test | AppEnvironment::Production => LogFormat::Compact,
        };

        let limits_path = env::var("LEAVE_LIMITS_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let cutoffs = load_cutoffs()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            leave: LeavePolicyConfig {
                limits_path,
                cutoffs,
            },
        })
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

/// Tracing controls.
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

/// Where the leave allowance table comes from, plus the same-day submission cutoffs.
#[derive(Debug, Clone, Default)]
pub struct LeavePolicyConfig {
    pub limits_path: Option<PathBuf>,
    pub cutoffs: SessionCutoffs,
}

impl LeavePolicyConfig {
    /// Load the allowance table, falling back to the built-in defaults when no file is set.
    pub fn load_limits(&self) -> Result<LeaveTypeLimits, ConfigError> {
        match &self.limits_path {
            Some(path) => LeaveTypeLimits::from_path(path).map_err(|source| {
                ConfigError::LeaveLimits {
                    path: path.clone(),
                    source,
                }
            }),
            None => Ok(LeaveTypeLimits::default()),
        }
    }
}

fn load_cutoffs() -> Result<SessionCutoffs, ConfigError> {
    let defaults = SessionCutoffs::default();
    let cutoffs = SessionCutoffs {
        all_sessions_until: cutoff_var("LEAVE_ALL_SESSIONS_UNTIL", defaults.all_sessions_until)?,
        afternoon_until: cutoff_var("LEAVE_AFTERNOON_UNTIL", defaults.afternoon_until)?,
    };

    if cutoffs.all_sessions_until > cutoffs.afternoon_until {
        return Err(ConfigError::CutoffOrder {
            all_sessions_until: cutoffs.all_sessions_until,
            afternoon_until: cutoffs.afternoon_until,
        });
    }
    Ok(cutoffs)
}

/// Read an `HH:MM` cutoff as minutes since midnight.
fn cutoff_var(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    let Some(value) = env::var(name).ok().filter(|value| !value.trim().is_empty()) else {
        return Ok(default);
    };

    let invalid = || ConfigError::InvalidCutoff {
        name,
        value: value.clone(),
    };
    let (hours, minutes) = value.trim().split_once(':').ok_or_else(invalid)?;
    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost {
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("{name} must be a time of day formatted HH:MM, got '{value}'")]
    InvalidCutoff { name: &'static str, value: String },
    #[error("cutoff {all_sessions_until} must not be later than {afternoon_until} (minutes)")]
    CutoffOrder {
        all_sessions_until: u32,
        afternoon_until: u32,
    },
    #[error("LEAVE_LIMITS_PATH '{}' could not be loaded", path.display())]
    LeaveLimits {
        path: PathBuf,
        #[source]
        source: LeaveLimitsError,
    },
}
