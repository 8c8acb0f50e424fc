use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::risk::RiskConfig;

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
    pub risk: RiskConfig,
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
        let include_targets = environment != AppEnvironment::Production;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                include_targets,
            },
            risk: load_risk_config()?,
        })
    }
}

/// Applies `RISK_*` and `NUDGE_*` overrides on top of the defaults.
fn load_risk_config() -> Result<RiskConfig, ConfigError> {
    let defaults = RiskConfig::default();
    let mut risk = defaults.clone();

    let thresholds = &mut risk.thresholds;
    thresholds.high_screener_is_firm = setting(
        "RISK_HIGH_SCREENER_IS_FIRM",
        defaults.thresholds.high_screener_is_firm,
    )?;
    thresholds.acted_vs_alt_firm_ratio = bounded_setting(
        "RISK_ACTED_VS_ALT_FIRM_RATIO",
        defaults.thresholds.acted_vs_alt_firm_ratio,
        0.0..=MAX_RATIO,
    )?;
    thresholds.urges_7d_firm_min =
        setting("RISK_URGES_7D_FIRM_MIN", defaults.thresholds.urges_7d_firm_min)?;
    thresholds.high_intensity_7d_firm_min = setting(
        "RISK_HIGH_INTENSITY_7D_FIRM_MIN",
        defaults.thresholds.high_intensity_7d_firm_min,
    )?;
    thresholds.night_episodes_soft_min = setting(
        "RISK_NIGHT_EPISODES_SOFT_MIN",
        defaults.thresholds.night_episodes_soft_min,
    )?;
    thresholds.elevated_screener_soft = setting(
        "RISK_ELEVATED_SCREENER_SOFT",
        defaults.thresholds.elevated_screener_soft,
    )?;
    thresholds.urges_7d_soft_min =
        setting("RISK_URGES_7D_SOFT_MIN", defaults.thresholds.urges_7d_soft_min)?;
    thresholds.high_intensity_7d_soft_min = setting(
        "RISK_HIGH_INTENSITY_7D_SOFT_MIN",
        defaults.thresholds.high_intensity_7d_soft_min,
    )?;

    risk.nudges.soft_cooldown_hours = bounded_setting(
        "NUDGE_SOFT_COOLDOWN_HOURS",
        defaults.nudges.soft_cooldown_hours,
        1..=MAX_COOLDOWN_HOURS,
    )?;
    risk.nudges.firm_cooldown_hours = bounded_setting(
        "NUDGE_FIRM_COOLDOWN_HOURS",
        defaults.nudges.firm_cooldown_hours,
        1..=MAX_COOLDOWN_HOURS,
    )?;
    risk.nudges.soft_cap = setting("NUDGE_SOFT_DAILY_CAP", defaults.nudges.soft_cap)?;
    risk.nudges.firm_cap = setting("NUDGE_FIRM_DAILY_CAP", defaults.nudges.firm_cap)?;

    risk.retention_days = bounded_setting(
        "RISK_ASSESSMENT_RETENTION_DAYS",
        defaults.retention_days,
        1..=MAX_RETENTION_DAYS,
    )?;

    Ok(risk)
}

/// Ten years of assessment history.
const MAX_RETENTION_DAYS: i64 = 3650;
/// One year between nudges.
const MAX_COOLDOWN_HOURS: i64 = 24 * 365;
const MAX_RATIO: f64 = 1000.0;

/// Like [`setting`], but rejects parsed values outside `range`.
fn bounded_setting<T>(
    key: &'static str,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + ToString,
{
    let value = setting(key, default)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidSetting {
            key,
            value: value.to_string(),
        })
    }
}

fn setting<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidSetting { key, value: raw })
        }
        _ => Ok(default),
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

/// Log output controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub include_targets: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSetting { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSetting { key, value } => {
                write!(f, "{key} has an unusable value '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidSetting { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
