use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use axum::http::HeaderValue;
use env_helpers::get_env_default;
use secrecy::SecretString;
use url::Url;

use crate::{application::validators::FilterPolicy, infra::error::InfraError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format {other:?}")),
        }
    }
}

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: SecretString,
    pub db_max_connections: u32,
    pub cors_origin: HeaderValue,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
    /// When set, structured JSON logs are also written to this file.
    pub log_file: Option<PathBuf>,
    pub filter_policy: FilterPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let bind_addr: SocketAddr = get_env_default(
            "BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 8080)),
        );
        let db_max_connections: u32 = get_env_default("DB_MAX_CONNECTIONS", 5);
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .map_err(|_| InfraError::ConfigInvalid {
                    var: "CORS_ORIGIN",
                    reason: "not a valid header value".into(),
                })?;
        let log_level: LogLevel = get_env_default("LOG_LEVEL", LogLevel::Info);
        let log_format: LogFormat = get_env_default("LOG_FORMAT", LogFormat::Pretty);
        let log_file: Option<PathBuf> = non_empty_var("LOG_FILE").map(PathBuf::from);

        let reject_future: bool = get_env_default("FILTER_REJECT_FUTURE_DATES", false);
        let filter_policy = if reject_future {
            FilterPolicy::RejectFutureDates
        } else {
            FilterPolicy::Lenient
        };

        let database_url = match non_empty_var("DATABASE_URL") {
            Some(url) => url,
            None => compose_database_url(&PgParts::from_env()?)?,
        };

        Ok(Self {
            bind_addr,
            database_url: SecretString::new(database_url.into()),
            db_max_connections,
            cors_origin,
            log_level,
            log_format,
            log_file,
            filter_policy,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Connection pieces used when `DATABASE_URL` is not given directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgParts {
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub ssl_mode: String,
}

impl PgParts {
    fn from_env() -> Result<Self, InfraError> {
        let database = non_empty_var("PG_DB").ok_or(InfraError::ConfigMissing {
            var: "DATABASE_URL (or PG_DB)",
        })?;

        Ok(Self {
            user: non_empty_var("PG_USER"),
            password: non_empty_var("PG_PASSWORD"),
            host: non_empty_var("PG_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: get_env_default("PG_PORT", 5432),
            database,
            ssl_mode: non_empty_var("PG_SSLMODE").unwrap_or_else(|| "disable".to_string()),
        })
    }
}

pub fn compose_database_url(parts: &PgParts) -> Result<String, InfraError> {
    let invalid = |reason: &str| InfraError::ConfigInvalid {
        var: "PG_*",
        reason: reason.to_string(),
    };

    let mut url = Url::parse(&format!(
        "postgres://{}:{}/{}",
        parts.host, parts.port, parts.database
    ))
    .map_err(|e| invalid(&e.to_string()))?;

    if let Some(user) = &parts.user {
        url.set_username(user)
            .map_err(|_| invalid("user cannot be set"))?;
        if let Some(password) = &parts.password {
            url.set_password(Some(password))
                .map_err(|_| invalid("password cannot be set"))?;
        }
    }
    url.query_pairs_mut().append_pair("sslmode", &parts.ssl_mode);

    Ok(url.to_string())
}
