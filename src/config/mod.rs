//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{num::NonZeroU32, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

mod cli;

pub use cli::CliArgs;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "quill";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_CACHE_TTL_SECS: u64 = 20;
const DEFAULT_SESSION_COOKIE: &str = "session";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid setting `{field}`: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn parse(value: &str) -> Result<Self, SettingsError> {
        match value.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(SettingsError::Invalid {
                field: "logging.level",
                message: format!("unknown log level `{other}`"),
            }),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub graceful_shutdown_seconds: u64,
}

impl ServerSettings {
    pub fn graceful_shutdown(&self) -> Duration {
        Duration::from_secs(self.graceful_shutdown_seconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: LogLevel,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedSettings {
    /// Posts per feed page.
    pub page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_seconds: u64,
    /// Route names the cache covers (`index`, `group`, `profile`).
    pub routes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub cookie_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub feed: FeedSettings,
    pub cache: CacheSettings,
    pub sessions: SessionSettings,
}

/// Parse CLI arguments and load settings with CLI overrides applied.
pub fn load_with_cli() -> Result<(CliArgs, Settings), SettingsError> {
    let cli = CliArgs::parse();
    let settings = load(&cli)?;
    Ok((cli, settings))
}

/// Load settings from defaults, optional files, `QUILL__` environment
/// variables, and the provided CLI overrides — in that precedence order.
pub fn load(cli: &CliArgs) -> Result<Settings, SettingsError> {
    let mut builder = Config::builder()
        .set_default("server.host", DEFAULT_HOST)?
        .set_default("server.port", i64::from(DEFAULT_PORT))?
        .set_default(
            "server.graceful_shutdown_seconds",
            DEFAULT_GRACEFUL_SHUTDOWN_SECS as i64,
        )?
        .set_default("database.url", None::<String>)?
        .set_default(
            "database.max_connections",
            i64::from(DEFAULT_DB_MAX_CONNECTIONS),
        )?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "compact")?
        .set_default("feed.page_size", i64::from(DEFAULT_PAGE_SIZE))?
        .set_default("cache.enabled", true)?
        .set_default("cache.ttl_seconds", DEFAULT_CACHE_TTL_SECS as i64)?
        .set_default("cache.routes", vec!["index".to_string()])?
        .set_default("sessions.cookie_name", DEFAULT_SESSION_COOKIE)?
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = &cli.config_file {
        builder = builder.add_source(File::from(path.clone()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix("QUILL")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("cache.routes"),
    );

    if let Some(host) = &cli.server_host {
        builder = builder.set_override("server.host", host.clone())?;
    }
    if let Some(port) = cli.server_port {
        builder = builder.set_override("server.port", i64::from(port))?;
    }
    if let Some(seconds) = cli.server_graceful_shutdown_seconds {
        builder = builder.set_override("server.graceful_shutdown_seconds", seconds as i64)?;
    }
    if let Some(url) = &cli.database_url {
        builder = builder.set_override("database.url", url.clone())?;
    }
    if let Some(count) = cli.database_max_connections {
        builder = builder.set_override("database.max_connections", i64::from(count))?;
    }
    if let Some(level) = &cli.log_level {
        LogLevel::parse(level)?;
        builder = builder.set_override("logging.level", level.to_ascii_lowercase())?;
    }
    if let Some(json) = cli.log_json {
        let format = if json { "json" } else { "compact" };
        builder = builder.set_override("logging.format", format)?;
    }
    if let Some(page_size) = cli.feed_page_size {
        builder = builder.set_override("feed.page_size", i64::from(page_size))?;
    }
    if let Some(enabled) = cli.cache_enabled {
        builder = builder.set_override("cache.enabled", enabled)?;
    }
    if let Some(ttl) = cli.cache_ttl_seconds {
        builder = builder.set_override("cache.ttl_seconds", ttl as i64)?;
    }

    let settings: Settings = builder.build()?.try_deserialize()?;
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), SettingsError> {
    if settings.feed.page_size == 0 {
        return Err(SettingsError::Invalid {
            field: "feed.page_size",
            message: "page size must be at least 1".to_string(),
        });
    }
    if settings.cache.enabled && settings.cache.ttl_seconds == 0 {
        return Err(SettingsError::Invalid {
            field: "cache.ttl_seconds",
            message: "an enabled cache needs a non-zero TTL".to_string(),
        });
    }
    for route in &settings.cache.routes {
        if crate::cache::CachedRoute::parse(route).is_none() {
            return Err(SettingsError::Invalid {
                field: "cache.routes",
                message: format!("unknown route `{route}`"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
