//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{num::NonZeroUsize, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::cache::{DEFAULT_LISTING_LIMIT, DEFAULT_STORE_CAPACITY};
use crate::security::{DEFAULT_SALT_LENGTH, SecretKey, SecretKeyError};

mod cli;

pub use cli::{
    CheckPasswordArgs, CliArgs, Command, DemoArgs, HashPasswordArgs, Overrides, SignArgs,
    VerifyArgs,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "vellum";

#[derive(Debug, Clone)]
pub struct Settings {
    pub security: SecuritySettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct SecuritySettings {
    pub secret_key: SecretKey,
    pub salt_length: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub store_capacity: NonZeroUsize,
    pub listing_limit: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("VELLUM").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    security: RawSecuritySettings,
    cache: RawCacheSettings,
    logging: RawLoggingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(secret) = overrides.secret_key.as_ref() {
            self.security.secret_key = Some(secret.clone());
        }
        if let Some(length) = overrides.salt_length {
            self.security.salt_length = Some(length);
        }
        if let Some(capacity) = overrides.cache_store_capacity {
            self.cache.store_capacity = Some(capacity);
        }
        if let Some(limit) = overrides.cache_listing_limit {
            self.cache.listing_limit = Some(limit);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            security,
            cache,
            logging,
        } = raw;

        Ok(Self {
            security: build_security_settings(security)?,
            cache: build_cache_settings(cache)?,
            logging: build_logging_settings(logging)?,
        })
    }
}

fn build_security_settings(security: RawSecuritySettings) -> Result<SecuritySettings, LoadError> {
    let secret = security
        .secret_key
        .ok_or_else(|| LoadError::invalid("security.secret_key", "must be set"))?;
    if secret.trim().is_empty() {
        return Err(LoadError::invalid("security.secret_key", "must not be empty"));
    }
    let secret_key = SecretKey::new(&secret).map_err(|err| match err {
        SecretKeyError::Empty => LoadError::invalid("security.secret_key", "must not be empty"),
        other => LoadError::invalid("security.secret_key", other.to_string()),
    })?;

    let salt_length = non_zero_usize(
        security.salt_length.unwrap_or(DEFAULT_SALT_LENGTH),
        "security.salt_length",
    )?;

    Ok(SecuritySettings {
        secret_key,
        salt_length,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let store_capacity = non_zero_usize(
        cache.store_capacity.unwrap_or(DEFAULT_STORE_CAPACITY),
        "cache.store_capacity",
    )?;
    let listing_limit = non_zero_usize(
        cache.listing_limit.unwrap_or(DEFAULT_LISTING_LIMIT),
        "cache.listing_limit",
    )?;

    Ok(CacheSettings {
        store_capacity,
        listing_limit,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSecuritySettings {
    secret_key: Option<String>,
    salt_length: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    store_capacity: Option<usize>,
    listing_limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

fn non_zero_usize(value: usize, key: &'static str) -> Result<NonZeroUsize, LoadError> {
    NonZeroUsize::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}
