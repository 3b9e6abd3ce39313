use std::{env, path::PathBuf};

use thiserror::Error;

/// Radius of the sphere used for great-circle distances, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6372.795;

/// Rendering format of every timestamp: `2016-01-7 16:00`.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%-d %H:%M";

/// Parsing format of every timestamp. Month, day and hour accept one or two
/// digits, so both `2016-01-07 9:00` and `2016-01-7 09:00` are read.
pub const DATE_TIME_INPUT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Separates date and time in the `--in-air` option (`2016-01-07/11:00`).
pub const IN_AIR_ARG_SEPARATOR: char = '/';

/// Hash holding every flight document, keyed by flight number.
pub const ROUTES_KEY: &str = "routes";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6379;
pub const DEFAULT_LOG_DIR: &str = "logs";

/// `host:port` of the key-value server when `--connection` is not given.
pub const ADDR_ENV_VAR: &str = "ROUTES_REDIS_ADDR";
/// Log directory when `--log-dir` is not given.
pub const LOG_DIR_ENV_VAR: &str = "ROUTES_LOG_DIR";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid connection '{0}', expected host:port")]
    InvalidConnection(String),
}

/// Runtime settings of the command-line driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl Config {
    /// Command-line values win over the environment, which wins over defaults.
    pub fn resolve(
        connection: Option<&str>,
        log_dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        Self::resolve_with(connection, log_dir, |name| env::var(name).ok())
    }

    pub fn resolve_with(
        connection: Option<&str>,
        log_dir: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        let connection = connection
            .map(str::to_string)
            .or_else(|| lookup(ADDR_ENV_VAR));
        if let Some(connection) = connection {
            let (host, port) = parse_connection(&connection)?;
            config.host = host;
            config.port = port;
        }

        if let Some(dir) = log_dir.or_else(|| lookup(LOG_DIR_ENV_VAR).map(PathBuf::from)) {
            config.log_dir = dir;
        }

        Ok(config)
    }

    /// `host:port`, also used to name the session log.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parses `host:port`. A bare host keeps the default port.
pub fn parse_connection(connection: &str) -> Result<(String, u16), ConfigError> {
    let invalid = || ConfigError::InvalidConnection(connection.to_string());
    let connection = connection.trim();

    let (host, port) = match connection.rsplit_once(':') {
        Some((host, port)) => (host, port.parse::<u16>().map_err(|_| invalid())?),
        None => (connection, DEFAULT_PORT),
    };
    if host.is_empty() || port == 0 {
        return Err(invalid());
    }
    Ok((host.to_string(), port))
}
