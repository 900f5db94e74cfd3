pub use std::path::Path;

use axelarnet_modules::axelarnet::Params;
use axelarnet_modules::error::Error;
use serde_derive::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    pub global: GlobalConfig,
    /// Module parameters used for freshly generated genesis states
    #[serde(default)]
    pub axelarnet: Params,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GlobalConfig {
    pub log_level: LogLevel,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

/// Attempt to load and parse the TOML config file as a `Config`.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, Error> {
    let config_toml = std::fs::read_to_string(&path).map_err(|e| Error::Custom {
        reason: e.to_string(),
    })?;

    let config = toml::from_str::<Config>(&config_toml[..]).map_err(|e| Error::Custom {
        reason: e.to_string(),
    })?;

    config.axelarnet.validate()?;

    Ok(config)
}
