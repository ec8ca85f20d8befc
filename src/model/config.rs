use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Runtime settings, read from `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// How long the UI waits for a key before redrawing (ms)
    #[serde(default = "default_nc_timeout")]
    pub nc_timeout: u64,
    /// How long a status bar message stays visible (seconds)
    #[serde(default = "default_statusbar_timeout")]
    pub statusbar_timeout: u64,
    /// Log verbosity, 0 (quiet) to 3 (trace)
    #[serde(default)]
    pub loglvl: u8,
    /// Sort mode character: `d`, `n`, `p` or `r`
    #[serde(default = "default_sortmode")]
    pub sortmode: char,
    /// Filters narrow the previous result until cleared
    #[serde(default = "default_true")]
    pub filter_persist: bool,
    /// Persisted filters are kept as a history rather than replaced
    #[serde(default = "default_true")]
    pub filter_cascade: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            nc_timeout: default_nc_timeout(),
            statusbar_timeout: default_statusbar_timeout(),
            loglvl: 0,
            sortmode: default_sortmode(),
            filter_persist: true,
            filter_cascade: true,
        }
    }
}

fn default_nc_timeout() -> u64 {
    500
}

fn default_statusbar_timeout() -> u64 {
    3
}

fn default_sortmode() -> char {
    'd'
}

fn default_true() -> bool {
    true
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("invalid sort mode: {0} (valid sort modes are: d, n, p, or r)")]
    InvalidSortMode(char),
    #[error("invalid log level: {0} (expected 0-3)")]
    InvalidLogLevel(u8),
    #[error("unknown variable: {0}")]
    UnknownVariable(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl Config {
    /// Reject values the rest of the program cannot use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.sortmode.to_ascii_lowercase(), 'd' | 'n' | 'p' | 'r') {
            return Err(ConfigError::InvalidSortMode(self.sortmode));
        }
        if self.loglvl > 3 {
            return Err(ConfigError::InvalidLogLevel(self.loglvl));
        }
        Ok(())
    }

    /// Current value of a variable, formatted for display
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "nc_timeout" => self.nc_timeout.to_string(),
            "statusbar_timeout" => self.statusbar_timeout.to_string(),
            "loglvl" => self.loglvl.to_string(),
            "sortmode" => self.sortmode.to_string(),
            "filter_persist" => self.filter_persist.to_string(),
            "filter_cascade" => self.filter_cascade.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Set a variable from its textual form. The config is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let mut next = self.clone();
        match key {
            "nc_timeout" => next.nc_timeout = value.parse().map_err(|_| invalid())?,
            "statusbar_timeout" => next.statusbar_timeout = value.parse().map_err(|_| invalid())?,
            "loglvl" => next.loglvl = value.parse().map_err(|_| invalid())?,
            "sortmode" => {
                let mut chars = value.chars();
                next.sortmode = match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => return Err(invalid()),
                };
            }
            "filter_persist" => next.filter_persist = parse_bool(value).ok_or_else(invalid)?,
            "filter_cascade" => next.filter_cascade = parse_bool(value).ok_or_else(invalid)?,
            _ => return Err(ConfigError::UnknownVariable(key.to_string())),
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

/// Accepts `true`/`false` as well as `1`/`0`
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
