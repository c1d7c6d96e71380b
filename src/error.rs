use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("profile not found: {0}")]
    NotFound(PathBuf),
    #[error("invalid profile: {0}")]
    Invalid(String),
    #[error("no home directory available")]
    NoHome,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure reported by one touch sensor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("sensor did not respond")]
    NoResponse,
    #[error("sensor bus error: {0}")]
    Bus(String),
}
