use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {reason}")]
    Parse {
        path: PathBuf,
        reason: String,
    },

    #[error("Invalid environment override: {0}")]
    Environment(String),

    #[error("Failed to render settings: {0}")]
    Render(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;
