//! CLI-level errors (wraps catalog and settings errors)

use thiserror::Error;

use crate::domain::CatalogError;
use crate::errors::SettingsError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Settings(#[from] SettingsError),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Settings(_) => crate::exitcode::CONFIG,
            CliError::Catalog(e) => match e {
                CatalogError::NegativePrice(_) | CatalogError::Overflow => {
                    crate::exitcode::DATAERR
                }
                _ => crate::exitcode::SOFTWARE,
            },
        }
    }
}
