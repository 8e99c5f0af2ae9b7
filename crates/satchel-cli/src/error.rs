//! Error handling for the satchel CLI.
//!
//! Configuration and build failures carry the library's own error types so
//! that their error codes (`CONFIGURATION_ERROR`, `TRANSFORM_ERROR`, ...)
//! survive to the terminal. See [`cli_error_to_miette`].

mod report;

use thiserror::Error;

pub use report::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Settings could not be loaded or are invalid
    #[error(transparent)]
    Config(#[from] satchel_config::ConfigError),

    /// The build failed
    #[error(transparent)]
    Build(#[from] satchel_bundler::Error),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors outside the build itself
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
