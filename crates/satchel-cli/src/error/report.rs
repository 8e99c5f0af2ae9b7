//! Miette diagnostic conversion for CLI errors.

use miette::Report;

use crate::error::CliError;

/// Convert a [`CliError`] into a miette report.
///
/// Configuration errors are reported through [`satchel_bundler::Error`] so
/// they share its `CONFIGURATION_ERROR` code and hints.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => Report::new(e),
        CliError::Config(e) => Report::new(satchel_bundler::Error::from(e)),
        other => miette::miette!("{}", other),
    }
}
