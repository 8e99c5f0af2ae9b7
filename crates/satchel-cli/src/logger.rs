//! Logging infrastructure for the satchel CLI.
//!
//! Status lines (`✓ Wrote ...`) are printed by [`crate::ui`]; the tracing
//! subscriber installed here carries the library's own events, which by
//! default means only warnings such as unmapped globals or import cycles.
//!
//! # Example
//!
//! ```rust,no_run
//! use satchel_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::warn!("no global mapped for \"framework-x\"");
//! ```

use satchel_bundler::logging::LogLevel;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified options.
///
/// # Verbosity Levels
///
/// The logging level is determined in this order:
/// 1. `--verbose` flag: DEBUG for satchel crates, WARN for the rest
/// 2. `--quiet` flag: ERROR only
/// 3. `RUST_LOG` environment variable: custom filter
/// 4. Default: WARN
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize logger with a custom environment filter.
///
/// Later calls in the same process are ignored.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .without_time()
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(LogLevel::Debug.directives())
    } else if quiet {
        EnvFilter::new(LogLevel::Error.directives())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(LogLevel::Warn.directives()))
    }
}

/// Check if colored output should be enabled.
///
/// # Environment Variables
///
/// - `NO_COLOR`: If set, disables colors
/// - `FORCE_COLOR`: If set, forces colors even in non-TTY
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_filter_scopes_debug_to_satchel_crates() {
        let filter = filter_for(true, false).to_string();
        assert!(filter.contains("satchel_bundler=debug"), "{filter}");
        assert!(filter.contains("satchel_cli=debug"), "{filter}");
    }

    #[test]
    fn test_quiet_filter_is_errors_only() {
        assert!(filter_for(false, true).to_string().contains("error"));
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logger(false, true, true);
        init_logger(true, false, true);
    }
}
