//! Logging setup for applications embedding the pipeline.
//!
//! Only available with the `logging` feature. Library code only emits
//! `tracing` events; callers that already install a subscriber should not
//! use this module.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Crates whose events follow the chosen level. Everything else (Rolldown,
/// oxc) stays at `warn` unless `RUST_LOG` says otherwise.
const PIPELINE_TARGETS: &[&str] = &["satchel_bundler", "satchel_config", "satchel_cli"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Silent,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Filter directives for this level: pipeline crates at `self`, the rest at `warn`.
    pub fn directives(self) -> String {
        if self == LogLevel::Silent {
            return "off".to_string();
        }
        let base = if self < LogLevel::Warn { self } else { LogLevel::Warn };
        let mut directives = vec![base.as_filter().to_string()];
        directives.extend(
            PIPELINE_TARGETS
                .iter()
                .map(|target| format!("{target}={}", self.as_filter())),
        );
        directives.join(",")
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "off" | "quiet" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("invalid log level: {other}")),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter())
    }
}

/// Install a global compact subscriber at `level`.
///
/// Only the first call in a process has any effect.
///
/// ```rust,no_run
/// use satchel_bundler::logging::{LogLevel, init_logging};
///
/// init_logging(LogLevel::Debug);
/// ```
pub fn init_logging(level: LogLevel) {
    install(EnvFilter::new(level.directives()));
}

/// Like [`init_logging`], but `RUST_LOG` wins when it is set and valid.
pub fn init_logging_from_env() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(LogLevel::default().directives()));
    install(filter);
}

fn install(filter: EnvFilter) {
    INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false).without_time())
            .try_init();
    });
}
