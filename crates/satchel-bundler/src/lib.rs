#![cfg_attr(docsrs, feature(doc_cfg))]

//! # satchel-bundler
//!
//! Library build pipeline on top of Rolldown.
//!
//! One entry module becomes a set of distributable artifacts (ES module,
//! UMD, CommonJS, IIFE) that share a single module graph and a single set of
//! host-provided externals.
//!
//! ## Quick Start
//!
//! ```no_run
//! use satchel_bundler::{BuildConfig, OutputFormat, Pipeline};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BuildConfig::builder(".", "src/index.ts", "my-lib")
//!     .external("framework-x")
//!     .global("framework-x", "FrameworkX")
//!     .alias("@", "src")
//!     .formats([OutputFormat::Es, OutputFormat::Umd])
//!     .build()?;
//!
//! let outcome = Pipeline::new(&config).build().await?;
//! for artifact in &outcome.artifacts {
//!     println!("{} -> {}", artifact.format, artifact.file_name);
//! }
//! # Ok(()) }
//! ```

use std::fmt;
use std::path::PathBuf;

pub mod alias;
pub mod classify;
pub mod diagnostics;
pub mod engine;
pub mod graph;
pub mod inject;
pub mod pipeline;
pub mod plan;
pub mod stages;
pub mod wrapper;
pub mod writer;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use alias::AliasResolver;
pub use classify::{Classification, Classifier, guess_global_name};
pub use engine::{BundleEngine, EngineFormat, RenderRequest, RenderedChunk, RolldownEngine};
pub use graph::{
    GraphBuilder, GraphStats, ImportKind, ImportRecord, ImportTarget, ModuleGraph, ModuleId,
    ModuleKind, ModuleNode,
};
pub use inject::DefineTable;
pub use pipeline::{BuildOutcome, OutputArtifact, Pipeline, build};
pub use plan::{ModuleWrapper, PlannedArtifact, plan};
pub use stages::{
    CycleCheckStage, ModuleKindStage, StagePhase, StageRegistry, TransformStage, find_cycles,
};

// Configuration types used throughout the public API
pub use satchel_config::{
    BuildConfig, BuildConfigBuilder, ConfigError, DefineSource, Environment, LibraryConfig,
    OutputFormat, Platform,
};

/// Failure category reported for a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Resolution,
    Transform,
    Write,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Configuration => "CONFIGURATION_ERROR",
            ErrorKind::Resolution => "RESOLUTION_ERROR",
            ErrorKind::Transform => "TRANSFORM_ERROR",
            ErrorKind::Write => "WRITE_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::Resolution => "ResolutionError",
            ErrorKind::Transform => "TransformError",
            ErrorKind::Write => "WriteError",
        })
    }
}

/// Error types for satchel-bundler operations.
///
/// Every failure is terminal: a build either writes all of its artifacts or
/// reports exactly one of these.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid or inconsistent configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An import specifier could not be mapped to a module.
    #[error("cannot resolve \"{specifier}\" from {}: {reason}", .importer.display())]
    Resolution {
        specifier: String,
        importer: PathBuf,
        reason: String,
    },

    /// A module failed to parse or the engine rejected it.
    #[error("{}", format_transform(.module, .line, .column, .message))]
    Transform {
        module: Option<PathBuf>,
        line: Option<u32>,
        column: Option<u32>,
        message: String,
    },

    /// An artifact could not be written.
    #[error("failed to write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },
}

/// Result type alias for satchel-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Configuration,
            Error::Resolution { .. } => ErrorKind::Resolution,
            Error::Transform { .. } => ErrorKind::Transform,
            Error::Write { .. } => ErrorKind::Write,
        }
    }

    /// Transform error with no source location.
    pub fn transform(module: Option<PathBuf>, message: impl Into<String>) -> Self {
        Error::Transform {
            module,
            line: None,
            column: None,
            message: message.into(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Error::Write {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

fn format_transform(
    module: &Option<PathBuf>,
    line: &Option<u32>,
    column: &Option<u32>,
    message: &str,
) -> String {
    match (module, *line, *column) {
        (Some(path), Some(line), Some(column)) => {
            format!("failed to transform {}:{line}:{column}: {message}", path.display())
        }
        (Some(path), Some(line), None) => {
            format!("failed to transform {}:{line}: {message}", path.display())
        }
        (Some(path), None, _) => format!("failed to transform {}: {message}", path.display()),
        (None, _, _) => format!("transform failed: {message}"),
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn fmt::Display + '_>> {
        Some(Box::new(self.kind().code()))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn fmt::Display + '_>> {
        match self {
            Error::Config(err) => err.hint().map(|h| Box::new(h) as Box<dyn fmt::Display>),
            Error::Resolution { specifier, .. } => Some(Box::new(format!(
                "Check that '{specifier}' exists, or add it to `external` if the host provides it."
            ))),
            Error::Transform { message, .. } if message.starts_with("unsupported module type") => {
                Some(Box::new(
                    "Add a transform stage that converts this module to JavaScript.",
                ))
            }
            Error::Transform { .. } => None,
            Error::Write { .. } => Some(Box::new(
                "Check disk space and permissions for the output directory.",
            )),
        }
    }
}
