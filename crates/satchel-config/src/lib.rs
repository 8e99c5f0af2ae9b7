//! Declarative settings for satchel library builds.
//!
//! Users describe a build with [`LibraryConfig`] (from `satchel.toml`,
//! `satchel.config.json`, a `package.json` `satchel` field, `SATCHEL_*`
//! variables or code). Resolving it against a project root produces a
//! validated, immutable [`BuildConfig`].

pub mod config;
pub mod define;
pub mod discovery;
pub mod env;
pub mod error;
pub mod format;
pub mod manifest;
pub mod validation;

// Re-export main types
pub use config::*;
pub use define::*;
pub use env::Environment;
pub use error::*;
pub use format::*;
pub use manifest::PackageManifest;

// Re-export discovery and validation
pub use discovery::{ConfigDiscovery, ConfigSource, discover, extract};
pub use validation::{ConfigValidator, FsValidator, SchemaValidator, validate_fs, validate_schema};
