//! Satchel CLI - build a library as an ES module and a UMD script.
//!
//! This crate is the command-line front end of `satchel-bundler`. Settings
//! come from `satchel.toml` (or `satchel.config.json`, or the `satchel` field
//! of `package.json`), `SATCHEL_*` environment variables and flags, in
//! increasing priority.
//!
//! - [`cli`] - argument definitions
//! - [`commands`] - `build` and `check`
//! - [`config`] - settings from file, environment and flags
//! - [`error`] - CLI errors and their conversion to diagnostics
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status messages and the build summary
//!
//! # Example
//!
//! ```rust,no_run
//! use satchel_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
