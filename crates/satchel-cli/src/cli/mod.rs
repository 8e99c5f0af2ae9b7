//! Command-line interface definition for satchel.
//!
//! # Command Structure
//!
//! - `satchel build` - produce every configured artifact
//! - `satchel check` - validate configuration and inputs without building

mod commands;
pub mod enums;
mod validation;

use clap::Parser;

pub use commands::{BuildArgs, CheckArgs, Command, ConfigArgs};
pub use enums::*;
pub use validation::{parse_alias, parse_define, parse_global, parse_global_mapping};

/// Satchel - library builds for ES module and script-tag consumers
#[derive(Parser, Debug)]
#[command(
    name = "satchel",
    version,
    about = "Build a JavaScript/TypeScript library as an ES module and a UMD script",
    long_about = "Satchel bundles one library entry into an ES module for bundler consumers\n\
                  and a UMD script for script-tag consumers. Declared externals are never\n\
                  bundled; in script builds they are read from globals."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
