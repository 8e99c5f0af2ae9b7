use clap::{Args, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

use crate::cli::enums::*;
use crate::cli::validation::{parse_alias, parse_define, parse_global, parse_global_mapping};

/// Available satchel subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the library
    ///
    /// Produces one artifact per configured format. Either every artifact is
    /// written or none is.
    Build(BuildArgs),

    /// Validate configuration without building
    ///
    /// Loads settings the same way `build` does, checks the entry and output
    /// paths and lists the artifacts a build would write.
    Check(CheckArgs),
}

/// Settings shared by every command. Flags override `SATCHEL_*` variables,
/// which override the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// Entry module, relative to the project root
    ///
    /// Examples:
    ///   satchel build src/index.ts
    ///   satchel build lib/main.js --name my-lib
    #[arg(value_name = "ENTRY")]
    pub entry: Option<PathBuf>,

    /// Config file to load instead of the discovered one
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Base name for output files
    #[arg(short, long)]
    pub name: Option<String>,

    /// Global the UMD and IIFE builds assign the exports to
    #[arg(long, value_name = "NAME", value_parser = parse_global)]
    pub global_name: Option<String>,

    /// Output formats, comma separated
    #[arg(short, long, value_enum, value_delimiter = ',', value_name = "FORMATS")]
    pub formats: Vec<Format>,

    /// Output directory for artifacts
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Specifier the host provides; never bundled (repeatable)
    ///
    /// Subpaths are included: `-e framework-x` also covers
    /// `framework-x/jsx-runtime`.
    #[arg(short, long, value_name = "SPECIFIER")]
    pub external: Vec<String>,

    /// Global variable of an external in script builds (repeatable)
    #[arg(short, long = "global", value_name = "SPECIFIER=GLOBAL", value_parser = parse_global_mapping)]
    pub globals: Vec<(String, String)>,

    /// Import prefix mapped to a directory (repeatable)
    #[arg(short, long, value_name = "PREFIX=DIR", value_parser = parse_alias)]
    pub alias: Vec<(String, PathBuf)>,

    /// Constant substituted at build time (repeatable)
    #[arg(short = 'D', long, value_name = "TOKEN=VALUE", value_parser = parse_define)]
    pub define: Vec<(String, Value)>,

    /// Target runtime, drives resolution conditions
    #[arg(long, value_enum)]
    pub platform: Option<PlatformArg>,

    /// Write a source map next to every artifact
    #[arg(long)]
    pub sourcemap: bool,

    /// Minify every artifact
    #[arg(long)]
    pub minify: bool,

    /// Comment placed at the top of every artifact
    #[arg(long, value_name = "TEXT")]
    pub banner: Option<String>,
}

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Produce artifacts and print the summary without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}
