//! Loading a [`BuildConfig`] for a command.
//!
//! Priority, highest first: command-line flags, `SATCHEL_*` variables, the
//! config file, built-in defaults. Flags are merged into the same figment
//! that [`ConfigDiscovery`] assembles, so they are validated exactly like
//! file settings.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::Serialized;
use indexmap::IndexMap;
use satchel_config::{BuildConfig, ConfigDiscovery, DefineSource, OutputFormat, Platform};

use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use crate::ui;

/// Resolve the project root and load its validated configuration.
pub fn load(args: &ConfigArgs) -> Result<BuildConfig> {
    let root = project_root(args.root.as_deref())?;
    let discovery = ConfigDiscovery::new(&root);

    if let Some(source) = args.config.as_ref().map(|p| root.join(p)).or_else(|| {
        discovery.find().map(|source| source.path().to_path_buf())
    }) {
        ui::debug(&format!("Using configuration from {}", source.display()));
    }

    let figment = apply_overrides(discovery.figment(args.config.as_deref())?, args);
    let library = satchel_config::extract(figment)?;
    Ok(library.into_build_config(&root)?)
}

fn project_root(explicit: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let Some(explicit) = explicit else {
        return Ok(cwd);
    };
    let root = cwd.join(explicit);
    if !root.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "--root {} is not a directory",
            explicit.display()
        )));
    }
    Ok(root)
}

/// Merge every flag that was given on top of `figment`.
///
/// `--external` adds to the configured list; every other flag replaces the
/// setting it names. Map flags (`--global`, `--alias`, `--define`) replace
/// individual keys.
pub fn apply_overrides(mut figment: Figment, args: &ConfigArgs) -> Figment {
    if let Some(entry) = &args.entry {
        figment = figment.merge(Serialized::default("entry", entry));
    }
    if let Some(name) = &args.name {
        figment = figment.merge(Serialized::default("name", name));
    }
    if let Some(global_name) = &args.global_name {
        figment = figment.merge(Serialized::default("globalName", global_name));
    }
    if !args.formats.is_empty() {
        let formats: Vec<OutputFormat> = args.formats.iter().map(|&f| f.into()).collect();
        figment = figment.merge(Serialized::default("formats", formats));
    }
    if let Some(out_dir) = &args.out_dir {
        figment = figment.merge(Serialized::default("outDir", out_dir));
    }
    if !args.external.is_empty() {
        figment = figment.admerge(Serialized::default("external", &args.external));
    }
    if !args.globals.is_empty() {
        let globals: IndexMap<&str, &str> = args
            .globals
            .iter()
            .map(|(specifier, global)| (specifier.as_str(), global.as_str()))
            .collect();
        figment = figment.merge(Serialized::default("globals", globals));
    }
    if !args.alias.is_empty() {
        let alias: IndexMap<&str, &Path> = args
            .alias
            .iter()
            .map(|(prefix, dir)| (prefix.as_str(), dir.as_path()))
            .collect();
        figment = figment.merge(Serialized::default("alias", alias));
    }
    if !args.define.is_empty() {
        let define: IndexMap<&str, DefineSource> = args
            .define
            .iter()
            .map(|(token, value)| (token.as_str(), DefineSource::literal(value.clone())))
            .collect();
        figment = figment.merge(Serialized::default("define", define));
    }
    if let Some(platform) = args.platform {
        figment = figment.merge(Serialized::default("platform", Platform::from(platform)));
    }
    if args.sourcemap {
        figment = figment.merge(Serialized::default("sourcemap", true));
    }
    if args.minify {
        figment = figment.merge(Serialized::default("minify", true));
    }
    if let Some(banner) = &args.banner {
        figment = figment.merge(Serialized::default("banner", banner));
    }
    figment
}
