//! Check command implementation.
//!
//! Validates configuration and inputs without building.

use satchel_bundler::{guess_global_name, plan};
use satchel_config::{BuildConfig, validate_fs};

use crate::cli::CheckArgs;
use crate::config;
use crate::error::Result;
use crate::ui;

/// Execute the check command.
///
/// # Validation Steps
///
/// 1. Load and validate settings
/// 2. Check the entry module and output directory
/// 3. Plan the artifacts (file names must not collide)
/// 4. Warn about externals that script builds would have to guess a global for
pub async fn execute(args: CheckArgs) -> Result<()> {
    ui::info("Checking configuration...");

    let config = config::load(&args.config)?;
    validate_fs(&config)?;
    let planned = plan(&config)?;

    ui::success(&format!("Entry {}", config.entry_path().display()));
    for artifact in &planned {
        ui::info(&format!(
            "{} -> {}",
            artifact.format,
            config.out_dir().join(&artifact.file_name).display()
        ));
    }

    for (specifier, guess) in unmapped_externals(&config) {
        ui::warning(&format!(
            "No global mapped for external \"{specifier}\"; script builds will read \"{guess}\""
        ));
    }

    ui::success("Configuration is valid!");
    Ok(())
}

/// Externals without a configured global, with the global a script build
/// would assume. Empty when no planned format reads globals.
fn unmapped_externals(config: &BuildConfig) -> Vec<(&str, String)> {
    if !config.formats().iter().any(|f| f.exposes_global()) {
        return Vec::new();
    }
    config
        .externals()
        .iter()
        .filter(|specifier| !config.globals().contains_key(specifier.as_str()))
        .map(|specifier| (specifier.as_str(), guess_global_name(specifier)))
        .collect()
}
