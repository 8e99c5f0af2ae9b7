//! Build command implementation.

use std::time::Instant;

use satchel_bundler::{BuildOutcome, Pipeline};

use crate::cli::BuildArgs;
use crate::config;
use crate::error::Result;
use crate::ui;

/// Execute the build command.
///
/// # Build Process
///
/// 1. Load configuration (flags > `SATCHEL_*` > file > defaults)
/// 2. Run the pipeline; artifacts are written only if every one succeeds
/// 3. Display the build summary
pub async fn execute(args: BuildArgs) -> Result<()> {
    let start = Instant::now();

    let config = config::load(&args.config)?;
    let formats: Vec<String> = config.formats().iter().map(|f| f.to_string()).collect();
    ui::info(&format!(
        "Building {} ({})",
        config.package_name(),
        formats.join(", ")
    ));

    let outcome = match Pipeline::new(&config)
        .write_output(!args.dry_run)
        .build()
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            ui::error("Build failed; no files were written");
            return Err(e.into());
        }
    };

    let entries = summary_entries(&outcome);
    ui::print_build_summary(&entries, start.elapsed());

    if args.dry_run {
        ui::warning("Dry run: nothing was written");
    } else {
        ui::success(&format!(
            "Wrote {} file(s) to {}",
            entries.len(),
            config.out_dir().display()
        ));
    }
    Ok(())
}

/// File name and size of every artifact and source map, in write order.
fn summary_entries(outcome: &BuildOutcome) -> Vec<(String, u64)> {
    let mut entries = Vec::with_capacity(outcome.artifacts.len() * 2);
    for artifact in &outcome.artifacts {
        entries.push((artifact.file_name.clone(), artifact.code.len() as u64));
        if let (Some(name), Some(map)) = (artifact.map_file_name(), &artifact.map) {
            entries.push((name, map.len() as u64));
        }
    }
    entries
}
