//! Terminal output: status messages and the build summary.
//!
//! All output goes to stderr so that stdout stays free for piping.
//!
//! # Examples
//!
//! ```no_run
//! use satchel_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("Build successful");
//! ui::error("Failed to parse file");
//! ```

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, format_size, print_build_summary, render_build_summary};
pub use messages::{debug, error, info, success, warning};

static COLORS: AtomicBool = AtomicBool::new(true);

/// Decide once whether status output is colored.
///
/// `--no-color` wins; otherwise `NO_COLOR`, `FORCE_COLOR` and terminal
/// detection decide.
pub fn init_colors(no_color: bool) {
    let enabled = colors_for(no_color, crate::logger::should_use_colors());
    COLORS.store(enabled, Ordering::Relaxed);
}

fn colors_for(no_color: bool, detected: bool) -> bool {
    !no_color && detected
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}
