//! Sizes, durations and the build summary table.

use std::fmt::Write as _;
use std::time::Duration;

use console::Term;
use owo_colors::OwoColorize;

/// Human-readable size: whole bytes below 1 KB, two decimals above.
///
/// ```
/// use satchel_cli::ui::format_size;
///
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for &next in &UNITS[1..] {
        if size < 1024.0 {
            break;
        }
        size /= 1024.0;
        unit = next;
    }
    format!("{size:.2} {unit}")
}

/// `50ms`, `1.50s` or `2m 5s`.
pub fn format_duration(duration: Duration) -> String {
    match duration.as_millis() {
        ms @ 0..1000 => format!("{ms}ms"),
        1000..60_000 => format!("{:.2}s", duration.as_secs_f64()),
        _ => {
            let secs = duration.as_secs();
            format!("{}m {}s", secs / 60, secs % 60)
        }
    }
}

/// Print the artifacts of a build with their sizes, then the total.
pub fn print_build_summary(entries: &[(String, u64)], elapsed: Duration) {
    let width = (Term::stderr().size().1 as usize).min(80);
    eprint!(
        "{}",
        render_build_summary(entries, elapsed, super::colors_enabled(), width)
    );
}

/// The summary table as printed, with rules `width` columns wide.
pub fn render_build_summary(
    entries: &[(String, u64)],
    elapsed: Duration,
    colors: bool,
    width: usize,
) -> String {
    let rule = "─".repeat(width);
    let mut out = String::new();

    if colors {
        let _ = writeln!(out, "\n{}", "Build Summary".bold().underline());
    } else {
        let _ = writeln!(out, "\nBuild Summary");
    }
    let _ = writeln!(out, "{rule}");

    let name_width = entries.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, size) in entries {
        let padded = format!("{name:<name_width$}");
        let size = format_size(*size);
        if colors {
            let _ = writeln!(
                out,
                "  {} {}  {}",
                "▸".blue(),
                padded.bright_white().bold(),
                size.dimmed()
            );
        } else {
            let _ = writeln!(out, "  ▸ {padded}  {size}");
        }
    }

    let _ = writeln!(out, "{rule}");

    let total: u64 = entries.iter().map(|(_, size)| size).sum();
    let (total, elapsed) = (format_size(total), format_duration(elapsed));
    if colors {
        let _ = writeln!(out, "  {} {} in {}", "Total:".bold(), total.green(), elapsed.green());
    } else {
        let _ = writeln!(out, "  Total: {total} in {elapsed}");
    }
    out
}
