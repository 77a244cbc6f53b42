//! Output formatting for CLI display.

use std::path::Path;

use crate::cleanup::CleanupReport;
use crate::create::CreateReport;
use crate::model::GridObject;

/// One line per object; `dry_run` prefixes each with "Would create".
pub(super) fn format_plan(objects: &[GridObject], dry_run: bool) -> String {
    let prefix = if dry_run { "Would create " } else { "" };
    let mut out: String = objects
        .iter()
        .map(|object| format!("{prefix}{object}\n"))
        .collect();
    out.push_str(&format!("{} object(s)\n", objects.len()));
    out
}

pub(super) fn format_create_report(report: &CreateReport, total: usize, log: &Path) -> String {
    let mut lines = vec![format!(
        "Created {}/{total} object(s), logged to {}",
        report.created,
        log.display()
    )];
    if !report.failures.is_empty() {
        lines.push(format!("Failed to create {}:", report.failures.len()));
        lines.extend(
            report
                .failures
                .iter()
                .map(|failure| format!("  {}: {}", failure.object, failure.error)),
        );
    }
    lines.join("\n") + "\n"
}

pub(super) fn format_cleanup_report(report: &CleanupReport, log: &Path) -> String {
    let mut lines = vec![format!("Deleted {} object(s)", report.deleted)];
    if report.remaining() == 0 {
        lines.push(format!("All objects deleted. Cleared {}.", log.display()));
        return lines.join("\n") + "\n";
    }
    if !report.failures.is_empty() {
        lines.push(format!("Failed to delete {}:", report.failures.len()));
        lines.extend(
            report
                .failures
                .iter()
                .map(|failure| format!("  {}: {}", failure.object, failure.error)),
        );
    }
    if report.unreadable > 0 {
        lines.push(format!("Kept {} unreadable line(s).", report.unreadable));
    }
    lines.push(format!(
        "{} left in {}. Run cleanup again to retry.",
        report.remaining(),
        log.display()
    ));
    lines.join("\n") + "\n"
}
