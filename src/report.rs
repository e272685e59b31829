//! Renders the human-readable run summary printed to stdout.

use std::fmt::Write;

use crate::import_manager::ImportReport;

pub fn render(report: &ImportReport) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Results for playlist '{}' (from {}):",
        report.playlist_name,
        report.source_file.display()
    );
    let _ = writeln!(out, "  matched:            {}", report.counts.matched);
    let _ = writeln!(out, "  not found:          {}", report.counts.unmatched);
    let _ = writeln!(
        out,
        "  skipped duplicates: {}",
        report.counts.skipped_duplicate
    );

    if !report.skipped.is_empty() {
        let _ = writeln!(out, "\nSkipped entries:");
        for entry in &report.skipped {
            let _ = writeln!(out, "  - {} ({})", entry.entry, entry.reason.code());
        }
    }

    let _ = writeln!(out);
    if report.created_playlist {
        if report.dry_run {
            let _ = writeln!(out, "Would create playlist '{}'.", report.playlist_name);
        } else {
            let _ = writeln!(out, "Created playlist '{}'.", report.playlist_name);
        }
    }
    if report.to_add.is_empty() {
        let _ = writeln!(out, "No tracks to add.");
    } else if report.dry_run {
        let _ = writeln!(
            out,
            "Dry run: would add {} tracks to playlist '{}'.",
            report.counts.added, report.playlist_name
        );
    } else if let Some(failure) = &report.append_failure {
        let _ = writeln!(out, "Failed to add tracks: {failure}");
    } else {
        let _ = writeln!(
            out,
            "Added {} tracks to playlist '{}'.",
            report.counts.added, report.playlist_name
        );
    }
    out
}
