//! CLI output formatting for the run report.

use aip_core::CompileReport;
use anyhow::Result;

/// Prints the report as pretty JSON on stdout.
pub(crate) fn print_json_report(report: &CompileReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Prints a human-readable summary on stdout.
pub(crate) fn print_completion_summary(report: &CompileReport) {
    for line in summary_lines(report) {
        println!("{line}");
    }
}

fn summary_lines(report: &CompileReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Compiled {} ({} pages from {} parts, AIP {})",
        report.output.display(),
        report.pages,
        report.fetched - report.skipped,
        report.period
    )];

    for group in &report.groups {
        match group.period {
            Some(period) if period != report.period => lines.push(format!(
                "  {}: {} file(s) from {period}",
                group.group, group.files
            )),
            Some(_) => {}
            None => lines.push(format!("  {}: not found, omitted", group.group)),
        }
        if group.interrupted {
            lines.push(format!(
                "  {}: later files unreachable, series may be incomplete",
                group.group
            ));
        }
    }

    if report.failed > 0 {
        lines.push(format!("  {} download(s) failed; see the log", report.failed));
    }
    if report.skipped > 0 {
        lines.push(format!(
            "  {} unreadable part(s) skipped; see the log",
            report.skipped
        ));
    }
    lines
}
