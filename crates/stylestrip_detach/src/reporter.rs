use std::{
    io::{self, Write},
    path::Path,
};

use colored::Colorize;
use log::{debug, trace};

use crate::types::{FileStatus, RunReport, RunStatus};

/// Path relative to `base` when possible, for shorter lines
fn display_path(base: &Path, path: &Path) -> String {
    path.strip_prefix(base).unwrap_or(path).to_string_lossy().to_string()
}

pub fn print_main_missing<W: Write>(writer: &mut W, report: &RunReport) -> io::Result<()> {
    debug!("Main stylesheet missing, nothing to report");
    writeln!(
        writer,
        "{} Main stylesheet not found: {}. Nothing to do.",
        "⚠".yellow().bold(),
        report.main_style.display().to_string().yellow()
    )?;
    writer.flush()?;
    Ok(())
}

/// Prints one line per stylesheet followed by a summary.
pub fn print_report<W: Write>(writer: &mut W, report: &RunReport) -> io::Result<()> {
    if report.status == RunStatus::MainStyleNotFound {
        return print_main_missing(writer, report);
    }
    debug!("Printing report for {} stylesheets", report.files.len());

    writeln!(
        writer,
        "{} Detached styles of {}\n",
        "●".bright_blue(),
        report.main_style.display().to_string().bright_white().bold()
    )?;

    for outcome in &report.files {
        let path = display_path(&report.base_dir, &outcome.path);
        trace!("Reporting outcome for {}", path);
        match &outcome.status {
            FileStatus::Deduplicated { bytes_before, bytes_after } => writeln!(
                writer,
                "{} {} ({} → {} bytes)",
                "✓".green().bold(),
                path.blue(),
                bytes_before,
                bytes_after.to_string().cyan()
            )?,
            FileStatus::Failed(err) => {
                writeln!(writer, "{} {}: {}", "✗".red().bold(), path.blue(), err.to_string().red())?
            }
        }
    }

    print_summary(writer, report)?;

    writer.flush()?;
    Ok(())
}

fn print_summary<W: Write>(writer: &mut W, report: &RunReport) -> io::Result<()> {
    let failed = report.failures().count();

    writeln!(writer, "\n{}", "─".repeat(60).dimmed())?;
    writeln!(writer, "{}", "Summary".bold())?;
    writeln!(writer, "  Deduplicated: {}", report.deduplicated_count().to_string().green().bold())?;
    if failed > 0 {
        writeln!(writer, "  Failed: {}", failed.to_string().red().bold())?;
    }
    writeln!(writer, "  Bytes saved: {}", report.bytes_saved().to_string().cyan())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileOutcome;
    use std::{path::PathBuf, time::Duration};
    use stylestrip_core::StyleError;

    fn render(report: &RunReport) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        print_report(&mut out, report).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_report_lists_each_file_relative_to_base() {
        let report = RunReport {
            main_style: PathBuf::from("/dist/common/main.wxss"),
            base_dir: PathBuf::from("/dist"),
            status: RunStatus::Completed,
            files: vec![
                FileOutcome {
                    path: PathBuf::from("/dist/pages/index.wxss"),
                    status: FileStatus::Deduplicated { bytes_before: 300, bytes_after: 40 },
                },
                FileOutcome {
                    path: PathBuf::from("/dist/pages/bad.wxss"),
                    status: FileStatus::Failed(StyleError::MalformedInput(
                        "unexpected token".to_string(),
                    )),
                },
            ],
            elapsed: Duration::from_millis(5),
        };

        let out = render(&report);
        assert!(out.contains("pages/index.wxss (300 → 40 bytes)"));
        assert!(out.contains("pages/bad.wxss: malformed stylesheet: unexpected token"));
        assert!(out.contains("Deduplicated: 1"));
        assert!(out.contains("Failed: 1"));
        assert!(out.contains("Bytes saved: 260"));
        assert!(!out.contains("/dist/pages"));
    }

    #[test]
    fn test_report_for_missing_main() {
        let report = RunReport {
            main_style: PathBuf::from("/dist/common/main.wxss"),
            base_dir: PathBuf::from("/dist"),
            status: RunStatus::MainStyleNotFound,
            files: Vec::new(),
            elapsed: Duration::ZERO,
        };

        let out = render(&report);
        assert!(out.contains("Main stylesheet not found: /dist/common/main.wxss"));
        assert!(!out.contains("Summary"));
    }

    #[test]
    fn test_summary_omits_failures_when_clean() {
        let report = RunReport {
            main_style: PathBuf::from("/dist/common/main.wxss"),
            base_dir: PathBuf::from("/dist"),
            status: RunStatus::Completed,
            files: vec![FileOutcome {
                path: PathBuf::from("/dist/pages/a.wxss"),
                status: FileStatus::Deduplicated { bytes_before: 10, bytes_after: 10 },
            }],
            elapsed: Duration::ZERO,
        };

        let out = render(&report);
        assert!(!out.contains("Failed"));
        assert!(out.contains("Bytes saved: 0"));
    }
}
