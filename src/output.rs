//! Output and Reporting
//!
//! Formats per-file validation reports as human-readable text, JSON, or a
//! one-line summary.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::cli::{OutputFormat, VerbosityLevel};
use crate::valid::{Finding, ValidationResult};

/// What happened to one file
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// The file was opened and validated
    Validated(ValidationResult),
    /// The file could not be opened or validated at all
    Failed(String),
}

/// Validation report for one file
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: ReportOutcome,
    pub duration: Duration,
}

impl FileReport {
    pub fn validated(path: impl Into<PathBuf>, result: ValidationResult, duration: Duration) -> Self {
        Self {
            path: path.into(),
            outcome: ReportOutcome::Validated(result),
            duration,
        }
    }

    pub fn failed(path: impl Into<PathBuf>, message: impl Into<String>, duration: Duration) -> Self {
        Self {
            path: path.into(),
            outcome: ReportOutcome::Failed(message.into()),
            duration,
        }
    }

    pub fn error_count(&self) -> usize {
        match &self.outcome {
            ReportOutcome::Validated(result) => result.error_count(),
            ReportOutcome::Failed(_) => 0,
        }
    }

    pub fn warning_count(&self) -> usize {
        match &self.outcome {
            ReportOutcome::Validated(result) => result.warning_count(),
            ReportOutcome::Failed(_) => 0,
        }
    }

    /// Whether this file counts as a success for the exit status
    pub fn passed(&self, fail_on_warnings: bool) -> bool {
        match &self.outcome {
            ReportOutcome::Validated(result) => {
                !result.has_errors() && !(fail_on_warnings && result.has_warnings())
            }
            ReportOutcome::Failed(_) => false,
        }
    }
}

/// Totals over a set of reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    pub files: usize,
    pub valid: usize,
    pub invalid: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl Totals {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut totals = Totals {
            files: reports.len(),
            ..Totals::default()
        };
        for report in reports {
            match &report.outcome {
                ReportOutcome::Validated(result) => {
                    if result.has_errors() {
                        totals.invalid += 1;
                    } else {
                        totals.valid += 1;
                    }
                    totals.errors += result.error_count();
                    totals.warnings += result.warning_count();
                }
                ReportOutcome::Failed(_) => totals.failed += 1,
            }
        }
        totals
    }
}

#[derive(Serialize)]
struct JsonFileReport<'a> {
    path: String,
    status: &'static str,
    duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    findings: &'a [Finding],
}

#[derive(Serialize)]
struct JsonReport<'a> {
    totals: Totals,
    files: Vec<JsonFileReport<'a>>,
}

/// Output formatter
pub struct Output {
    verbosity: VerbosityLevel,
    format: OutputFormat,
    show_colors: bool,
}

impl Output {
    pub fn new(verbosity: VerbosityLevel, format: OutputFormat) -> Self {
        Self {
            verbosity,
            format,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    /// Never emit ANSI escapes
    pub fn without_colors(mut self) -> Self {
        self.show_colors = false;
        self
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn format_reports(&self, reports: &[FileReport]) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(reports),
            OutputFormat::Json => format_json(reports),
            OutputFormat::Summary => {
                let mut output = format_totals(&Totals::from_reports(reports));
                output.push('\n');
                output
            }
        }
    }

    fn format_human(&self, reports: &[FileReport]) -> String {
        let mut output = String::new();

        for report in reports {
            let noteworthy = !matches!(
                &report.outcome,
                ReportOutcome::Validated(result) if !result.has_errors()
            );
            if self.verbosity == VerbosityLevel::Quiet && !noteworthy {
                continue;
            }
            output.push_str(&self.format_file_report(report));
            output.push('\n');
        }

        if self.verbosity >= VerbosityLevel::Normal {
            output.push_str(&self.format_summary(reports));
        }

        output
    }

    pub fn format_file_report(&self, report: &FileReport) -> String {
        let path_display = report.path.display();
        let duration_str = format_duration(report.duration);

        match &report.outcome {
            ReportOutcome::Validated(result) if result.is_empty() => {
                format!(
                    "{}  {} ({})",
                    self.colorize("✓ VALID", "32"),
                    path_display,
                    duration_str
                )
            }
            ReportOutcome::Validated(result) => {
                let label = if result.has_errors() {
                    self.colorize("✗ INVALID", "31")
                } else {
                    self.colorize("! WARNINGS", "33")
                };
                let mut output = format!(
                    "{}  {} ({}) - {}",
                    label,
                    path_display,
                    duration_str,
                    count_phrase(result.error_count(), result.warning_count())
                );

                if self.verbosity >= VerbosityLevel::Verbose {
                    for finding in result.findings() {
                        output.push_str(&format!("\n    {}", finding));
                    }
                }
                output
            }
            ReportOutcome::Failed(message) => {
                format!(
                    "{}  {} ({}) - {}",
                    self.colorize("⚠ ERROR", "33"),
                    path_display,
                    duration_str,
                    message
                )
            }
        }
    }

    fn format_summary(&self, reports: &[FileReport]) -> String {
        let totals = Totals::from_reports(reports);
        let total_duration: Duration = reports.iter().map(|r| r.duration).sum();

        let mut output = String::new();
        output.push_str("\nValidation Summary:\n");
        output.push_str(&format!("  Total files: {}\n", totals.files));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Valid:", "32"),
            totals.valid
        ));
        if totals.invalid > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Invalid:", "31"),
                totals.invalid
            ));
        }
        if totals.failed > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Failed:", "33"),
                totals.failed
            ));
        }
        output.push_str(&format!(
            "  Findings: {}\n",
            count_phrase(totals.errors, totals.warnings)
        ));
        if self.verbosity >= VerbosityLevel::Verbose {
            output.push_str(&format!("  Duration: {}\n", format_duration(total_duration)));
        }
        output
    }
}

fn format_json(reports: &[FileReport]) -> String {
    let files = reports
        .iter()
        .map(|report| {
            let (status, message, findings) = match &report.outcome {
                ReportOutcome::Validated(result) if result.has_errors() => {
                    ("invalid", None, result.findings())
                }
                ReportOutcome::Validated(result) => ("valid", None, result.findings()),
                ReportOutcome::Failed(message) => ("failed", Some(message.as_str()), &[][..]),
            };
            JsonFileReport {
                path: report.path.display().to_string(),
                status,
                duration_ms: u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
                message,
                findings,
            }
        })
        .collect();

    let report = JsonReport {
        totals: Totals::from_reports(reports),
        files,
    };
    match serde_json::to_string_pretty(&report) {
        Ok(mut json) => {
            json.push('\n');
            json
        }
        Err(e) => format!("{{\"error\": \"{}\"}}\n", e),
    }
}

fn format_totals(totals: &Totals) -> String {
    format!(
        "{} file(s): {} valid, {} invalid, {} failed; {}",
        totals.files,
        totals.valid,
        totals.invalid,
        totals.failed,
        count_phrase(totals.errors, totals.warnings)
    )
}

fn count_phrase(errors: usize, warnings: usize) -> String {
    format!(
        "{} error{}, {} warning{}",
        errors,
        if errors == 1 { "" } else { "s" },
        warnings,
        if warnings == 1 { "" } else { "s" }
    )
}

pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{:.0}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0) as u64;
        let secs = total_secs % 60.0;
        format!("{}m{:.1}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EntityKind;
    use crate::id::EntityId;

    fn create_test_reports() -> Vec<FileReport> {
        let id = EntityId::generate();
        let mut broken = ValidationResult::new();
        broken.push(Finding::error(&id, EntityKind::DataArray, "data does not match its shape!"));
        broken.push(Finding::warning(&id, EntityKind::DataArray, "some sources do not exist!"));

        vec![
            FileReport::validated("clean.nix", ValidationResult::new(), Duration::from_millis(4)),
            FileReport::validated("broken.nix", broken, Duration::from_millis(12)),
            FileReport::failed("missing.nix", "file not found", Duration::ZERO),
        ]
    }

    #[test]
    fn test_totals() {
        let totals = Totals::from_reports(&create_test_reports());
        assert_eq!(
            totals,
            Totals {
                files: 3,
                valid: 1,
                invalid: 1,
                failed: 1,
                errors: 1,
                warnings: 1,
            }
        );
    }

    #[test]
    fn test_report_passed() {
        let reports = create_test_reports();
        assert!(reports[0].passed(true));
        assert!(!reports[1].passed(false));
        assert!(!reports[2].passed(false));

        let id = EntityId::generate();
        let mut warned = ValidationResult::new();
        warned.push(Finding::warning(&id, EntityKind::Source, "metadata section does not exist!"));
        let report = FileReport::validated("warned.nix", warned, Duration::ZERO);
        assert!(report.passed(false));
        assert!(!report.passed(true));
    }

    #[test]
    fn test_human_output_summary() {
        let output = Output::new(VerbosityLevel::Normal, OutputFormat::Human).without_colors();
        let formatted = output.format_reports(&create_test_reports());
        assert!(formatted.contains("✓ VALID  clean.nix (4ms)"));
        assert!(formatted.contains("✗ INVALID  broken.nix (12ms) - 1 error, 1 warning"));
        assert!(formatted.contains("⚠ ERROR  missing.nix (0ms) - file not found"));
        assert!(formatted.contains("Validation Summary:"));
        assert!(!formatted.contains("data does not match its shape!"));
        assert!(!formatted.contains('\x1b'));
    }

    #[test]
    fn test_verbose_lists_findings() {
        let output = Output::new(VerbosityLevel::Verbose, OutputFormat::Human).without_colors();
        let formatted = output.format_reports(&create_test_reports());
        assert!(formatted.contains("data does not match its shape!"));
        assert!(formatted.contains("some sources do not exist!"));
        assert!(formatted.contains("Duration:"));
    }

    #[test]
    fn test_quiet_only_shows_problems() {
        let output = Output::new(VerbosityLevel::Quiet, OutputFormat::Human).without_colors();
        let formatted = output.format_reports(&create_test_reports());
        assert!(!formatted.contains("clean.nix"));
        assert!(formatted.contains("broken.nix"));
        assert!(formatted.contains("missing.nix"));
        assert!(!formatted.contains("Validation Summary:"));
    }

    #[test]
    fn test_json_output() {
        let output = Output::new(VerbosityLevel::Normal, OutputFormat::Json);
        let formatted = output.format_reports(&create_test_reports());
        let value: serde_json::Value = serde_json::from_str(&formatted).unwrap();

        assert_eq!(value["totals"]["files"], 3);
        assert_eq!(value["files"][0]["status"], "valid");
        assert_eq!(value["files"][1]["status"], "invalid");
        assert_eq!(value["files"][1]["findings"][0]["severity"], "error");
        assert_eq!(value["files"][2]["status"], "failed");
        assert_eq!(value["files"][2]["message"], "file not found");
    }

    #[test]
    fn test_summary_output() {
        let output = Output::new(VerbosityLevel::Verbose, OutputFormat::Summary);
        assert_eq!(
            output.format_reports(&create_test_reports()),
            "3 file(s): 1 valid, 1 invalid, 1 failed; 1 error, 1 warning\n"
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30.0s");
    }
}
