//! Output formatting for the CLI.
//!
//! Coverage results go to stdout, either as the table or as JSON.
//! Cross-check problems and errors go to stderr.

use codeowners_coverage_core::platform::{CrossCheck, Level, ProblemTable};
use codeowners_coverage_core::ValidationReport;
use colored::Colorize;
use std::io::{self, Write};

/// Printed when an existing file lacks a mandatory approver.
pub const EXISTING_FAILED: &str = "- Not all existing files have a code-owner. ❌";

/// Printed when a newly created file would lack a mandatory approver.
pub const NEWLY_CREATED_FAILED: &str =
    "- Not all possibly newly created files have a code-owner. ❌";

/// Which coverage checks failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOutcome {
    /// The existing-files check ran and failed.
    pub existing_failed: bool,
    /// The newly-created-files check ran and failed.
    pub newly_created_failed: bool,
}

impl CheckOutcome {
    /// Evaluates the requested checks against a report.
    pub fn evaluate(report: &ValidationReport, existing: bool, newly_created: bool) -> Self {
        Self {
            existing_failed: existing && !report.all_existing_files_have_mandatory_code_owner(),
            newly_created_failed: newly_created
                && !report.all_newly_created_files_have_mandatory_code_owner(),
        }
    }

    /// Returns true if any requested check failed.
    pub fn failed(&self) -> bool {
        self.existing_failed || self.newly_created_failed
    }
}

/// Output formatter for human-readable console output.
pub struct HumanOutput<W: Write> {
    writer: W,
    use_colors: bool,
}

impl<W: Write> HumanOutput<W> {
    /// Creates a new human output formatter.
    pub fn new(writer: W, use_colors: bool) -> Self {
        Self { writer, use_colors }
    }

    fn write_failure_line(&mut self, message: &str) -> io::Result<()> {
        if self.use_colors {
            writeln!(self.writer, "{}", message.red().bold())
        } else {
            writeln!(self.writer, "{}", message)
        }
    }

    /// Writes the failed checks followed by the rows that fail them.
    pub fn write_failures(
        &mut self,
        outcome: CheckOutcome,
        report: &ValidationReport,
    ) -> io::Result<()> {
        if !outcome.failed() {
            return Ok(());
        }
        if outcome.existing_failed {
            self.write_failure_line(EXISTING_FAILED)?;
        }
        if outcome.newly_created_failed {
            self.write_failure_line(NEWLY_CREATED_FAILED)?;
        }
        write!(
            self.writer,
            "The failed checks:\n{}",
            report.to_failure_table(outcome.existing_failed, outcome.newly_created_failed)
        )
    }

    /// Writes the approvers of every file.
    pub fn write_approvers(&mut self, report: &ValidationReport) -> io::Result<()> {
        write!(self.writer, "Approvers:\n{}", report.to_table())
    }

    /// Writes the structural warnings of the rules file.
    pub fn write_diagnostics(&mut self, report: &ValidationReport) -> io::Result<()> {
        for diagnostic in report.diagnostics() {
            let label = "[WARN]";
            if self.use_colors {
                writeln!(self.writer, "{} {}", label.yellow().bold(), diagnostic)?;
            } else {
                writeln!(self.writer, "{} {}", label, diagnostic)?;
            }
        }
        Ok(())
    }

    /// Writes the outcome of the cross-check.
    pub fn write_cross_check(&mut self, cross_check: &CrossCheck) -> io::Result<()> {
        match cross_check {
            CrossCheck::NotConfigured => Ok(()),
            CrossCheck::Skipped { reason } => {
                let message = format!("Platform cross-check skipped: {}", reason);
                if self.use_colors {
                    writeln!(self.writer, "{}", message.yellow())
                } else {
                    writeln!(self.writer, "{}", message)
                }
            }
            CrossCheck::Completed(problems) => self.write_problems(problems),
        }
    }

    fn write_problems(&mut self, problems: &ProblemTable) -> io::Result<()> {
        if problems.is_empty() {
            let message = "✓ Platform settings match the CODEOWNERS file";
            if self.use_colors {
                writeln!(self.writer, "{}", message.green().bold())?;
            } else {
                writeln!(self.writer, "{}", message)?;
            }
            return Ok(());
        }

        let header = format!(
            "Platform problems: {} fatal, {} error(s), {} warning(s), {} info",
            problems.count(Level::Fatal),
            problems.count(Level::Error),
            problems.count(Level::Warning),
            problems.count(Level::Info),
        );
        let severe = problems.highest_level() >= Some(Level::Error);
        match (self.use_colors, severe) {
            (true, true) => writeln!(self.writer, "{}", header.red().bold())?,
            (true, false) => writeln!(self.writer, "{}", header.yellow().bold())?,
            (false, _) => writeln!(self.writer, "{}", header)?,
        }
        write!(self.writer, "{}", problems.to_grouped_table())?;
        write!(self.writer, "{}", problems.to_table())
    }

    /// Writes a startup error.
    pub fn write_error(&mut self, message: &str) -> io::Result<()> {
        if self.use_colors {
            writeln!(self.writer, "{} {}", "Error:".red().bold(), message)
        } else {
            writeln!(self.writer, "Error: {}", message)
        }
    }
}

/// Writes the approvers of every file as a JSON array.
pub fn write_json<W: Write>(writer: &mut W, report: &ValidationReport) -> io::Result<()> {
    let json = report.to_json().map_err(io::Error::other)?;
    writeln!(writer, "{}", json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeowners_coverage_core::platform::Problem;
    use codeowners_coverage_core::resolve::{Resolver, ResolverConfig};
    use codeowners_coverage_core::rules::RuleSet;
    use codeowners_coverage_core::FileRecord;

    fn report() -> ValidationReport {
        let rules = RuleSet::parse("*.rs @rust\n").unwrap();
        let results = Resolver::new(&rules, ResolverConfig::new()).resolve_all(vec![
            FileRecord::existing("lib.rs"),
            FileRecord::existing("README.md"),
            FileRecord::probe("src"),
        ]);
        ValidationReport::new(results, Vec::new(), "CODEOWNERS")
    }

    fn render(f: impl FnOnce(&mut HumanOutput<&mut Vec<u8>>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        let mut output = HumanOutput::new(&mut buf, false);
        f(&mut output).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_outcome_only_counts_requested_checks() {
        let report = report();
        let none = CheckOutcome::evaluate(&report, false, false);
        assert!(!none.failed());

        let both = CheckOutcome::evaluate(&report, true, true);
        assert!(both.existing_failed);
        assert!(both.newly_created_failed);
    }

    #[test]
    fn test_failures_output() {
        let report = report();
        let outcome = CheckOutcome::evaluate(&report, true, false);
        let output = render(|o| o.write_failures(outcome, &report));
        assert!(output.starts_with(EXISTING_FAILED));
        assert!(output.contains("The failed checks:\n|"));
        assert!(output.contains("README.md"));
        assert!(output.contains("<-- NO APPROVERS!"));
        assert!(!output.contains("lib.rs"));
        assert!(!output.contains(NEWLY_CREATED_FAILED));
    }

    #[test]
    fn test_passing_checks_print_nothing() {
        let report = report();
        let output = render(|o| o.write_failures(CheckOutcome::default(), &report));
        assert!(output.is_empty());
    }

    #[test]
    fn test_approvers_output() {
        let report = report();
        let output = render(|o| o.write_approvers(&report));
        assert!(output.starts_with("Approvers:\n|"));
        assert!(output.contains("| lib.rs"));
        assert!(output.contains("[@rust]"));
    }

    #[test]
    fn test_json_output() {
        let mut buf = Vec::new();
        write_json(&mut buf, &report()).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 3);
        assert_eq!(parsed[2]["path"], "src/*");
    }

    #[test]
    fn test_cross_check_output() {
        let mut problems = ProblemTable::new();
        problems.add(Problem::new(
            Level::Error,
            "",
            "*.rs",
            "@ghost",
            "user does not exist",
        ));
        let output = render(|o| o.write_cross_check(&CrossCheck::Completed(problems)));
        assert!(output.contains("1 error(s)"));
        assert!(output.contains("| user does not exist | 1     | @ghost             |"));
        assert!(output.contains("| ERROR |"));
        let summary = output.find("| Message").unwrap();
        let details = output.find("| Level").unwrap();
        assert!(summary < details);

        let output = render(|o| o.write_cross_check(&CrossCheck::NotConfigured));
        assert!(output.is_empty());

        let output = render(|o| {
            o.write_cross_check(&CrossCheck::Skipped {
                reason: "Rate limit exceeded".to_string(),
            })
        });
        assert_eq!(output, "Platform cross-check skipped: Rate limit exceeded\n");
    }

    #[test]
    fn test_error_output_without_colors() {
        let output = render(|o| o.write_error("something went wrong"));
        assert_eq!(output, "Error: something went wrong\n");
    }
}
