//! Minimal CODEOWNERS coverage check.
//!
//! Analyzes the current directory with directory probes and fails if any
//! existing or possibly newly created file lacks a mandatory approver.
//! There are no options; use `codeowners-coverage` for those.

use codeowners_coverage_core::{Analyzer, AnalyzerConfig, NewFileSource};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = AnalyzerConfig::new().with_new_files(NewFileSource::DirectoryProbes);
    let report = match Analyzer::new(config).analyze() {
        Ok(report) => report,
        Err(e) => {
            println!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut pass = true;
    if !report.all_existing_files_have_mandatory_code_owner() {
        println!("- Not all existing files have a code-owner. ❌");
        pass = false;
    }
    if !report.all_newly_created_files_have_mandatory_code_owner() {
        println!("- Not all possibly newly created files have a code-owner. ❌");
        pass = false;
    }

    if !pass {
        print!("The failed checks:\n{}", report.to_table());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
