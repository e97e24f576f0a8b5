//! The aggregated outcome of an analysis.
//!
//! A [`ValidationReport`] holds one [`OwnershipResult`] per scanned record,
//! in discovery order, and answers the two coverage questions. Every
//! method is a view; the report never changes after it is built.

mod table;

pub use table::{StringTable, bracketed_list};

use crate::resolve::{Coverage, OwnershipResult};
use crate::rules::Diagnostic;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Marker appended to table rows without a mandatory approver.
pub const NO_APPROVERS_MARKER: &str = "<-- NO APPROVERS!";

/// Ownership of every scanned file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    results: Vec<OwnershipResult>,
    diagnostics: Vec<Diagnostic>,
    rules_file: PathBuf,
}

/// One row of the JSON rendering.
#[derive(Debug, Serialize)]
struct JsonRow<'a> {
    path: &'a str,
    existing: bool,
    newly_created: bool,
    coverage: Coverage,
    mandatory_approvers: &'a [String],
    matched_line: Option<usize>,
}

impl ValidationReport {
    /// Creates a report from results in discovery order.
    pub fn new(
        results: Vec<OwnershipResult>,
        diagnostics: Vec<Diagnostic>,
        rules_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            results,
            diagnostics,
            rules_file: rules_file.into(),
        }
    }

    /// True iff every existing file has a mandatory approver.
    pub fn all_existing_files_have_mandatory_code_owner(&self) -> bool {
        self.failures_for_existing().next().is_none()
    }

    /// True iff every newly created file has a mandatory approver.
    pub fn all_newly_created_files_have_mandatory_code_owner(&self) -> bool {
        self.failures_for_newly_created().next().is_none()
    }

    /// True iff every existing file has an approver, optional sections
    /// included.
    pub fn all_existing_files_have_any_code_owner(&self) -> bool {
        self.existing_without_any_owner().next().is_none()
    }

    /// True iff every newly created file has an approver, optional
    /// sections included.
    pub fn all_newly_created_files_have_any_code_owner(&self) -> bool {
        self.newly_created_without_any_owner().next().is_none()
    }

    /// Existing files nobody can approve.
    pub fn existing_without_any_owner(&self) -> impl Iterator<Item = &OwnershipResult> {
        self.results
            .iter()
            .filter(|r| r.file.existing && r.approvers.is_empty())
    }

    /// Newly created files nobody can approve.
    pub fn newly_created_without_any_owner(&self) -> impl Iterator<Item = &OwnershipResult> {
        self.results
            .iter()
            .filter(|r| r.file.newly_created && r.approvers.is_empty())
    }

    /// Existing files without a mandatory approver.
    pub fn failures_for_existing(&self) -> impl Iterator<Item = &OwnershipResult> {
        self.results
            .iter()
            .filter(|r| r.file.existing && !r.mandatory_approver_satisfied)
    }

    /// Newly created files without a mandatory approver.
    pub fn failures_for_newly_created(&self) -> impl Iterator<Item = &OwnershipResult> {
        self.results
            .iter()
            .filter(|r| r.file.newly_created && !r.mandatory_approver_satisfied)
    }

    /// Renders every result as a table.
    pub fn to_table(&self) -> String {
        render_table(self.results.iter())
    }

    /// Renders only the results that fail a requested check.
    pub fn to_failure_table(&self, existing: bool, newly_created: bool) -> String {
        render_table(self.results.iter().filter(|r| {
            !r.mandatory_approver_satisfied
                && ((existing && r.file.existing) || (newly_created && r.file.newly_created))
        }))
    }

    /// Renders every result as a JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let rows: Vec<JsonRow<'_>> = self
            .results
            .iter()
            .map(|r| JsonRow {
                path: &r.file.path,
                existing: r.file.existing,
                newly_created: r.file.newly_created,
                coverage: r.coverage,
                mandatory_approvers: &r.owners,
                matched_line: r.matched_rule.as_ref().map(|m| m.line),
            })
            .collect();
        serde_json::to_string_pretty(&rows)
    }

    /// Returns the results in discovery order.
    pub fn results(&self) -> &[OwnershipResult] {
        &self.results
    }

    /// Iterates over the results in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, OwnershipResult> {
        self.results.iter()
    }

    /// Returns the number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if nothing was scanned.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Returns the structural diagnostics of the rules file.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns the rules file the report was built from.
    pub fn rules_file(&self) -> &Path {
        &self.rules_file
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a OwnershipResult;
    type IntoIter = std::slice::Iter<'a, OwnershipResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn render_table<'a>(results: impl Iterator<Item = &'a OwnershipResult>) -> String {
    let mut table = StringTable::with_headers(["Path", "Mandatory Approvers"]);
    for result in results {
        let approvers = bracketed_list(&result.owners);
        if result.owners.is_empty() {
            table.add_row([result.file.path.clone(), approvers, NO_APPROVERS_MARKER.to_string()]);
        } else {
            table.add_row([result.file.path.clone(), approvers]);
        }
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{Resolver, ResolverConfig};
    use crate::rules::RuleSet;
    use crate::scan::FileRecord;

    fn report(rules: &str, files: Vec<FileRecord>) -> ValidationReport {
        let rules = RuleSet::parse(rules).unwrap();
        let results = Resolver::new(&rules, ResolverConfig::new()).resolve_all(files);
        ValidationReport::new(results, rules.diagnostics().to_vec(), "CODEOWNERS")
    }

    #[test]
    fn predicates_follow_flags() {
        let report = report(
            "*.rs @rust\n",
            vec![
                FileRecord::existing("src/lib.rs"),
                FileRecord::existing("README.md"),
                FileRecord::added("src/new.rs"),
            ],
        );
        assert!(!report.all_existing_files_have_mandatory_code_owner());
        assert!(report.all_newly_created_files_have_mandatory_code_owner());
        assert_eq!(report.failures_for_existing().count(), 1);
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn optional_owners_count_as_any_owner() {
        let report = report(
            "^[Docs] @writers\n*.md\n",
            vec![
                FileRecord::existing("README.md"),
                FileRecord::added("guide.md"),
                FileRecord::existing("lib.rs"),
            ],
        );
        assert!(!report.all_existing_files_have_mandatory_code_owner());
        assert!(!report.all_newly_created_files_have_mandatory_code_owner());
        assert!(!report.all_existing_files_have_any_code_owner());
        assert!(report.all_newly_created_files_have_any_code_owner());

        let unowned: Vec<_> = report
            .existing_without_any_owner()
            .map(|r| r.file.path.as_str())
            .collect();
        assert_eq!(unowned, vec!["lib.rs"]);
    }

    #[test]
    fn empty_rule_set_fails_existing_check() {
        let report = report("", vec![FileRecord::existing("a.txt")]);
        assert!(!report.all_existing_files_have_mandatory_code_owner());
    }

    #[test]
    fn empty_report_passes_both_checks() {
        let report = report("*.rs @rust\n", Vec::new());
        assert!(report.is_empty());
        assert!(report.all_existing_files_have_mandatory_code_owner());
        assert!(report.all_newly_created_files_have_mandatory_code_owner());
    }

    #[test]
    fn table_marks_rows_without_approvers() {
        let report = report(
            "*.rs @b @a\n",
            vec![FileRecord::existing("lib.rs"), FileRecord::existing("x.md")],
        );
        let expected = "\
|--------+---------------------|
| Path   | Mandatory Approvers |
|--------+---------------------|
| lib.rs | [@a, @b]            |
| x.md   | []                  | <-- NO APPROVERS!
|--------+---------------------|
";
        assert_eq!(report.to_table(), expected);
        assert_eq!(report.to_table(), report.to_table());
    }

    #[test]
    fn failure_table_only_lists_failing_rows() {
        let report = report(
            "*.rs @rust\n",
            vec![
                FileRecord::existing("lib.rs"),
                FileRecord::existing("x.md"),
                FileRecord::probe("docs"),
            ],
        );
        let existing = report.to_failure_table(true, false);
        assert!(existing.contains("x.md"));
        assert!(!existing.contains("lib.rs"));
        assert!(!existing.contains("docs/*"));

        let newly_created = report.to_failure_table(false, true);
        assert!(newly_created.contains("docs/*"));
        assert!(!newly_created.contains("x.md"));
    }

    #[test]
    fn json_rows() {
        let report = report(
            "*.rs @rust\n",
            vec![FileRecord::existing("lib.rs"), FileRecord::added("x.md")],
        );
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["path"], "lib.rs");
        assert_eq!(rows[0]["coverage"], "owned");
        assert_eq!(rows[0]["mandatory_approvers"][0], "@rust");
        assert_eq!(rows[0]["matched_line"], 1);
        assert_eq!(rows[1]["existing"], false);
        assert_eq!(rows[1]["newly_created"], true);
        assert_eq!(rows[1]["coverage"], "unmatched");
        assert!(rows[1]["matched_line"].is_null());
    }
}
