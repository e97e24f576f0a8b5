//! Leveled findings of the platform cross-check.

use crate::report::StringTable;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// How serious a [`Problem`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Informational only.
    Info,
    /// Probably a mistake, but approvals still work.
    Warning,
    /// Approvals will not work as written.
    Error,
    /// The rules file asks for something the platform cannot do.
    Fatal,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Info => "INFO",
            Level::Warning => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        })
    }
}

/// The lowest problem level that fails a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailLevel {
    /// Problems never fail the run.
    Never,
    /// Only fatal problems fail the run.
    Fatal,
    /// Errors and fatal problems fail the run.
    #[default]
    Error,
    /// Warnings and worse fail the run.
    Warning,
}

impl FailLevel {
    /// Returns the lowest failing level, `None` when nothing fails.
    pub fn threshold(self) -> Option<Level> {
        match self {
            FailLevel::Never => None,
            FailLevel::Fatal => Some(Level::Fatal),
            FailLevel::Error => Some(Level::Error),
            FailLevel::Warning => Some(Level::Warning),
        }
    }
}

impl FromStr for FailLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "never" => Ok(FailLevel::Never),
            "fatal" => Ok(FailLevel::Fatal),
            "error" => Ok(FailLevel::Error),
            "warning" | "warn" => Ok(FailLevel::Warning),
            other => Err(format!(
                "unknown fail level '{}' (expected never, fatal, error or warning)",
                other
            )),
        }
    }
}

/// One finding of the cross-check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Problem {
    /// How serious the finding is.
    pub level: Level,
    /// The section the finding is about; empty when not section specific.
    pub section: String,
    /// The pattern the finding is about; empty when not rule specific.
    pub expression: String,
    /// The approver the finding is about; empty when not owner specific.
    pub approver: String,
    /// What is wrong.
    pub description: String,
}

impl Problem {
    /// Creates a problem.
    pub fn new(
        level: Level,
        section: impl Into<String>,
        expression: impl Into<String>,
        approver: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            level,
            section: section.into(),
            expression: expression.into(),
            approver: approver.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.description)?;
        if !self.approver.is_empty() {
            write!(f, " ({})", self.approver)?;
        }
        if !self.expression.is_empty() {
            write!(f, " in rule '{}'", self.expression)?;
        }
        Ok(())
    }
}

/// The findings of one cross-check, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProblemTable {
    problems: Vec<Problem>,
}

impl ProblemTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a problem unless the same one is already present.
    pub fn add(&mut self, problem: Problem) {
        if !self.problems.contains(&problem) {
            self.problems.push(problem);
        }
    }

    /// Returns all problems.
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// Returns true if the table holds the given problem.
    pub fn contains(&self, problem: &Problem) -> bool {
        self.problems.contains(problem)
    }

    /// Returns the number of problems.
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    /// Returns true if no problem was found.
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// Counts the problems of one level.
    pub fn count(&self, level: Level) -> usize {
        self.problems.iter().filter(|p| p.level == level).count()
    }

    /// Returns the most serious level present.
    pub fn highest_level(&self) -> Option<Level> {
        self.problems.iter().map(|p| p.level).max()
    }

    /// Returns true if any problem is at or above the fail level.
    pub fn exceeds(&self, fail_level: FailLevel) -> bool {
        match (fail_level.threshold(), self.highest_level()) {
            (Some(threshold), Some(highest)) => highest >= threshold,
            _ => false,
        }
    }

    /// Renders the problems as a table.
    pub fn to_table(&self) -> String {
        let mut table =
            StringTable::with_headers(["Level", "Section", "Expression", "Approver", "Problem"]);
        for problem in &self.problems {
            table.add_row([
                problem.level.to_string(),
                problem.section.clone(),
                problem.expression.clone(),
                problem.approver.clone(),
                problem.description.clone(),
            ]);
        }
        table.to_string()
    }

    /// Renders one row per distinct problem message, sorted by message,
    /// with the number of findings and the affected approvers.
    pub fn to_grouped_table(&self) -> String {
        let mut groups: BTreeMap<&str, (usize, BTreeSet<&str>)> = BTreeMap::new();
        for problem in &self.problems {
            let (count, approvers) = groups.entry(problem.description.as_str()).or_default();
            *count += 1;
            if !problem.approver.is_empty() {
                approvers.insert(problem.approver.as_str());
            }
        }

        let mut table = StringTable::with_headers(["Message", "Count", "Affected approvers"]);
        for (message, (count, approvers)) in groups {
            table.add_row([
                message.to_string(),
                count.to_string(),
                approvers.into_iter().collect::<Vec<_>>().join(", "),
            ]);
        }
        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ProblemTable {
        let mut table = ProblemTable::new();
        table.add(Problem::new(Level::Info, "Docs", "*.md", "a@example.com", "unverified"));
        table.add(Problem::new(Level::Warning, "Docs", "*.md", "@x", "unauthorized"));
        table
    }

    #[test]
    fn exceeds_follows_fail_level() {
        let table = table();
        assert!(!table.exceeds(FailLevel::Never));
        assert!(!table.exceeds(FailLevel::Fatal));
        assert!(!table.exceeds(FailLevel::Error));
        assert!(table.exceeds(FailLevel::Warning));

        assert!(!ProblemTable::new().exceeds(FailLevel::Warning));
    }

    #[test]
    fn duplicate_problems_are_dropped() {
        let mut table = table();
        table.add(Problem::new(Level::Warning, "Docs", "*.md", "@x", "unauthorized"));
        assert_eq!(table.len(), 2);
        assert_eq!(table.count(Level::Warning), 1);
        assert_eq!(table.highest_level(), Some(Level::Warning));
    }

    #[test]
    fn fail_level_from_str() {
        assert_eq!("never".parse::<FailLevel>().unwrap(), FailLevel::Never);
        assert_eq!("WARN".parse::<FailLevel>().unwrap(), FailLevel::Warning);
        assert!("loud".parse::<FailLevel>().is_err());
        assert_eq!(FailLevel::default(), FailLevel::Error);
    }

    #[test]
    fn table_rendering_lists_levels() {
        let rendered = table().to_table();
        assert!(rendered.contains("| Level | Section |"));
        assert!(rendered.contains("| INFO  |"));
        assert!(rendered.contains("| WARN  |"));
    }

    #[test]
    fn grouped_table_counts_per_message() {
        let mut table = table();
        table.add(Problem::new(Level::Error, "", "*.rs", "@ghost", "user does not exist"));
        table.add(Problem::new(Level::Error, "", "/src/", "@ghost", "user does not exist"));
        table.add(Problem::new(Level::Error, "", "/lib/", "@alice", "user does not exist"));

        let rendered = table.to_grouped_table();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[1], "| Message             | Count | Affected approvers |");
        assert_eq!(lines[3], "| unauthorized        | 1     | @x                 |");
        assert_eq!(lines[4], "| unverified          | 1     | a@example.com      |");
        assert_eq!(lines[5], "| user does not exist | 3     | @alice, @ghost     |");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn problem_display() {
        let problem = Problem::new(Level::Error, "", "/src/", "", "no valid approvers for rule");
        assert_eq!(
            problem.to_string(),
            "[ERROR] no valid approvers for rule in rule '/src/'"
        );
    }
}
