//! Ownership resolution.
//!
//! The [`Resolver`] runs every [`FileRecord`] through the rule set and
//! records who must approve a change to it.

use crate::rules::RuleSet;
use crate::scan::FileRecord;
use log::trace;
use serde::Serialize;
use std::fmt;

/// How a file is covered by the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    /// At least one mandatory owner.
    Owned,
    /// A mandatory section matched, but its decisive rule has no owners
    /// or is negated.
    ExplicitlyUnowned,
    /// No mandatory section matched.
    Unmatched,
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Coverage::Owned => "owned",
            Coverage::ExplicitlyUnowned => "explicitly unowned",
            Coverage::Unmatched => "unmatched",
        })
    }
}

/// The rule that decided ownership of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedRule {
    /// Source line of the rule (1-based).
    pub line: usize,
    /// The pattern as written, including a leading `!`.
    pub pattern: String,
    /// The section the rule belongs to, `None` before any header.
    pub section: Option<String>,
}

/// Ownership of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnershipResult {
    /// The file the result is for.
    pub file: FileRecord,
    /// The decisive rule among mandatory sections.
    pub matched_rule: Option<MatchedRule>,
    /// Mandatory approvers, sorted and distinct.
    pub owners: Vec<String>,
    /// Every approver, optional sections included.
    pub approvers: Vec<String>,
    /// How the file is covered.
    pub coverage: Coverage,
    /// Whether the file has a mandatory approver, or counts as having one.
    pub mandatory_approver_satisfied: bool,
}

/// Options for the [`Resolver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Count explicitly unowned files as satisfied.
    pub accept_explicitly_unowned: bool,
}

impl ResolverConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether explicitly unowned files count as satisfied.
    pub fn with_accept_explicitly_unowned(mut self, accept: bool) -> Self {
        self.accept_explicitly_unowned = accept;
        self
    }
}

/// Resolves file records against a rule set.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    rules: &'a RuleSet,
    config: ResolverConfig,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver over `rules`.
    pub fn new(rules: &'a RuleSet, config: ResolverConfig) -> Self {
        Self { rules, config }
    }

    /// Resolves a single record.
    pub fn resolve(&self, file: FileRecord) -> OwnershipResult {
        let resolution = self.rules.resolve(&file.resolution_path());
        let owners = resolution.mandatory_owners();

        let coverage = if !owners.is_empty() {
            Coverage::Owned
        } else if resolution.has_mandatory_match() {
            Coverage::ExplicitlyUnowned
        } else {
            Coverage::Unmatched
        };

        let mandatory_approver_satisfied = match coverage {
            Coverage::Owned => true,
            Coverage::ExplicitlyUnowned => self.config.accept_explicitly_unowned,
            Coverage::Unmatched => false,
        };

        let matched_rule = resolution.decisive().map(|m| MatchedRule {
            line: m.rule.line,
            pattern: m.rule.text.clone(),
            section: m.section.name.clone(),
        });

        trace!("{}: {} ({} owners)", file.path, coverage, owners.len());
        OwnershipResult {
            approvers: resolution.all_owners(),
            file,
            matched_rule,
            owners,
            coverage,
            mandatory_approver_satisfied,
        }
    }

    /// Resolves records in order.
    pub fn resolve_all(&self, files: impl IntoIterator<Item = FileRecord>) -> Vec<OwnershipResult> {
        files.into_iter().map(|file| self.resolve(file)).collect()
    }
}
