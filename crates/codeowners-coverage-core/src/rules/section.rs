//! Sections and the rules they contain.

use crate::matching::{Candidate, Pattern};
use crate::parse::{Owner, Span};
use std::fmt;

/// A compiled CODEOWNERS rule.
#[derive(Debug, Clone)]
pub struct OwnershipRule {
    /// The compiled pattern, without the negation marker.
    pub pattern: Pattern,
    /// The pattern as written, including a leading `!`.
    pub text: String,
    /// Effective owners. Rules written without owners carry the default
    /// owners of their section header, if any.
    pub owners: Vec<Owner>,
    /// Whether the owners were written on the rule itself.
    pub explicit_owners: bool,
    /// Minimum approvals from the enclosing section header.
    pub min_approvals: Option<u32>,
    /// Whether the rule was written as `!pattern`.
    pub negated: bool,
    /// Source line (1-based).
    pub line: usize,
    /// Location of the pattern in the source.
    pub span: Span,
}

impl OwnershipRule {
    /// Returns the owners this rule assigns when it is the last match.
    ///
    /// A negated rule assigns nobody.
    pub fn effective_owners(&self) -> &[Owner] {
        if self.negated { &[] } else { &self.owners }
    }

    /// Returns true if this rule leaves matching paths without owners.
    pub fn is_unowned(&self) -> bool {
        self.effective_owners().is_empty()
    }
}

/// A named group of rules with its own "last match wins" scope.
///
/// Rules written before the first header belong to the implicit section,
/// which has no name, is never optional and has no default owners.
#[derive(Debug, Clone)]
pub struct Section {
    /// The section name, `None` for the implicit section.
    pub name: Option<String>,
    /// Whether the header was prefixed with `^`.
    pub optional: bool,
    /// The `[N]` approval count of the header.
    pub min_approvals: Option<u32>,
    /// Owners from the first header of this section.
    pub default_owners: Vec<Owner>,
    /// Rules in file order.
    pub rules: Vec<OwnershipRule>,
    /// Line of the first header, `None` for the implicit section.
    pub line: Option<usize>,
}

impl Section {
    /// Creates the implicit section that precedes any header.
    pub fn implicit() -> Self {
        Self {
            name: None,
            optional: false,
            min_approvals: None,
            default_owners: Vec::new(),
            rules: Vec::new(),
            line: None,
        }
    }

    /// Returns true for the section that precedes any header.
    pub fn is_implicit(&self) -> bool {
        self.name.is_none()
    }

    /// Returns true if matches in this section yield mandatory approvers.
    pub fn is_mandatory(&self) -> bool {
        !self.optional
    }

    /// Returns true if this section answers to the given header name.
    ///
    /// Section names compare case-insensitively.
    pub fn has_name(&self, name: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(name))
    }

    /// Finds the rule that decides ownership of `candidate` in this section.
    pub fn last_match(&self, candidate: &Candidate<'_>) -> Option<&OwnershipRule> {
        // last match wins, so scanning from the end stops at the winner
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.pattern.matches_candidate(candidate))
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => f.write_str(name),
            None => f.write_str("(default)"),
        }
    }
}

/// The rule that decided ownership of a path within one section.
#[derive(Debug, Clone, Copy)]
pub struct SectionMatch<'a> {
    /// The section the rule belongs to.
    pub section: &'a Section,
    /// The last matching rule in that section.
    pub rule: &'a OwnershipRule,
}

impl<'a> SectionMatch<'a> {
    /// Returns the owners this match contributes.
    pub fn owners(&self) -> &'a [Owner] {
        self.rule.effective_owners()
    }
}
