//! Structural diagnostics for a compiled rule set.
//!
//! Diagnostics never make loading fail; they point at rules that are legal
//! but probably not what the author meant.

use crate::parse::Span;
use serde::Serialize;
use thiserror::Error;

/// A structural finding in a CODEOWNERS file.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An optional section declares an approval count that is never enforced.
    #[error(
        "line {line}: optional section '{section}' requires {count} approvals, which has no effect"
    )]
    OptionalSectionWithApprovals {
        /// The line of the section header (1-based).
        line: usize,
        /// The section name.
        section: String,
        /// The declared approval count.
        count: u32,
        /// Location of the section name.
        span: Span,
    },

    /// The same pattern appears more than once in one section.
    #[error(
        "line {line}: duplicate pattern '{pattern}' in section '{section}' (first defined on line {first_line})"
    )]
    DuplicatePattern {
        /// The line of the repeated pattern (1-based).
        line: usize,
        /// The pattern text.
        pattern: String,
        /// The section both rules belong to.
        section: String,
        /// The line where the pattern was first defined.
        first_line: usize,
        /// Location of the repeated pattern.
        span: Span,
    },

    /// A section is declared again with a different optional flag.
    #[error(
        "line {line}: section '{section}' is redeclared as {redeclared}, but line {first_line} declares it {declared}"
    )]
    ConflictingSectionFlags {
        /// The line of the redeclaring header (1-based).
        line: usize,
        /// The section name.
        section: String,
        /// How the first header declared the section.
        declared: &'static str,
        /// How this header declares it.
        redeclared: &'static str,
        /// The line of the first header.
        first_line: usize,
        /// Location of the redeclaring header.
        span: Span,
    },
}

fn optionality(optional: bool) -> &'static str {
    if optional { "optional" } else { "required" }
}

impl Diagnostic {
    /// Creates an optional-section-with-approvals diagnostic.
    pub fn optional_section_with_approvals(
        section: impl Into<String>,
        count: u32,
        span: Span,
    ) -> Self {
        Self::OptionalSectionWithApprovals {
            line: span.line,
            section: section.into(),
            count,
            span,
        }
    }

    /// Creates a duplicate pattern diagnostic.
    pub fn duplicate_pattern(
        pattern: impl Into<String>,
        section: impl Into<String>,
        span: Span,
        first_line: usize,
    ) -> Self {
        Self::DuplicatePattern {
            line: span.line,
            pattern: pattern.into(),
            section: section.into(),
            first_line,
            span,
        }
    }

    /// Creates a conflicting section flags diagnostic.
    pub fn conflicting_section_flags(
        section: impl Into<String>,
        first_optional: bool,
        first_line: usize,
        span: Span,
    ) -> Self {
        Self::ConflictingSectionFlags {
            line: span.line,
            section: section.into(),
            declared: optionality(first_optional),
            redeclared: optionality(!first_optional),
            first_line,
            span,
        }
    }

    /// Returns the span associated with this diagnostic.
    pub fn span(&self) -> &Span {
        match self {
            Diagnostic::OptionalSectionWithApprovals { span, .. } => span,
            Diagnostic::DuplicatePattern { span, .. } => span,
            Diagnostic::ConflictingSectionFlags { span, .. } => span,
        }
    }

    /// Returns the line number this diagnostic refers to.
    pub fn line(&self) -> usize {
        self.span().line
    }
}
