//! AST data structures for CODEOWNERS files.
//!
//! This module defines the abstract syntax tree nodes that represent
//! parsed CODEOWNERS file content, including GitLab-style section headers.

use super::span::Span;
use std::borrow::Cow;
use std::fmt::{self, Display};

/// Represents a pattern in a CODEOWNERS rule.
///
/// Patterns follow gitignore syntax for matching file paths. A leading `!`
/// is stripped by the parser and recorded in `negated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// The pattern text without the negation marker (e.g., "*.rs", "/src/**", "docs/").
    pub text: String,
    /// Whether the pattern was written as `!pattern`.
    pub negated: bool,
    /// Location of the pattern in the source file.
    pub span: Span,
}

impl Pattern {
    /// Creates a new positive pattern with the given text and span.
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            negated: false,
            span,
        }
    }

    /// Creates a negated pattern (`!text`).
    pub fn negated(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            negated: true,
            span,
        }
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("!")?;
        }
        f.write_str(&self.text)
    }
}

/// Represents an owner in a CODEOWNERS rule.
///
/// Owners can be users, teams, email addresses or platform roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    /// A user (e.g., "@username").
    User {
        /// The username without the leading '@'.
        name: String,
        /// Location in the source file.
        span: Span,
    },
    /// A team (e.g., "@org/team-name" or "@group/subgroup/team").
    Team {
        /// The organization or top-level group.
        org: String,
        /// The team path within the organization.
        team: String,
        /// Location in the source file.
        span: Span,
    },
    /// An email address owner.
    Email {
        /// The email address.
        email: String,
        /// Location in the source file.
        span: Span,
    },
    /// A platform role (e.g., "@@maintainer").
    Role {
        /// The role name without the leading "@@".
        role: String,
        /// Location in the source file.
        span: Span,
    },
}

impl Owner {
    /// Creates a new user owner.
    pub fn user(name: impl Into<String>, span: Span) -> Self {
        Self::User {
            name: name.into(),
            span,
        }
    }

    /// Creates a new team owner.
    pub fn team(org: impl Into<String>, team: impl Into<String>, span: Span) -> Self {
        Self::Team {
            org: org.into(),
            team: team.into(),
            span,
        }
    }

    /// Creates a new email owner.
    pub fn email(email: impl Into<String>, span: Span) -> Self {
        Self::Email {
            email: email.into(),
            span,
        }
    }

    /// Creates a new role owner.
    pub fn role(role: impl Into<String>, span: Span) -> Self {
        Self::Role {
            role: role.into(),
            span,
        }
    }

    /// Returns the span of this owner.
    pub fn span(&self) -> &Span {
        match self {
            Owner::User { span, .. } => span,
            Owner::Team { span, .. } => span,
            Owner::Email { span, .. } => span,
            Owner::Role { span, .. } => span,
        }
    }

    /// Returns the raw text representation of this owner.
    ///
    /// Emails are borrowed; the other kinds are re-assembled with their sigil.
    pub fn as_str(&self) -> Cow<'_, str> {
        match self {
            Owner::User { name, .. } => Cow::Owned(format!("@{}", name)),
            Owner::Team { org, team, .. } => Cow::Owned(format!("@{}/{}", org, team)),
            Owner::Email { email, .. } => Cow::Borrowed(email),
            Owner::Role { role, .. } => Cow::Owned(format!("@@{}", role)),
        }
    }
}

impl Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

/// A GitLab-style section header: `^[Name][2] @default-owner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    /// The section name as written between the brackets.
    pub name: String,
    /// True when the header is prefixed with `^`.
    pub optional: bool,
    /// The `[N]` minimum approval count, if given.
    pub min_approvals: Option<u32>,
    /// Owners listed after the header; they apply to rules without owners.
    pub default_owners: Vec<Owner>,
    /// Location of the section name.
    pub span: Span,
}

impl Display for SectionHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            f.write_str("^")?;
        }
        write!(f, "[{}]", self.name)?;
        if let Some(count) = self.min_approvals {
            write!(f, "[{}]", count)?;
        }
        for owner in &self.default_owners {
            write!(f, " {}", owner)?;
        }
        Ok(())
    }
}

/// Represents the kind of line in a CODEOWNERS file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// A blank line (may contain only whitespace).
    Blank,
    /// A comment line (starts with '#').
    Comment {
        /// The comment content (without the leading '#').
        content: String,
    },
    /// A section header line.
    Section(SectionHeader),
    /// A rule line with a pattern and zero or more owners.
    Rule {
        /// The file path pattern.
        pattern: Pattern,
        /// The owners for files matching the pattern; empty means explicitly unowned.
        owners: Vec<Owner>,
    },
    /// An invalid line that couldn't be parsed.
    Invalid {
        /// The raw line content.
        raw: String,
        /// Description of what went wrong.
        error: String,
    },
}

/// Represents a single line in a CODEOWNERS file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// The kind/content of this line.
    pub kind: LineKind,
    /// Location of the entire line in the source file.
    pub span: Span,
}

impl Line {
    /// Creates a new line with the given kind and span.
    pub fn new(kind: LineKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Creates a blank line.
    pub fn blank(span: Span) -> Self {
        Self::new(LineKind::Blank, span)
    }

    /// Creates a comment line.
    pub fn comment(content: impl Into<String>, span: Span) -> Self {
        Self::new(
            LineKind::Comment {
                content: content.into(),
            },
            span,
        )
    }

    /// Creates a section header line.
    pub fn section(header: SectionHeader, span: Span) -> Self {
        Self::new(LineKind::Section(header), span)
    }

    /// Creates a rule line.
    pub fn rule(pattern: Pattern, owners: Vec<Owner>, span: Span) -> Self {
        Self::new(LineKind::Rule { pattern, owners }, span)
    }

    /// Creates an invalid line.
    pub fn invalid(raw: impl Into<String>, error: impl Into<String>, span: Span) -> Self {
        Self::new(
            LineKind::Invalid {
                raw: raw.into(),
                error: error.into(),
            },
            span,
        )
    }

    /// Returns true if this is a rule line.
    pub fn is_rule(&self) -> bool {
        matches!(self.kind, LineKind::Rule { .. })
    }

    /// Returns true if this is a section header.
    pub fn is_section(&self) -> bool {
        matches!(self.kind, LineKind::Section(_))
    }

    /// Returns true if this is a comment line.
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, LineKind::Comment { .. })
    }

    /// Returns true if this is a blank line.
    pub fn is_blank(&self) -> bool {
        matches!(self.kind, LineKind::Blank)
    }

    /// Returns true if this is an invalid line.
    pub fn is_invalid(&self) -> bool {
        matches!(self.kind, LineKind::Invalid { .. })
    }
}

impl Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LineKind::Blank => Ok(()),
            LineKind::Comment { content } => write!(f, "#{}", content),
            LineKind::Section(header) => write!(f, "{}", header),
            LineKind::Rule { pattern, owners } => {
                write!(f, "{}", pattern)?;
                for owner in owners {
                    write!(f, " {}", owner)?;
                }
                Ok(())
            }
            LineKind::Invalid { raw, .. } => f.write_str(raw),
        }
    }
}

/// The complete AST for a CODEOWNERS file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeownersFile {
    /// All lines in the file, in order.
    pub lines: Vec<Line>,
}

impl CodeownersFile {
    /// Creates a new CODEOWNERS file AST from the given lines.
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    /// Returns an iterator over all rule lines.
    pub fn rules(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(|line| line.is_rule())
    }

    /// Returns an iterator over all section headers.
    pub fn sections(&self) -> impl Iterator<Item = &SectionHeader> {
        self.lines.iter().filter_map(|line| match &line.kind {
            LineKind::Section(header) => Some(header),
            _ => None,
        })
    }

    /// Returns true if there are any invalid lines.
    pub fn has_errors(&self) -> bool {
        self.lines.iter().any(|line| line.is_invalid())
    }

    /// Extracts all rules as (pattern, owners) pairs, ignoring sections.
    pub fn extract_rules(&self) -> Vec<(&Pattern, &[Owner])> {
        self.lines
            .iter()
            .filter_map(|line| match &line.kind {
                LineKind::Rule { pattern, owners } => Some((pattern, owners.as_slice())),
                _ => None,
            })
            .collect()
    }
}

impl Display for CodeownersFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
