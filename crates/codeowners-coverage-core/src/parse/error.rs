//! Error types for CODEOWNERS file parsing.
//!
//! This module defines error types that capture parse failures
//! along with their source locations.

use super::ast::CodeownersFile;
use super::span::Span;
use thiserror::Error;

/// An error that occurred while parsing or compiling a single line.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A line could not be parsed.
    #[error("line {line}: {message}")]
    InvalidLine {
        /// The line number where the error occurred (1-based).
        line: usize,
        /// Description of the error.
        message: String,
        /// Location in the source.
        span: Span,
    },

    /// Expected an owner but found something else.
    #[error(
        "line {line}, column {column}: expected owner (e.g., @user, @org/team, @@role or email), found '{token}'"
    )]
    ExpectedOwner {
        /// The line number (1-based).
        line: usize,
        /// The column number (1-based).
        column: usize,
        /// The offending token.
        token: String,
        /// Location in the source.
        span: Span,
    },

    /// Expected a pattern but found something else.
    #[error("line {line}, column {column}: expected file pattern")]
    ExpectedPattern {
        /// The line number (1-based).
        line: usize,
        /// The column number (1-based).
        column: usize,
        /// Location in the source.
        span: Span,
    },

    /// The pattern is not valid glob syntax.
    #[error("line {line}: invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The line number (1-based).
        line: usize,
        /// The pattern text.
        pattern: String,
        /// Why the pattern could not be compiled.
        reason: String,
        /// Location of the pattern.
        span: Span,
    },

    /// A section header is malformed.
    #[error("line {line}: invalid section header: {message}")]
    InvalidSection {
        /// The line number (1-based).
        line: usize,
        /// Description of the problem.
        message: String,
        /// Location of the header.
        span: Span,
    },

    /// A negated pattern was given owners.
    #[error("line {line}: negated pattern '!{pattern}' cannot have owners")]
    NegatedWithOwners {
        /// The line number (1-based).
        line: usize,
        /// The pattern text without '!'.
        pattern: String,
        /// Location of the pattern.
        span: Span,
    },
}

impl ParseError {
    /// Creates an invalid line error.
    pub fn invalid_line(message: impl Into<String>, span: Span) -> Self {
        Self::InvalidLine {
            line: span.line,
            message: message.into(),
            span,
        }
    }

    /// Creates an expected owner error.
    pub fn expected_owner(token: impl Into<String>, span: Span) -> Self {
        Self::ExpectedOwner {
            line: span.line,
            column: span.column,
            token: token.into(),
            span,
        }
    }

    /// Creates an expected pattern error.
    pub fn expected_pattern(span: Span) -> Self {
        Self::ExpectedPattern {
            line: span.line,
            column: span.column,
            span,
        }
    }

    /// Creates an invalid pattern error.
    pub fn invalid_pattern(
        pattern: impl Into<String>,
        reason: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::InvalidPattern {
            line: span.line,
            pattern: pattern.into(),
            reason: reason.into(),
            span,
        }
    }

    /// Creates an invalid section error.
    pub fn invalid_section(message: impl Into<String>, span: Span) -> Self {
        Self::InvalidSection {
            line: span.line,
            message: message.into(),
            span,
        }
    }

    /// Creates a negated-with-owners error.
    pub fn negated_with_owners(pattern: impl Into<String>, span: Span) -> Self {
        Self::NegatedWithOwners {
            line: span.line,
            pattern: pattern.into(),
            span,
        }
    }

    /// Returns the span associated with this error.
    pub fn span(&self) -> &Span {
        match self {
            ParseError::InvalidLine { span, .. } => span,
            ParseError::ExpectedOwner { span, .. } => span,
            ParseError::ExpectedPattern { span, .. } => span,
            ParseError::InvalidPattern { span, .. } => span,
            ParseError::InvalidSection { span, .. } => span,
            ParseError::NegatedWithOwners { span, .. } => span,
        }
    }

    /// Returns the line number where this error occurred.
    pub fn line(&self) -> usize {
        self.span().line
    }
}

/// The result of parsing a CODEOWNERS file.
///
/// Parsing is lenient: every line is visited and all errors are collected.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The parsed AST; lines that failed are kept as `LineKind::Invalid`.
    pub ast: CodeownersFile,
    /// Any errors encountered during parsing.
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Creates a successful parse result with no errors.
    pub fn ok(ast: CodeownersFile) -> Self {
        Self {
            ast,
            errors: Vec::new(),
        }
    }

    /// Creates a parse result with errors.
    pub fn with_errors(ast: CodeownersFile, errors: Vec<ParseError>) -> Self {
        Self { ast, errors }
    }

    /// Returns true if parsing succeeded without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if there were parse errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Converts into the AST, or the collected errors if there were any.
    pub fn into_result(self) -> Result<CodeownersFile, Vec<ParseError>> {
        if self.errors.is_empty() {
            Ok(self.ast)
        } else {
            Err(self.errors)
        }
    }
}
