//! The error type returned by analysis operations.

use crate::parse::ParseError;
use crate::platform::PlatformError;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What could not be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    /// The base directory is missing or not a directory.
    BaseDirectory,
    /// An explicitly given rules file does not exist.
    RulesFile,
    /// None of the conventional rules file locations exist.
    NoRulesFile,
    /// A change set file does not exist.
    ChangeSet,
}

impl fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NotFoundKind::BaseDirectory => "base directory",
            NotFoundKind::RulesFile => "CODEOWNERS file",
            NotFoundKind::NoRulesFile => "CODEOWNERS file",
            NotFoundKind::ChangeSet => "change set",
        })
    }
}

/// Errors that stop an analysis.
#[derive(Debug, Error)]
pub enum Error {
    /// The rules file contains malformed lines.
    #[error("failed to parse {}: {}", .path.display(), describe_parse_errors(.errors))]
    Parse {
        /// The rules file.
        path: PathBuf,
        /// Every malformed line, in file order.
        errors: Vec<ParseError>,
    },

    /// A required path does not exist.
    #[error("{}", describe_not_found(.kind, .path))]
    NotFound {
        /// What was looked for.
        kind: NotFoundKind,
        /// Where it was looked for.
        path: PathBuf,
    },

    /// Reading the tree or the rules file failed.
    #[error("{context}: {source}")]
    Analysis {
        /// What was being done.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The platform cross-check failed and was required.
    #[error("platform cross-check failed: {0}")]
    Platform(#[from] PlatformError),
}

fn describe_parse_errors(errors: &[ParseError]) -> String {
    match errors {
        [] => "no details".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}

fn describe_not_found(kind: &NotFoundKind, path: &Path) -> String {
    match kind {
        NotFoundKind::NoRulesFile => format!(
            "This project does NOT have a CODEOWNERS file (searched in {})",
            path.display()
        ),
        NotFoundKind::BaseDirectory => format!(
            "base directory {} does not exist or is not a directory",
            path.display()
        ),
        _ => format!("{} {} does not exist", kind, path.display()),
    }
}

impl Error {
    /// Creates a parse error for the given rules file.
    pub fn parse(path: impl Into<PathBuf>, errors: Vec<ParseError>) -> Self {
        Self::Parse {
            path: path.into(),
            errors,
        }
    }

    /// Creates a not found error.
    pub fn not_found(kind: NotFoundKind, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            kind,
            path: path.into(),
        }
    }

    /// Creates an analysis error wrapping an I/O failure.
    pub fn analysis(context: impl Into<String>, source: io::Error) -> Self {
        Self::Analysis {
            context: context.into(),
            source,
        }
    }

    /// Returns the line of the first parse error, if this is a parse error.
    pub fn first_error_line(&self) -> Option<usize> {
        match self {
            Error::Parse { errors, .. } => errors.first().map(ParseError::line),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Span;

    #[test]
    fn parse_error_names_file_and_first_line() {
        let errors = vec![
            ParseError::expected_owner("alice", Span::new(20, 3, 6, 5)),
            ParseError::expected_pattern(Span::new(40, 5, 1, 1)),
        ];
        let err = Error::parse("repo/CODEOWNERS", errors);
        let message = err.to_string();
        assert!(message.starts_with("failed to parse repo/CODEOWNERS: line 3"));
        assert!(message.ends_with("(and 1 more)"));
        assert_eq!(err.first_error_line(), Some(3));
    }

    #[test]
    fn missing_rules_file_message() {
        let err = Error::not_found(NotFoundKind::NoRulesFile, "/work/repo");
        assert!(
            err.to_string()
                .starts_with("This project does NOT have a CODEOWNERS file")
        );

        let err = Error::not_found(NotFoundKind::RulesFile, "custom/OWNERS");
        assert_eq!(err.to_string(), "CODEOWNERS file custom/OWNERS does not exist");
    }

    #[test]
    fn analysis_error_keeps_source() {
        let err = Error::analysis("failed to read CODEOWNERS", io::Error::other("denied"));
        assert_eq!(err.to_string(), "failed to read CODEOWNERS: denied");
        assert!(std::error::Error::source(&err).is_some());
    }
}
