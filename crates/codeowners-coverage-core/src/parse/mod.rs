//! Parser module for CODEOWNERS files.
//!
//! This module parses CODEOWNERS files, including GitLab-style section
//! headers, into an AST with span metadata for error reporting.
//!
//! # Example
//!
//! ```rust
//! use codeowners_coverage_core::parse::parse_codeowners;
//!
//! let input = r#"
//! ## CODEOWNERS file
//! *.rs @rustacean
//! [Documentation] @docs-team
//! /docs/
//! "#;
//!
//! let result = parse_codeowners(input);
//! assert!(result.is_ok());
//! assert_eq!(result.ast.sections().count(), 1);
//! ```

mod ast;
mod error;
mod lexer;
mod parser;
pub mod span;

pub use ast::{CodeownersFile, Line, LineKind, Owner, Pattern, SectionHeader};
pub use error::{ParseError, ParseResult};
pub use lexer::{OwnerKind, classify_owner};
pub use parser::parse_codeowners;
pub use span::Span;
