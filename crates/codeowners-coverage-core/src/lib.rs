//! CODEOWNERS Coverage Core
//!
//! A library that checks whether every file of a repository has a
//! mandatory code owner according to its CODEOWNERS file.
//!
//! # Features
//!
//! - **Rules**: Parse CODEOWNERS files with GitLab-style sections, default
//!   owners and negated patterns
//! - **Resolution**: Last match wins within each section; mandatory owners
//!   are the union over all non-optional sections
//! - **Newly created files**: Check files a change adds, or one probe per
//!   directory standing for "any new file here"
//! - **Platform cross-check**: Optionally verify branch protection and
//!   owners against the hosting platform
//!
//! # Quick Start
//!
//! ```rust
//! use codeowners_coverage_core::rules::RuleSet;
//!
//! let rules = RuleSet::parse("*.rs @rustacean\n/docs/ @acme/docs-team\n").unwrap();
//!
//! let resolution = rules.resolve("docs/guide.md");
//! assert_eq!(resolution.mandatory_owners(), vec!["@acme/docs-team"]);
//! assert!(rules.resolve("README").mandatory_owners().is_empty());
//! ```
//!
//! Whole repositories are analyzed with an [`Analyzer`]:
//!
//! ```no_run
//! use codeowners_coverage_core::{Analyzer, AnalyzerConfig, NewFileSource};
//!
//! let config = AnalyzerConfig::new()
//!     .with_base_dir("/path/to/repo")
//!     .with_new_files(NewFileSource::DirectoryProbes);
//! let report = Analyzer::new(config).analyze()?;
//!
//! if !report.all_existing_files_have_mandatory_code_owner() {
//!     print!("{}", report.to_failure_table(true, false));
//! }
//! # Ok::<(), codeowners_coverage_core::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`parse`]: Parser for CODEOWNERS files
//! - [`matching`]: Pattern matching for CODEOWNERS patterns
//! - [`rules`]: Compiled rule sets and sections
//! - [`scan`]: Repository scanning and change sets
//! - [`resolve`]: Per-file ownership resolution
//! - [`report`]: Aggregated results and their renderings
//! - [`platform`]: Cross-checking against the hosting platform

mod analyzer;
mod error;
#[cfg(feature = "generate")]
pub mod generate;
pub mod matching;
pub mod parse;
pub mod platform;
pub mod report;
pub mod resolve;
pub mod rules;
pub mod scan;

// Re-export commonly used types at the crate root
pub use analyzer::{
    Analysis, Analyzer, AnalyzerConfig, CODEOWNERS_LOCATIONS, find_codeowners_file, load_rules,
};
pub use error::{Error, NotFoundKind};
pub use parse::{CodeownersFile, ParseError, parse_codeowners};
pub use platform::{CrossCheck, CrossCheckConfig, FailLevel, Platform, PlatformClient};
pub use report::ValidationReport;
pub use resolve::{Coverage, OwnershipResult, ResolverConfig};
pub use rules::RuleSet;
pub use scan::{ChangeSet, FileRecord, NewFileSource};
