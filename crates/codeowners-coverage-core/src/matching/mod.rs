//! Pattern matching for CODEOWNERS files.
//!
//! This module implements the gitignore-style pattern matching used by
//! CODEOWNERS files. Patterns follow these rules:
//!
//! - `*` matches any sequence of non-slash characters
//! - `**` matches any sequence including slashes (any path)
//! - `?` matches a single non-slash character
//! - `/` at the start anchors to the base directory
//! - `/` at the end matches only directories (and everything beneath them)
//! - Patterns without a leading `/` match at any depth
//! - A pattern that names a directory also matches everything beneath it,
//!   except when its last segment is a bare `*` (`docs/*` covers direct
//!   children only)
//!
//! Matching is purely lexical; the filesystem is never consulted.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

pub use globset::Candidate;

/// A compiled CODEOWNERS pattern that can match file paths.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// The original pattern string.
    original: String,
    /// The compiled globs; a path matches if any of them does.
    matcher: GlobSet,
    /// Whether this pattern is anchored to the base directory.
    anchored: bool,
    /// Whether this pattern matches only directories.
    directory_only: bool,
}

impl Pattern {
    /// Compiles a CODEOWNERS pattern for matching.
    ///
    /// The pattern must not carry a negation marker; polarity is tracked by
    /// the rule set. Fails on invalid glob syntax such as an unclosed `[`.
    pub fn new(pattern: &str) -> Result<Self, globset::Error> {
        let normalized = normalize_pattern(pattern);

        let mut builder = GlobSetBuilder::new();
        for glob in &normalized.globs {
            // literal_separator keeps `*` and `?` from crossing `/`
            builder.add(
                GlobBuilder::new(glob)
                    .literal_separator(true)
                    .backslash_escape(true)
                    .build()?,
            );
        }

        Ok(Self {
            original: pattern.to_string(),
            matcher: builder.build()?,
            anchored: normalized.anchored,
            directory_only: normalized.directory_only,
        })
    }

    /// Returns the original pattern string.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Returns true if this pattern is anchored to the base directory.
    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Returns true if this pattern matches only directories.
    pub fn is_directory_only(&self) -> bool {
        self.directory_only
    }

    /// Checks if this pattern matches the given path.
    ///
    /// The path should be relative to the base directory and use forward slashes.
    pub fn matches(&self, path: &str) -> bool {
        let path = path.strip_prefix('/').unwrap_or(path);
        self.matcher.is_match(path)
    }

    /// Checks a pre-parsed candidate path.
    ///
    /// Use this when testing one path against many patterns.
    pub fn matches_candidate(&self, candidate: &Candidate<'_>) -> bool {
        self.matcher.is_match_candidate(candidate)
    }
}

/// A pattern rewritten into globset syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NormalizedPattern {
    globs: Vec<String>,
    anchored: bool,
    directory_only: bool,
}

/// Normalizes a CODEOWNERS pattern into one or more glob patterns.
fn normalize_pattern(pattern: &str) -> NormalizedPattern {
    let directory_only = pattern.ends_with('/');
    let trimmed = pattern.trim_end_matches('/');

    let anchored = trimmed.starts_with('/');
    let body = trimmed.trim_start_matches('/');

    if body.is_empty() {
        // "/" on its own covers the whole tree
        return NormalizedPattern {
            globs: vec!["**".to_string()],
            anchored,
            directory_only,
        };
    }

    let base = if anchored || body.starts_with("**/") || body == "**" {
        body.to_string()
    } else {
        format!("**/{}", body)
    };

    let last_segment = base.rsplit('/').next().unwrap_or(base.as_str());
    let globs = if directory_only {
        vec![format!("{}/**", base)]
    } else if last_segment == "**" || trimmed.ends_with("/*") {
        // `/*` and `dir/*` stop at direct children
        vec![base]
    } else {
        let beneath = format!("{}/**", base);
        vec![base, beneath]
    };

    NormalizedPattern {
        globs,
        anchored,
        directory_only,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_simple_wildcard() {
        let pattern = Pattern::new("*.rs").unwrap();
        assert!(pattern.matches("main.rs"));
        assert!(pattern.matches("src/lib.rs"));
        assert!(pattern.matches("src/parse/mod.rs"));
        assert!(!pattern.matches("main.txt"));
    }

    #[test]
    fn pattern_anchored() {
        let pattern = Pattern::new("/*.rs").unwrap();
        assert!(pattern.is_anchored());
        assert!(pattern.matches("main.rs"));
        assert!(!pattern.matches("src/main.rs"));
    }

    #[test]
    fn pattern_directory_only() {
        let pattern = Pattern::new("src/").unwrap();
        assert!(pattern.is_directory_only());
        assert!(pattern.matches("src/main.rs"));
        assert!(pattern.matches("src/lib/mod.rs"));
        assert!(pattern.matches("nested/src/lib.rs"));
        assert!(!pattern.matches("src"));
        assert!(!pattern.matches("main.rs"));
    }

    #[test]
    fn pattern_directory_name_without_slash_covers_contents() {
        let pattern = Pattern::new("/docs").unwrap();
        assert!(pattern.matches("docs"));
        assert!(pattern.matches("docs/guide/intro.md"));
        assert!(!pattern.matches("docs.md"));
        assert!(!pattern.matches("other/docs/a.md"));
    }

    #[test]
    fn pattern_trailing_globstar() {
        let pattern = Pattern::new("dirname/**").unwrap();
        assert!(pattern.matches("dirname/file.txt"));
        assert!(pattern.matches("dirname/a/b/c.txt"));
        assert!(pattern.matches("nested/dirname/file.txt"));
        assert!(!pattern.matches("dirname"));
        assert!(!pattern.matches("dirname.txt"));
    }

    #[test]
    fn pattern_direct_children_only() {
        let pattern = Pattern::new("/docs/*").unwrap();
        assert!(pattern.matches("docs/README.md"));
        assert!(!pattern.matches("docs/api/index.md"));
    }

    #[test]
    fn pattern_root_children_only() {
        let pattern = Pattern::new("/*").unwrap();
        assert!(pattern.matches("README.md"));
        assert!(pattern.matches("src"));
        assert!(!pattern.matches("src/deep/lib.rs"));
        assert!(!pattern.matches("src/lib.rs"));
    }

    #[test]
    fn pattern_single_segment_wildcard_does_not_cross_directories() {
        let pattern = Pattern::new("/docs/*.md").unwrap();
        assert!(pattern.matches("docs/README.md"));
        assert!(!pattern.matches("docs/api/index.md"));
        assert!(!pattern.matches("other/docs/README.md"));
    }

    #[test]
    fn pattern_unanchored_with_slash_matches_at_any_depth() {
        let pattern = Pattern::new("docs/*.md").unwrap();
        assert!(pattern.matches("docs/README.md"));
        assert!(pattern.matches("other/docs/README.md"));
        assert!(!pattern.matches("docs/api/README.md"));
    }

    #[test]
    fn pattern_question_mark() {
        let pattern = Pattern::new("/file?.txt").unwrap();
        assert!(pattern.matches("file1.txt"));
        assert!(!pattern.matches("file10.txt"));
        assert!(!pattern.matches("file/.txt"));
    }

    #[test]
    fn pattern_directory_with_wildcard() {
        let pattern = Pattern::new("/tool-*/").unwrap();
        assert!(pattern.matches("tool-a/run.sh"));
        assert!(pattern.matches("tool-b/bin/run.sh"));
        assert!(!pattern.matches("tools/run.sh"));
    }

    #[test]
    fn pattern_all_files() {
        let pattern = Pattern::new("*").unwrap();
        assert!(pattern.matches("main.rs"));
        assert!(pattern.matches("src/main.rs"));
        assert!(pattern.matches("a/b/c/d.txt"));
    }

    #[test]
    fn pattern_escaped_space() {
        let pattern = Pattern::new("/my\\ file.txt").unwrap();
        assert!(pattern.matches("my file.txt"));
        assert!(!pattern.matches("my\\ file.txt"));
    }

    #[test]
    fn pattern_unbalanced_bracket_fails() {
        assert!(Pattern::new("src/[abc.rs").is_err());
        assert!(Pattern::new("src/[abc].rs").is_ok());
    }

    #[test]
    fn pattern_matches_with_leading_slash() {
        let pattern = Pattern::new("*.rs").unwrap();
        assert!(pattern.matches("/main.rs"));
        assert!(pattern.matches("/src/main.rs"));
    }

    #[test]
    fn pattern_matches_candidate() {
        let pattern = Pattern::new("/src/").unwrap();
        let candidate = Candidate::new("src/lib.rs");
        assert!(pattern.matches_candidate(&candidate));
    }

    #[test]
    fn normalize_pattern_cases() {
        let n = normalize_pattern("/src/");
        assert!(n.anchored);
        assert!(n.directory_only);
        assert_eq!(n.globs, vec!["src/**"]);

        let n = normalize_pattern("*.rs");
        assert!(!n.anchored);
        assert_eq!(n.globs, vec!["**/*.rs", "**/*.rs/**"]);

        let n = normalize_pattern("src/lib/");
        assert!(n.directory_only);
        assert_eq!(n.globs, vec!["**/src/lib/**"]);

        let n = normalize_pattern("/docs/*");
        assert_eq!(n.globs, vec!["docs/*"]);

        let n = normalize_pattern("/*");
        assert_eq!(n.globs, vec!["*"]);

        let n = normalize_pattern("docs/*");
        assert_eq!(n.globs, vec!["**/docs/*"]);

        let n = normalize_pattern("**/build");
        assert_eq!(n.globs, vec!["**/build", "**/build/**"]);

        let n = normalize_pattern("/");
        assert_eq!(n.globs, vec!["**"]);
    }
}
