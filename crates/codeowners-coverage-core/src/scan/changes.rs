//! Change sets: the files a pending change adds to the repository.

use crate::error::{Error, NotFoundKind};
use log::{debug, trace};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Paths added by a pending change, in the order they were listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    added: Vec<String>,
}

/// Turns a listed path into a base-relative, `/` separated path.
fn normalize_path(raw: &str) -> Option<String> {
    let path = raw.trim().replace('\\', "/");
    let path = path.trim_start_matches("./").trim_start_matches('/');
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

impl ChangeSet {
    /// Creates a change set from paths, dropping blanks and repeats.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let added = paths
            .into_iter()
            .filter_map(|p| normalize_path(p.as_ref()))
            .filter(|p| seen.insert(p.clone()))
            .collect();
        Self { added }
    }

    /// Parses either a unified diff or a plain list of paths.
    ///
    /// Input that contains a diff file header (`--- ` or `diff --git`) is
    /// read as a unified diff, anything else as one path per line.
    pub fn parse(input: &str) -> Self {
        let is_diff = input
            .lines()
            .any(|line| line.starts_with("diff --git ") || line.starts_with("--- "));
        if is_diff {
            Self::parse_unified_diff(input)
        } else {
            Self::parse_path_list(input)
        }
    }

    /// Reads and parses a change set file.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        if !path.is_file() {
            return Err(Error::not_found(NotFoundKind::ChangeSet, path));
        }
        let input = fs::read_to_string(path).map_err(|e| {
            Error::analysis(format!("failed to read change set {}", path.display()), e)
        })?;
        Ok(Self::parse(&input))
    }

    /// Parses one path per line. Blank lines and `#` comments are skipped.
    pub fn parse_path_list(input: &str) -> Self {
        let change_set = Self::from_paths(
            input
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        );
        debug!("Read {} added paths from list", change_set.len());
        change_set
    }

    /// Collects the files a unified diff creates.
    ///
    /// A created file has the header pair `--- /dev/null` followed by
    /// `+++ b/<path>`. Modified, renamed and deleted files are ignored.
    pub fn parse_unified_diff(input: &str) -> Self {
        let mut added = Vec::new();
        let mut lines = input.lines().peekable();

        while let Some(line) = lines.next() {
            if !is_dev_null_header(line) {
                continue;
            }
            if let Some(next) = lines.peek()
                && let Some(target) = next.strip_prefix("+++ ")
            {
                // drop a trailing timestamp and the "b/" side prefix
                let target = target.split('\t').next().unwrap_or(target);
                let target = target.strip_prefix("b/").unwrap_or(target);
                trace!("Diff creates {}", target);
                added.push(target.to_string());
                lines.next();
            }
        }

        let change_set = Self::from_paths(added);
        debug!("Read {} added paths from diff", change_set.len());
        change_set
    }

    /// Returns the added paths in listing order.
    pub fn paths(&self) -> &[String] {
        &self.added
    }

    /// Returns true if `path` is part of this change set.
    pub fn contains(&self, path: &str) -> bool {
        self.added.iter().any(|p| p == path)
    }

    /// Returns the number of added paths.
    pub fn len(&self) -> usize {
        self.added.len()
    }

    /// Returns true if nothing was added.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
    }
}

fn is_dev_null_header(line: &str) -> bool {
    line.strip_prefix("--- ")
        .map(|rest| rest.split('\t').next().unwrap_or(rest).trim_end())
        .is_some_and(|source| source == "/dev/null")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_paths_normalizes_and_dedups() {
        let change_set = ChangeSet::from_paths(["./src/new.rs", "/docs/a.md", "src/new.rs", "  "]);
        assert_eq!(change_set.paths(), &["src/new.rs", "docs/a.md"]);
        assert!(change_set.contains("docs/a.md"));
        assert_eq!(change_set.len(), 2);
    }

    #[test]
    fn path_list_skips_comments_and_blanks() {
        let change_set = ChangeSet::parse("# added files\nsrc/a.rs\n\nsrc\\b.rs\n");
        assert_eq!(change_set.paths(), &["src/a.rs", "src/b.rs"]);
    }

    #[test]
    fn unified_diff_collects_created_files_only() {
        let diff = "\
diff --git a/src/new.rs b/src/new.rs
new file mode 100644
index 0000000..e69de29
--- /dev/null
+++ b/src/new.rs
@@ -0,0 +1 @@
+fn main() {}
diff --git a/src/old.rs b/src/old.rs
--- a/src/old.rs
+++ b/src/old.rs
@@ -1 +1 @@
-a
+b
diff --git a/gone.rs b/gone.rs
--- a/gone.rs
+++ /dev/null
@@ -1 +0,0 @@
-x
";
        let change_set = ChangeSet::parse(diff);
        assert_eq!(change_set.paths(), &["src/new.rs"]);
    }

    #[test]
    fn unified_diff_with_timestamps() {
        let diff = "--- /dev/null\t2024-01-01 00:00:00\n+++ b/docs/guide.md\t2024-01-01 00:00:00\n";
        let change_set = ChangeSet::parse_unified_diff(diff);
        assert_eq!(change_set.paths(), &["docs/guide.md"]);
    }

    #[test]
    fn from_file_reads_and_reports_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("added.txt");
        fs::write(&path, "src/a.rs\n").unwrap();
        assert_eq!(ChangeSet::from_file(&path).unwrap().paths(), &["src/a.rs"]);

        let missing = dir.path().join("missing.txt");
        assert!(matches!(
            ChangeSet::from_file(&missing),
            Err(Error::NotFound {
                kind: NotFoundKind::ChangeSet,
                ..
            })
        ));
    }

    #[test]
    fn empty_input_is_empty_change_set() {
        assert!(ChangeSet::parse("").is_empty());
        assert!(ChangeSet::parse_unified_diff("not a diff").is_empty());
    }
}
