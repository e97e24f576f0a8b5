//! Repository walking.
//!
//! Lists the entries under a base directory the way a checkout would see
//! them: `.gitignore` rules apply (even outside a git repository), hidden
//! files are kept and version-control metadata is skipped.

use crate::error::Error;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::{DirEntry, Match, WalkBuilder};
use log::{debug, trace};
use std::cmp::Reverse;
use std::io;
use std::path::Path;

/// Directory names that hold version-control metadata.
const VCS_DIRECTORIES: &[&str] = &[".git", ".hg", ".svn"];

/// One entry found by [`walk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path relative to the base directory, `/` separated. Empty for the base itself.
    pub path: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

fn is_vcs_metadata(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| VCS_DIRECTORIES.contains(&name))
}

/// Walks `base_dir` depth-first, sorted by file name within each directory.
///
/// The base directory itself is the first entry. Any I/O failure during the
/// walk aborts it.
pub fn walk(base_dir: &Path) -> Result<Vec<WalkEntry>, Error> {
    debug!("Walking {:?}", base_dir);

    let walker = WalkBuilder::new(base_dir)
        .hidden(false)
        .ignore(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .require_git(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| !is_vcs_metadata(entry))
        .build();

    let mut entries = Vec::new();
    for result in walker {
        let entry = result.map_err(|err| {
            let message = err.to_string();
            Error::analysis(
                format!("failed to walk {}", base_dir.display()),
                err.into_io_error()
                    .unwrap_or_else(|| io::Error::other(message)),
            )
        })?;

        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
        let relative = entry.path().strip_prefix(base_dir).map_err(|_| {
            Error::analysis(
                format!("walked outside of {}", base_dir.display()),
                io::Error::other(entry.path().display().to_string()),
            )
        })?;

        let Some(path_str) = relative.to_str() else {
            debug!("Skipping non UTF-8 path {:?}", entry.path());
            continue;
        };

        // Normalize to forward slashes
        let path = path_str.replace('\\', "/");
        trace!("Walked {} (dir={})", path, is_dir);
        entries.push(WalkEntry { path, is_dir });
    }

    debug!("Found {} entries", entries.len());
    Ok(entries)
}

fn ignore_error(context: String, err: ignore::Error) -> Error {
    let message = err.to_string();
    Error::analysis(
        context,
        err.into_io_error()
            .unwrap_or_else(|| io::Error::other(message)),
    )
}

/// The `.gitignore` files of a walked tree.
///
/// Answers whether a path that does not exist yet would be ignored, which
/// the walk itself cannot tell.
#[derive(Debug, Default)]
pub struct IgnoreRules {
    /// Matchers keyed by their directory, deepest first.
    matchers: Vec<(String, Gitignore)>,
}

impl IgnoreRules {
    /// Loads every `.gitignore` listed in `entries`.
    pub fn load(base_dir: &Path, entries: &[WalkEntry]) -> Result<Self, Error> {
        let mut matchers = Vec::new();
        for entry in entries.iter().filter(|e| !e.is_dir) {
            let dir = match entry.path.rsplit_once('/') {
                Some((dir, ".gitignore")) => dir,
                None if entry.path == ".gitignore" => "",
                _ => continue,
            };

            let mut builder = GitignoreBuilder::new(base_dir.join(dir));
            if let Some(err) = builder.add(base_dir.join(&entry.path)) {
                return Err(ignore_error(format!("failed to read {}", entry.path), err));
            }
            let gitignore = builder
                .build()
                .map_err(|err| ignore_error(format!("failed to load {}", entry.path), err))?;
            trace!("Loaded {} ignore rules from {}", gitignore.num_ignores(), entry.path);
            matchers.push((dir.to_string(), gitignore));
        }

        matchers.sort_by_key(|(dir, _)| {
            Reverse(if dir.is_empty() { 0 } else { dir.matches('/').count() + 1 })
        });
        Ok(Self { matchers })
    }

    /// Returns true if a file at `path` would be ignored.
    ///
    /// The deepest `.gitignore` with a matching rule decides, so a `!`
    /// rule in a subdirectory overrides its parents.
    pub fn is_ignored(&self, path: &str) -> bool {
        for (dir, gitignore) in &self.matchers {
            let relative = if dir.is_empty() {
                path
            } else {
                match path.strip_prefix(dir.as_str()).and_then(|p| p.strip_prefix('/')) {
                    Some(relative) => relative,
                    None => continue,
                }
            };
            match gitignore.matched(relative, false) {
                Match::None => {}
                Match::Ignore(_) => return true,
                Match::Whitelist(_) => return false,
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn setup_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        File::create(dir.path().join("src/main.rs")).unwrap();
        File::create(dir.path().join("src/nested/deep.rs")).unwrap();
        File::create(dir.path().join("b.txt")).unwrap();
        File::create(dir.path().join(".hidden_file")).unwrap();

        fs::create_dir_all(dir.path().join(".git")).unwrap();
        File::create(dir.path().join(".git/config")).unwrap();
        fs::create_dir_all(dir.path().join(".svn")).unwrap();
        File::create(dir.path().join(".svn/entries")).unwrap();

        dir
    }

    fn paths(entries: &[WalkEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn walks_depth_first_in_name_order() {
        let dir = setup_test_dir();
        let entries = walk(dir.path()).unwrap();

        assert_eq!(
            paths(&entries),
            vec![
                "",
                ".hidden_file",
                "b.txt",
                "src",
                "src/main.rs",
                "src/nested",
                "src/nested/deep.rs",
            ]
        );
        assert!(entries[0].is_dir);
        assert!(entries[3].is_dir);
        assert!(!entries[4].is_dir);
    }

    #[test]
    fn respects_gitignore_without_repository() {
        let dir = setup_test_dir();
        fs::write(dir.path().join(".gitignore"), "target/\n*.log\n").unwrap();
        fs::create_dir_all(dir.path().join("target")).unwrap();
        File::create(dir.path().join("target/out.bin")).unwrap();
        File::create(dir.path().join("debug.log")).unwrap();

        let entries = walk(dir.path()).unwrap();
        let paths = paths(&entries);

        assert!(paths.contains(&".gitignore"));
        assert!(!paths.iter().any(|p| p.starts_with("target")));
        assert!(!paths.contains(&"debug.log"));
    }

    #[test]
    fn ignore_rules_answer_for_missing_paths() {
        let dir = setup_test_dir();
        fs::write(dir.path().join(".gitignore"), "*.log\nlogs/*\n").unwrap();
        fs::create_dir_all(dir.path().join("logs")).unwrap();
        fs::write(dir.path().join("src/.gitignore"), "!keep.log\n").unwrap();

        let entries = walk(dir.path()).unwrap();
        let rules = IgnoreRules::load(dir.path(), &entries).unwrap();

        assert!(rules.is_ignored("new.log"));
        assert!(rules.is_ignored("logs/anything"));
        assert!(rules.is_ignored("src/nested/new.log"));
        assert!(!rules.is_ignored("src/keep.log"));
        assert!(!rules.is_ignored("src/new.rs"));
        assert!(!IgnoreRules::default().is_ignored("new.log"));
    }

    #[test]
    fn skips_vcs_metadata() {
        let dir = setup_test_dir();
        let entries = walk(dir.path()).unwrap();
        assert!(
            !entries
                .iter()
                .any(|e| e.path.starts_with(".git") || e.path.starts_with(".svn"))
        );
    }
}
