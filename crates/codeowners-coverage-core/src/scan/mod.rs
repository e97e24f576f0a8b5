//! Repository scanning.
//!
//! The [`Scanner`] turns a base directory into the list of [`FileRecord`]s
//! that ownership is resolved for. Besides the files in the tree it can
//! mark files as newly created from a [`ChangeSet`], or add one synthetic
//! probe per directory that stands for "a file added here".

mod changes;
mod walker;

pub use changes::ChangeSet;
pub use walker::{IgnoreRules, WalkEntry, walk};

use crate::error::{Error, NotFoundKind};
use log::{debug, trace};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// File name used to resolve directory probes.
///
/// It is chosen so that no real pattern is likely to name it.
pub const PROBE_FILE_NAME: &str = "NewlyCreated_NiElSbAsJeSwRoTeThIs";

/// Where a [`FileRecord`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOrigin {
    /// Found in the directory tree.
    Tree,
    /// Listed by a change set but absent from the tree.
    ChangeSet,
    /// Synthetic file standing for any file added to a directory.
    DirectoryProbe,
}

/// A path whose ownership is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Path relative to the base directory, `/` separated.
    ///
    /// Directory probes are written `dir/*`, or `*` for the base directory.
    pub path: String,
    /// Whether the file exists in the tree.
    pub existing: bool,
    /// Whether the file is created by the pending change.
    pub newly_created: bool,
    /// Where the record came from.
    pub origin: RecordOrigin,
}

impl FileRecord {
    /// A file that exists in the tree.
    pub fn existing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            existing: true,
            newly_created: false,
            origin: RecordOrigin::Tree,
        }
    }

    /// A file that a change set adds but the tree does not contain yet.
    pub fn added(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            existing: false,
            newly_created: true,
            origin: RecordOrigin::ChangeSet,
        }
    }

    /// A probe for files added to `dir` (empty for the base directory).
    pub fn probe(dir: &str) -> Self {
        let path = if dir.is_empty() {
            "*".to_string()
        } else {
            format!("{}/*", dir)
        };
        Self {
            path,
            existing: false,
            newly_created: true,
            origin: RecordOrigin::DirectoryProbe,
        }
    }

    /// Returns true for synthetic directory probes.
    pub fn is_probe(&self) -> bool {
        self.origin == RecordOrigin::DirectoryProbe
    }

    /// Returns the path that rules are matched against.
    pub fn resolution_path(&self) -> Cow<'_, str> {
        if !self.is_probe() {
            return Cow::Borrowed(&self.path);
        }
        match self.path.strip_suffix('*') {
            Some(dir) => Cow::Owned(format!("{}{}", dir, PROBE_FILE_NAME)),
            None => Cow::Borrowed(&self.path),
        }
    }
}

/// How newly created files are determined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NewFileSource {
    /// No file is newly created.
    #[default]
    None,
    /// The files added by a change set.
    ChangeSet(ChangeSet),
    /// One probe per directory in the tree.
    DirectoryProbes,
}

/// Enumerates the files under a base directory.
#[derive(Debug, Clone)]
pub struct Scanner {
    base_dir: PathBuf,
    new_files: NewFileSource,
}

impl Scanner {
    /// Creates a scanner for `base_dir` that marks nothing as newly created.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            new_files: NewFileSource::None,
        }
    }

    /// Sets how newly created files are determined.
    pub fn with_new_files(mut self, new_files: NewFileSource) -> Self {
        self.new_files = new_files;
        self
    }

    /// Returns the base directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Scans the base directory.
    ///
    /// Records come in discovery order. Change-set paths that are missing
    /// from the tree are appended after it, in change-set order.
    pub fn scan(&self) -> Result<Vec<FileRecord>, Error> {
        if !self.base_dir.is_dir() {
            return Err(Error::not_found(NotFoundKind::BaseDirectory, &self.base_dir));
        }

        let entries = walk(&self.base_dir)?;
        let ignore_rules = match self.new_files {
            NewFileSource::DirectoryProbes => Some(IgnoreRules::load(&self.base_dir, &entries)?),
            _ => None,
        };

        let mut records = Vec::new();
        for entry in entries {
            if entry.is_dir {
                if let Some(ignore_rules) = &ignore_rules {
                    let probe = FileRecord::probe(&entry.path);
                    if ignore_rules.is_ignored(&probe.resolution_path()) {
                        trace!("Files added to {:?} would be ignored", entry.path);
                    } else {
                        records.push(probe);
                    }
                }
            } else {
                records.push(FileRecord::existing(entry.path));
            }
        }

        if let NewFileSource::ChangeSet(change_set) = &self.new_files {
            let added: HashSet<&str> = change_set.paths().iter().map(String::as_str).collect();
            let mut in_tree = HashSet::new();
            for record in &mut records {
                if added.contains(record.path.as_str()) {
                    record.newly_created = true;
                    in_tree.insert(record.path.clone());
                }
            }
            for path in change_set.paths() {
                if !in_tree.contains(path) {
                    records.push(FileRecord::added(path.as_str()));
                }
            }
        }

        debug!(
            "Scanned {} records under {:?}",
            records.len(),
            self.base_dir
        );
        Ok(records)
    }
}
