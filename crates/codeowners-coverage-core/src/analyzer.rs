//! The analysis pipeline.
//!
//! An [`Analyzer`] validates the base directory, loads the rules file,
//! scans the tree, resolves ownership and aggregates the results into a
//! [`ValidationReport`]. With a [`Platform`] it also cross-checks the
//! rules against the hosting platform.

use crate::error::{Error, NotFoundKind};
use crate::platform::{CrossCheck, CrossCheckConfig, Platform, run_cross_check};
use crate::report::ValidationReport;
use crate::resolve::{Resolver, ResolverConfig};
use crate::rules::RuleSet;
use crate::scan::{NewFileSource, Scanner};
use log::{debug, info, warn};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Conventional rules file locations, searched in order.
pub const CODEOWNERS_LOCATIONS: &[&str] = &[
    "CODEOWNERS",
    ".github/CODEOWNERS",
    ".gitlab/CODEOWNERS",
    "docs/CODEOWNERS",
];

/// Finds the rules file in a repository.
///
/// Searches the locations in [`CODEOWNERS_LOCATIONS`] and returns the first
/// regular file found.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use codeowners_coverage_core::find_codeowners_file;
///
/// if let Some(path) = find_codeowners_file(Path::new("/path/to/repo")) {
///     println!("Found CODEOWNERS at: {}", path.display());
/// }
/// ```
pub fn find_codeowners_file(base_dir: &Path) -> Option<PathBuf> {
    CODEOWNERS_LOCATIONS
        .iter()
        .map(|location| base_dir.join(location))
        .find(|path| path.is_file())
}

/// Options for an [`Analyzer`].
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfig {
    /// Root of the tree; the current directory when unset.
    pub base_dir: Option<PathBuf>,
    /// Explicit rules file; searched for when unset.
    pub rules_file: Option<PathBuf>,
    /// How newly created files are determined.
    pub new_files: NewFileSource,
    /// Resolution options.
    pub resolver: ResolverConfig,
}

impl AnalyzerConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base directory.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Sets an explicit rules file.
    pub fn with_rules_file(mut self, rules_file: impl Into<PathBuf>) -> Self {
        self.rules_file = Some(rules_file.into());
        self
    }

    /// Sets how newly created files are determined.
    pub fn with_new_files(mut self, new_files: NewFileSource) -> Self {
        self.new_files = new_files;
        self
    }

    /// Sets the resolution options.
    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }
}

/// A report together with the outcome of the cross-check.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Ownership of every scanned file.
    pub report: ValidationReport,
    /// The platform cross-check.
    pub cross_check: CrossCheck,
}

/// Runs the analysis pipeline.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    /// Creates an analyzer.
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Runs the analysis without a platform.
    pub fn analyze(&self) -> Result<ValidationReport, Error> {
        self.run().map(|(report, _)| report)
    }

    /// Runs the analysis and then the cross-check against `platform`.
    ///
    /// A platform failure fails the analysis only when the platform is
    /// required; otherwise the cross-check is reported as skipped.
    pub async fn analyze_with_platform(
        &self,
        platform: &Platform,
        cross_check_config: &CrossCheckConfig,
    ) -> Result<Analysis, Error> {
        let (report, rules) = self.run()?;

        let cross_check = match platform {
            Platform::Absent => CrossCheck::NotConfigured,
            Platform::Present { client, required } => {
                match run_cross_check(&rules, client.as_ref(), cross_check_config).await {
                    Ok(problems) => {
                        info!("Platform cross-check found {} problem(s)", problems.len());
                        CrossCheck::Completed(problems)
                    }
                    Err(e) if *required => return Err(Error::Platform(e)),
                    Err(e) => {
                        warn!("Skipping platform cross-check: {}", e);
                        CrossCheck::Skipped {
                            reason: e.to_string(),
                        }
                    }
                }
            }
        };

        Ok(Analysis {
            report,
            cross_check,
        })
    }

    fn run(&self) -> Result<(ValidationReport, RuleSet), Error> {
        let base_dir = self.base_dir()?;
        if !base_dir.is_dir() {
            return Err(Error::not_found(NotFoundKind::BaseDirectory, base_dir));
        }

        let rules_file = self.locate_rules_file(&base_dir)?;
        let rules = load_rules(&rules_file)?;

        let scanner = Scanner::new(&base_dir).with_new_files(self.config.new_files.clone());
        let records = scanner.scan()?;
        debug!("Resolving ownership of {} records", records.len());

        let results = Resolver::new(&rules, self.config.resolver).resolve_all(records);
        let report = ValidationReport::new(results, rules.diagnostics().to_vec(), rules_file);
        debug!("Analyzed {} records", report.len());
        Ok((report, rules))
    }

    fn base_dir(&self) -> Result<PathBuf, Error> {
        match &self.config.base_dir {
            Some(dir) => Ok(dir.clone()),
            None => env::current_dir()
                .map_err(|e| Error::analysis("failed to determine the current directory", e)),
        }
    }

    fn locate_rules_file(&self, base_dir: &Path) -> Result<PathBuf, Error> {
        match &self.config.rules_file {
            Some(path) if path.is_file() => Ok(path.clone()),
            Some(path) => Err(Error::not_found(NotFoundKind::RulesFile, path)),
            None => find_codeowners_file(base_dir)
                .ok_or_else(|| Error::not_found(NotFoundKind::NoRulesFile, base_dir)),
        }
    }
}

/// Reads and compiles a rules file.
pub fn load_rules(path: &Path) -> Result<RuleSet, Error> {
    debug!("Loading rules from {}", path.display());
    let content = fs::read_to_string(path)
        .map_err(|e| Error::analysis(format!("failed to read {}", path.display()), e))?;
    let rules = RuleSet::parse(&content).map_err(|errors| Error::parse(path, errors))?;
    info!(
        "Loaded {} rules in {} sections from {}",
        rules.rule_count(),
        rules.sections().len(),
        path.display()
    );
    Ok(rules)
}
