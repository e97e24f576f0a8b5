//! CLI module for the CODEOWNERS coverage checker.
//!
//! Command-line arguments are parsed with Clap. GitHub settings fall back
//! to environment variables so the tool runs unchanged in CI.

pub mod config;
pub mod github;
pub mod output;

use clap::Parser;
use codeowners_coverage_core::FailLevel;
use std::path::PathBuf;

/// Checks that every file of a repository has a mandatory code owner.
///
/// Existing files are checked against the CODEOWNERS rules. Newly created
/// files are either read from a change set or probed per directory.
#[derive(Parser, Debug)]
#[command(name = "codeowners-coverage")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Root of the repository (defaults to the current directory).
    #[arg(long, alias = "baseDir")]
    pub base_dir: Option<PathBuf>,

    /// Explicit CODEOWNERS file (searched for when not given).
    #[arg(long, alias = "codeOwnersFile")]
    pub codeowners_file: Option<PathBuf>,

    /// Fail if any file, existing or newly created, lacks a mandatory approver.
    #[arg(long, alias = "allFilesMustHaveCodeOwner")]
    pub all_files_must_have_code_owner: bool,

    /// Fail if an existing file lacks a mandatory approver.
    #[arg(
        long,
        aliases = ["allExistingFilesMustHaveCodeOwner", "allExisingFilesMustHaveCodeOwner"]
    )]
    pub all_existing_files_must_have_code_owner: bool,

    /// Fail if a newly created file lacks a mandatory approver.
    #[arg(long, alias = "allNewlyCreatedFilesMustHaveCodeOwner")]
    pub all_newly_created_files_must_have_code_owner: bool,

    /// File listing the added paths, one per line, or a unified diff.
    #[arg(long, value_name = "FILE")]
    pub changes: Option<PathBuf>,

    /// Do not probe every directory for newly created files.
    #[arg(long)]
    pub no_directory_probes: bool,

    /// Count files unowned by a negated rule as satisfied.
    #[arg(long)]
    pub accept_explicitly_unowned: bool,

    /// Print the approvers of every file.
    #[arg(long, alias = "showApprovers")]
    pub show_approvers: bool,

    /// Print approvers as JSON instead of a table.
    #[arg(long, short = 'j', overrides_with = "table")]
    pub json: bool,

    /// Print approvers as a table (the default).
    #[arg(long, overrides_with = "json")]
    pub table: bool,

    /// GitHub API base URL (for GitHub Enterprise).
    #[arg(long, env = "GITHUB_BASE_URL", default_value = "https://api.github.com/")]
    pub github_base_url: String,

    /// Repository in 'owner/repo' format for the platform cross-check.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub github_repository: Option<String>,

    /// Protected branch whose review settings are checked.
    #[arg(long, env = "GITHUB_BRANCH", default_value = "main")]
    pub github_branch: String,

    /// GitHub personal access token for the platform cross-check.
    #[arg(long, env = "GITHUB_ACCESS_TOKEN", hide_env_values = true)]
    pub github_access_token: Option<String>,

    /// GitHub App ID for authentication (alternative to access token).
    #[arg(long, env = "GITHUB_APP_ID")]
    pub github_app_id: Option<u64>,

    /// GitHub App Installation ID (required when using App authentication).
    #[arg(long, env = "GITHUB_APP_INSTALLATION_ID")]
    pub github_app_installation_id: Option<u64>,

    /// GitHub App private key in PEM format (required when using App authentication).
    #[arg(long, env = "GITHUB_APP_PRIVATE_KEY", hide_env_values = true)]
    pub github_app_private_key: Option<String>,

    /// Fail instead of skipping when the platform cannot be reached.
    #[arg(long)]
    pub require_platform_check: bool,

    /// Lowest cross-check problem level that fails the run.
    /// Possible values: never, fatal, error, warning
    #[arg(long, default_value = "error")]
    pub platform_fail_level: FailLevel,

    /// Comma-separated list of owners not looked up on the platform.
    #[arg(long, value_delimiter = ',')]
    pub ignored_owners: Option<Vec<String>>,

    /// Increase verbosity level (-v info, -vv debug, -vvv trace).
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Returns true if existing files must have a mandatory approver.
    pub fn check_existing(&self) -> bool {
        self.all_files_must_have_code_owner || self.all_existing_files_must_have_code_owner
    }

    /// Returns true if newly created files must have a mandatory approver.
    pub fn check_newly_created(&self) -> bool {
        self.all_files_must_have_code_owner || self.all_newly_created_files_must_have_code_owner
    }

    /// Returns true if GitHub authentication is configured.
    pub fn has_github_auth(&self) -> bool {
        self.github_access_token.is_some() || self.has_github_app_auth()
    }

    /// Returns true if GitHub App authentication is configured.
    pub fn has_github_app_auth(&self) -> bool {
        self.github_app_id.is_some()
            && self.github_app_installation_id.is_some()
            && self.github_app_private_key.is_some()
    }
}

/// Parses `argv` with the environment fallbacks switched off, so tests do
/// not pick up `GITHUB_*` variables from CI.
#[cfg(test)]
pub(crate) fn try_parse_without_env<I, T>(argv: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    use clap::{CommandFactory, FromArgMatches};

    let matches = Args::command()
        .mut_args(|arg| arg.env(None::<&str>))
        .try_get_matches_from(argv)?;
    Args::from_arg_matches(&matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<const N: usize>(argv: [&str; N]) -> Args {
        try_parse_without_env(argv).unwrap()
    }

    #[test]
    fn test_no_checks_by_default() {
        let args = parse(["codeowners-coverage"]);
        assert!(!args.check_existing());
        assert!(!args.check_newly_created());
        assert!(args.base_dir.is_none());
        assert_eq!(args.platform_fail_level, FailLevel::Error);
        assert_eq!(args.github_branch, "main");
        assert!(args.github_repository.is_none());
    }

    #[test]
    fn test_all_files_enables_both_checks() {
        let args = parse(["codeowners-coverage", "--all-files-must-have-code-owner"]);
        assert!(args.check_existing());
        assert!(args.check_newly_created());
    }

    #[test]
    fn test_flags_combine_inclusively() {
        let args = parse([
            "codeowners-coverage",
            "--all-files-must-have-code-owner",
            "--all-existing-files-must-have-code-owner",
        ]);
        assert!(args.check_existing());
        assert!(args.check_newly_created());

        let args = parse([
            "codeowners-coverage",
            "--all-newly-created-files-must-have-code-owner",
        ]);
        assert!(!args.check_existing());
        assert!(args.check_newly_created());
    }

    #[test]
    fn test_camel_case_aliases() {
        let args = parse([
            "codeowners-coverage",
            "--baseDir",
            "/repo",
            "--allExisingFilesMustHaveCodeOwner",
            "--showApprovers",
        ]);
        assert_eq!(args.base_dir, Some(PathBuf::from("/repo")));
        assert!(args.check_existing());
        assert!(args.show_approvers);
    }

    #[test]
    fn test_json_and_table_override_each_other() {
        let args = parse(["codeowners-coverage", "-j"]);
        assert!(args.json);

        let args = parse(["codeowners-coverage", "--json", "--table"]);
        assert!(!args.json);
    }

    #[test]
    fn test_verbose_flag() {
        let args = parse(["codeowners-coverage", "-vv"]);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_platform_fail_level() {
        let args = parse(["codeowners-coverage", "--platform-fail-level", "warn"]);
        assert_eq!(args.platform_fail_level, FailLevel::Warning);

        let result =
            try_parse_without_env(["codeowners-coverage", "--platform-fail-level", "loud"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_github_auth_detection() {
        let args = parse(["codeowners-coverage"]);
        assert!(!args.has_github_auth());

        let args = parse([
            "codeowners-coverage",
            "--github-access-token",
            "ghp_test",
        ]);
        assert!(args.has_github_auth());
        assert!(!args.has_github_app_auth());
    }

    #[test]
    fn test_ignored_owners() {
        let args = parse(["codeowners-coverage", "--ignored-owners", "@ghost,@bot"]);
        let ignored = args.ignored_owners.unwrap();
        assert_eq!(ignored, vec!["@ghost".to_string(), "@bot".to_string()]);
    }
}
