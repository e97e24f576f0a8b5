//! Configuration handling for the CLI.
//!
//! This module converts CLI arguments into the library's configuration types
//! and sets up GitHub authentication.

use crate::cli::Args;
use codeowners_coverage_core::{
    AnalyzerConfig, ChangeSet, CrossCheckConfig, FailLevel, NewFileSource, ResolverConfig,
};
use http::Uri;
use jsonwebtoken::EncodingKey;
use octocrab::Octocrab;
use octocrab::models::{AppId, InstallationId};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required configuration.
    #[error("missing required configuration: {0}")]
    MissingRequired(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// GitHub authentication error.
    #[error("GitHub authentication error: {0}")]
    GitHubAuth(String),

    /// The change set could not be loaded.
    #[error(transparent)]
    Analysis(#[from] codeowners_coverage_core::Error),
}

/// Application exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// All requested checks passed.
    Success = 0,
    /// Startup or analysis failed (wrong configuration or unreadable input).
    StartupFailure = 1,
    /// Application terminated by signal (SIGINT/SIGTERM).
    Terminated = 2,
    /// A coverage check failed or platform problems exceed the fail level.
    ValidationFailed = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// How the CLI authenticates against GitHub.
pub enum Credential {
    /// A personal access token.
    Token(SecretString),
    /// A GitHub App installation.
    App {
        app_id: u64,
        installation_id: u64,
        private_key: SecretString,
    },
}

/// Shows the first six and the last two characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*****".to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}*****{}", head, tail)
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Token(token) => write!(f, "token {}", mask(token.expose_secret())),
            Credential::App {
                app_id,
                installation_id,
                ..
            } => write!(f, "app {} (installation {})", app_id, installation_id),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self)
    }
}

/// Where and how to reach the platform.
#[derive(Debug)]
pub struct PlatformConfig {
    /// API base URL.
    pub base_url: Uri,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Protected branch.
    pub branch: String,
    /// Authentication.
    pub credential: Credential,
}

impl PlatformConfig {
    /// Builds the platform configuration, `None` when no credentials are given.
    pub fn from_args(args: &Args) -> Result<Option<Self>, ConfigError> {
        if !args.has_github_auth() {
            return Ok(None);
        }

        let repository = args.github_repository.as_deref().ok_or_else(|| {
            ConfigError::MissingRequired(
                "GITHUB_REPOSITORY is required when GitHub credentials are given".to_string(),
            )
        })?;
        let (owner, repo) = repository
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "repository '{}' is not in 'owner/repo' format",
                    repository
                ))
            })?;

        let base_url: Uri = args.github_base_url.parse().map_err(|e| {
            ConfigError::Invalid(format!(
                "GitHub base URL '{}' is invalid: {}",
                args.github_base_url, e
            ))
        })?;
        if base_url.scheme().is_none() || base_url.host().is_none() {
            return Err(ConfigError::Invalid(format!(
                "GitHub base URL '{}' must be absolute",
                args.github_base_url
            )));
        }

        let credential = match (
            args.github_app_id,
            args.github_app_installation_id,
            &args.github_app_private_key,
            &args.github_access_token,
        ) {
            (Some(app_id), Some(installation_id), Some(key), _) => Credential::App {
                app_id,
                installation_id,
                private_key: SecretString::from(key.clone()),
            },
            (_, _, _, Some(token)) => Credential::Token(SecretString::from(token.clone())),
            _ => {
                return Err(ConfigError::MissingRequired(
                    "a GitHub access token or a complete GitHub App configuration".to_string(),
                ));
            }
        };

        Ok(Some(Self {
            base_url,
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: args.github_branch.clone(),
            credential,
        }))
    }
}

/// Validated and processed configuration for a run.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Configuration for the analyzer.
    pub analyzer: AnalyzerConfig,
    /// Configuration for the cross-check.
    pub cross_check: CrossCheckConfig,
    /// The platform, when credentials are configured.
    pub platform: Option<PlatformConfig>,
    /// Whether a platform failure fails the run.
    pub require_platform_check: bool,
    /// Lowest problem level that fails the run.
    pub platform_fail_level: FailLevel,
    /// Whether existing files must have a mandatory approver.
    pub check_existing: bool,
    /// Whether newly created files must have a mandatory approver.
    pub check_newly_created: bool,
    /// Whether to print the approvers of every file.
    pub show_approvers: bool,
    /// Whether to output JSON.
    pub json_output: bool,
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let mut analyzer = AnalyzerConfig::new().with_resolver(
            ResolverConfig::new().with_accept_explicitly_unowned(args.accept_explicitly_unowned),
        );

        if let Some(base_dir) = &args.base_dir {
            if !base_dir.is_dir() {
                return Err(ConfigError::Invalid(format!(
                    "base directory '{}' does not exist or is not a directory",
                    base_dir.display()
                )));
            }
            analyzer = analyzer.with_base_dir(base_dir.clone());
        }

        if let Some(file) = &args.codeowners_file {
            if !file.is_file() {
                return Err(ConfigError::Invalid(format!(
                    "CODEOWNERS file '{}' does not exist or is not a file",
                    file.display()
                )));
            }
            analyzer = analyzer.with_rules_file(file.clone());
        }

        let new_files = match (&args.changes, args.no_directory_probes) {
            (Some(path), _) => NewFileSource::ChangeSet(ChangeSet::from_file(path)?),
            (None, false) => NewFileSource::DirectoryProbes,
            (None, true) => NewFileSource::None,
        };
        analyzer = analyzer.with_new_files(new_files);

        let mut cross_check = CrossCheckConfig::new();
        if let Some(ignored) = &args.ignored_owners {
            cross_check = cross_check.with_ignored_owners(ignored.iter().cloned().collect());
        }

        let platform = PlatformConfig::from_args(args)?;
        if platform.is_none() && args.require_platform_check {
            return Err(ConfigError::MissingRequired(
                "GitHub credentials are required with --require-platform-check".to_string(),
            ));
        }

        Ok(Self {
            analyzer,
            cross_check,
            platform,
            require_platform_check: args.require_platform_check,
            platform_fail_level: args.platform_fail_level,
            check_existing: args.check_existing(),
            check_newly_created: args.check_newly_created(),
            show_approvers: args.show_approvers,
            json_output: args.json,
        })
    }

    /// Returns the base directory the run analyzes.
    pub fn base_dir(&self) -> Option<&PathBuf> {
        self.analyzer.base_dir.as_ref()
    }
}

/// Creates an authenticated Octocrab client.
pub async fn create_octocrab(config: &PlatformConfig) -> Result<Octocrab, ConfigError> {
    let base_url = config.base_url.to_string();

    match &config.credential {
        Credential::App {
            app_id,
            installation_id,
            private_key,
        } => {
            let key = EncodingKey::from_rsa_pem(private_key.expose_secret().as_bytes())
                .map_err(|e| ConfigError::GitHubAuth(format!("invalid private key: {}", e)))?;

            let app_client = Octocrab::builder()
                .app(AppId(*app_id), key)
                .base_uri(base_url.as_str())
                .map_err(|e| ConfigError::GitHubAuth(format!("invalid base URL: {}", e)))?
                .build()
                .map_err(|e| {
                    ConfigError::GitHubAuth(format!("failed to create app client: {}", e))
                })?;

            app_client
                .installation(InstallationId(*installation_id))
                .map_err(|e| {
                    ConfigError::GitHubAuth(format!("failed to get installation client: {}", e))
                })
        }
        Credential::Token(token) => Octocrab::builder()
            .base_uri(base_url.as_str())
            .map_err(|e| ConfigError::GitHubAuth(format!("invalid base URL: {}", e)))?
            .personal_token(token.expose_secret().to_string())
            .build()
            .map_err(|e| ConfigError::GitHubAuth(format!("failed to build client: {}", e))),
    }
}
