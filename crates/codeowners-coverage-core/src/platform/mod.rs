//! Hosting platform integration.
//!
//! The rules can be cross-checked against the platform that enforces them:
//! does the protected branch require code owner reviews, and do the owners
//! exist? The platform is reached through the [`PlatformClient`] trait so
//! that the core stays free of any HTTP stack.

mod check;
mod problem;

pub use check::{CrossCheck, CrossCheckConfig, KNOWN_ROLES, run_cross_check};
pub use problem::{FailLevel, Level, Problem, ProblemTable};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// The result of looking up a user or a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupResult {
    /// The user or team exists and is visible.
    Exists,
    /// The user or team was not found.
    NotFound,
    /// Insufficient authorization to look it up.
    Unauthorized,
}

impl fmt::Display for LookupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupResult::Exists => write!(f, "exists"),
            LookupResult::NotFound => write!(f, "not_found"),
            LookupResult::Unauthorized => write!(f, "unauthorized"),
        }
    }
}

/// Review requirements of the protected branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalSettings {
    /// The branch the settings belong to.
    pub branch: String,
    /// Approving reviews required before merging, `None` when reviews are
    /// not required at all.
    pub required_approving_review_count: Option<u32>,
    /// Whether a code owner must approve.
    pub require_code_owner_reviews: bool,
}

impl ApprovalSettings {
    /// Returns true if at least one approving review is required.
    pub fn requires_reviews(&self) -> bool {
        self.required_approving_review_count.unwrap_or(0) > 0
    }
}

/// Errors that can occur when talking to the platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// An API error occurred.
    #[error("API error: {0}")]
    Api(String),

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(String),

    /// Authentication failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Access to the platform that hosts the repository.
///
/// Implementations are constructed with their credentials and target
/// repository; the cross-check never reads configuration on its own.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Loads the review settings of the target branch.
    async fn approval_settings(&self) -> Result<ApprovalSettings, PlatformError>;

    /// Looks up a user by name (without the leading '@').
    async fn user_exists(&self, username: &str) -> Result<LookupResult, PlatformError>;

    /// Looks up a team within an organization.
    ///
    /// `team` is the path after the organization, so nested teams arrive
    /// as `parent/child`.
    async fn team_exists(&self, org: &str, team: &str) -> Result<LookupResult, PlatformError>;
}

/// An optional platform to cross-check against.
#[derive(Clone, Default)]
pub enum Platform {
    /// No platform configured; the cross-check is not run.
    #[default]
    Absent,
    /// A configured platform.
    Present {
        /// The client to query.
        client: Arc<dyn PlatformClient>,
        /// Whether a platform failure fails the analysis.
        required: bool,
    },
}

impl Platform {
    /// Wraps a client.
    pub fn present(client: Arc<dyn PlatformClient>, required: bool) -> Self {
        Self::Present { client, required }
    }

    /// Returns true if a platform is configured.
    pub fn is_present(&self) -> bool {
        matches!(self, Platform::Present { .. })
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Absent => f.write_str("Absent"),
            Platform::Present { required, .. } => f
                .debug_struct("Present")
                .field("client", &"<dyn PlatformClient>")
                .field("required", required)
                .finish(),
        }
    }
}
