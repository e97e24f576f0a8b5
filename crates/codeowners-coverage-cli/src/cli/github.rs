//! GitHub platform client implementation using octocrab.
//!
//! This module provides the octocrab-based implementation of the
//! `PlatformClient` trait for use in the CLI.

use async_trait::async_trait;
use codeowners_coverage_core::platform::{
    ApprovalSettings, LookupResult, PlatformClient, PlatformError,
};
use http::StatusCode;
use serde::Deserialize;
use tracing::debug;

/// The part of a branch protection response the cross-check reads.
#[derive(Debug, Deserialize)]
struct BranchProtection {
    required_pull_request_reviews: Option<RequiredReviews>,
}

#[derive(Debug, Deserialize)]
struct RequiredReviews {
    #[serde(default)]
    required_approving_review_count: Option<u32>,
    #[serde(default)]
    require_code_owner_reviews: bool,
}

/// An octocrab client bound to one repository and branch.
pub struct OctocrabClient {
    client: octocrab::Octocrab,
    owner: String,
    repo: String,
    branch: String,
}

impl OctocrabClient {
    /// Creates a client for `owner/repo` and its protected `branch`.
    pub fn new(
        client: octocrab::Octocrab,
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            client,
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
        }
    }
}

/// Extracts the HTTP status code from an octocrab error.
fn extract_status_code(error: &octocrab::Error) -> Option<StatusCode> {
    match error {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code),
        _ => None,
    }
}

/// Maps an error that is not a lookup answer to a platform error.
fn platform_error(error: octocrab::Error) -> PlatformError {
    match extract_status_code(&error) {
        Some(StatusCode::UNAUTHORIZED) => PlatformError::Auth(error.to_string()),
        Some(StatusCode::TOO_MANY_REQUESTS) => PlatformError::RateLimitExceeded,
        Some(_) => PlatformError::Api(error.to_string()),
        None => PlatformError::Network(error.to_string()),
    }
}

/// Turns a lookup response into a `LookupResult`.
fn lookup<T>(result: Result<T, octocrab::Error>) -> Result<LookupResult, PlatformError> {
    match result {
        Ok(_) => Ok(LookupResult::Exists),
        Err(e) => match extract_status_code(&e) {
            Some(StatusCode::NOT_FOUND) => Ok(LookupResult::NotFound),
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                Ok(LookupResult::Unauthorized)
            }
            _ => Err(platform_error(e)),
        },
    }
}

#[async_trait]
impl PlatformClient for OctocrabClient {
    async fn approval_settings(&self) -> Result<ApprovalSettings, PlatformError> {
        let route = format!(
            "/repos/{}/{}/branches/{}/protection",
            self.owner, self.repo, self.branch
        );
        debug!("Loading branch protection from {}", route);

        let protection: BranchProtection = match self.client.get(&route, None::<&()>).await {
            Ok(protection) => protection,
            Err(e) if extract_status_code(&e) == Some(StatusCode::NOT_FOUND) => {
                debug!("Branch '{}' is not protected", self.branch);
                BranchProtection {
                    required_pull_request_reviews: None,
                }
            }
            Err(e) => return Err(platform_error(e)),
        };

        let reviews = protection.required_pull_request_reviews;
        Ok(ApprovalSettings {
            branch: self.branch.clone(),
            required_approving_review_count: reviews
                .as_ref()
                .map(|r| r.required_approving_review_count.unwrap_or(1)),
            require_code_owner_reviews: reviews.is_some_and(|r| r.require_code_owner_reviews),
        })
    }

    async fn user_exists(&self, username: &str) -> Result<LookupResult, PlatformError> {
        lookup(self.client.users(username).profile().await)
    }

    async fn team_exists(&self, org: &str, team: &str) -> Result<LookupResult, PlatformError> {
        // Team slugs are unique per organization, nested or not
        let slug = team.rsplit('/').next().unwrap_or(team);
        lookup(self.client.teams(org).get(slug).await)
    }
}
