//! Cross-checking the rules against the platform.
//!
//! The check loads the review settings of the protected branch, verifies
//! every distinct owner once and flags rules that end up without anyone
//! able to approve.

use super::problem::{Level, Problem, ProblemTable};
use super::{LookupResult, PlatformClient, PlatformError};
use crate::parse::Owner;
use crate::rules::{OwnershipRule, RuleSet, Section};
use log::{debug, trace, warn};
use std::collections::{HashMap, HashSet};

/// Role names accepted in `@@role` owners.
pub const KNOWN_ROLES: &[&str] = &[
    "owner",
    "owners",
    "maintainer",
    "maintainers",
    "developer",
    "developers",
];

/// Options for the cross-check.
#[derive(Debug, Clone, Default)]
pub struct CrossCheckConfig {
    /// Owners that are not looked up and always count as valid.
    pub ignored_owners: HashSet<String>,
}

impl CrossCheckConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ignored owners.
    pub fn with_ignored_owners(mut self, owners: HashSet<String>) -> Self {
        self.ignored_owners = owners;
        self
    }
}

/// The outcome of the optional cross-check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CrossCheck {
    /// No platform was configured.
    #[default]
    NotConfigured,
    /// The platform could not be reached and the check was not required.
    Skipped {
        /// Why the check was skipped.
        reason: String,
    },
    /// The check ran.
    Completed(ProblemTable),
}

impl CrossCheck {
    /// Returns the problems if the check ran.
    pub fn problems(&self) -> Option<&ProblemTable> {
        match self {
            CrossCheck::Completed(table) => Some(table),
            _ => None,
        }
    }
}

/// Whether an owner can approve, as far as the platform tells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Valid,
    Invalid,
}

fn section_label(section: &Section) -> String {
    section.name.clone().unwrap_or_default()
}

/// Runs the cross-check.
///
/// Any [`PlatformError`] aborts the whole check; the caller decides whether
/// that fails the analysis.
pub async fn run_cross_check(
    rules: &RuleSet,
    client: &dyn PlatformClient,
    config: &CrossCheckConfig,
) -> Result<ProblemTable, PlatformError> {
    debug!("Running platform cross-check");
    let mut table = ProblemTable::new();

    let settings = client.approval_settings().await?;
    debug!("Approval settings: {:?}", settings);
    if !settings.requires_reviews() {
        table.add(Problem::new(
            Level::Error,
            "",
            "",
            "",
            format!(
                "branch '{}' does not require approving reviews",
                settings.branch
            ),
        ));
    }
    if !settings.require_code_owner_reviews {
        table.add(Problem::new(
            Level::Error,
            "",
            "",
            "",
            format!(
                "branch '{}' does not require code owner reviews",
                settings.branch
            ),
        ));
    }
    let branch_count = settings.required_approving_review_count.unwrap_or(0);
    for section in rules.sections().iter().filter(|s| s.is_mandatory()) {
        if let Some(count) = section.min_approvals
            && count > branch_count
        {
            table.add(Problem::new(
                Level::Warning,
                section_label(section),
                "",
                "",
                format!(
                    "section requires {} approvals but branch '{}' only requires {}",
                    count, settings.branch, branch_count
                ),
            ));
        }
    }

    // Each distinct owner is looked up once and reported where it first appears
    let mut verdicts: HashMap<String, Verdict> = HashMap::new();
    for (section, rule) in rules.rules() {
        if rule.negated {
            continue;
        }
        for owner in &rule.owners {
            let key = owner.as_str().into_owned();
            if verdicts.contains_key(&key) {
                trace!("Skipping already-checked owner: {}", key);
                continue;
            }
            let verdict = if config.ignored_owners.contains(&key) {
                trace!("Skipping ignored owner: {}", key);
                Verdict::Valid
            } else {
                verify_owner(owner, section, rule, client, &mut table).await?
            };
            verdicts.insert(key, verdict);
        }
    }

    for (section, rule) in rules.rules() {
        if !rule.explicit_owners || rule.negated {
            continue;
        }
        let any_valid = rule
            .owners
            .iter()
            .any(|owner| verdicts.get(owner.as_str().as_ref()) != Some(&Verdict::Invalid));
        if !any_valid {
            table.add(Problem::new(
                Level::Error,
                section_label(section),
                &rule.text,
                "",
                "no valid approvers for rule",
            ));
        }
    }

    debug!(
        "Cross-check complete: {} unique owners checked, {} problems found",
        verdicts.len(),
        table.len()
    );
    Ok(table)
}

async fn verify_owner(
    owner: &Owner,
    section: &Section,
    rule: &OwnershipRule,
    client: &dyn PlatformClient,
    table: &mut ProblemTable,
) -> Result<Verdict, PlatformError> {
    let report = |table: &mut ProblemTable, level: Level, description: &str| {
        table.add(Problem::new(
            level,
            section_label(section),
            &rule.text,
            owner.as_str(),
            description,
        ));
    };

    match owner {
        Owner::User { name, .. } => {
            trace!("Checking if user @{} exists", name);
            match client.user_exists(name).await? {
                LookupResult::Exists => Ok(Verdict::Valid),
                LookupResult::NotFound => {
                    debug!("User @{} not found", name);
                    report(table, Level::Error, "user does not exist");
                    Ok(Verdict::Invalid)
                }
                LookupResult::Unauthorized => {
                    warn!("Unauthorized to check user @{}", name);
                    report(
                        table,
                        Level::Warning,
                        "insufficient authorization to verify user",
                    );
                    Ok(Verdict::Valid)
                }
            }
        }
        Owner::Team { org, team, .. } => {
            trace!("Checking if team @{}/{} exists", org, team);
            match client.team_exists(org, team).await? {
                LookupResult::Exists => Ok(Verdict::Valid),
                LookupResult::NotFound => {
                    debug!("Team @{}/{} not found", org, team);
                    report(table, Level::Error, "team does not exist in organization");
                    Ok(Verdict::Invalid)
                }
                LookupResult::Unauthorized => {
                    warn!("Unauthorized to check team @{}/{}", org, team);
                    report(
                        table,
                        Level::Warning,
                        "insufficient authorization to verify team",
                    );
                    Ok(Verdict::Valid)
                }
            }
        }
        Owner::Email { email, .. } => {
            trace!("Cannot verify email owner {}", email);
            report(
                table,
                Level::Info,
                "unable to verify email address; assuming the user can approve",
            );
            Ok(Verdict::Valid)
        }
        Owner::Role { role, .. } => {
            if KNOWN_ROLES.contains(&role.as_str()) {
                report(table, Level::Info, "role is checked by name only");
                Ok(Verdict::Valid)
            } else {
                report(table, Level::Fatal, "illegal role was specified");
                Ok(Verdict::Invalid)
            }
        }
    }
}
