//! Branch protection domain types.
//!
//! This module contains the request body of the GitHub "update branch protection" endpoint.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "branch_protection_tests.rs"]
mod tests;

/// Body of `PUT /repos/{owner}/{repo}/branches/{branch}/protection`.
///
/// GitHub requires every top level key to be present, even when it is `null`, so none of
/// the optional fields skip serialization.
///
/// # Examples
///
/// ```rust
/// use github_client::{BranchProtectionUpdate, RequiredStatusChecks};
///
/// let update = BranchProtectionUpdate::enforced(Some(RequiredStatusChecks::new(
///     true,
///     vec!["verifyMetadata".to_string()],
/// )));
/// assert!(update.enforce_admins);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct BranchProtectionUpdate {
    pub required_status_checks: Option<RequiredStatusChecks>,
    pub enforce_admins: bool,
    pub required_pull_request_reviews: Option<serde_json::Value>,
    pub restrictions: Option<BranchRestrictions>,
}

impl BranchProtectionUpdate {
    /// Protection that applies to admins, requires no reviews and restricts nobody.
    pub fn enforced(required_status_checks: Option<RequiredStatusChecks>) -> Self {
        Self {
            required_status_checks,
            enforce_admins: true,
            required_pull_request_reviews: None,
            restrictions: Some(BranchRestrictions::default()),
        }
    }
}

/// Status checks that must pass before merging.
///
/// The check names are sent twice: as the legacy `contexts` list and as structured
/// `checks`. Older API versions only read `contexts`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RequiredStatusChecks {
    /// Require branches to be up to date before merging
    pub strict: bool,
    pub contexts: Vec<String>,
    pub checks: Vec<StatusCheck>,
}

impl RequiredStatusChecks {
    pub fn new(strict: bool, contexts: Vec<String>) -> Self {
        let checks = contexts
            .iter()
            .map(|context| StatusCheck {
                context: context.clone(),
                app_id: None,
            })
            .collect();
        Self {
            strict,
            contexts,
            checks,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct StatusCheck {
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<u64>,
}

/// Users, teams and apps allowed to push. Empty lists mean nobody is singled out.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct BranchRestrictions {
    pub users: Vec<String>,
    pub teams: Vec<String>,
    pub apps: Vec<String>,
}
