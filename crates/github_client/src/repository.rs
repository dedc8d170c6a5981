//! Repository domain types.
//!
//! Request bodies for the repository endpoints used when provisioning a new repository:
//! generating it from a template, updating its settings, publishing a Pages site and
//! cutting a release.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;

/// Body of `POST /repos/{template_owner}/{template_repo}/generate`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TemplateRepositoryPayload {
    /// The user or organization that will own the new repository
    pub owner: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub private: bool,
    /// Copy every branch of the template, not only the default branch
    pub include_all_branches: bool,
}

/// Represents the settings that can be updated for a repository.
/// Use `Default::default()` and modify fields as needed.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct RepositorySettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_merge_commit: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_auto_merge: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_branch_on_merge: Option<bool>,
}

/// Body of `POST /repos/{owner}/{repo}/pages`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PagesSitePayload {
    pub source: PagesSource,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PagesSource {
    pub branch: String,
    pub path: String,
}

impl PagesSitePayload {
    /// Publishes the root of `branch`.
    pub fn from_branch(branch: impl Into<String>) -> Self {
        Self {
            source: PagesSource {
                branch: branch.into(),
                path: "/".to_string(),
            },
        }
    }
}

/// Body of `POST /repos/{owner}/{repo}/releases`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReleasePayload {
    pub tag_name: String,
    pub name: String,
}
