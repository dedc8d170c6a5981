//! Template registry.
//!
//! Maps a repository type to the template repository the new module is generated from.
//! The lookup is the only validation of the requested type and runs before any call to
//! GitHub.

use serde::{Deserialize, Serialize};

use crate::{ModuleCreatorError, ModuleCreatorResult};

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;

/// A template repository on GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRepo {
    pub template_owner: String,
    pub template_repo: String,
}

impl std::fmt::Display for TemplateRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.template_owner, self.template_repo)
    }
}

const TEMPLATE_REPOS: [(&str, &str, &str); 2] = [
    (
        "gitops",
        "cloud-native-toolkit",
        "template-terraform-gitops",
    ),
    (
        "terraform",
        "cloud-native-toolkit",
        "template-terraform-module",
    ),
];

/// Returns the template for `repo_type`.
///
/// # Errors
///
/// Returns `ModuleCreatorError::UnknownRepoType` carrying the rejected value when the type
/// is not registered.
pub fn lookup_template(repo_type: &str) -> ModuleCreatorResult<TemplateRepo> {
    TEMPLATE_REPOS
        .iter()
        .find(|(key, _, _)| *key == repo_type)
        .map(|(_, owner, repo)| TemplateRepo {
            template_owner: owner.to_string(),
            template_repo: repo.to_string(),
        })
        .ok_or_else(|| ModuleCreatorError::UnknownRepoType(repo_type.to_string()))
}

/// The registered repository types, in registry order.
pub fn supported_repo_types() -> Vec<&'static str> {
    TEMPLATE_REPOS.iter().map(|(key, _, _)| *key).collect()
}

pub(crate) fn supported_repo_types_display() -> String {
    supported_repo_types()
        .iter()
        .map(|t| format!("'{}'", t))
        .collect::<Vec<_>>()
        .join(" and ")
}
