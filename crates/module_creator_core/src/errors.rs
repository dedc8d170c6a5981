//! Error types for module repository creation.
//!
//! [`ModuleCreatorError`] covers every failure the orchestration can report. Whether a
//! given error aborts a run depends on the step that produced it; see
//! [`crate::ModuleService::run`].

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Result alias used throughout the crate.
pub type ModuleCreatorResult<T> = Result<T, ModuleCreatorError>;

#[derive(Error, Debug)]
pub enum ModuleCreatorError {
    /// The requested repository type has no registered template.
    #[error(
        "Invalid repo type provided. Only {} are supported. ({})",
        crate::template::supported_repo_types_display(),
        .0
    )]
    UnknownRepoType(String),

    /// A GitHub API call failed.
    #[error(transparent)]
    GitHub(#[from] github_client::Error),

    /// One or more branches could not be protected.
    #[error(transparent)]
    BranchProtection(#[from] BranchProtectionErrors),

    /// A local git operation (clone, stage, commit, push) failed.
    #[error("Git operation failed: {0}")]
    GitOperation(String),

    /// The module descriptor could not be read or merged.
    #[error("Failed to update module metadata: {0}")]
    Metadata(String),

    #[error("Failed to parse module descriptor: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to protect a single branch.
#[derive(Error, Debug)]
#[error("Error updating branch protection for {branch} branch")]
pub struct BranchProtectionError {
    branch: String,
    #[source]
    source: github_client::Error,
}

impl BranchProtectionError {
    pub fn new(branch: impl Into<String>, source: github_client::Error) -> Self {
        Self {
            branch: branch.into(),
            source,
        }
    }

    /// The branch whose protection update failed.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// The underlying API failure.
    pub fn cause(&self) -> &github_client::Error {
        &self.source
    }
}

/// All per-branch failures of one branch protection batch.
///
/// Only constructed when at least one branch failed.
#[derive(Error, Debug)]
#[error("Error updating branch protection for branch(es): {}", format_branches(.errors))]
pub struct BranchProtectionErrors {
    errors: Vec<BranchProtectionError>,
}

impl BranchProtectionErrors {
    pub fn new(errors: Vec<BranchProtectionError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[BranchProtectionError] {
        &self.errors
    }

    pub fn branches(&self) -> Vec<&str> {
        self.errors.iter().map(BranchProtectionError::branch).collect()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }
}

impl IntoIterator for BranchProtectionErrors {
    type Item = BranchProtectionError;
    type IntoIter = std::vec::IntoIter<BranchProtectionError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

fn format_branches(errors: &[BranchProtectionError]) -> String {
    let quoted: Vec<String> = errors
        .iter()
        .map(|e| format!("\"{}\"", e.branch))
        .collect();
    format!("[{}]", quoted.join(","))
}
