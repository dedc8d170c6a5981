//! Module creation workflow.
//!
//! [`ModuleService::run`] provisions one module repository end to end. The steps run in
//! a fixed order. Template lookup, repository creation and the settings update abort the
//! run; every later step is best effort and only logs a warning when it fails, so a
//! partially configured repository is still reported to the caller.

use std::sync::Arc;

use github_client::GitHubApi;
use serde::{Deserialize, Serialize};

use crate::git::{RepoCredentials, VersionControl};
use crate::logger::Logger;
use crate::module_repo::{Collaborators, MetadataUpdate, ModuleRepo};
use crate::naming::resolve_names;
use crate::template::lookup_template;
use crate::{ModuleCreatorError, ModuleCreatorResult};

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;

/// Everything needed to create one module repository.
#[derive(Debug, Clone)]
pub struct CreateModuleRequest {
    /// Registered repository type, `gitops` or `terraform`
    pub repo_type: String,
    pub owner: String,
    pub base_name: String,
    /// Human readable name, passed through to the result untouched
    pub display_name: Option<String>,
    /// Cloud provider; drives the repository name for non-gitops modules
    pub provider: Option<String>,
    pub software_provider: Option<String>,
    /// Fail when the repository already exists instead of reusing it
    pub strict: bool,
    /// Git credentials used to push the descriptor update
    pub credentials: RepoCredentials,
}

/// Identity of the module repository produced by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateModuleResult {
    pub repo_url: String,
    pub owner: String,
    pub repo: String,
    pub module_name: String,
    pub display_name: Option<String>,
    pub cloud_provider: Option<String>,
    pub software_provider: Option<String>,
}

/// Sequences the repository configuration steps for a new module.
pub struct ModuleService {
    collaborators: Collaborators,
}

impl ModuleService {
    pub fn new(
        client: Arc<dyn GitHubApi>,
        version_control: Arc<dyn VersionControl>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            collaborators: Collaborators {
                client,
                version_control,
                logger,
            },
        }
    }

    /// Creates and configures the module repository described by `request`.
    ///
    /// # Errors
    ///
    /// - `ModuleCreatorError::UnknownRepoType` before any call to GitHub
    /// - `ModuleCreatorError::GitHub` when the repository cannot be created (or already
    ///   exists in strict mode) or its settings cannot be updated
    ///
    /// Failures of the remaining steps are logged as warnings and do not fail the run.
    pub async fn run(&self, request: &CreateModuleRequest) -> ModuleCreatorResult<CreateModuleResult> {
        let logger = self.collaborators.logger.clone();

        let template = lookup_template(&request.repo_type)?;
        let provider = non_empty(request.provider.as_deref());
        let software_provider = non_empty(request.software_provider.as_deref());
        let names = resolve_names(&request.repo_type, &request.base_name, provider.as_deref());

        logger.info(
            &format!("Creating module repository {}/{}", request.owner, names.name),
            &[
                ("type", request.repo_type.as_str()),
                ("template", template.to_string().as_str()),
                ("module", names.module_name.as_str()),
            ],
        );

        let repo = ModuleRepo::create_from_template(
            self.collaborators.clone(),
            &template,
            &request.owner,
            &names.name,
            &names.description,
            request.strict,
        )
        .await?;

        repo.update_settings().await?;

        if let Err(e) = repo.add_default_labels().await {
            warn_tolerated(logger.as_ref(), "Error creating labels", &e);
        }

        repo.create_pages_site().await;

        let metadata = MetadataUpdate {
            repo_url: repo.target().html_url(),
            credentials: request.credentials.clone(),
            name: names.module_name.clone(),
            base_name: request.base_name.clone(),
            repo_type: request.repo_type.clone(),
            cloud_provider: provider.clone(),
            software_provider: software_provider.clone(),
        };
        if let Err(e) = repo.update_metadata(&metadata).await {
            warn_tolerated(logger.as_ref(), "Error updating module metadata", &e);
        }

        if let Err(e) = repo.add_branch_protection().await {
            warn_tolerated(logger.as_ref(), "Error adding branch protection", &e);
        }

        if let Err(e) = repo.create_initial_release().await {
            warn_tolerated(logger.as_ref(), "Error creating initial release", &e);
        }

        let result = CreateModuleResult {
            repo_url: repo.target().html_url(),
            owner: repo.owner().to_string(),
            repo: repo.repo().to_string(),
            module_name: names.module_name,
            display_name: request.display_name.clone(),
            cloud_provider: provider,
            software_provider,
        };
        logger.info(
            &format!("Module repository ready at {}", result.repo_url),
            &[],
        );
        Ok(result)
    }
}

fn warn_tolerated(logger: &dyn Logger, message: &str, error: &ModuleCreatorError) {
    logger.warning(message, &[("error", error.to_string().as_str())]);
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
