//! Configuration of a module repository on GitHub.
//!
//! [`ModuleRepo`] is bound to one repository and can only be obtained once that
//! repository exists, either by generating it from a template or by binding to it
//! explicitly. Batched calls (branch protection, labels) go through a
//! [`ConcurrencyLimiter`] per batch because GitHub rate limits these writes.

use std::fmt;
use std::sync::Arc;

use futures::future::{join_all, try_join_all};
use github_client::{
    BranchProtectionUpdate, GitHubApi, Label, PagesSitePayload, ReleasePayload,
    RepositorySettingsUpdate, RequiredStatusChecks, TemplateRepositoryPayload,
};
use serde::Serialize;
use serde_json::{json, Value};
use temp_dir::TempDir;

use crate::errors::{BranchProtectionError, BranchProtectionErrors};
use crate::git::{RepoCredentials, VersionControl};
use crate::limiter::ConcurrencyLimiter;
use crate::logger::Logger;
use crate::metadata::{read_and_merge, ModuleMetadata, MODULE_DESCRIPTOR_FILE};
use crate::template::TemplateRepo;
use crate::ModuleCreatorResult;

#[cfg(test)]
#[path = "module_repo_tests.rs"]
mod tests;

pub const PAGES_BRANCH: &str = "gh-pages";
pub const MAIN_BRANCH: &str = "main";
pub const INITIAL_RELEASE: &str = "v0.0.0";
pub const METADATA_COMMIT_MESSAGE: &str = "Updates module metadata";

const GENERATE_ROUTE: &str = "POST /repos/{template_owner}/{template_repo}/generate";
const UPDATE_REPO_ROUTE: &str = "PATCH /repos/{owner}/{repo}";
const BRANCH_PROTECTION_ROUTE: &str = "PUT /repos/{owner}/{repo}/branches/{branch}/protection";
const CREATE_LABEL_ROUTE: &str = "POST /repos/{owner}/{repo}/labels";
const CREATE_PAGES_ROUTE: &str = "POST /repos/{owner}/{repo}/pages";
const CREATE_RELEASE_ROUTE: &str = "POST /repos/{owner}/{repo}/releases";

/// Status checks required on a protected branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCheckRule {
    pub strict: bool,
    pub contexts: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchRule {
    pub branch: &'static str,
    pub required_status_checks: Option<StatusCheckRule>,
}

/// Protection applied to every new module repository.
pub const BRANCH_RULES: [BranchRule; 2] = [
    BranchRule {
        branch: PAGES_BRANCH,
        required_status_checks: None,
    },
    BranchRule {
        branch: MAIN_BRANCH,
        required_status_checks: Some(StatusCheckRule {
            strict: true,
            contexts: &["verifyMetadata", "verify (ocp4_latest)"],
        }),
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultLabel {
    pub name: &'static str,
    pub description: &'static str,
    pub color: &'static str,
}

/// Labels created in every new module repository.
pub const DEFAULT_LABELS: [DefaultLabel; 6] = [
    DefaultLabel {
        name: "major",
        description: "Release: major (x.0.0)",
        color: "94FFA4",
    },
    DefaultLabel {
        name: "minor",
        description: "Release: minor (0.x.0)",
        color: "94D5A4",
    },
    DefaultLabel {
        name: "patch",
        description: "Release: patch (0.0.x)",
        color: "94BBA4",
    },
    DefaultLabel {
        name: "chore",
        description: "Changelog: chore",
        color: "000000",
    },
    DefaultLabel {
        name: "feature",
        description: "Changelog: feature",
        color: "0075ca",
    },
    DefaultLabel {
        name: "skip ci",
        description: "Skip the CI workflows for this change",
        color: "ededed",
    },
];

/// Owner and name of a repository on GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoTarget {
    pub owner: String,
    pub repo: String,
}

impl RepoTarget {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepoTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// The external capabilities a [`ModuleRepo`] works with.
#[derive(Clone)]
pub struct Collaborators {
    pub client: Arc<dyn GitHubApi>,
    pub version_control: Arc<dyn VersionControl>,
    pub logger: Arc<dyn Logger>,
}

/// Inputs of [`ModuleRepo::update_metadata`].
#[derive(Debug, Clone)]
pub struct MetadataUpdate {
    /// Clone URL of the repository
    pub repo_url: String,
    pub credentials: RepoCredentials,
    /// Module name written to the descriptor; also names the scratch directory
    pub name: String,
    /// Name without type or provider prefix, used in the descriptor description
    pub base_name: String,
    pub repo_type: String,
    pub cloud_provider: Option<String>,
    pub software_provider: Option<String>,
}

/// A module repository that exists on GitHub.
pub struct ModuleRepo {
    target: RepoTarget,
    collaborators: Collaborators,
    protection_limiter: ConcurrencyLimiter,
    label_limiter: ConcurrencyLimiter,
}

impl ModuleRepo {
    /// Binds to a repository that already exists.
    pub fn bind(collaborators: Collaborators, target: RepoTarget) -> Self {
        Self {
            target,
            collaborators,
            protection_limiter: ConcurrencyLimiter::default(),
            label_limiter: ConcurrencyLimiter::default(),
        }
    }

    /// Generates `owner/name` from `template`, copying all branches.
    ///
    /// When `strict` is `false` and GitHub reports that the repository already exists,
    /// the existing repository is used so reruns can pick up where they left off.
    ///
    /// # Errors
    ///
    /// Returns `ModuleCreatorError::GitHub` for every other failure, and for "already
    /// exists" when `strict` is `true`.
    pub async fn create_from_template(
        collaborators: Collaborators,
        template: &TemplateRepo,
        owner: &str,
        name: &str,
        description: &str,
        strict: bool,
    ) -> ModuleCreatorResult<Self> {
        let logger = collaborators.logger.clone();
        let payload = TemplateRepositoryPayload {
            owner: owner.to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
            private: false,
            include_all_branches: true,
        };
        let mut params = serde_json::to_value(&payload).map_err(github_client::Error::from)?;
        params["template_owner"] = json!(template.template_owner);
        params["template_repo"] = json!(template.template_repo);

        // See https://docs.github.com/en/rest/repos/repos#create-a-repository-using-a-template
        logger.debug(
            &format!(
                "Creating repo {}/{} from template {}",
                owner, name, template
            ),
            &[],
        );

        let target = RepoTarget::new(owner, name);
        match collaborators.client.request(GENERATE_ROUTE, &params).await {
            Ok(_) => {}
            Err(e) if !strict && e.is_already_exists() => {
                logger.info(
                    &format!("Repo {} already exists, reusing it", target),
                    &[("owner", owner), ("repo", name)],
                );
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self::bind(collaborators, target))
    }

    pub fn target(&self) -> &RepoTarget {
        &self.target
    }

    pub fn owner(&self) -> &str {
        &self.target.owner
    }

    pub fn repo(&self) -> &str {
        &self.target.repo
    }

    /// Disables merge commits, enables auto-merge and branch deletion on merge.
    pub async fn update_settings(&self) -> ModuleCreatorResult<()> {
        let settings = RepositorySettingsUpdate {
            allow_merge_commit: Some(false),
            allow_auto_merge: Some(true),
            delete_branch_on_merge: Some(true),
            ..Default::default()
        };

        // See https://docs.github.com/en/rest/repos/repos#update-a-repository
        self.logger()
            .debug(&format!("Updating repo {}", self.target), &[]);
        let params = self.params(&settings)?;
        self.collaborators
            .client
            .request(UPDATE_REPO_ROUTE, &params)
            .await?;
        Ok(())
    }

    /// Applies [`BRANCH_RULES`], one branch at a time.
    ///
    /// Every branch is attempted even if an earlier one failed.
    ///
    /// # Errors
    ///
    /// Returns `ModuleCreatorError::BranchProtection` listing each branch that failed.
    pub async fn add_branch_protection(&self) -> ModuleCreatorResult<()> {
        // See https://docs.github.com/en/rest/branches/branch-protection#update-branch-protection
        self.logger().debug(
            &format!("Update branch protection for repo {}", self.target),
            &[],
        );

        let results = join_all(
            BRANCH_RULES
                .iter()
                .map(|rule| self.protection_limiter.run(self.protect_branch(rule))),
        )
        .await;

        let errors: Vec<BranchProtectionError> =
            results.into_iter().filter_map(Result::err).collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(BranchProtectionErrors::new(errors).into())
        }
    }

    async fn protect_branch(&self, rule: &BranchRule) -> Result<(), BranchProtectionError> {
        let checks = rule.required_status_checks.map(|checks| {
            RequiredStatusChecks::new(
                checks.strict,
                checks.contexts.iter().map(|c| c.to_string()).collect(),
            )
        });
        let update = BranchProtectionUpdate::enforced(checks);

        let mut params = self
            .params(&update)
            .map_err(|e| BranchProtectionError::new(rule.branch, e))?;
        params["branch"] = json!(rule.branch);

        self.collaborators
            .client
            .request(BRANCH_PROTECTION_ROUTE, &params)
            .await
            .map(|_| ())
            .map_err(|e| BranchProtectionError::new(rule.branch, e))
    }

    /// Creates [`DEFAULT_LABELS`].
    ///
    /// # Errors
    ///
    /// The first failing label is returned as `ModuleCreatorError::GitHub`; callers are
    /// expected to treat it as non-fatal.
    pub async fn add_default_labels(&self) -> ModuleCreatorResult<()> {
        // See https://docs.github.com/en/rest/issues/labels#create-a-label
        self.logger()
            .debug(&format!("Creating labels for repo {}", self.target), &[]);

        try_join_all(
            DEFAULT_LABELS
                .iter()
                .map(|label| self.label_limiter.run(self.create_label(label))),
        )
        .await?;
        Ok(())
    }

    async fn create_label(&self, label: &DefaultLabel) -> Result<(), github_client::Error> {
        let params = self.params(&Label::new(label.name, label.description, label.color))?;
        self.collaborators
            .client
            .request(CREATE_LABEL_ROUTE, &params)
            .await
            .map(|_| ())
    }

    /// Publishes GitHub Pages from [`PAGES_BRANCH`].
    ///
    /// Never fails: the site may already exist or Pages may be unavailable for the
    /// account, neither of which matters to the caller.
    pub async fn create_pages_site(&self) {
        // See https://docs.github.com/en/rest/pages/pages#create-a-github-pages-site
        self.logger().debug(
            &format!("Setting GitHub Pages for repo {}", self.target),
            &[],
        );

        let result = match self.params(&PagesSitePayload::from_branch(PAGES_BRANCH)) {
            Ok(params) => self
                .collaborators
                .client
                .request(CREATE_PAGES_ROUTE, &params)
                .await
                .map(|_| ()),
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            self.logger().debug(
                &format!("Unable to create GitHub Pages site for repo {}", self.target),
                &[("error", e.to_string().as_str())],
            );
        }
    }

    /// Creates release [`INITIAL_RELEASE`].
    pub async fn create_initial_release(&self) -> ModuleCreatorResult<()> {
        // See https://docs.github.com/en/rest/releases/releases#create-a-release
        let release = ReleasePayload {
            tag_name: INITIAL_RELEASE.to_string(),
            name: INITIAL_RELEASE.to_string(),
        };
        self.logger().debug(
            &format!("Creating initial release for repo {}", self.target),
            &[],
        );
        let params = self.params(&release)?;
        self.collaborators
            .client
            .request(CREATE_RELEASE_ROUTE, &params)
            .await?;
        Ok(())
    }

    /// Rewrites the module descriptor in the repository and pushes the change.
    ///
    /// The repository is cloned into a scratch directory named after the module, the
    /// descriptor fields are merged in, and the commit is pushed to the branch that was
    /// checked out by the clone. The scratch directory is removed afterwards whatever the
    /// outcome; nothing is rolled back remotely.
    ///
    /// Returns the merged descriptor.
    pub async fn update_metadata(
        &self,
        update: &MetadataUpdate,
    ) -> ModuleCreatorResult<serde_yaml::Value> {
        let scratch = TempDir::with_prefix(format!("{}-", update.name))?;
        let clone_path = scratch.path().join(&update.name);

        self.logger().debug(
            &format!("Cloning {} to update module metadata", update.repo_url),
            &[("path", clone_path.display().to_string().as_str())],
        );
        let working_copy = self.collaborators.version_control.clone_repository(
            &update.repo_url,
            &update.credentials,
            &clone_path,
        )?;
        let branch = working_copy.current_branch()?;

        let metadata = ModuleMetadata::new(
            update.name.as_str(),
            &update.base_name,
            update.repo_type.as_str(),
            update.cloud_provider.as_deref(),
            update.software_provider.as_deref(),
        );
        let document = read_and_merge(
            &working_copy.path().join(MODULE_DESCRIPTOR_FILE),
            &metadata,
        )?;
        let rendered = serde_yaml::to_string(&document)?;
        self.logger().debug(
            &format!("Updated {}", MODULE_DESCRIPTOR_FILE),
            &[("content", rendered.as_str())],
        );

        working_copy.add_all()?;
        working_copy.commit(METADATA_COMMIT_MESSAGE)?;
        working_copy.push("origin", &branch)?;

        self.logger().debug(
            &format!("Pushed module metadata to {} on {}", self.target, branch),
            &[],
        );
        Ok(document)
    }

    fn logger(&self) -> &dyn Logger {
        self.collaborators.logger.as_ref()
    }

    /// Serializes `body` and adds the `owner` and `repo` path parameters.
    fn params<T: Serialize>(&self, body: &T) -> Result<Value, github_client::Error> {
        let mut params = serde_json::to_value(body)?;
        match params.as_object_mut() {
            Some(map) => {
                map.insert("owner".to_string(), json!(self.target.owner));
                map.insert("repo".to_string(), json!(self.target.repo));
                Ok(params)
            }
            None => Err(github_client::Error::InvalidRoute {
                route: self.target.to_string(),
                reason: "request body must be a JSON object".to_string(),
            }),
        }
    }
}

impl fmt::Debug for ModuleRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRepo")
            .field("target", &self.target)
            .field("protection_limiter", &self.protection_limiter)
            .field("label_limiter", &self.label_limiter)
            .finish()
    }
}
