//! # Module Creator Core
//!
//! This crate provides the orchestration logic for creating Terraform module repositories
//! on GitHub from one of the registered templates.
//!
//! ## Overview
//!
//! A run of [`ModuleService::run`] performs the complete workflow:
//! 1. Template lookup for the requested repository type
//! 2. Derivation of the repository name, module name and description
//! 3. Repository generation from the template (reusing an existing repository unless strict)
//! 4. Repository settings update
//! 5. Default labels and the GitHub Pages site
//! 6. Module descriptor (`module.yaml`) update through clone, commit and push
//! 7. Branch protection and the initial `v0.0.0` release
//!
//! Steps 1 to 4 abort the run when they fail. Later steps log a warning and the run
//! continues.
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use github_client::{create_token_client, GitHubClient};
//! use module_creator_core::{
//!     CreateModuleRequest, Git2VersionControl, ModuleService, RepoCredentials, TracingLogger,
//! };
//! use secrecy::SecretString;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let token = SecretString::from("ghp_example".to_string());
//! let client = GitHubClient::new(create_token_client(&token)?);
//!
//! let service = ModuleService::new(
//!     Arc::new(client),
//!     Arc::new(Git2VersionControl),
//!     Arc::new(TracingLogger),
//! );
//!
//! let result = service
//!     .run(&CreateModuleRequest {
//!         repo_type: "terraform".to_string(),
//!         owner: "acme".to_string(),
//!         base_name: "vpc".to_string(),
//!         display_name: None,
//!         provider: Some("aws".to_string()),
//!         software_provider: None,
//!         strict: false,
//!         credentials: RepoCredentials::from_token(token),
//!     })
//!     .await?;
//!
//! println!("Created {}", result.repo_url);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! External capabilities are injected so every step can be tested in isolation:
//! - [`github_client::GitHubApi`] for GitHub REST calls
//! - [`VersionControl`] for the git clone/commit/push of the descriptor update
//! - [`Logger`] for progress and tolerated failures

mod errors;
pub use errors::{
    BranchProtectionError, BranchProtectionErrors, ModuleCreatorError, ModuleCreatorResult,
};

pub mod git;
pub use git::{Git2VersionControl, Git2WorkingCopy, RepoCredentials, VersionControl, WorkingCopy};

pub mod limiter;
pub use limiter::{ConcurrencyLimiter, DEFAULT_CONCURRENCY};

pub mod logger;
pub use logger::{LogLevel, LogProperties, Logger, TracingLogger};

pub mod metadata;
pub use metadata::{ModuleMetadata, MODULE_DESCRIPTOR_FILE};

pub mod module_repo;
pub use module_repo::{Collaborators, MetadataUpdate, ModuleRepo, RepoTarget};

pub mod naming;
pub use naming::{resolve_names, ModuleNames};

pub mod service;
pub use service::{CreateModuleRequest, CreateModuleResult, ModuleService};

pub mod template;
pub use template::{lookup_template, supported_repo_types, TemplateRepo};

#[cfg(test)]
mod test_support;
