//! Module creation command.
//!
//! Inputs come from three places, in decreasing priority: command line flags, the
//! `INPUT_*` variables GitHub Actions sets for the action inputs, and the optional TOML
//! configuration file. Empty values count as absent because the runner sets every
//! declared input, including the ones the workflow left blank. That includes `strict`,
//! which is only parsed as a boolean once it has a value.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use github_client::{create_token_client, create_token_client_with_base_uri, GitHubClient};
use module_creator_core::{
    CreateModuleRequest, CreateModuleResult, Git2VersionControl, Logger, ModuleService,
    RepoCredentials,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, info};

use crate::config::ConfigFile;
use crate::errors::Error;

#[cfg(test)]
#[path = "create_cmd_tests.rs"]
mod create_cmd_tests;

/// Command-line arguments for module creation.
#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    /// GitHub token used for the API calls and to push the module metadata.
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repository type, `gitops` or `terraform`.
    #[arg(long = "type", env = "INPUT_TYPE")]
    pub repo_type: Option<String>,

    /// Owner (user or organization) of the new repository.
    #[arg(long, env = "INPUT_OWNER")]
    pub owner: Option<String>,

    /// Base name of the module, e.g. `vpc`.
    #[arg(long, env = "INPUT_NAME")]
    pub name: Option<String>,

    /// Human readable module name, echoed in the outputs.
    #[arg(long, env = "INPUT_DISPLAYNAME")]
    pub display_name: Option<String>,

    /// Cloud provider the module provisions on, e.g. `aws`.
    #[arg(long, env = "INPUT_PROVIDER")]
    pub provider: Option<String>,

    /// Software provider of a gitops module.
    #[arg(long, env = "INPUT_SOFTWAREPROVIDER")]
    pub software_provider: Option<String>,

    /// Fail if the repository already exists instead of configuring it again.
    #[arg(
        long,
        env = "INPUT_STRICT",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub strict: Option<String>,

    /// REST API root, for GitHub Enterprise Server. Defaults to `https://api.github.com`.
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Path to a TOML file with default inputs.
    #[arg(long, env = "INPUT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// The inputs of one module creation, after merging all sources.
#[derive(Debug)]
pub struct ResolvedInputs {
    pub token: SecretString,
    /// API root to talk to instead of the public GitHub API
    pub api_url: Option<String>,
    pub request: CreateModuleRequest,
}

/// Parses a boolean input the way GitHub Actions does (`true`/`True`/`TRUE`,
/// `false`/`False`/`FALSE`).
pub fn parse_bool_input(value: &str) -> Result<bool, String> {
    match value {
        "true" | "True" | "TRUE" => Ok(true),
        "false" | "False" | "FALSE" => Ok(false),
        other => Err(format!(
            "Input does not meet YAML 1.2 \"Core Schema\" specification: {}",
            other
        )),
    }
}

/// Merges the command line arguments with the configuration file defaults.
///
/// # Errors
///
/// Returns `Error::InvalidArguments` naming the first required input (token, type,
/// owner, name) that has no value, or when `strict` is not a boolean.
pub fn resolve_inputs(args: &CreateArgs, config: ConfigFile) -> Result<ResolvedInputs, Error> {
    let token = required(non_empty(args.token.clone()), "token", "INPUT_TOKEN")?;
    let repo_type = required(
        non_empty(args.repo_type.clone()).or(non_empty(config.repo_type)),
        "type",
        "INPUT_TYPE",
    )?;
    let owner = required(
        non_empty(args.owner.clone()).or(non_empty(config.owner)),
        "owner",
        "INPUT_OWNER",
    )?;
    let base_name = required(non_empty(args.name.clone()), "name", "INPUT_NAME")?;
    let strict = match non_empty(args.strict.clone()) {
        Some(value) => Some(parse_bool_input(&value).map_err(|e| {
            Error::InvalidArguments(format!("--strict (or INPUT_STRICT): {}", e))
        })?),
        None => config.strict,
    };

    let token = SecretString::from(token);
    let credentials = RepoCredentials::from_token(SecretString::from(
        token.expose_secret().to_string(),
    ));

    Ok(ResolvedInputs {
        token,
        api_url: non_empty(args.api_url.clone()),
        request: CreateModuleRequest {
            repo_type,
            owner,
            base_name,
            display_name: non_empty(args.display_name.clone()),
            provider: non_empty(args.provider.clone()).or(non_empty(config.provider)),
            software_provider: non_empty(args.software_provider.clone())
                .or(non_empty(config.software_provider)),
            strict: strict.unwrap_or(false),
            credentials,
        },
    })
}

/// Handles the complete module creation workflow.
///
/// Loads the configuration file if one was given, resolves the inputs and hands them to
/// `create_module_fn`. The creation function is injected so the input handling can be
/// tested without GitHub.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be loaded, a required input is
/// missing or the creation itself fails.
pub async fn handle_create_command<F, Fut>(
    args: &CreateArgs,
    create_module_fn: F,
) -> Result<CreateModuleResult, Error>
where
    F: FnOnce(ResolvedInputs) -> Fut,
    Fut: Future<Output = Result<CreateModuleResult, Error>>,
{
    let config = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };

    let inputs = resolve_inputs(args, config)?;
    debug!(
        repo_type = %inputs.request.repo_type,
        owner = %inputs.request.owner,
        name = %inputs.request.base_name,
        strict = inputs.request.strict,
        "Resolved module inputs"
    );

    create_module_fn(inputs).await
}

/// Creates the module repository on GitHub.
///
/// # Errors
///
/// Returns `Error::Auth` if no client can be built for the token and
/// `Error::ModuleCreation` for fatal creation failures.
pub async fn create_module(
    inputs: ResolvedInputs,
    logger: Arc<dyn Logger>,
) -> Result<CreateModuleResult, Error> {
    let octocrab = match &inputs.api_url {
        Some(api_url) => create_token_client_with_base_uri(&inputs.token, api_url),
        None => create_token_client(&inputs.token),
    }
    .map_err(|e| {
        error!(error = %e, "Failed to create GitHub client");
        Error::Auth(e.to_string())
    })?;

    let service = ModuleService::new(
        Arc::new(GitHubClient::new(octocrab)),
        Arc::new(Git2VersionControl),
        logger,
    );

    let result = service.run(&inputs.request).await?;
    info!(repo_url = %result.repo_url, "Module repository created");
    Ok(result)
}

fn required(value: Option<String>, name: &str, env: &str) -> Result<String, Error> {
    value.ok_or_else(|| {
        Error::InvalidArguments(format!("--{} (or {}) is required", name, env))
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
