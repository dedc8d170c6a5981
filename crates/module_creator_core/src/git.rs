//! Local Git repository operations.
//!
//! This module provides the clone, stage, commit and push steps used to edit a file
//! inside a freshly created repository. The operations sit behind the [`VersionControl`]
//! and [`WorkingCopy`] traits; [`Git2VersionControl`] implements them with git2.
//!
//! For GitHub API operations (creating repositories, managing settings), see the
//! `github_client` crate.

use std::path::{Path, PathBuf};

use git2::{build::RepoBuilder, FetchOptions, PushOptions, RemoteCallbacks, Repository, Signature};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, info};

use crate::errors::ModuleCreatorError as Error;

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;

/// Username GitHub expects when a token is used as the password.
const TOKEN_USERNAME: &str = "x-access-token";

const COMMIT_AUTHOR_NAME: &str = "module-creator";
const COMMIT_AUTHOR_EMAIL: &str = "module-creator@users.noreply.github.com";

/// Credentials for HTTPS git transport.
#[derive(Debug)]
pub struct RepoCredentials {
    username: String,
    password: SecretString,
}

impl RepoCredentials {
    /// An empty username means token authentication and is sent as `x-access-token`.
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// Credentials for a GitHub token.
    pub fn from_token(token: SecretString) -> Self {
        Self::new("", token)
    }

    pub fn username(&self) -> &str {
        if self.username.is_empty() {
            TOKEN_USERNAME
        } else {
            &self.username
        }
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }
}

impl Clone for RepoCredentials {
    fn clone(&self) -> Self {
        Self {
            username: self.username.clone(),
            password: SecretString::from(self.password.expose_secret().to_string()),
        }
    }
}

/// Produces working copies of remote repositories.
pub trait VersionControl: Send + Sync {
    /// Clones `url` into `path` and returns a handle to the working copy.
    fn clone_repository(
        &self,
        url: &str,
        credentials: &RepoCredentials,
        path: &Path,
    ) -> Result<Box<dyn WorkingCopy>, Error>;
}

/// A checked out repository.
pub trait WorkingCopy: Send {
    /// Root of the working tree.
    fn path(&self) -> &Path;

    /// Name of the checked out branch.
    fn current_branch(&self) -> Result<String, Error>;

    /// Stages every change in the working tree, including deletions.
    fn add_all(&self) -> Result<(), Error>;

    /// Commits the index on top of HEAD.
    fn commit(&self, message: &str) -> Result<(), Error>;

    /// Pushes `branch` to the same branch on `remote`.
    fn push(&self, remote: &str, branch: &str) -> Result<(), Error>;
}

/// [`VersionControl`] backed by git2.
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2VersionControl;

impl VersionControl for Git2VersionControl {
    fn clone_repository(
        &self,
        url: &str,
        credentials: &RepoCredentials,
        path: &Path,
    ) -> Result<Box<dyn WorkingCopy>, Error> {
        info!("Cloning {} into {:?}", url, path);

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(credential_callbacks(credentials));

        let repo = RepoBuilder::new()
            .fetch_options(fetch_options)
            .clone(url, path)
            .map_err(|e| {
                error!("Failed to clone {}: {}", url, e);
                Error::GitOperation(format!("Failed to clone {}: {}", url, e.message()))
            })?;

        debug!("Clone of {} completed", url);

        Ok(Box::new(Git2WorkingCopy {
            repo,
            path: path.to_path_buf(),
            credentials: credentials.clone(),
        }))
    }
}

/// A working copy opened with git2.
pub struct Git2WorkingCopy {
    repo: Repository,
    path: PathBuf,
    credentials: RepoCredentials,
}

impl WorkingCopy for Git2WorkingCopy {
    fn path(&self) -> &Path {
        &self.path
    }

    fn current_branch(&self) -> Result<String, Error> {
        let head = self.repo.head().map_err(|e| {
            error!("Failed to read HEAD: {}", e);
            Error::GitOperation(format!("Failed to read HEAD: {}", e))
        })?;

        if !head.is_branch() {
            return Err(Error::GitOperation(
                "HEAD is detached, no current branch".to_string(),
            ));
        }

        head.shorthand().map(str::to_string).ok_or_else(|| {
            Error::GitOperation("Current branch name is not valid UTF-8".to_string())
        })
    }

    fn add_all(&self) -> Result<(), Error> {
        let mut index = self.repo.index().map_err(|e| {
            error!("Failed to get repository index: {}", e);
            Error::GitOperation(format!("Failed to get repository index: {}", e))
        })?;

        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .map_err(|e| {
                error!("Failed to add files to index: {}", e);
                Error::GitOperation(format!("Failed to add files to index: {}", e))
            })?;

        // add_all does not pick up removed files
        index.update_all(["*"].iter(), None).map_err(|e| {
            error!("Failed to update index: {}", e);
            Error::GitOperation(format!("Failed to update index: {}", e))
        })?;

        index.write().map_err(|e| {
            error!("Failed to write index: {}", e);
            Error::GitOperation(format!("Failed to write index: {}", e))
        })?;

        debug!("Staged {} entries", index.len());
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<(), Error> {
        let mut index = self.repo.index().map_err(|e| {
            Error::GitOperation(format!("Failed to get repository index: {}", e))
        })?;
        let tree_oid = index.write_tree().map_err(|e| {
            error!("Failed to write tree: {}", e);
            Error::GitOperation(format!("Failed to write tree: {}", e))
        })?;
        let tree = self.repo.find_tree(tree_oid).map_err(|e| {
            error!("Failed to find tree: {}", e);
            Error::GitOperation(format!("Failed to find tree: {}", e))
        })?;

        let parent = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| {
                error!("Failed to resolve HEAD commit: {}", e);
                Error::GitOperation(format!("Failed to resolve HEAD commit: {}", e))
            })?;

        let signature = Signature::now(COMMIT_AUTHOR_NAME, COMMIT_AUTHOR_EMAIL).map_err(|e| {
            error!("Failed to create signature: {}", e);
            Error::GitOperation(format!("Failed to create signature: {}", e))
        })?;

        let commit_oid = self
            .repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &[&parent],
            )
            .map_err(|e| {
                error!("Failed to create commit: {}", e);
                Error::GitOperation(format!("Failed to create commit: {}", e))
            })?;

        info!(
            "Changes committed successfully with OID: {} and message: '{}'",
            commit_oid, message
        );
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str) -> Result<(), Error> {
        let mut remote_handle = self.repo.find_remote(remote).map_err(|e| {
            error!("Failed to find remote '{}': {}", remote, e);
            Error::GitOperation(format!("Failed to find remote '{}': {}", remote, e))
        })?;

        let mut callbacks = credential_callbacks(&self.credentials);
        callbacks.push_update_reference(|refname, status| match status {
            Some(msg) => {
                error!("Reference update failed for '{}': {}", refname, msg);
                Err(git2::Error::from_str(&format!(
                    "Push reference update failed: {}",
                    msg
                )))
            }
            None => {
                info!("Reference '{}' updated successfully", refname);
                Ok(())
            }
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!("refs/heads/{}:refs/heads/{}", branch, branch);
        info!("Attempting to push with refspec: {}", refspec);

        remote_handle
            .push(&[&refspec], Some(&mut push_options))
            .map_err(|e| {
                error!("Git push failed with error: {}", e);
                let detailed_error = match e.class() {
                    git2::ErrorClass::Net => format!(
                        "Network error during push: {}. Check internet connection and repository URL.",
                        e.message()
                    ),
                    git2::ErrorClass::Http => format!(
                        "HTTP error during push: {}. This may indicate authentication or permission issues.",
                        e.message()
                    ),
                    git2::ErrorClass::Callback => format!(
                        "Authentication callback error: {}. The token may be invalid or expired.",
                        e.message()
                    ),
                    _ => format!(
                        "Git operation failed: {} (class: {:?})",
                        e.message(),
                        e.class()
                    ),
                };
                Error::GitOperation(detailed_error)
            })?;

        info!("Successfully pushed {} to {}", branch, remote);
        Ok(())
    }
}

fn credential_callbacks(credentials: &RepoCredentials) -> RemoteCallbacks<'static> {
    let username = credentials.username().to_string();
    let password = credentials.password().expose_secret().to_string();

    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |url, _username_from_url, allowed_types| {
        debug!(
            "Git credential callback triggered - URL: {}, allowed types: {:?}",
            url, allowed_types
        );

        if allowed_types.contains(git2::CredentialType::USER_PASS_PLAINTEXT) {
            git2::Cred::userpass_plaintext(&username, &password)
        } else {
            error!(
                "No supported credential types available. Allowed types: {:?}",
                allowed_types
            );
            Err(git2::Error::from_str(
                "No supported credential types for GitHub authentication",
            ))
        }
    });
    callbacks
}
