//! Crate for interacting with the GitHub REST API.
//!
//! The crate exposes a single narrow capability, [`GitHubApi`], which sends a request
//! described by a route template such as `"POST /repos/{owner}/{repo}/labels"` and a JSON
//! parameter object. [`GitHubClient`] implements it on top of an authenticated
//! [`Octocrab`] instance. The remaining modules hold the typed request bodies for the
//! endpoints used when provisioning a repository.

use async_trait::async_trait;
use http::Method;
use octocrab::Octocrab;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

pub mod errors;
pub use errors::Error;

pub mod branch_protection;
pub use branch_protection::{
    BranchProtectionUpdate, BranchRestrictions, RequiredStatusChecks, StatusCheck,
};

pub mod label;
pub use label::Label;

pub mod repository;
pub use repository::{
    PagesSitePayload, PagesSource, ReleasePayload, RepositorySettingsUpdate,
    TemplateRepositoryPayload,
};

pub mod route;
pub use route::{ExpandedRoute, Route};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// The request capability the rest of the workspace depends on.
///
/// Implementations send the request described by `route` (`"<METHOD> <path template>"`)
/// with `params` supplying both the path placeholders and the request body, and return
/// the decoded JSON response (`Value::Null` for empty bodies).
///
/// # Errors
///
/// Non-success responses are reported as [`Error::ApiError`] (or [`Error::NotFound`] /
/// [`Error::RateLimitExceeded`]) so callers can inspect the cause.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    async fn request(&self, route: &str, params: &Value) -> Result<Value, Error>;
}

/// A client for interacting with the GitHub API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// Creates a new `GitHubClient` from an authenticated `Octocrab` instance.
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    /// Sends a request through octocrab's raw HTTP verbs.
    ///
    /// # Errors
    /// Returns `Error::InvalidRoute` for malformed routes or unsupported methods, the
    /// mapped GitHub error for non-success responses and `Error::Deserialization` if the
    /// response body is not JSON.
    #[instrument(skip(self, params), fields(route = %route))]
    async fn request(&self, route: &str, params: &Value) -> Result<Value, Error> {
        let expanded = Route::parse(route)?.expand(params)?;
        debug!(
            method = %expanded.method,
            path = %expanded.path,
            has_body = expanded.body.is_some(),
            "Sending GitHub request"
        );

        let path = expanded.path.as_str();
        let body = expanded.body.as_ref();
        let response = match expanded.method {
            Method::GET => self.client._get(path).await,
            Method::POST => self.client._post(path, body).await,
            Method::PUT => self.client._put(path, body).await,
            Method::PATCH => self.client._patch(path, body).await,
            Method::DELETE => self.client._delete(path, body).await,
            other => {
                return Err(Error::InvalidRoute {
                    route: route.to_string(),
                    reason: format!("unsupported HTTP method {}", other),
                })
            }
        }
        .map_err(|e| map_octocrab_error("Failed to send GitHub request", e))?;

        let response = octocrab::map_github_error(response)
            .await
            .map_err(|e| map_octocrab_error("GitHub rejected the request", e))?;

        let text = self
            .client
            .body_to_string(response)
            .await
            .map_err(|e| map_octocrab_error("Failed to read GitHub response", e))?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Creates an `Octocrab` client authenticated with a personal access token or the
/// `GITHUB_TOKEN` of a workflow run.
///
/// # Errors
/// Returns `Error::AuthError` if the client cannot be built.
#[instrument(skip(token))]
pub fn create_token_client(token: &SecretString) -> Result<Octocrab, Error> {
    Octocrab::builder()
        .personal_token(token.expose_secret().to_string())
        .build()
        .map_err(|e| {
            error!(error = %e, "Failed to build Octocrab client with token credentials");
            Error::AuthError("Failed to create a client for the provided token.".to_string())
        })
}

/// Same as [`create_token_client`] but against a different API root, e.g. GitHub
/// Enterprise Server (`https://ghe.example.com/api/v3`).
///
/// # Errors
/// Returns `Error::AuthError` if the URI is invalid or the client cannot be built.
#[instrument(skip(token))]
pub fn create_token_client_with_base_uri(
    token: &SecretString,
    base_uri: &str,
) -> Result<Octocrab, Error> {
    Octocrab::builder()
        .base_uri(base_uri)
        .map_err(|e| Error::AuthError(format!("Invalid GitHub API URI '{}': {}", base_uri, e)))?
        .personal_token(token.expose_secret().to_string())
        .build()
        .map_err(|e| {
            error!(error = %e, "Failed to build Octocrab client with token credentials");
            Error::AuthError("Failed to create a client for the provided token.".to_string())
        })
}

fn map_octocrab_error(message: &str, e: octocrab::Error) -> Error {
    log_octocrab_error(message, &e);
    match e {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            let errors: Vec<String> = source
                .errors
                .as_ref()
                .map(|errors| errors.iter().map(validation_message).collect())
                .unwrap_or_default();

            if status == 404 {
                Error::NotFound
            } else if (status == 403 || status == 429)
                && source.message.to_ascii_lowercase().contains("rate limit")
            {
                Error::RateLimitExceeded
            } else {
                Error::ApiError {
                    status,
                    message: source.message.clone(),
                    errors,
                }
            }
        }
        _ => Error::InvalidResponse,
    }
}

// GitHub validation errors are objects with a `message` (custom errors) or a
// `code`/`field` pair; occasionally they are plain strings.
fn validation_message(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("message").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => error.to_string(),
        },
        other => other.to_string(),
    }
}

fn log_octocrab_error(message: &str, e: &octocrab::Error) {
    match e {
        // Callers decide whether a GitHub error response is fatal.
        octocrab::Error::GitHub { source, backtrace } => warn!(
            error_message = %source.message,
            status = source.status_code.as_u16(),
            backtrace = backtrace.to_string(),
            "{}. Received an error from GitHub",
            message
        ),
        octocrab::Error::UriParse { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}. Failed to parse URI.",
            message
        ),
        octocrab::Error::Uri { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}, Failed to parse URI.",
            message
        ),
        octocrab::Error::InvalidHeaderValue { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}. One of the header values was invalid.",
            message
        ),
        octocrab::Error::InvalidUtf8 { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}. The message wasn't valid UTF-8.",
            message,
        ),
        _ => error!(error_message = e.to_string(), message),
    };
}
