//! Error types for GitHub client operations.
//!
//! This module defines the error types that can occur when talking to the GitHub REST API
//! through the github_client crate. API failures keep the HTTP status and the messages GitHub
//! returned so callers can inspect the cause, for example to detect that a repository
//! already exists.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitHub client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use github_client::Error;
///
/// match client.request("POST /repos/{owner}/{repo}/labels", &params).await {
///     Ok(_) => println!("Label created"),
///     Err(e) if e.is_already_exists() => println!("Label was already there"),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// GitHub answered with a non-success status code.
    ///
    /// `message` is the top level message of the GitHub error document and `errors`
    /// holds the messages of the individual validation errors, if any.
    #[error("GitHub API request failed with status {status}: {message}")]
    ApiError {
        status: u16,
        message: String,
        errors: Vec<String>,
    },

    /// Authentication or GitHub client initialization failure.
    ///
    /// The contained string provides specific details about the authentication failure.
    #[error("Failed to authenticate or initialize GitHub client: {0}")]
    AuthError(String),

    /// Error deserializing the response from GitHub or serializing a request body.
    #[error("Failed to deserialize GitHub response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The route template could not be turned into a request.
    ///
    /// Raised for unknown HTTP methods, malformed routes and placeholders that have no
    /// matching parameter.
    #[error("Invalid route '{route}': {reason}")]
    InvalidRoute { route: String, reason: String },

    /// The GitHub API returned a response in an unexpected format, or the transport failed
    /// before a response was received.
    #[error("Invalid response format")]
    InvalidResponse,

    /// The requested resource was not found.
    #[error("Resource not found")]
    NotFound,

    /// GitHub API rate limit has been exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl Error {
    /// Returns `true` when GitHub rejected the request because the resource already exists.
    ///
    /// GitHub reports this as a `422 Unprocessable Entity` whose message or validation
    /// errors contain "already exists" (for example "name already exists on this account").
    pub fn is_already_exists(&self) -> bool {
        match self {
            Error::ApiError {
                status,
                message,
                errors,
            } => {
                *status == 422
                    && (mentions_already_exists(message)
                        || errors.iter().any(|e| mentions_already_exists(e)))
            }
            _ => false,
        }
    }

    /// Returns the HTTP status code for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::ApiError { status, .. } => Some(*status),
            Error::NotFound => Some(404),
            _ => None,
        }
    }
}

fn mentions_already_exists(text: &str) -> bool {
    text.to_ascii_lowercase().contains("already exists")
}
