//! Label domain types.
//!
//! This module contains types representing GitHub issue and pull request labels.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "label_tests.rs"]
mod tests;

/// A label as sent to `POST /repos/{owner}/{repo}/labels`.
///
/// # Examples
///
/// ```
/// use github_client::Label;
///
/// let label = Label::new("major", "Release: major (x.0.0)", "94FFA4");
/// assert_eq!(label.name, "major");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    /// The name of the label
    pub name: String,
    pub description: String,
    /// Hex color without the leading '#'
    pub color: String,
}

impl Label {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            color: color.into(),
        }
    }
}
