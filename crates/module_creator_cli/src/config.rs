//! Optional configuration file for the module creator CLI.
//!
//! The file provides defaults for the inputs that tend to be the same across runs, such
//! as the owner or the provider. Flags and `INPUT_*` variables override it.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::Error;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Defaults loaded from a TOML file.
///
/// # Example TOML
///
/// ```toml
/// owner = "acme"
/// type = "terraform"
/// provider = "aws"
/// strict = false
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub owner: Option<String>,

    #[serde(rename = "type")]
    pub repo_type: Option<String>,

    pub provider: Option<String>,

    pub software_provider: Option<String>,

    pub strict: Option<bool>,
}

impl ConfigFile {
    /// Loads the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::LoadFile` when the file cannot be read and `Error::ParseTomlFile`
    /// when it is not a valid configuration.
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading configuration from {:?}", path);

        let content = fs::read_to_string(path).map_err(Error::LoadFile)?;
        toml::from_str(&content).map_err(Error::ParseTomlFile)
    }
}
