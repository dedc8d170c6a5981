use std::io;

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the module creator CLI.
#[derive(Error, Debug)]
pub enum Error {
    /// The GitHub client could not be created for the supplied token.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Invalid or missing inputs.
    ///
    /// Returned when a required input is neither passed as a flag, set through its
    /// `INPUT_*` variable nor present in the configuration file.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Failed to load the configuration file from the filesystem.
    #[error("Failed to load file.")]
    LoadFile(io::Error),

    /// The configuration file is not valid TOML or has unexpected fields.
    #[error("Failed to parse TOML configuration file.")]
    ParseTomlFile(toml::de::Error),

    /// The module repository could not be created.
    #[error(transparent)]
    ModuleCreation(#[from] module_creator_core::ModuleCreatorError),

    /// The step outputs could not be written.
    #[error("Failed to write outputs: {0}")]
    WriteOutputs(io::Error),
}
