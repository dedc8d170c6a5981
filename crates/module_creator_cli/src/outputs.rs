//! Step outputs.
//!
//! Inside a workflow the outputs are appended to the file named by `GITHUB_OUTPUT`;
//! elsewhere they are printed as `key=value` lines.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use module_creator_core::CreateModuleResult;
use tracing::debug;

use crate::errors::Error;

#[cfg(test)]
#[path = "outputs_tests.rs"]
mod tests;

pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// The outputs published for a created module, in publication order.
///
/// `repo_url` and `repoUrl` carry the same value. Absent optional values are published
/// as empty strings so downstream steps can always reference them.
pub fn module_outputs(result: &CreateModuleResult) -> Vec<(&'static str, String)> {
    vec![
        ("repo_url", result.repo_url.clone()),
        ("repoUrl", result.repo_url.clone()),
        ("owner", result.owner.clone()),
        ("repo", result.repo.clone()),
        ("moduleName", result.module_name.clone()),
        ("displayName", result.display_name.clone().unwrap_or_default()),
        (
            "cloudProvider",
            result.cloud_provider.clone().unwrap_or_default(),
        ),
        (
            "softwareProvider",
            result.software_provider.clone().unwrap_or_default(),
        ),
    ]
}

/// Renders outputs in the `GITHUB_OUTPUT` file format.
pub fn format_outputs(outputs: &[(&str, String)]) -> String {
    let mut rendered = String::new();
    for (key, value) in outputs {
        if value.contains('\n') {
            let delimiter = delimiter_for(value);
            rendered.push_str(&format!("{}<<{}\n{}\n{}\n", key, delimiter, value, delimiter));
        } else {
            rendered.push_str(&format!("{}={}\n", key, value));
        }
    }
    rendered
}

/// Appends the outputs to `output_file` when given, otherwise writes them to `fallback`.
///
/// # Errors
///
/// Returns `Error::WriteOutputs` if the file cannot be opened or either target cannot be
/// written.
pub fn write_outputs<W: Write>(
    outputs: &[(&str, String)],
    output_file: Option<&Path>,
    fallback: &mut W,
) -> Result<(), Error> {
    let rendered = format_outputs(outputs);
    match output_file {
        Some(path) => {
            debug!("Appending {} outputs to {:?}", outputs.len(), path);
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(Error::WriteOutputs)?;
            file.write_all(rendered.as_bytes())
                .map_err(Error::WriteOutputs)
        }
        None => fallback
            .write_all(rendered.as_bytes())
            .and_then(|_| fallback.flush())
            .map_err(Error::WriteOutputs),
    }
}

fn delimiter_for(value: &str) -> String {
    let mut delimiter = "ghadelimiter".to_string();
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    delimiter
}
