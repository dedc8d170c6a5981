//! The module descriptor (`module.yaml`) kept at the root of every module repository.
//!
//! Only the fields this crate owns are written; everything else in the descriptor (inputs,
//! outputs, version constraints, ...) is left exactly as the template shipped it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::{ModuleCreatorError, ModuleCreatorResult};

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;

/// File name of the descriptor, relative to the repository root.
pub const MODULE_DESCRIPTOR_FILE: &str = "module.yaml";

/// The descriptor fields set when a module is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleMetadata {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub module_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_provider: Option<String>,
}

impl ModuleMetadata {
    /// Builds the fields for a module, deriving the description from the type, the base
    /// name and the providers. Empty providers are treated as absent.
    pub fn new(
        name: impl Into<String>,
        base_name: &str,
        module_type: impl Into<String>,
        cloud_provider: Option<&str>,
        software_provider: Option<&str>,
    ) -> Self {
        let name = name.into();
        let module_type = module_type.into();
        let cloud_provider = non_empty(cloud_provider);
        let software_provider = non_empty(software_provider);
        let description = metadata_description(
            &module_type,
            base_name,
            cloud_provider.as_deref(),
            software_provider.as_deref(),
        );

        Self {
            name,
            description,
            module_type,
            cloud_provider,
            software_provider,
        }
    }
}

/// Description written to the descriptor.
///
/// gitops modules describe what they deploy into a gitops repository; other modules
/// mention the provider they provision on, preferring the cloud provider. `base_name`
/// is the name without the type or provider prefix, as in the repository description.
pub fn metadata_description(
    module_type: &str,
    base_name: &str,
    cloud_provider: Option<&str>,
    software_provider: Option<&str>,
) -> String {
    if module_type == "gitops" {
        return match software_provider {
            Some(software) => format!(
                "Module to populate a gitops repo with the resources to provision {} from {}",
                base_name, software
            ),
            None => format!(
                "Module to populate a gitops repo with the resources to provision {}",
                base_name
            ),
        };
    }

    match cloud_provider.or(software_provider) {
        Some(provider) => format!("Module to provision {} on {}", base_name, provider),
        None => format!("Module to provision {}", base_name),
    }
}

/// Merges `metadata` into the YAML document at `path` and writes it back.
///
/// Keys present in `metadata` overwrite the document's values; all other keys keep their
/// value and position. Returns the merged document.
///
/// # Errors
///
/// Fails when the file cannot be read or written, is not valid YAML, or its top level is
/// not a mapping.
pub fn read_and_merge(path: &Path, metadata: &ModuleMetadata) -> ModuleCreatorResult<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        ModuleCreatorError::Metadata(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let mut document: Mapping = match serde_yaml::from_str::<Value>(&content)? {
        Value::Mapping(mapping) => mapping,
        Value::Null => Mapping::new(),
        _ => {
            return Err(ModuleCreatorError::Metadata(format!(
                "{} must contain a YAML mapping",
                path.display()
            )))
        }
    };

    if let Value::Mapping(fields) = serde_yaml::to_value(metadata)? {
        for (key, value) in fields {
            document.insert(key, value);
        }
    }

    let merged = Value::Mapping(document);
    fs::write(path, serde_yaml::to_string(&merged)?)?;
    debug!(path = %path.display(), "Module descriptor updated");

    Ok(merged)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
