//! Naming rules for module repositories.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "naming_tests.rs"]
mod tests;

/// The names derived for a new module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleNames {
    /// Repository name, e.g. `terraform-aws-vpc`
    pub name: String,
    /// Module name recorded in the descriptor, e.g. `aws-vpc`
    pub module_name: String,
    pub description: String,
}

/// Derives the repository name, module name and description.
///
/// `gitops` modules are always named `terraform-gitops-{base}`. Other modules include the
/// provider when one is given (an empty provider counts as none) and fall back to `any`.
pub fn resolve_names(repo_type: &str, base_name: &str, provider: Option<&str>) -> ModuleNames {
    let provider = provider.filter(|p| !p.is_empty());

    if repo_type == "gitops" {
        return ModuleNames {
            name: format!("terraform-gitops-{}", base_name),
            module_name: format!("gitops-{}", base_name),
            description: format!(
                "Module to populate a gitops repo with the resources to provision {}",
                base_name
            ),
        };
    }

    match provider {
        Some(provider) => ModuleNames {
            name: format!("terraform-{}-{}", provider, base_name),
            module_name: format!("{}-{}", provider, base_name),
            description: format!("Module to provision {} on {}", base_name, provider),
        },
        None => ModuleNames {
            name: format!("terraform-any-{}", base_name),
            module_name: base_name.to_string(),
            description: format!("Module to provision {}", base_name),
        },
    }
}
