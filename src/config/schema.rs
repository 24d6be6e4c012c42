use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::variable::VariableConfig;
use crate::bindings::is_valid_name;
use crate::error::{Result, StamperError};

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct TemplateManifest {
    #[serde(default)]
    pub template: TemplateMetadata,

    #[serde(default)]
    pub variables: BTreeMap<String, VariableConfig>,

    #[serde(default)]
    pub files: FilesConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct TemplateMetadata {
    #[serde(default)]
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,

    /// Load dot-files and dot-directories too (skipped by default).
    #[serde(default)]
    pub include_hidden: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct FilesConfig {
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub copy_without_render: Vec<String>,

    #[serde(default)]
    pub conditional: Vec<ConditionalFile>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ConditionalFile {
    pub pattern: String,
    /// Tera expression; when false, matching files are left out.
    pub when: String,
}

impl TemplateManifest {
    pub fn validate(&self) -> Result<()> {
        for (name, var) in &self.variables {
            if !is_valid_name(name) {
                return Err(StamperError::InvalidManifest {
                    reason: format!("'{name}' is not a valid variable name"),
                });
            }

            if var.computed.is_some() && var.default.is_some() {
                return Err(StamperError::InvalidManifest {
                    reason: format!("variable '{name}' cannot have both 'default' and 'computed'"),
                });
            }

            if let Some(pattern) = &var.validation {
                if var.is_computed() {
                    return Err(StamperError::InvalidManifest {
                        reason: format!("computed variable '{name}' cannot have a 'validation'"),
                    });
                }
                if let Err(e) = regex_lite::Regex::new(pattern) {
                    return Err(StamperError::InvalidManifest {
                        reason: format!("invalid validation pattern for '{name}': {e}"),
                    });
                }
            }
        }

        Ok(())
    }
}
