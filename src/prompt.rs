use inquire::validator::{ErrorMessage, Validation};

use crate::bindings::VariableBindings;
use crate::config::{TemplateManifest, VariableConfig};
use crate::error::{Result, StamperError};

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptOptions {
    /// Never prompt: unbound variables fall back to their manifest defaults.
    pub use_defaults: bool,
}

/// Declared variables the user still has to be asked for, in manifest order.
///
/// Computed variables and names bound with `-d` are never prompted.
pub fn variables_to_prompt<'a>(
    manifest: &'a TemplateManifest,
    supplied: &VariableBindings,
    options: PromptOptions,
) -> Vec<&'a str> {
    if options.use_defaults {
        return Vec::new();
    }

    manifest
        .variables
        .iter()
        .filter(|(name, var)| var.is_prompted() && !supplied.contains(name))
        .map(|(name, _)| name.as_str())
        .collect()
}

/// Ask for every variable returned by [`variables_to_prompt`] and add the
/// answers to `supplied`.
pub fn collect_variables(
    manifest: &TemplateManifest,
    supplied: &VariableBindings,
    options: PromptOptions,
) -> Result<VariableBindings> {
    let mut bindings = supplied.clone();

    for name in variables_to_prompt(manifest, supplied, options) {
        let answer = prompt_variable(name, &manifest.variables[name])?;
        bindings.insert(name, answer);
    }

    Ok(bindings)
}

fn prompt_variable(name: &str, var: &VariableConfig) -> Result<String> {
    let prompt_text = var.description.as_deref().unwrap_or(name);

    let mut prompt = inquire::Text::new(prompt_text);
    if let Some(default) = &var.default {
        prompt = prompt.with_default(default);
    }
    if var.validation.is_some() {
        let name = name.to_string();
        let var = var.clone();
        prompt = prompt.with_validator(move |input: &str| {
            match var.check_value(&name, input) {
                Ok(()) => Ok(Validation::Valid),
                Err(StamperError::InvalidValue { message, .. }) => {
                    Ok(Validation::Invalid(ErrorMessage::Custom(message)))
                }
                Err(e) => Err(inquire::CustomUserError::from(e.to_string())),
            }
        });
    }

    prompt.prompt().map_err(|_| StamperError::PromptCancelled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> TemplateManifest {
        toml::from_str(
            r#"
[variables.packageName]
description = "Bundle name"
validation = '^[a-z][a-z0-9]*(\.[a-z0-9_]+)+$'

[variables.appName]
default = "MyApp"

[variables.activityName]
computed = "{{ appName }}Activity"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_prompts_unbound_declared_variables() {
        let manifest = manifest();
        let names =
            variables_to_prompt(&manifest, &VariableBindings::new(), PromptOptions::default());
        assert_eq!(names, vec!["appName", "packageName"]);
    }

    #[test]
    fn test_supplied_variables_are_not_prompted() {
        let manifest = manifest();
        let supplied: VariableBindings = [("packageName", "org.demo.shop")].into_iter().collect();
        let names = variables_to_prompt(&manifest, &supplied, PromptOptions::default());
        assert_eq!(names, vec!["appName"]);
    }

    #[test]
    fn test_use_defaults_never_prompts() {
        let manifest = manifest();
        let options = PromptOptions { use_defaults: true };
        assert!(variables_to_prompt(&manifest, &VariableBindings::new(), options).is_empty());

        let collected = collect_variables(&manifest, &VariableBindings::new(), options).unwrap();
        assert!(collected.is_empty());
    }

    #[test]
    fn test_collect_without_prompts_keeps_supplied() {
        let manifest = manifest();
        let supplied: VariableBindings =
            [("packageName", "org.demo.shop"), ("appName", "Shop")].into_iter().collect();

        let collected = collect_variables(&manifest, &supplied, PromptOptions::default()).unwrap();
        assert_eq!(collected, supplied);
    }
}
