use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::config::TemplateManifest;
use crate::error::{Result, StamperError};
use crate::render::context::eval_computed;

/// Placeholder name to replacement value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableBindings(BTreeMap<String, String>);

impl VariableBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableBindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid name pattern"))
}

/// Whether `name` can appear inside a `{{ ... }}` placeholder.
pub fn is_valid_name(name: &str) -> bool {
    name_pattern().is_match(name)
}

/// Parse one `name=value` argument. The value may itself contain `=`.
pub fn parse_binding(input: &str) -> Result<(String, String)> {
    let Some((name, value)) = input.split_once('=') else {
        return Err(StamperError::InvalidBinding {
            input: input.to_string(),
            reason: "missing '='".into(),
        });
    };

    let name = name.trim();
    if !is_valid_name(name) {
        return Err(StamperError::InvalidBinding {
            input: input.to_string(),
            reason: format!("'{name}' is not a valid variable name"),
        });
    }

    Ok((name.to_string(), value.to_string()))
}

/// Parse repeated `-d name=value` arguments, rejecting duplicate names.
pub fn parse_bindings<S: AsRef<str>>(inputs: &[S]) -> Result<VariableBindings> {
    let mut bindings = VariableBindings::new();
    for input in inputs {
        let (name, value) = parse_binding(input.as_ref())?;
        if bindings.contains(&name) {
            return Err(StamperError::DuplicateBinding { name });
        }
        bindings.insert(name, value);
    }
    Ok(bindings)
}

pub struct ResolvedBindings {
    pub bindings: VariableBindings,
    pub warnings: Vec<String>,
}

/// Combine supplied bindings with manifest defaults and computed variables.
///
/// Supplied values win over defaults. Supplied and default values must pass the
/// variable's `validation` pattern. Computed variables are evaluated after
/// everything else and may depend on each other.
pub fn resolve_bindings(
    manifest: &TemplateManifest,
    supplied: &VariableBindings,
) -> Result<ResolvedBindings> {
    let mut bindings = VariableBindings::new();
    let mut warnings = Vec::new();

    for (name, value) in supplied.iter() {
        match manifest.variables.get(name) {
            Some(var) if var.is_computed() => {
                warnings.push(format!(
                    "'{name}' is computed by the template; the supplied value is ignored"
                ));
                continue;
            }
            Some(var) => var.check_value(name, value)?,
            None if !manifest.variables.is_empty() => {
                warnings.push(format!("'{name}' is not declared by the template"));
            }
            None => {}
        }
        bindings.insert(name, value);
    }

    for (name, var) in &manifest.variables {
        if bindings.contains(name) {
            continue;
        }
        if let Some(default) = &var.default {
            var.check_value(name, default)?;
            bindings.insert(name.clone(), default.clone());
        }
    }

    let mut remaining: Vec<(&str, &str)> = manifest
        .variables
        .iter()
        .filter_map(|(name, var)| var.computed.as_deref().map(|expr| (name.as_str(), expr)))
        .collect();

    while !remaining.is_empty() {
        let mut still_pending = Vec::new();
        for (name, expr) in &remaining {
            match eval_computed(expr, &bindings) {
                Ok(value) => {
                    bindings.insert(*name, value);
                }
                Err(_) => still_pending.push((*name, *expr)),
            }
        }

        if still_pending.len() == remaining.len() {
            // No progress; report the first failure
            let (name, expr) = still_pending[0];
            if let Err(source) = eval_computed(expr, &bindings) {
                return Err(StamperError::ComputedEvaluation {
                    name: name.to_string(),
                    source,
                });
            }
        }
        remaining = still_pending;
    }

    Ok(ResolvedBindings { bindings, warnings })
}
