use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

use globset::Glob;
use regex_lite::Regex;

use crate::config::load_manifest;
use crate::error::Result;
use crate::render::placeholder::{placeholders, Filter};
use crate::template::load_template_set;

/// Result of validating a template.
pub struct CheckResult {
    pub template_name: String,
    pub file_count: usize,
    pub binary_count: usize,
    /// Every placeholder name used in a path or text file.
    pub placeholders: BTreeSet<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Validate a template directory without rendering it.
pub fn check_template(template_dir: &Path) -> Result<CheckResult> {
    let manifest = load_manifest(template_dir)?;
    let set = load_template_set(template_dir, &manifest)?;

    let mut warnings = Vec::new();
    let mut errors = Vec::new();
    let mut used = BTreeSet::new();

    if set.is_empty() {
        errors.push("Template contains no files".to_string());
    }

    for entry in set.entries() {
        let mut sources = vec![("path", entry.path.as_bytes())];
        if !entry.is_binary {
            sources.push(("content", entry.content.as_slice()));
        }

        for (location, bytes) in sources {
            for placeholder in placeholders(bytes) {
                used.insert(placeholder.name.to_string());
                for filter in &placeholder.filters {
                    if filter.parse::<Filter>().is_err() {
                        errors.push(format!(
                            "Unknown filter '{filter}' in {location} of {}",
                            entry.path
                        ));
                    }
                }
            }
        }
    }

    for cond in &manifest.files.conditional {
        if let Err(e) = Glob::new(&cond.pattern) {
            errors.push(format!("Invalid conditional pattern '{}': {e}", cond.pattern));
        }
        if let Err(e) = validate_tera_expression(&cond.when) {
            errors.push(format!(
                "Invalid conditional expression for pattern '{}': {e}",
                cond.pattern
            ));
        }
    }

    for (name, var) in &manifest.variables {
        if let Some(computed) = &var.computed {
            if let Err(e) = validate_tera_template(computed) {
                errors.push(format!(
                    "Invalid 'computed' expression for variable '{name}': {e}"
                ));
            }
        }
    }

    if !manifest.variables.is_empty() {
        for name in used.iter().filter(|n| !manifest.variables.contains_key(*n)) {
            warnings.push(format!(
                "Placeholder '{name}' is not declared in the manifest; it must be bound with -d"
            ));
        }

        let mut referenced = BTreeSet::new();
        for computed in manifest.variables.values().filter_map(|v| v.computed.as_deref()) {
            for tag in tera_tags().captures_iter(computed) {
                let inner = tag.get(1).or_else(|| tag.get(2)).map_or("", |m| m.as_str());
                referenced.extend(expression_identifiers(inner));
            }
        }
        for cond in &manifest.files.conditional {
            referenced.extend(expression_identifiers(&cond.when));
        }

        for name in manifest.variables.keys() {
            if !used.contains(name) && !referenced.contains(name.as_str()) {
                warnings.push(format!("Variable '{name}' is declared but never used"));
            }
        }
    }

    Ok(CheckResult {
        template_name: manifest.template.name,
        file_count: set.len(),
        binary_count: set.entries().iter().filter(|e| e.is_binary).count(),
        placeholders: used,
        warnings,
        errors,
    })
}

fn tera_tags() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)\{\{(.*?)\}\}|\{%(.*?)%\}").expect("valid tag pattern"))
}

fn string_literals() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"'[^']*'|"[^"]*"|`[^`]*`"#).expect("valid literal pattern"))
}

fn identifiers() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("valid identifier pattern"))
}

/// Identifiers a Tera expression refers to. String literals are not searched.
fn expression_identifiers(expr: &str) -> BTreeSet<&str> {
    let mut found = BTreeSet::new();
    for code in string_literals().split(expr) {
        found.extend(identifiers().find_iter(code).map(|m| m.as_str()));
    }
    found
}

fn validate_tera_expression(expr: &str) -> std::result::Result<(), String> {
    let template = format!("{{% if {expr} %}}ok{{% endif %}}");
    validate_tera_template(&template)
}

fn validate_tera_template(source: &str) -> std::result::Result<(), String> {
    let mut tera = tera::Tera::default();
    tera.add_raw_template("__check__", source)
        .map_err(|e| e.to_string())?;
    Ok(())
}
