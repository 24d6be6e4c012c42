use globset::{Glob, GlobSetBuilder};

use crate::bindings::VariableBindings;
use crate::config::FilesConfig;
use crate::error::{Result, StamperError};
use crate::render::context::eval_bool_expr;
use crate::template::TemplateSet;

/// Apply `[[files.conditional]]` rules: entries whose template path matches a
/// rule whose `when` expression is false are left out of the returned set.
pub fn select_entries(
    set: &TemplateSet,
    files: &FilesConfig,
    bindings: &VariableBindings,
) -> Result<TemplateSet> {
    let mut builder = GlobSetBuilder::new();

    for cond in &files.conditional {
        let include =
            eval_bool_expr(&cond.when, bindings).map_err(|e| StamperError::ConditionEvaluation {
                pattern: cond.pattern.clone(),
                source: e,
            })?;
        if !include {
            let glob = Glob::new(&cond.pattern).map_err(|e| StamperError::GlobPattern {
                pattern: cond.pattern.clone(),
                source: e,
            })?;
            builder.add(glob);
        }
    }

    let excluded = builder.build().map_err(|e| StamperError::GlobPattern {
        pattern: "<conditional>".into(),
        source: e,
    })?;

    Ok(set.filtered(|entry| !excluded.is_match(&entry.path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConditionalFile;
    use crate::template::TemplateEntry;

    fn set() -> TemplateSet {
        [
            "app/src/main/cpp/CMakeLists.txt",
            "app/src/main/java/MainActivity.java",
            "library/build.gradle",
        ]
        .into_iter()
        .map(|p| TemplateEntry::text(p, ""))
        .collect()
    }

    fn files(rules: &[(&str, &str)]) -> FilesConfig {
        FilesConfig {
            conditional: rules
                .iter()
                .map(|(pattern, when)| ConditionalFile {
                    pattern: pattern.to_string(),
                    when: when.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn paths(set: &TemplateSet) -> Vec<&str> {
        set.entries().iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn test_false_condition_excludes_matches() {
        let rules = files(&[
            ("**/cpp/**", "template == 'native'"),
            ("library/**", "template == 'library'"),
        ]);
        let bindings: VariableBindings = [("template", "app")].into_iter().collect();

        let selected = select_entries(&set(), &rules, &bindings).unwrap();
        assert_eq!(paths(&selected), vec!["app/src/main/java/MainActivity.java"]);
    }

    #[test]
    fn test_true_condition_keeps_matches() {
        let rules = files(&[("**/cpp/**", "template == 'native'")]);
        let bindings: VariableBindings = [("template", "native")].into_iter().collect();

        let selected = select_entries(&set(), &rules, &bindings).unwrap();
        assert_eq!(selected, set());
    }

    #[test]
    fn test_invalid_expression() {
        let rules = files(&[("**", "template ==")]);
        let result = select_entries(&set(), &rules, &VariableBindings::new());
        assert!(matches!(
            result,
            Err(StamperError::ConditionEvaluation { .. })
        ));
    }
}
