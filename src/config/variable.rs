use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StamperError};

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct VariableConfig {
    /// Shown as the prompt text when the value is asked for interactively.
    pub description: Option<String>,
    /// Used when the variable is not bound on the command line.
    pub default: Option<String>,
    /// Tera template evaluated against the other bindings; never supplied directly.
    pub computed: Option<String>,
    /// Regex a supplied, default or prompted value must match.
    pub validation: Option<String>,
    pub validation_message: Option<String>,
}

impl VariableConfig {
    pub fn is_computed(&self) -> bool {
        self.computed.is_some()
    }

    pub fn is_prompted(&self) -> bool {
        self.computed.is_none()
    }

    /// Check `value` against the `validation` pattern, if any.
    pub fn check_value(&self, name: &str, value: &str) -> Result<()> {
        let Some(pattern) = &self.validation else {
            return Ok(());
        };

        let re = Regex::new(pattern).map_err(|e| StamperError::InvalidManifest {
            reason: format!("invalid validation pattern for '{name}': {e}"),
        })?;

        if re.is_match(value) {
            Ok(())
        } else {
            Err(StamperError::InvalidValue {
                name: name.to_string(),
                message: self.failure_message(),
            })
        }
    }

    pub fn failure_message(&self) -> String {
        match (&self.validation_message, &self.validation) {
            (Some(message), _) => message.clone(),
            (None, Some(pattern)) => format!("must match pattern: {pattern}"),
            (None, None) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn bundle_name() -> VariableConfig {
        VariableConfig {
            validation: Some(r"^[a-z][a-z0-9]*(\.[a-z0-9_]+)+$".into()),
            validation_message: Some("must look like com.example.app".into()),
            ..Default::default()
        }
    }

    #[rstest]
    #[case("com.example.app", true)]
    #[case("org.demo_1.shop", true)]
    #[case("Not A;Package", false)]
    #[case("single", false)]
    #[case("Com.example", false)]
    fn test_check_value(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(bundle_name().check_value("packageName", value).is_ok(), valid);
    }

    #[test]
    fn test_check_value_message() {
        let err = bundle_name().check_value("packageName", "x y").unwrap_err();
        match err {
            StamperError::InvalidValue { name, message } => {
                assert_eq!(name, "packageName");
                assert_eq!(message, "must look like com.example.app");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_check_value_without_pattern() {
        assert!(VariableConfig::default().check_value("x", "anything at all").is_ok());
    }

    #[test]
    fn test_default_failure_message_names_pattern() {
        let var = VariableConfig {
            validation: Some("^[0-9]+$".into()),
            ..Default::default()
        };
        assert_eq!(var.failure_message(), "must match pattern: ^[0-9]+$");
    }
}
