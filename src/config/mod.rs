pub mod schema;
pub mod variable;

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::{Result, StamperError};

pub use schema::{ConditionalFile, FilesConfig, TemplateManifest, TemplateMetadata};
pub use variable::VariableConfig;

pub const MANIFEST_FILE: &str = "stamper.toml";

/// Load and validate the manifest of a template directory.
///
/// A template without `stamper.toml` gets a default manifest named after its directory.
pub fn load_manifest(template_dir: &Path) -> Result<TemplateManifest> {
    let manifest_path = template_dir.join(MANIFEST_FILE);

    let mut manifest = if manifest_path.exists() {
        let content = std::fs::read_to_string(&manifest_path).map_err(|e| StamperError::Io {
            context: format!("reading {}", manifest_path.display()),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| StamperError::ManifestParse {
            path: manifest_path.clone(),
            source: e,
        })?
    } else {
        TemplateManifest::default()
    };

    if manifest.template.name.is_empty() {
        manifest.template.name = template_dir
            .canonicalize()
            .ok()
            .as_deref()
            .unwrap_or(template_dir)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "template".to_string());
    }

    manifest.validate()?;

    Ok(manifest)
}

pub(crate) fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| StamperError::GlobPattern {
            pattern: pattern.clone(),
            source: e,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| StamperError::GlobPattern {
        pattern: "<combined>".into(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_manifest_absent_uses_dir_name() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("android-app");
        std::fs::create_dir(&dir).unwrap();

        let manifest = load_manifest(&dir).unwrap();
        assert_eq!(manifest.template.name, "android-app");
        assert!(manifest.variables.is_empty());
    }

    #[test]
    fn test_load_manifest_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "[template\nname =").unwrap();

        let result = load_manifest(dir.path());
        assert!(matches!(result, Err(StamperError::ManifestParse { .. })));
    }

    #[test]
    fn test_build_glob_set_invalid_pattern() {
        let result = build_glob_set(&["a[".to_string()]);
        assert!(matches!(result, Err(StamperError::GlobPattern { .. })));
    }
}
