use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bindings::VariableBindings;
use crate::error::{Result, StamperError};
use crate::render::{RenderResult, RenderedFile};

/// Written next to the generated files so a project remembers its origin.
pub const RECORD_FILE: &str = ".stamper.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub template: String,
    pub template_version: Option<String>,
    pub stamper_version: String,
    pub bindings: VariableBindings,
}

impl GenerationRecord {
    pub fn new(
        template: String,
        template_version: Option<String>,
        bindings: VariableBindings,
    ) -> Self {
        Self {
            template,
            template_version,
            stamper_version: env!("CARGO_PKG_VERSION").to_string(),
            bindings,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Write into an output directory that already has contents.
    pub overwrite: bool,
}

pub struct WrittenProject {
    pub output_dir: PathBuf,
    pub files_created: Vec<PathBuf>,
    pub files_copied: Vec<PathBuf>,
}

/// Write the rendered files of `result` and the generation record under `output_dir`.
///
/// Skipped entries are ignored; deciding whether a partial result may be
/// written is up to the caller.
pub fn write_result(
    result: &RenderResult,
    output_dir: &Path,
    record: &GenerationRecord,
    options: WriteOptions,
) -> Result<WrittenProject> {
    if let Some(file) = result.rendered.iter().find(|f| f.path == RECORD_FILE) {
        return Err(StamperError::ReservedPath {
            path: file.source_path.clone(),
        });
    }

    if !options.overwrite && has_contents(output_dir) {
        return Err(StamperError::OutputExists {
            path: output_dir.to_path_buf(),
        });
    }

    std::fs::create_dir_all(output_dir).map_err(|e| StamperError::Io {
        context: format!("creating output directory {}", output_dir.display()),
        source: e,
    })?;

    let mut files_created = Vec::new();
    let mut files_copied = Vec::new();

    for file in &result.rendered {
        let relative = to_native_path(&file.path);
        write_file(&output_dir.join(&relative), file)?;
        if file.is_binary {
            files_copied.push(relative);
        } else {
            files_created.push(relative);
        }
    }

    write_record(output_dir, record)?;

    Ok(WrittenProject {
        output_dir: output_dir.to_path_buf(),
        files_created,
        files_copied,
    })
}

fn has_contents(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut d| d.next().is_some())
        .unwrap_or(false)
}

fn to_native_path(path: &str) -> PathBuf {
    path.split('/').collect()
}

fn write_file(dest_path: &Path, file: &RenderedFile) -> Result<()> {
    if let Some(parent) = dest_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StamperError::Io {
            context: format!("creating directory {}", parent.display()),
            source: e,
        })?;
    }
    std::fs::write(dest_path, &file.content).map_err(|e| StamperError::Io {
        context: format!("writing {}", dest_path.display()),
        source: e,
    })?;

    if file.executable {
        set_executable(dest_path)?;
    }
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(|e| {
        StamperError::Io {
            context: format!("setting permissions on {}", path.display()),
            source: e,
        }
    })
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

fn write_record(output_dir: &Path, record: &GenerationRecord) -> Result<()> {
    let record_path = output_dir.join(RECORD_FILE);
    let json = serde_json::to_string_pretty(record).map_err(|e| StamperError::Io {
        context: format!("serializing {}", record_path.display()),
        source: e.into(),
    })?;
    std::fs::write(&record_path, json + "\n").map_err(|e| StamperError::Io {
        context: format!("writing {}", record_path.display()),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render;
    use crate::template::{TemplateEntry, TemplateSet};

    fn record() -> GenerationRecord {
        GenerationRecord::new(
            "android-app".into(),
            Some("0.1.0".into()),
            [("packageName", "com.example.app")].into_iter().collect(),
        )
    }

    fn rendered(entries: Vec<TemplateEntry>) -> RenderResult {
        render(&TemplateSet::new(entries), &record().bindings).unwrap()
    }

    #[test]
    fn test_writes_files_and_record() {
        let result = rendered(vec![
            TemplateEntry::text(
                "app/{{ packageName | path }}/Main.java",
                "package {{packageName}};",
            ),
            TemplateEntry::binary("app/icon.png", vec![0x89u8, 0]),
        ]);
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("MyApp");

        let written = write_result(&result, &out, &record(), WriteOptions::default()).unwrap();

        assert_eq!(
            std::fs::read_to_string(out.join("app/com/example/app/Main.java")).unwrap(),
            "package com.example.app;"
        );
        assert_eq!(std::fs::read(out.join("app/icon.png")).unwrap(), vec![0x89, 0]);
        assert_eq!(written.files_created.len(), 1);
        assert_eq!(written.files_copied, vec![PathBuf::from("app").join("icon.png")]);

        let saved: GenerationRecord =
            serde_json::from_str(&std::fs::read_to_string(out.join(RECORD_FILE)).unwrap())
                .unwrap();
        assert_eq!(saved, record());
    }

    #[test]
    fn test_refuses_non_empty_output() {
        let result = rendered(vec![TemplateEntry::text("a.txt", "new")]);
        let out = tempfile::tempdir().unwrap();
        std::fs::write(out.path().join("existing.txt"), "old").unwrap();

        let err = write_result(&result, out.path(), &record(), WriteOptions::default());
        assert!(matches!(err, Err(StamperError::OutputExists { .. })));
        assert!(!out.path().join("a.txt").exists());

        write_result(&result, out.path(), &record(), WriteOptions { overwrite: true }).unwrap();
        assert_eq!(std::fs::read_to_string(out.path().join("a.txt")).unwrap(), "new");
    }

    #[test]
    fn test_empty_existing_output_is_fine() {
        let result = rendered(vec![TemplateEntry::text("a.txt", "")]);
        let out = tempfile::tempdir().unwrap();

        assert!(write_result(&result, out.path(), &record(), WriteOptions::default()).is_ok());
    }

    #[test]
    fn test_reserved_record_path() {
        let result = rendered(vec![TemplateEntry::text(RECORD_FILE, "{}")]);
        let out = tempfile::tempdir().unwrap();

        let err = write_result(&result, out.path(), &record(), WriteOptions::default());
        assert!(matches!(err, Err(StamperError::ReservedPath { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_preserves_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let mut script = TemplateEntry::text("gradlew", "#!/bin/sh\n");
        script.executable = true;
        let result = rendered(vec![script, TemplateEntry::text("gradle.properties", "")]);
        let out = tempfile::tempdir().unwrap();

        write_result(&result, out.path(), &record(), WriteOptions::default()).unwrap();

        let mode = |name: &str| {
            std::fs::metadata(out.path().join(name))
                .unwrap()
                .permissions()
                .mode()
        };
        assert_eq!(mode("gradlew") & 0o111, 0o111);
        assert_eq!(mode("gradle.properties") & 0o111, 0);
    }
}
