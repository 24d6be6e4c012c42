use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::config::{build_glob_set, TemplateManifest, MANIFEST_FILE};
use crate::error::{Result, StamperError};
use crate::template::{TemplateEntry, TemplateSet};

const SNIFF_LEN: usize = 8192;

/// Walk a template directory into a [`TemplateSet`].
///
/// Entries come out sorted by file name so the set (and everything rendered
/// from it) is deterministic across platforms.
pub fn load_template_set(template_dir: &Path, manifest: &TemplateManifest) -> Result<TemplateSet> {
    if !template_dir.is_dir() {
        return Err(StamperError::TemplateDirectoryMissing {
            path: template_dir.to_path_buf(),
        });
    }

    let exclude_set = build_glob_set(&manifest.files.exclude)?;
    let verbatim_set = build_glob_set(&manifest.files.copy_without_render)?;
    let include_hidden = manifest.template.include_hidden;

    let mut entries = Vec::new();

    let walker = WalkDir::new(template_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| include_hidden || !is_hidden(e));

    for entry in walker {
        let entry = entry.map_err(|e| StamperError::Io {
            context: format!("walking {}", template_dir.display()),
            source: e.into(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(rel_path) = entry.path().strip_prefix(template_dir) else {
            continue;
        };
        let rel = to_slash_path(rel_path).ok_or_else(|| StamperError::NonUtf8Path {
            path: entry.path().to_path_buf(),
        })?;

        if rel == MANIFEST_FILE || exclude_set.is_match(&rel) {
            continue;
        }

        let content = std::fs::read(entry.path()).map_err(|e| StamperError::Io {
            context: format!("reading {}", entry.path().display()),
            source: e,
        })?;

        let is_binary = verbatim_set.is_match(&rel) || is_binary_content(&content);

        entries.push(TemplateEntry {
            path: rel,
            content,
            is_binary,
            executable: is_executable(&entry),
        });
    }

    Ok(TemplateSet::new(entries))
}

/// Detect binary content using content_inspector (BOM-aware, null-byte scanning).
///
/// Only the first 8KB are inspected.
pub fn is_binary_content(content: &[u8]) -> bool {
    let head = &content[..content.len().min(SNIFF_LEN)];
    !content_inspector::inspect(head).is_text()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// `None` when a component is not valid UTF-8.
fn to_slash_path(path: &Path) -> Option<String> {
    path.components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()
        .map(|parts| parts.join("/"))
}

#[cfg(unix)]
fn is_executable(entry: &DirEntry) -> bool {
    use std::os::unix::fs::PermissionsExt;

    entry
        .metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_entry: &DirEntry) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn paths(set: &TemplateSet) -> Vec<&str> {
        set.entries().iter().map(|e| e.path.as_str()).collect()
    }

    #[rstest]
    #[case(b"package {{packageName}};", false)]
    #[case(&(0..256).map(|i| i as u8).collect::<Vec<u8>>(), true)]
    #[case(b"", false)]
    fn test_is_binary_content(#[case] content: &[u8], #[case] expected: bool) {
        assert_eq!(is_binary_content(content), expected);
    }

    #[test]
    fn test_load_sorted_and_slash_separated() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.txt", b"b");
        write(dir.path(), "a/z.txt", b"z");
        write(dir.path(), "a/y.txt", b"y");

        let set = load_template_set(dir.path(), &TemplateManifest::default()).unwrap();
        assert_eq!(paths(&set), vec!["a/y.txt", "a/z.txt", "b.txt"]);
    }

    #[test]
    fn test_load_skips_manifest_hidden_and_excluded() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), MANIFEST_FILE, b"[template]\nname = \"t\"\n");
        write(dir.path(), ".git/HEAD", b"ref");
        write(dir.path(), ".editorconfig", b"root = true");
        write(dir.path(), "keep.txt", b"keep");
        write(dir.path(), "notes.orig", b"old");

        let mut manifest = TemplateManifest::default();
        manifest.files.exclude = vec!["**/*.orig".into()];

        let set = load_template_set(dir.path(), &manifest).unwrap();
        assert_eq!(paths(&set), vec!["keep.txt"]);
    }

    #[test]
    fn test_load_includes_hidden_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".gitignore", b"/build");
        write(dir.path(), "app.txt", b"app");

        let mut manifest = TemplateManifest::default();
        manifest.template.include_hidden = true;

        let set = load_template_set(dir.path(), &manifest).unwrap();
        assert_eq!(paths(&set), vec![".gitignore", "app.txt"]);
    }

    #[test]
    fn test_load_flags_binary_and_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "icon.png", b"\x89PNG\r\n\x1a\n\0\0\0");
        write(dir.path(), "keep.txt", b"{{verbatim}}");
        write(dir.path(), "render.txt", b"{{rendered}}");

        let mut manifest = TemplateManifest::default();
        manifest.files.copy_without_render = vec!["keep.txt".into()];

        let set = load_template_set(dir.path(), &manifest).unwrap();
        let flags: Vec<_> = set.entries().iter().map(|e| e.is_binary).collect();
        assert_eq!(flags, vec![true, true, false]);
    }

    #[cfg(unix)]
    #[test]
    fn test_load_records_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "gradlew", b"#!/bin/sh\n");
        write(dir.path(), "build.gradle", b"apply plugin");
        fs::set_permissions(dir.path().join("gradlew"), fs::Permissions::from_mode(0o755))
            .unwrap();

        let set = load_template_set(dir.path(), &TemplateManifest::default()).unwrap();
        let exec: Vec<_> = set
            .entries()
            .iter()
            .map(|e| (e.path.as_str(), e.executable))
            .collect();
        assert_eq!(exec, vec![("build.gradle", false), ("gradlew", true)]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_load_rejects_non_utf8_file_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "cafe.txt", b"ascii");
        let latin1 = dir.path().join(OsStr::from_bytes(b"caf\xe9.txt"));
        fs::write(&latin1, b"latin-1").unwrap();

        let result = load_template_set(dir.path(), &TemplateManifest::default());
        assert!(matches!(
            result,
            Err(StamperError::NonUtf8Path { path }) if path == latin1
        ));
    }

    #[test]
    fn test_load_missing_directory() {
        let result = load_template_set(
            Path::new("/nonexistent/template"),
            &TemplateManifest::default(),
        );
        assert!(matches!(
            result,
            Err(StamperError::TemplateDirectoryMissing { .. })
        ));
    }
}
