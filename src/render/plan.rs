use std::collections::HashMap;
use std::fmt;

use crate::bindings::VariableBindings;
use crate::error::{Result, StamperError};
use crate::render::placeholder::{substitute, substitute_str, SubstitutionError};
use crate::template::{TemplateEntry, TemplateSet};

/// A template entry after substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Path of the entry in the template.
    pub source_path: String,
    /// Path relative to the output directory, `/`-separated.
    pub path: String,
    pub content: Vec<u8>,
    /// Whether the content was copied verbatim (true) or rendered (false).
    pub is_binary: bool,
    pub executable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnresolvedPlaceholder { name: String },
    UnknownFilter { filter: String },
    /// The rendered path is empty, absolute, or climbs out of the output directory.
    UnsafePath { path: String },
    /// `output` is also claimed by `other`, either as the same file or as one
    /// of its parent directories.
    PathCollision { other: String, output: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnresolvedPlaceholder { name } => {
                write!(f, "unresolved placeholder '{name}'")
            }
            SkipReason::UnknownFilter { filter } => write!(f, "unknown filter '{filter}'"),
            SkipReason::UnsafePath { path } => write!(f, "unsafe output path '{path}'"),
            SkipReason::PathCollision { other, output } => {
                write!(f, "output path '{output}' collides with template file '{other}'")
            }
        }
    }
}

impl From<SubstitutionError> for SkipReason {
    fn from(e: SubstitutionError) -> Self {
        match e {
            SubstitutionError::Unresolved(name) => SkipReason::UnresolvedPlaceholder { name },
            SubstitutionError::UnknownFilter(filter) => SkipReason::UnknownFilter { filter },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub source_path: String,
    pub reason: SkipReason,
}

/// Output of [`render`]: both lists keep the order of the template set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderResult {
    pub rendered: Vec<RenderedFile>,
    pub skipped: Vec<SkippedEntry>,
}

impl RenderResult {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn copied_count(&self) -> usize {
        self.rendered.iter().filter(|f| f.is_binary).count()
    }
}

/// Render every entry of `set` against `bindings`.
///
/// Per-entry problems never abort the run; they end up in
/// [`RenderResult::skipped`]. Only an empty set is an error.
pub fn render(set: &TemplateSet, bindings: &VariableBindings) -> Result<RenderResult> {
    if set.is_empty() {
        return Err(StamperError::EmptyTemplateSet);
    }

    let mut outcomes: Vec<std::result::Result<RenderedFile, SkipReason>> = set
        .entries()
        .iter()
        .map(|entry| render_entry(entry, bindings))
        .collect();

    // Barrier: every output path is known before collisions are checked.
    for (index, reason) in find_collisions(set.entries(), &outcomes) {
        outcomes[index] = Err(reason);
    }

    let mut result = RenderResult::default();
    for (entry, outcome) in set.entries().iter().zip(outcomes) {
        match outcome {
            Ok(file) => result.rendered.push(file),
            Err(reason) => result.skipped.push(SkippedEntry {
                source_path: entry.path.clone(),
                reason,
            }),
        }
    }

    Ok(result)
}

fn render_entry(
    entry: &TemplateEntry,
    bindings: &VariableBindings,
) -> std::result::Result<RenderedFile, SkipReason> {
    let path = substitute_str(&entry.path, bindings)?;
    if !is_safe_relative(&path) {
        return Err(SkipReason::UnsafePath { path });
    }

    let content = if entry.is_binary {
        entry.content.clone()
    } else {
        substitute(&entry.content, bindings)?
    };

    Ok(RenderedFile {
        source_path: entry.path.clone(),
        path,
        content,
        is_binary: entry.is_binary,
        executable: entry.executable,
    })
}

fn is_safe_relative(path: &str) -> bool {
    !path.is_empty()
        && path
            .split('/')
            .all(|c| !c.is_empty() && c != "." && c != ".." && !c.contains('\\'))
}

/// Find every rendered entry whose output path is claimed twice, either as the
/// same path or as a file that another entry needs as a directory.
fn find_collisions(
    entries: &[TemplateEntry],
    outcomes: &[std::result::Result<RenderedFile, SkipReason>],
) -> Vec<(usize, SkipReason)> {
    let mut owners: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, outcome) in outcomes.iter().enumerate() {
        if let Ok(file) = outcome {
            owners.entry(file.path.as_str()).or_default().push(index);
        }
    }

    let mut clashes: Vec<Option<usize>> = vec![None; outcomes.len()];
    let mut record = |index: usize, other: usize| {
        clashes[index].get_or_insert(other);
    };

    for (index, outcome) in outcomes.iter().enumerate() {
        let Ok(file) = outcome else { continue };

        if let Some(&other) = owners[file.path.as_str()].iter().find(|&&o| o != index) {
            record(index, other);
        }

        for (pos, _) in file.path.match_indices('/') {
            if let Some(parents) = owners.get(&file.path[..pos]) {
                for &parent in parents {
                    record(index, parent);
                    record(parent, index);
                }
            }
        }
    }

    clashes
        .into_iter()
        .enumerate()
        .filter_map(|(index, other)| {
            let other = other?;
            let output = outcomes[index].as_ref().ok()?.path.clone();
            Some((
                index,
                SkipReason::PathCollision {
                    other: entries[other].path.clone(),
                    output,
                },
            ))
        })
        .collect()
}
