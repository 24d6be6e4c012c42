pub mod loader;

pub use loader::{is_binary_content, load_template_set};

/// One file of a template, before substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateEntry {
    /// Path relative to the template root, always `/`-separated.
    pub path: String,
    pub content: Vec<u8>,
    /// Binary entries keep their content verbatim; only the path is rendered.
    pub is_binary: bool,
    pub executable: bool,
}

impl TemplateEntry {
    pub fn text(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            is_binary: false,
            executable: false,
        }
    }

    pub fn binary(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            is_binary: true,
            ..Self::text(path, content)
        }
    }
}

/// An ordered, immutable collection of template entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSet {
    entries: Vec<TemplateEntry>,
}

impl TemplateSet {
    pub fn new(entries: Vec<TemplateEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep only the entries accepted by `keep`, preserving order.
    pub fn filtered(&self, mut keep: impl FnMut(&TemplateEntry) -> bool) -> Self {
        Self {
            entries: self.entries.iter().filter(|e| keep(e)).cloned().collect(),
        }
    }
}

impl FromIterator<TemplateEntry> for TemplateSet {
    fn from_iter<I: IntoIterator<Item = TemplateEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
