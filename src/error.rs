#![allow(unused_assignments)]

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum StamperError {
    #[error("Template set is empty")]
    #[diagnostic(help("The template directory must contain at least one file to render"))]
    EmptyTemplateSet,

    #[error("Every template file was excluded by a conditional rule")]
    #[diagnostic(help(
        "Check the `when` expressions of the [[files.conditional]] rules in stamper.toml \
         against the bound variables"
    ))]
    AllEntriesExcluded,

    #[error("Template directory not found: {path}")]
    TemplateDirectoryMissing { path: PathBuf },

    #[error("Template file name is not valid UTF-8: {}", path.display())]
    #[diagnostic(help("Rename the file; placeholders and output paths must be UTF-8"))]
    NonUtf8Path { path: PathBuf },

    #[error("Failed to parse {path}")]
    #[diagnostic(help("Check the TOML syntax in your stamper.toml file"))]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid manifest: {reason}")]
    InvalidManifest { reason: String },

    #[error("Glob pattern error: {pattern}")]
    GlobPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid variable binding '{input}': {reason}")]
    #[diagnostic(help("Bindings take the form -d name=value"))]
    InvalidBinding { input: String, reason: String },

    #[error("Variable '{name}' was bound more than once")]
    DuplicateBinding { name: String },

    #[error("Invalid value for variable '{name}': {message}")]
    InvalidValue { name: String, message: String },

    #[error("Prompt cancelled")]
    PromptCancelled,

    #[error("Invalid computed expression for variable '{name}'")]
    ComputedEvaluation {
        name: String,
        #[source]
        source: tera::Error,
    },

    #[error("Invalid 'when' expression for pattern '{pattern}'")]
    ConditionEvaluation {
        pattern: String,
        #[source]
        source: tera::Error,
    },

    #[error("Output directory already exists: {path}")]
    #[diagnostic(help("Use --overwrite to write into a non-empty directory"))]
    OutputExists { path: PathBuf },

    #[error("Template renders a file onto the reserved path {path}")]
    #[diagnostic(help("Rename the template file; this path holds the generation record"))]
    ReservedPath { path: String },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{count} template file(s) could not be rendered")]
    #[diagnostic(help("Fix the reported entries, or pass --allow-partial to write the rest"))]
    EntriesFailed { count: usize },
}

pub type Result<T> = std::result::Result<T, StamperError>;
