pub mod bindings;
pub mod check;
pub mod config;
pub mod error;
pub mod prompt;
pub mod render;
pub mod template;
pub mod writer;

use std::path::PathBuf;

use crate::bindings::{resolve_bindings, VariableBindings};
use crate::config::{load_manifest, TemplateManifest};
use crate::error::{Result, StamperError};
use crate::prompt::{collect_variables, PromptOptions};
use crate::render::{render, select_entries, RenderResult};
use crate::template::load_template_set;
use crate::writer::{write_result, GenerationRecord, WriteOptions, WrittenProject};

pub struct GenerateOptions {
    pub template: PathBuf,
    pub output: Option<PathBuf>,
    pub bindings: VariableBindings,
    /// Take manifest defaults instead of prompting for unbound variables.
    pub defaults: bool,
    pub overwrite: bool,
    /// Write the successfully rendered files even when some entries failed.
    pub allow_partial: bool,
}

/// Everything needed to write a generation that has been rendered but not yet written.
pub struct FullGenerationPlan {
    pub result: RenderResult,
    pub output_dir: PathBuf,
    pub manifest: TemplateManifest,
    pub bindings: VariableBindings,
    pub warnings: Vec<String>,
    pub overwrite: bool,
    pub allow_partial: bool,
}

/// Plan a project generation: load the template, resolve bindings, render in memory.
///
/// Unless `defaults` is set, unbound declared variables are prompted for.
/// Nothing is written to disk.
pub fn plan_generation(options: GenerateOptions) -> Result<FullGenerationPlan> {
    let manifest = load_manifest(&options.template)?;
    let set = load_template_set(&options.template, &manifest)?;

    let prompt_options = PromptOptions {
        use_defaults: options.defaults,
    };
    let supplied = collect_variables(&manifest, &options.bindings, prompt_options)?;

    let resolved = resolve_bindings(&manifest, &supplied)?;
    let selected = select_entries(&set, &manifest.files, &resolved.bindings)?;
    if selected.is_empty() && !set.is_empty() {
        return Err(StamperError::AllEntriesExcluded);
    }
    let result = render(&selected, &resolved.bindings)?;

    let output_dir = match options.output {
        Some(out) => out,
        None => std::env::current_dir().map_err(|e| StamperError::Io {
            context: "getting current directory".into(),
            source: e,
        })?,
    };

    Ok(FullGenerationPlan {
        result,
        output_dir,
        manifest,
        bindings: resolved.bindings,
        warnings: resolved.warnings,
        overwrite: options.overwrite,
        allow_partial: options.allow_partial,
    })
}

/// Write a planned generation to its output directory.
///
/// Refuses to write anything when entries were skipped, unless the plan allows
/// partial output.
pub fn execute_generation(plan: &FullGenerationPlan) -> Result<WrittenProject> {
    if !plan.result.is_complete() && !plan.allow_partial {
        return Err(StamperError::EntriesFailed {
            count: plan.result.skipped.len(),
        });
    }

    let record = GenerationRecord::new(
        plan.manifest.template.name.clone(),
        plan.manifest.template.version.clone(),
        plan.bindings.clone(),
    );

    write_result(
        &plan.result,
        &plan.output_dir,
        &record,
        WriteOptions {
            overwrite: plan.overwrite,
        },
    )
}

/// Generate a project from a template.
pub fn generate(options: GenerateOptions) -> Result<WrittenProject> {
    let plan = plan_generation(options)?;
    execute_generation(&plan)
}
