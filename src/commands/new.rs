use std::path::PathBuf;

use console::style;
use miette::Result;
use stamper::bindings::parse_bindings;
use stamper::error::StamperError;
use stamper::render::RenderResult;
use stamper::GenerateOptions;

#[allow(clippy::too_many_arguments)]
pub fn run(
    template: String,
    output: Option<String>,
    data: Vec<String>,
    defaults: bool,
    overwrite: bool,
    allow_partial: bool,
    dry_run: bool,
    verbose: bool,
) -> Result<()> {
    let options = GenerateOptions {
        template: PathBuf::from(template),
        output: output.map(PathBuf::from),
        bindings: parse_bindings(&data)?,
        defaults,
        overwrite,
        allow_partial,
    };

    let plan = stamper::plan_generation(options)?;

    for warning in &plan.warnings {
        eprintln!(
            "{} {}",
            style("warning:").yellow().bold(),
            style(warning).yellow()
        );
    }
    report_skipped(&plan.result);

    if dry_run {
        print_dry_run(&plan.result, &plan.output_dir, verbose);
    } else {
        let written = stamper::execute_generation(&plan)?;

        println!(
            "\n{} Project generated at {}",
            style("✓").green().bold(),
            style(written.output_dir.display()).cyan()
        );
        println!(
            "  {} files rendered, {} files copied",
            written.files_created.len(),
            written.files_copied.len()
        );
    }

    if !plan.result.is_complete() {
        return Err(StamperError::EntriesFailed {
            count: plan.result.skipped.len(),
        }
        .into());
    }

    Ok(())
}

fn report_skipped(result: &RenderResult) {
    for skipped in &result.skipped {
        eprintln!(
            "{} {}: {}",
            style("error:").red().bold(),
            skipped.source_path,
            skipped.reason
        );
    }
}

fn print_dry_run(result: &RenderResult, output_dir: &std::path::Path, verbose: bool) {
    println!(
        "\n{} Dry run: files that would be generated in {}:",
        style("==>").cyan().bold(),
        style(output_dir.display()).cyan()
    );

    for file in &result.rendered {
        let action = if file.is_binary { "copy  " } else { "create" };
        println!("  {} {}", style(action).green(), file.path);

        if verbose {
            println!("  {}", style("──────").dim());
            if file.is_binary {
                println!(
                    "  {}",
                    style(format!("[binary file, {} bytes]", file.content.len())).dim()
                );
            } else {
                let content = String::from_utf8_lossy(&file.content);
                for line in content.lines() {
                    println!("  {}", line);
                }
            }
            println!("  {}", style("──────").dim());
            println!();
        }
    }

    let copied = result.copied_count();
    println!(
        "\nSummary: {} rendered, {} copied, {} skipped",
        result.rendered.len() - copied,
        copied,
        result.skipped.len()
    );

    println!(
        "\n{} Dry run: no files written.",
        style("\u{2139}").blue().bold()
    );
}
