use std::path::Path;

use console::style;
use miette::Result;

use stamper::check::check_template;

pub fn run(path: String) -> Result<()> {
    let template_dir = Path::new(&path);

    println!(
        "{} {}",
        style("Checking template at").bold(),
        style(template_dir.display()).cyan()
    );

    let result = check_template(template_dir)?;

    println!("  Name: {}", result.template_name);
    println!(
        "  Files: {} ({} copied verbatim)",
        result.file_count, result.binary_count
    );
    if result.placeholders.is_empty() {
        println!("  Placeholders: none");
    } else {
        let names: Vec<&str> = result.placeholders.iter().map(String::as_str).collect();
        println!("  Placeholders: {}", names.join(", "));
    }

    if !result.warnings.is_empty() {
        println!("\n{}", style("Warnings:").yellow().bold());
        for w in &result.warnings {
            println!("  {} {}", style("⚠").yellow(), w);
        }
    }

    if !result.errors.is_empty() {
        println!("\n{}", style("Errors:").red().bold());
        for e in &result.errors {
            println!("  {} {}", style("✗").red(), e);
        }
        println!(
            "\n{} Template has {} error(s)",
            style("✗").red().bold(),
            result.errors.len()
        );
        std::process::exit(1);
    } else {
        println!("\n{} Template is valid!", style("✓").green().bold());
    }

    Ok(())
}
