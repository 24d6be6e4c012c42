use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "stamper",
    about = "Render a project template directory into a new source tree",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a new project from a template directory
    New {
        /// Path to the template directory
        template: String,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<String>,

        /// Bind a placeholder (can be repeated: -d key=value)
        #[arg(short, long = "data", value_name = "KEY=VALUE")]
        data: Vec<String>,

        /// Use default values without prompting
        #[arg(long)]
        defaults: bool,

        /// Write into the output directory even if it has contents
        #[arg(long)]
        overwrite: bool,

        /// Write the files that rendered even when others failed
        #[arg(long)]
        allow_partial: bool,

        /// Show the files that would be generated without writing anything
        #[arg(long)]
        dry_run: bool,

        /// With --dry-run, also print rendered file contents
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a template directory
    Check {
        /// Path to the template to check (default: current directory)
        #[arg(default_value = ".")]
        path: String,
    },
}
