mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{export, paste, template, validate, ExportArgs, PasteArgs, TemplateArgs, ValidateArgs};
use folio_editor::EditorConfig;

/// Folio CLI - inspect and convert Folio documents
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a saved tree as a payload (tree JSON, HTML, counts)
    Export(ExportArgs),

    /// Check that a saved tree imports cleanly
    Validate(ValidateArgs),

    /// Print the document produced by a built-in template
    Template(TemplateArgs),

    /// Import an HTML file the way a paste would
    Paste(PasteArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = EditorConfig::load(&cwd)?;

    match cli.command {
        Command::Export(args) => export(args, config),
        Command::Validate(args) => validate(args, config),
        Command::Template(args) => template(args, config),
        Command::Paste(args) => paste(args, config),
    }
}
