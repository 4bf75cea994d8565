use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use folio_editor::{Editor, EditorConfig, NodeSource};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PasteArgs {
    /// HTML fragment or document
    pub file: PathBuf,

    /// Print the re-exported HTML instead of the tree JSON
    #[arg(long)]
    pub html: bool,
}

pub fn paste(args: PasteArgs, config: EditorConfig) -> Result<()> {
    let html = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Cannot read {}", args.file.display()))?;

    let mut editor = Editor::with_config(config);
    editor.import_html(&html)?;

    if editor.state().top_level_keys().is_empty() {
        eprintln!("{}", "⚠️  Nothing importable found".yellow());
    }

    let payload = editor.export_payload()?;
    if args.html {
        println!("{}", payload.html);
    } else {
        println!("{}", payload.tree_json);
    }
    Ok(())
}
