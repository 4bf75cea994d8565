use super::load_document;
use anyhow::Result;
use clap::Args;
use folio_editor::EditorConfig;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Saved tree JSON
    pub file: PathBuf,

    /// Print only the exported HTML
    #[arg(long)]
    pub html_only: bool,
}

pub fn export(args: ExportArgs, config: EditorConfig) -> Result<()> {
    let editor = load_document(&args.file, config)?;
    let payload = editor.export_payload()?;

    if args.html_only {
        println!("{}", payload.html);
    } else {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }
    Ok(())
}
