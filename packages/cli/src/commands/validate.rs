use super::load_into;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_editor::{Editor, EditorConfig, RestrictionState, TextMetrics};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Saved tree JSON
    pub file: PathBuf,
}

pub fn validate(args: ValidateArgs, config: EditorConfig) -> Result<()> {
    let mut editor = Editor::with_config(config);
    let corrections = Rc::new(Cell::new(0usize));
    let seen = corrections.clone();
    editor.subscribe(move |event| {
        if event.is_correction() {
            seen.set(seen.get() + 1);
        }
    });

    let editor = load_into(editor, &args.file)?;
    let state = editor.state();
    let metrics = TextMetrics::of(&state.text_content());

    println!(
        "  {} {} ({} nodes, {} words, {} characters)",
        "✓".green(),
        args.file.display(),
        state.len(),
        metrics.word_count,
        metrics.character_count
    );

    if RestrictionState::classify(state) == RestrictionState::TemplateOnly {
        println!("  {} single template layout", "•".bright_blue());
    }
    if corrections.get() > 0 {
        println!("  {} content next to the template was dropped on import", "⚠️".yellow());
    }
    Ok(())
}
