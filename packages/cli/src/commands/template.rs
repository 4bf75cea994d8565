use anyhow::{anyhow, Result};
use clap::Args;
use folio_editor::{template_ids, Command, Editor, EditorConfig};

#[derive(Debug, Args)]
pub struct TemplateArgs {
    /// Template id, e.g. contact-support
    pub id: String,

    /// Print HTML instead of the tree JSON
    #[arg(long)]
    pub html: bool,
}

pub fn template(args: TemplateArgs, config: EditorConfig) -> Result<()> {
    let mut editor = Editor::with_config(config);
    let handled = editor.dispatch(Command::InsertTemplate {
        template_id: args.id.clone(),
    })?;
    if !handled {
        return Err(anyhow!(
            "Unknown template: {} (available: {})",
            args.id,
            template_ids().join(", ")
        ));
    }

    let payload = editor.export_payload()?;
    if args.html {
        println!("{}", payload.html);
    } else {
        println!("{}", payload.tree_json);
    }
    Ok(())
}
