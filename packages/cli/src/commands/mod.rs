pub mod export;
pub mod paste;
pub mod template;
pub mod validate;

pub use export::{export, ExportArgs};
pub use paste::{paste, PasteArgs};
pub use template::{template, TemplateArgs};
pub use validate::{validate, ValidateArgs};

use anyhow::{Context, Result};
use folio_editor::{Editor, EditorConfig};
use std::path::Path;
use tracing::debug;

/// Editor holding the tree saved in `path`
pub(crate) fn load_document(path: &Path, config: EditorConfig) -> Result<Editor> {
    load_into(Editor::with_config(config), path)
}

/// Import the tree saved in `path` into an already configured editor
pub(crate) fn load_into(mut editor: Editor, path: &Path) -> Result<Editor> {
    let json = std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    debug!(path = %path.display(), bytes = json.len(), "Loading document");
    editor
        .import_payload(&json)
        .with_context(|| format!("{} is not a valid document", path.display()))?;
    Ok(editor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_editor::{Command, NodeSource};

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("folio-cli-{}-{}", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_document_round_trip() {
        let mut source = Editor::new();
        source
            .dispatch(Command::InsertTemplate {
                template_id: "contact-support".to_string(),
            })
            .unwrap();
        let json = source.export_payload().unwrap().tree_json;
        let path = write_temp("template.json", &json);

        let editor = load_document(&path, EditorConfig::default()).unwrap();
        assert_eq!(editor.state().top_level_keys().len(), 1);
        assert_eq!(editor.export_payload().unwrap().tree_json, json);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_document_reports_path() {
        let path = write_temp("broken.json", "{\"root\":");
        let err = load_document(&path, EditorConfig::default()).unwrap_err();
        assert!(err.to_string().contains("is not a valid document"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("folio-cli-does-not-exist.json");
        let err = load_document(&path, EditorConfig::default()).unwrap_err();
        assert!(err.to_string().starts_with("Cannot read"));
    }
}
