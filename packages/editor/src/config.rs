use crate::errors::{EditorError, EditorResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Seed for generated node keys
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Start without the initial empty paragraph
    #[serde(default)]
    pub empty_editor: bool,

    /// Payload export options
    #[serde(default)]
    pub export: ExportConfig,

    /// Swatches offered by the background color picker
    #[serde(default = "default_background_presets")]
    pub background_presets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    /// Drop inline `style`/`class` from exported paragraphs and text
    #[serde(default = "default_true")]
    pub strip_presentational: bool,

    #[serde(default = "default_true")]
    pub pretty_json: bool,

    #[serde(default)]
    pub pretty_html: bool,
}

fn default_namespace() -> String {
    "folio".to_string()
}

fn default_true() -> bool {
    true
}

fn default_background_presets() -> Vec<String> {
    [
        "#f9fafb", "#ffffff", "#eff6ff", "#f0fdf4", "#fefce8", "#fdf2f8", "#faf5ff", "#fff7ed",
    ]
    .iter()
    .map(|color| color.to_string())
    .collect()
}

impl EditorConfig {
    pub fn from_json(json: &str) -> EditorResult<Self> {
        serde_json::from_str(json).map_err(|e| EditorError::Config(e.to_string()))
    }

    /// Load config from a directory, falling back to defaults when the
    /// directory has no config file
    pub fn load(dir: impl AsRef<Path>) -> EditorResult<Self> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            empty_editor: false,
            export: ExportConfig::default(),
            background_presets: default_background_presets(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            strip_presentational: true,
            pretty_json: true,
            pretty_html: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r##"{
            "namespace": "playground",
            "emptyEditor": true,
            "export": { "stripPresentational": false, "prettyHtml": true },
            "backgroundPresets": ["#ffffff"]
        }"##;

        let config = EditorConfig::from_json(json).unwrap();
        assert_eq!(config.namespace, "playground");
        assert!(config.empty_editor);
        assert!(!config.export.strip_presentational);
        assert!(config.export.pretty_json);
        assert!(config.export.pretty_html);
        assert_eq!(config.background_presets, vec!["#ffffff"]);
    }

    #[test]
    fn test_default_config() {
        let config = EditorConfig::from_json("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.namespace, "folio");
        assert_eq!(config.background_presets.len(), 8);
        assert_eq!(config.background_presets[0], "#f9fafb");
    }

    #[test]
    fn test_bad_config_is_reported() {
        let err = EditorConfig::from_json(r#"{"emptyEditor": "yes"}"#).unwrap_err();
        assert!(matches!(err, EditorError::Config(_)));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = std::env::temp_dir().join("folio-config-missing");
        let config = EditorConfig::load(&dir).unwrap();
        assert_eq!(config, EditorConfig::default());
    }
}
