//! Editor variants and persisted UI settings.

use crate::types::NodeKind;
use serde::{Deserialize, Serialize};

/// The two flavours of the visual constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EditorVariant {
    /// Bot dialogue constructor
    #[default]
    Simple,
    /// n8n-style workflow constructor
    Advanced,
}

impl EditorVariant {
    pub const ALL: [EditorVariant; 2] = [EditorVariant::Simple, EditorVariant::Advanced];

    /// Window and toolbar title.
    pub fn title(self) -> &'static str {
        match self {
            EditorVariant::Simple => "Visual Constructor",
            EditorVariant::Advanced => "Advanced Visual Constructor",
        }
    }

    /// Storage key holding this variant's saved snapshot.
    pub fn storage_key(self) -> &'static str {
        match self {
            EditorVariant::Simple => "bot-constructor-graph",
            EditorVariant::Advanced => "n8n-workflow-graph",
        }
    }

    /// File name offered when exporting.
    pub fn export_file_name(self) -> &'static str {
        match self {
            EditorVariant::Simple => "bot-config.json",
            EditorVariant::Advanced => "n8n-workflow.json",
        }
    }

    /// Node kinds offered in the palette.
    pub fn palette(self) -> &'static [NodeKind] {
        match self {
            EditorVariant::Simple => &[
                NodeKind::Message,
                NodeKind::Question,
                NodeKind::Condition,
                NodeKind::Action,
                NodeKind::End,
            ],
            EditorVariant::Advanced => &NodeKind::ALL,
        }
    }

    /// Whether exported files can be imported back into the graph.
    pub fn supports_import(self) -> bool {
        matches!(self, EditorVariant::Advanced)
    }
}

/// UI settings persisted between sessions through eframe's storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Which constructor is active
    pub variant: EditorVariant,
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
    /// Whether the grid should be displayed on the canvas
    pub show_grid: bool,
    /// Remembered width of the properties panel
    pub properties_panel_width: f32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            variant: EditorVariant::Simple,
            dark_mode: true,
            show_grid: true,
            properties_panel_width: 280.0,
        }
    }
}

impl EditorSettings {
    /// Serializes the settings to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variants_have_distinct_keys_and_files() {
        assert_ne!(
            EditorVariant::Simple.storage_key(),
            EditorVariant::Advanced.storage_key()
        );
        assert_eq!(EditorVariant::Simple.export_file_name(), "bot-config.json");
        assert_eq!(EditorVariant::Advanced.export_file_name(), "n8n-workflow.json");
    }

    #[test]
    fn test_only_advanced_imports() {
        assert!(!EditorVariant::Simple.supports_import());
        assert!(EditorVariant::Advanced.supports_import());
    }

    #[test]
    fn test_advanced_palette_has_every_kind() {
        assert_eq!(EditorVariant::Advanced.palette().len(), NodeKind::ALL.len());
        assert!(!EditorVariant::Simple.palette().contains(&NodeKind::ApiCall));
    }

    #[test]
    fn test_settings_fill_missing_fields() {
        let settings = EditorSettings::from_json(r#"{"variant":"Advanced"}"#).unwrap();

        assert_eq!(settings.variant, EditorVariant::Advanced);
        assert!(settings.dark_mode);
        assert_eq!(settings.properties_panel_width, 280.0);
    }
}
