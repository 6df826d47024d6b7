//! Application state structures.
//!
//! The graph itself lives in [`GraphModel`]; everything here is view state:
//! canvas navigation, the gesture machine, the file-dialog channel and toasts.

use super::toast::Toasts;
use crate::config::EditorSettings;
use crate::graph::GraphModel;
use crate::interaction::CanvasInteraction;
use crate::persistence::PersistenceBridge;
use crate::properties::PropertyEditor;
use crate::storage::KeyValueStore;
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Canvas pan and zoom.
pub struct CanvasState {
    /// Pan offset in screen space
    pub offset: egui::Vec2,
    /// Zoom level (1.0 = normal)
    pub zoom_factor: f32,
    /// Whether the user is currently panning the canvas
    pub is_panning: bool,
    /// Last pointer position during panning
    pub last_pan_pos: Option<egui::Pos2>,
    /// Whether the offset has been placed relative to the first canvas rect
    pub positioned: bool,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            offset: egui::Vec2::ZERO,
            zoom_factor: 1.0,
            is_panning: false,
            last_pan_pos: None,
            positioned: false,
        }
    }
}

/// A file dialog waiting to be opened on the next frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingFileOperation {
    /// Offer the given document for download under the given file name
    Export { file_name: String, contents: String },
    /// Pick a file and read it back
    Import,
}

/// Messages sent from async file operations back to the app.
#[derive(Debug)]
pub enum FileOperationResult {
    /// The export was written to the given location
    ExportCompleted(String),
    /// A file was read: name and contents
    ImportCompleted(String, String),
    /// The operation failed with an error message
    OperationFailed(String),
}

/// File dialog bookkeeping.
pub struct FileState {
    pub pending: Option<PendingFileOperation>,
    pub sender: Sender<FileOperationResult>,
    pub receiver: Receiver<FileOperationResult>,
}

impl Default for FileState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            pending: None,
            sender,
            receiver,
        }
    }
}

/// The main application structure.
///
/// Implements `eframe::App` and wires the graph model, the canvas gestures,
/// the property editor and persistence together.
pub struct EditorApp {
    /// The dialogue graph being edited
    pub graph: GraphModel,
    /// Persisted UI settings
    pub settings: EditorSettings,
    /// Canvas navigation state
    pub canvas: CanvasState,
    /// Pointer-gesture state machine
    pub interaction: CanvasInteraction,
    /// Write-through property editor
    pub properties: PropertyEditor,
    /// Connection picked on the canvas for label editing, if any
    pub selected_connection: Option<usize>,
    /// Local snapshot storage
    pub persistence: PersistenceBridge,
    /// File dialog state
    pub file: FileState,
    /// Visible notifications
    pub toasts: Toasts,
}

impl EditorApp {
    /// Creates the app from restored settings and a snapshot store.
    pub fn with_store(settings: EditorSettings, store: Box<dyn KeyValueStore>) -> Self {
        let persistence = PersistenceBridge::new(store, settings.variant);
        Self {
            graph: GraphModel::default(),
            settings,
            canvas: CanvasState::default(),
            interaction: CanvasInteraction::new(),
            properties: PropertyEditor::new(),
            selected_connection: None,
            persistence,
            file: FileState::default(),
            toasts: Toasts::default(),
        }
    }

    /// Creates the app, restoring settings from eframe storage when present.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = cc
            .storage
            .and_then(|storage| storage.get_string(crate::constants::APP_STATE_KEY))
            .and_then(|json| match EditorSettings::from_json(&json) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    log::warn!("Ignoring unreadable settings: {e}");
                    None
                }
            })
            .unwrap_or_default();

        Self::with_store(settings, crate::storage::default_store())
    }
}
