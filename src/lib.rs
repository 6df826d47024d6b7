//! # Bot Flow Editor
//!
//! A visual node-graph editor for bot dialogue flows. Nodes of a fixed set of
//! kinds (start, message, question, condition, action, API call, delay, end)
//! are dragged from a palette onto a canvas, wired together through their
//! handles and edited in a properties panel.
//!
//! ## Features
//! - Drag-and-drop node creation from a per-variant palette
//! - Connections drawn from output to input handles
//! - Write-through property editing per node kind
//! - Local snapshots plus JSON export (and import in the advanced variant)
//! - Canvas panning and zooming

#![deny(unsafe_code)]

pub mod config;
pub mod constants;
pub mod error;
pub mod graph;
pub mod interaction;
pub mod persistence;
pub mod properties;
pub mod snapshot;
pub mod storage;
pub mod types;
mod ui;

pub use config::{EditorSettings, EditorVariant};
pub use error::EditorError;
pub use graph::GraphModel;
pub use interaction::{CanvasInteraction, DragPayload, Hit, Notice};
pub use persistence::PersistenceBridge;
pub use properties::PropertyEditor;
pub use snapshot::Snapshot;
pub use types::*;
pub use ui::EditorApp;

/// Runs the editor as a native application.
///
/// # Example
///
/// ```no_run
/// fn main() -> Result<(), eframe::Error> {
///     bot_flow_editor::run_app()
/// }
/// ```
#[cfg(not(target_arch = "wasm32"))]
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        EditorVariant::Simple.title(),
        options,
        Box::new(|cc| Ok(Box::new(EditorApp::new(cc)))),
    )
}

/// Starts the editor inside the given `<canvas>` element.
#[cfg(target_arch = "wasm32")]
pub async fn run_web(canvas: web_sys::HtmlCanvasElement) -> Result<(), eframe::wasm_bindgen::JsValue> {
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();
    eframe::WebRunner::new()
        .start(
            canvas,
            eframe::WebOptions::default(),
            Box::new(|cc| Ok(Box::new(EditorApp::new(cc)))),
        )
        .await
}
