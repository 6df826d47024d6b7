//! Local snapshot storage and JSON file export/import.
//!
//! Native builds use `rfd` dialogs on a tokio task; WASM builds trigger a
//! Blob download and a hidden file input. Either way results come back over
//! the [`FileOperationResult`] channel and are applied on the UI thread.

use super::state::{EditorApp, FileOperationResult, PendingFileOperation};
use crate::config::EditorVariant;
use crate::graph::GraphModel;
use crate::persistence::PersistenceBridge;
use eframe::egui;

impl EditorApp {
    /// Applies finished file operations and starts pending ones.
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.file.receiver.try_recv() {
            self.apply_file_result(result);
        }

        let Some(operation) = self.file.pending.take() else {
            return;
        };
        let ctx = ctx.clone();
        let sender = self.file.sender.clone();

        match operation {
            PendingFileOperation::Export {
                file_name,
                contents,
            } => {
                #[cfg(target_arch = "wasm32")]
                {
                    let result = match Self::trigger_download(&file_name, &contents) {
                        Ok(()) => FileOperationResult::ExportCompleted(file_name),
                        Err(e) => FileOperationResult::OperationFailed(e.to_string()),
                    };
                    let _ = sender.send(result);
                    ctx.request_repaint();
                }

                #[cfg(not(target_arch = "wasm32"))]
                {
                    tokio::spawn(async move {
                        if let Some(handle) = rfd::AsyncFileDialog::new()
                            .add_filter("JSON", &["json"])
                            .set_file_name(&file_name)
                            .save_file()
                            .await
                        {
                            let path = handle.path();
                            let result = match std::fs::write(path, contents) {
                                Ok(()) => FileOperationResult::ExportCompleted(path.display().to_string()),
                                Err(e) => FileOperationResult::OperationFailed(format!(
                                    "Failed to write {}: {e}",
                                    path.display()
                                )),
                            };
                            let _ = sender.send(result);
                        }
                        ctx.request_repaint();
                    });
                }
            }
            PendingFileOperation::Import => {
                #[cfg(target_arch = "wasm32")]
                {
                    wasm_bindgen_futures::spawn_local(async move {
                        if let Some(file) = Self::show_open_file_picker().await {
                            let name = file.name();
                            let result = match Self::read_file(file).await {
                                Ok(content) => FileOperationResult::ImportCompleted(name, content),
                                Err(e) => FileOperationResult::OperationFailed(e),
                            };
                            let _ = sender.send(result);
                        } else {
                            log::debug!("Import cancelled");
                        }
                        ctx.request_repaint();
                    });
                }

                #[cfg(not(target_arch = "wasm32"))]
                {
                    tokio::spawn(async move {
                        if let Some(handle) = rfd::AsyncFileDialog::new()
                            .add_filter("JSON", &["json"])
                            .pick_file()
                            .await
                        {
                            let path = handle.path();
                            let result = match std::fs::read_to_string(path) {
                                Ok(json) => FileOperationResult::ImportCompleted(
                                    path.display().to_string(),
                                    json,
                                ),
                                Err(e) => FileOperationResult::OperationFailed(format!(
                                    "Failed to read {}: {e}",
                                    path.display()
                                )),
                            };
                            let _ = sender.send(result);
                        }
                        ctx.request_repaint();
                    });
                }
            }
        }
    }

    /// Applies the outcome of a file dialog to the app.
    pub fn apply_file_result(&mut self, result: FileOperationResult) {
        match result {
            FileOperationResult::ExportCompleted(location) => {
                log::info!("Exported graph to {location}");
                self.toasts.success("Configuration exported");
            }
            FileOperationResult::ImportCompleted(name, content) => {
                match PersistenceBridge::import_document(&content) {
                    Ok(snapshot) => {
                        self.graph.deserialize(snapshot);
                        self.selected_connection = None;
                        self.interaction.cancel();
                        log::info!("Imported {} nodes from {name}", self.graph.nodes().len());
                        self.toasts.success("Workflow imported");
                    }
                    Err(e) => {
                        log::warn!("Could not import {name}: {e}");
                        self.toasts.error("Import failed");
                    }
                }
            }
            FileOperationResult::OperationFailed(error) => {
                log::error!("File operation failed: {error}");
            }
        }
    }

    /// Stores the current graph locally.
    pub fn save_graph(&mut self) {
        match self.persistence.save(&self.graph) {
            Ok(()) => self.toasts.success("Graph saved"),
            Err(e) => log::error!("Saving failed: {e}"),
        }
    }

    /// Replaces the graph with the locally stored snapshot.
    ///
    /// A missing or unreadable snapshot leaves the graph as it is.
    pub fn load_graph(&mut self) {
        match self.persistence.load_into(&mut self.graph) {
            Ok(true) => {
                self.selected_connection = None;
                self.interaction.cancel();
                self.toasts.success("Graph loaded");
            }
            Ok(false) => self.toasts.info("No saved graph"),
            Err(e) => {
                log::warn!("Treating unreadable snapshot as absent: {e}");
                self.toasts.info("No saved graph");
            }
        }
    }

    /// Deletes the locally stored snapshot.
    pub fn clear_saved_graph(&mut self) {
        match self.persistence.clear() {
            Ok(()) => self.toasts.info("Saved graph cleared"),
            Err(e) => log::error!("Clearing saved graph failed: {e}"),
        }
    }

    /// Queues a download of the graph as a timestamped JSON document.
    pub fn export_graph(&mut self) {
        match PersistenceBridge::export_document(&self.graph, chrono::Utc::now()) {
            Ok(contents) => {
                self.file.pending = Some(PendingFileOperation::Export {
                    file_name: self.settings.variant.export_file_name().to_string(),
                    contents,
                });
            }
            Err(e) => log::error!("Export failed: {e}"),
        }
    }

    /// Queues a file picker for importing a document (advanced variant only).
    pub fn import_graph(&mut self) {
        if self.settings.variant.supports_import() {
            self.file.pending = Some(PendingFileOperation::Import);
        }
    }

    /// Starts over with the seeded graph and a reset view.
    pub fn new_graph(&mut self) {
        self.graph = GraphModel::default();
        self.selected_connection = None;
        self.interaction.cancel();
        self.canvas.zoom_factor = 1.0;
        self.canvas.positioned = false;
    }

    /// Switches constructor variant.
    ///
    /// The current graph is saved under the old variant's key, then the new
    /// variant's snapshot (or a fresh seeded graph) is loaded.
    pub fn switch_variant(&mut self, variant: EditorVariant) {
        if variant == self.settings.variant {
            return;
        }
        if let Err(e) = self.persistence.save(&self.graph) {
            log::error!("Saving before variant switch failed: {e}");
        }

        self.settings.variant = variant;
        self.persistence.set_variant(variant);
        self.new_graph();
        if let Err(e) = self.persistence.load_into(&mut self.graph) {
            log::warn!("Treating unreadable snapshot as absent: {e}");
        }
        log::info!("Switched to {}", variant.title());
    }

    /// Triggers a file download in the browser (WASM only).
    ///
    /// Creates a temporary anchor element with a blob URL and clicks it.
    #[cfg(target_arch = "wasm32")]
    fn trigger_download(filename: &str, content: &str) -> Result<(), &'static str> {
        use eframe::wasm_bindgen::{JsCast, JsValue};

        let window = web_sys::window().ok_or("No window found")?;
        let document = window.document().ok_or("No document found")?;

        let blob_parts = js_sys::Array::new();
        blob_parts.push(&JsValue::from_str(content));

        let blob_options = web_sys::BlobPropertyBag::new();
        blob_options.set_type("application/json");

        let blob = web_sys::Blob::new_with_str_sequence_and_options(&blob_parts, &blob_options)
            .map_err(|_| "Failed to create blob")?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)
            .map_err(|_| "Failed to create object URL")?;

        let anchor = document
            .create_element("a")
            .map_err(|_| "Failed to create anchor element")?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| "Failed to cast to anchor element")?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.style().set_property("display", "none").ok();

        let body = document.body().ok_or("No body found")?;
        body.append_child(&anchor)
            .map_err(|_| "Failed to append anchor")?;
        anchor.click();
        body.remove_child(&anchor)
            .map_err(|_| "Failed to remove anchor")?;

        web_sys::Url::revoke_object_url(&url).map_err(|_| "Failed to revoke object URL")?;
        Ok(())
    }

    /// Opens a file picker through a hidden `<input type="file">` (WASM only).
    #[cfg(target_arch = "wasm32")]
    async fn show_open_file_picker() -> Option<web_sys::File> {
        use eframe::wasm_bindgen::closure::Closure;
        use eframe::wasm_bindgen::JsCast;

        let document = web_sys::window()?.document()?;
        let input = document
            .create_element("input")
            .ok()?
            .dyn_into::<web_sys::HtmlInputElement>()
            .ok()?;
        input.set_type("file");
        input.set_accept(".json,application/json");
        input.style().set_property("display", "none").ok()?;

        let (sender, receiver) = futures::channel::oneshot::channel::<Option<web_sys::File>>();
        let sender = std::rc::Rc::new(std::cell::RefCell::new(Some(sender)));

        let onchange = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let file = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
                .and_then(|input| input.files())
                .and_then(|files| files.get(0));
            if let Some(sender) = sender.borrow_mut().take() {
                let _ = sender.send(file);
            }
        }) as Box<dyn FnMut(_)>);
        input.set_onchange(Some(onchange.as_ref().unchecked_ref()));
        onchange.forget();

        let body = document.body()?;
        body.append_child(&input).ok()?;
        input.click();

        let file = receiver.await.ok()?;
        body.remove_child(&input).ok()?;
        file
    }

    /// Reads a browser `File` as text (WASM only).
    #[cfg(target_arch = "wasm32")]
    async fn read_file(file: web_sys::File) -> Result<String, String> {
        use eframe::wasm_bindgen::closure::Closure;
        use eframe::wasm_bindgen::{JsCast, JsValue};

        let file_reader =
            web_sys::FileReader::new().map_err(|_| "Failed to create FileReader".to_string())?;

        let promise = js_sys::Promise::new(&mut |resolve, reject| {
            let reader = file_reader.clone();
            let onload = Closure::wrap(Box::new(move |_event: web_sys::ProgressEvent| {
                if let Ok(result) = reader.result() {
                    let _ = resolve.call1(&JsValue::NULL, &result);
                }
            }) as Box<dyn FnMut(_)>);
            file_reader.set_onload(Some(onload.as_ref().unchecked_ref()));
            onload.forget();

            let onerror = Closure::wrap(Box::new(move |_event: web_sys::ProgressEvent| {
                let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("Failed to read file"));
            }) as Box<dyn FnMut(_)>);
            file_reader.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            onerror.forget();
        });

        file_reader
            .read_as_text(&file)
            .map_err(|_| "Failed to start reading file".to_string())?;

        let result = wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .map_err(|e| format!("Failed to read file: {e:?}"))?;
        result
            .as_string()
            .ok_or_else(|| "File content is not a string".to_string())
    }
}
