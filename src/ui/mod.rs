//! User interface for the bot flow editor.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main [`EditorApp`]
//! - `canvas` - Coordinate transforms, panning, zooming and pointer input
//! - `rendering` - Drawing nodes, connections, the grid and the connection draft
//! - `properties_panel` - Per-kind property editing
//! - `file_ops` - Local snapshots and JSON export/import
//! - `toast` - Transient notifications

mod canvas;
mod file_ops;
mod properties_panel;
mod rendering;
mod state;
mod toast;

pub use state::EditorApp;

use crate::config::EditorVariant;
use crate::constants::APP_STATE_KEY;
use crate::interaction::DragPayload;
use crate::interaction::Notice;
use eframe::egui;

impl eframe::App for EditorApp {
    /// Persists UI settings between restarts. The graph itself is only
    /// stored when the user saves.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.settings.to_json() {
            Ok(json) => storage.set_string(APP_STATE_KEY, json),
            Err(err) => log::error!("Failed to serialize settings: {err}"),
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.settings.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_pending_operations(ctx);
        self.handle_delete_key(ctx);

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::SidePanel::left("palette")
            .resizable(false)
            .default_width(150.0)
            .show(ctx, |ui| {
                self.draw_palette(ui);
            });

        let viewport_width = ctx.input(|i| i.content_rect().width());
        let max_width = (viewport_width * 0.5).max(180.0);
        egui::SidePanel::right("properties_panel")
            .resizable(true)
            .default_width(self.settings.properties_panel_width.clamp(180.0, max_width))
            .show(ctx, |ui| {
                self.settings.properties_panel_width = ui.available_width().clamp(180.0, max_width);
                self.draw_properties_panel(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_canvas(ui);
        });

        self.toasts.draw(ctx);
    }
}

impl EditorApp {
    /// Removes the selected node (or connection) on Delete/Backspace.
    ///
    /// Ignored while a text field has keyboard focus.
    pub fn handle_delete_key(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let pressed =
            ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace));
        if !pressed {
            return;
        }

        if let Some(id) = self.graph.selected().cloned() {
            if let Some(notice) = self.interaction.delete_node(&mut self.graph, &id) {
                self.toasts.notice(&notice);
            }
        } else if let Some(idx) = self.selected_connection.take() {
            if self.graph.remove_connection(idx).is_some() {
                self.toasts.notice(&Notice::ConnectionRemoved);
            }
        }
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let mut variant = self.settings.variant;
            egui::ComboBox::from_id_salt("editor_variant")
                .selected_text(variant.title())
                .show_ui(ui, |ui| {
                    for option in EditorVariant::ALL {
                        ui.selectable_value(&mut variant, option, option.title());
                    }
                });
            if variant != self.settings.variant {
                self.switch_variant(variant);
            }

            ui.separator();

            if ui.button("New").clicked() {
                self.new_graph();
            }
            if ui.button("Save").clicked() {
                self.save_graph();
            }
            if ui.button("Load").clicked() {
                self.load_graph();
            }
            if ui.button("Clear saved").clicked() {
                self.clear_saved_graph();
            }

            ui.separator();

            if ui.button("Export").clicked() {
                self.export_graph();
            }
            if self.settings.variant.supports_import() && ui.button("Import").clicked() {
                self.import_graph();
            }

            ui.separator();

            ui.checkbox(&mut self.settings.show_grid, "Show Grid");
            ui.checkbox(&mut self.settings.dark_mode, "Dark Mode");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("Zoom: {:.0}%", self.canvas.zoom_factor * 100.0));
            });
        });
    }

    /// Palette of node kinds that can be dragged onto the canvas.
    fn draw_palette(&mut self, ui: &mut egui::Ui) {
        ui.heading("Nodes");
        ui.label(egui::RichText::new("Drag onto the canvas").small().weak());
        ui.separator();

        for &kind in self.settings.variant.palette() {
            let id = egui::Id::new(("palette", kind.slug()));
            let response = ui
                .dnd_drag_source(id, DragPayload::new(kind), |ui| {
                    egui::Frame::new()
                        .stroke(egui::Stroke::new(1.5, rendering::kind_color(kind)))
                        .corner_radius(4.0)
                        .inner_margin(egui::Margin::symmetric(8, 6))
                        .show(ui, |ui| {
                            ui.set_min_width(ui.available_width());
                            ui.label(kind.display_name());
                        });
                })
                .response;
            if response.drag_started() {
                self.interaction.begin_palette_drag(DragPayload::new(kind));
            }
            ui.add_space(4.0);
        }
    }
}
