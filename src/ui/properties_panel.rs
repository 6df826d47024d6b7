//! Right-hand panel for editing the selected node or connection.

use super::state::EditorApp;
use crate::interaction::Notice;
use crate::types::*;
use eframe::egui;

impl EditorApp {
    /// Renders the properties of the current selection.
    pub fn draw_properties_panel(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.heading("Properties");
                ui.separator();

                if self.graph.selected().is_some() {
                    self.draw_node_properties(ui);
                } else if let Some(idx) = self.selected_connection {
                    self.draw_connection_properties(ui, idx);
                } else {
                    self.draw_no_selection_info(ui);
                }
            });
    }

    fn draw_node_properties(&mut self, ui: &mut egui::Ui) {
        let Some(node) = self.properties.selected(&self.graph).cloned() else {
            return;
        };

        ui.label(format!("Type: {}", node.kind().display_name()));
        ui.label(egui::RichText::new(node.id.as_str()).small().weak());
        ui.separator();

        ui.label("Label:");
        let mut label = node.label.clone();
        if ui.text_edit_singleline(&mut label).changed() {
            self.properties.set_label(&mut self.graph, &label);
        }

        match &node.body {
            NodeBody::Message { text } => {
                ui.label("Text:");
                let mut text = text.clone();
                if ui.text_edit_multiline(&mut text).changed() {
                    self.properties.set_text(&mut self.graph, &text);
                }
            }
            NodeBody::Question { text, options } => {
                ui.label("Question:");
                let mut text = text.clone();
                if ui.text_edit_multiline(&mut text).changed() {
                    self.properties.set_text(&mut self.graph, &text);
                }
                self.draw_option_list(ui, options);
            }
            NodeBody::ApiCall { url } => {
                ui.label("URL:");
                let mut url = url.clone();
                if ui.text_edit_singleline(&mut url).changed() {
                    self.properties.set_url(&mut self.graph, &url);
                }
            }
            NodeBody::Delay { .. } => {
                ui.label("Delay (seconds):");
                let mut raw = self.properties.delay_input(&self.graph);
                let response = ui.text_edit_singleline(&mut raw);
                if response.changed() {
                    self.properties.set_delay_input(&mut self.graph, &raw);
                }
                if response.lost_focus() {
                    self.properties.commit_delay_input(&self.graph);
                }
            }
            NodeBody::Start | NodeBody::Condition | NodeBody::Action | NodeBody::End => {}
        }

        ui.separator();
        if ui.button("Delete node").clicked() && self.properties.delete_selected(&mut self.graph) {
            self.toasts.notice(&Notice::NodeRemoved);
        }
    }

    fn draw_option_list(&mut self, ui: &mut egui::Ui, options: &[String]) {
        ui.label("Answer options:");
        let mut removed = None;
        for (index, option) in options.iter().enumerate() {
            ui.horizontal(|ui| {
                let mut value = option.clone();
                if ui.text_edit_singleline(&mut value).changed() {
                    self.properties.set_option(&mut self.graph, index, &value);
                }
                if ui.small_button("✕").clicked() {
                    removed = Some(index);
                }
            });
        }
        if let Some(index) = removed {
            self.properties.remove_option(&mut self.graph, index);
        }
        if ui.button("+ Add option").clicked() {
            self.properties.add_option(&mut self.graph);
        }
    }

    fn draw_connection_properties(&mut self, ui: &mut egui::Ui, idx: usize) {
        let Some(connection) = self.graph.connections().get(idx).cloned() else {
            self.selected_connection = None;
            return;
        };

        let name_of = |id: &NodeId| {
            self.graph
                .node(id)
                .map(|node| node.label.clone())
                .unwrap_or_else(|| id.to_string())
        };
        ui.label("Type: Connection");
        ui.label(format!("From: {}", name_of(&connection.from)));
        ui.label(format!("To: {}", name_of(&connection.to)));
        ui.separator();

        ui.label("Label:");
        let mut label = connection.label.clone().unwrap_or_default();
        if ui.text_edit_singleline(&mut label).changed() {
            self.graph.set_connection_label(idx, Some(label));
        }

        ui.separator();
        if ui.button("Delete connection").clicked() && self.graph.remove_connection(idx).is_some() {
            self.selected_connection = None;
            self.toasts.notice(&Notice::ConnectionRemoved);
        }
    }

    fn draw_no_selection_info(&self, ui: &mut egui::Ui) {
        ui.label("Select a node to edit its properties.");
        ui.add_space(8.0);
        ui.label(format!("Nodes: {}", self.graph.nodes().len()));
        ui.label(format!("Connections: {}", self.graph.connections().len()));

        let dangling = self.graph.dangling_connections().len();
        if dangling > 0 {
            ui.colored_label(
                egui::Color32::from_rgb(234, 179, 8),
                format!("{dangling} connection(s) point at missing nodes"),
            );
        }
    }
}
