//! Canvas navigation and pointer handling.
//!
//! This module converts between screen and world space, pans and zooms the
//! view, and feeds primary-button input into [`CanvasInteraction`].

use super::state::EditorApp;
use crate::constants::{MAX_ZOOM, MIN_ZOOM};
use crate::interaction::{connection_at, hit_test, DragPayload};
use eframe::egui;

impl EditorApp {
    /// Converts screen coordinates to world coordinates accounting for zoom and pan.
    pub fn screen_to_world(&self, screen_pos: egui::Pos2) -> egui::Pos2 {
        (screen_pos - self.canvas.offset) / self.canvas.zoom_factor
    }

    /// Converts world coordinates to screen coordinates accounting for zoom and pan.
    pub fn world_to_screen(&self, world_pos: egui::Pos2) -> egui::Pos2 {
        world_pos * self.canvas.zoom_factor + self.canvas.offset
    }

    /// Allocates the canvas, handles its input and paints the graph.
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        // Put the world origin at the canvas corner on the first frame
        if !self.canvas.positioned {
            self.canvas.offset = response.rect.min.to_vec2();
            self.canvas.positioned = true;
        }

        self.handle_canvas_panning(ui, &response);
        self.handle_canvas_zoom(ui, &response);
        self.handle_palette_drop(ui, &response);
        self.handle_canvas_pointer(ui, &response);

        self.render_graph(&painter, response.rect);
    }

    /// Handles middle-click or Cmd/Ctrl+left-click canvas panning.
    ///
    /// `modifiers.command` maps to Cmd on macOS and Ctrl elsewhere.
    pub fn handle_canvas_panning(&mut self, ui: &egui::Ui, response: &egui::Response) {
        let should_pan = ui.input(|i| {
            i.pointer.middle_down() || (i.pointer.primary_down() && i.modifiers.command)
        });

        if should_pan {
            if let Some(current_pos) = response.interact_pointer_pos() {
                if !self.canvas.is_panning {
                    self.canvas.is_panning = true;
                    self.canvas.last_pan_pos = Some(current_pos);
                    self.interaction.cancel();
                } else if let Some(last_pos) = self.canvas.last_pan_pos {
                    self.canvas.offset += current_pos - last_pos;
                    self.canvas.last_pan_pos = Some(current_pos);
                }
            }
        } else {
            self.canvas.is_panning = false;
            self.canvas.last_pan_pos = None;
        }
    }

    /// Zooms with the scroll wheel, keeping the world point under the cursor fixed.
    pub fn handle_canvas_zoom(&mut self, ui: &egui::Ui, response: &egui::Response) {
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll_delta == 0.0 {
            return;
        }

        let mouse_pos = ui
            .input(|i| i.pointer.hover_pos())
            .or_else(|| response.interact_pointer_pos());
        let Some(mouse_pos) = mouse_pos else {
            return;
        };
        if !response.rect.contains(mouse_pos) {
            return;
        }

        let world_before = self.screen_to_world(mouse_pos);
        let zoom_delta = if scroll_delta > 0.0 { 0.025 } else { -0.025 };
        let old_zoom = self.canvas.zoom_factor;
        self.canvas.zoom_factor = (old_zoom + zoom_delta).clamp(MIN_ZOOM, MAX_ZOOM);

        if (self.canvas.zoom_factor - old_zoom).abs() > f32::EPSILON {
            let world_after = self.world_to_screen(world_before);
            self.canvas.offset += mouse_pos - world_after;
        }
    }

    /// Creates a node when a palette item is released over the canvas.
    fn handle_palette_drop(&mut self, ui: &egui::Ui, response: &egui::Response) {
        if let Some(payload) = egui::DragAndDrop::payload::<DragPayload>(ui.ctx()) {
            if self.interaction.palette_drag().is_none() {
                self.interaction.begin_palette_drag(*payload);
            }
        }

        if let Some(payload) = response.dnd_release_payload::<DragPayload>() {
            if let Some(pos) = ui.input(|i| i.pointer.interact_pos()) {
                self.interaction.begin_palette_drag(*payload);
                self.drop_palette_item(self.screen_to_world(pos));
            }
        } else if !egui::DragAndDrop::has_any_payload(ui.ctx()) {
            self.interaction.cancel_palette_drag();
        }
    }

    /// Completes a pending palette drag at `world_pos`.
    pub fn drop_palette_item(&mut self, world_pos: egui::Pos2) {
        if let Some((id, notice)) = self
            .interaction
            .drop_on_canvas(&mut self.graph, (world_pos.x, world_pos.y))
        {
            log::debug!("Dropped {id} at ({:.0}, {:.0})", world_pos.x, world_pos.y);
            self.toasts.notice(&notice);
        }
    }

    /// Feeds primary-button presses, moves and releases to the gesture machine.
    fn handle_canvas_pointer(&mut self, ui: &egui::Ui, response: &egui::Response) {
        if self.canvas.is_panning || egui::DragAndDrop::has_any_payload(ui.ctx()) {
            return;
        }

        let (pressed, released, down, pointer_pos) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.primary_down(),
                i.pointer.interact_pos().or_else(|| i.pointer.hover_pos()),
            )
        });
        let Some(screen_pos) = pointer_pos else {
            return;
        };
        let world = self.screen_to_world(screen_pos);

        if pressed && response.rect.contains(screen_pos) {
            let hit = hit_test(&self.graph, world);
            let on_connection = match hit {
                crate::interaction::Hit::Canvas => connection_at(&self.graph, world),
                _ => None,
            };

            if let Some(idx) = on_connection {
                self.selected_connection = Some(idx);
                self.graph.clear_selection();
                self.interaction.cancel();
            } else {
                self.selected_connection = None;
                if let Some(notice) = self.interaction.pointer_down(&mut self.graph, hit, world) {
                    self.toasts.notice(&notice);
                }
            }
        }

        if down {
            self.interaction.pointer_move(&mut self.graph, world);
        }

        if released {
            // Releases over the side panels never land on a node hidden beneath them
            let hit = if response.rect.contains(screen_pos) {
                hit_test(&self.graph, world)
            } else {
                crate::interaction::Hit::Canvas
            };
            if let Some(notice) = self.interaction.pointer_up(&mut self.graph, hit, world) {
                self.toasts.notice(&notice);
            }
        }
    }
}
