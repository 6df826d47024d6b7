//! Canvas painting: grid, connections, the connection draft and nodes.

use super::state::EditorApp;
use crate::constants::*;
use crate::interaction::NodeGeometry;
use crate::types::*;
use eframe::egui;
use eframe::epaint::StrokeKind;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(100, 150, 255);

/// Fill colour of a node header, by kind.
pub fn kind_color(kind: NodeKind) -> egui::Color32 {
    match kind {
        NodeKind::Start => egui::Color32::from_rgb(34, 197, 94),
        NodeKind::Message => egui::Color32::from_rgb(59, 130, 246),
        NodeKind::Question => egui::Color32::from_rgb(168, 85, 247),
        NodeKind::Condition => egui::Color32::from_rgb(234, 179, 8),
        NodeKind::Action => egui::Color32::from_rgb(249, 115, 22),
        NodeKind::ApiCall => egui::Color32::from_rgb(20, 184, 166),
        NodeKind::Delay => egui::Color32::from_rgb(100, 116, 139),
        NodeKind::End => egui::Color32::from_rgb(239, 68, 68),
    }
}

/// One-line summary of a node's kind-specific attributes.
pub fn node_summary(node: &BotNode) -> String {
    match &node.body {
        NodeBody::Message { text } => text.clone(),
        NodeBody::Question { text, options } if options.is_empty() => text.clone(),
        NodeBody::Question { text, options } => format!("{text} [{}]", options.join(" / ")),
        NodeBody::ApiCall { url } => url.clone(),
        NodeBody::Delay { seconds } => format!("{seconds} s"),
        NodeBody::Start | NodeBody::Condition | NodeBody::Action | NodeBody::End => {
            node.kind().display_name().to_string()
        }
    }
}

/// Shortens `text` to at most `max_chars` characters, adding an ellipsis.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}

impl EditorApp {
    /// Paints the whole graph in layers: grid, connections, draft, nodes.
    pub fn render_graph(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        if self.settings.show_grid {
            self.draw_grid(painter, canvas_rect);
        }

        for (idx, connection) in self.graph.connections().iter().enumerate() {
            self.draw_connection(painter, connection, self.selected_connection == Some(idx));
        }

        if let Some(draft) = self.interaction.connection_draft() {
            if let Some(source) = self.graph.node(&draft.source) {
                let from = self.world_to_screen(NodeGeometry::of(source).output);
                let to = self.world_to_screen(draft.pointer);
                self.draw_connection_draft(painter, from, to);
            }
        }

        for node in self.graph.nodes() {
            self.draw_node(painter, node);
        }
    }

    /// Draws a zoom-aware grid every `GRID_SIZE` world units.
    pub fn draw_grid(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let grid_size = GRID_SIZE;
        let stroke = egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(128, 128, 128, 32));

        // Grid too small to see clearly
        if grid_size * self.canvas.zoom_factor < 2.0 {
            return;
        }

        let top_left = self.screen_to_world(canvas_rect.min);
        let bottom_right = self.screen_to_world(canvas_rect.max);

        let mut x = (top_left.x / grid_size).floor() * grid_size;
        while x <= bottom_right.x {
            let screen_x = self.world_to_screen(egui::pos2(x, 0.0)).x;
            painter.line_segment(
                [
                    egui::pos2(screen_x, canvas_rect.min.y),
                    egui::pos2(screen_x, canvas_rect.max.y),
                ],
                stroke,
            );
            x += grid_size;
        }

        let mut y = (top_left.y / grid_size).floor() * grid_size;
        while y <= bottom_right.y {
            let screen_y = self.world_to_screen(egui::pos2(0.0, y)).y;
            painter.line_segment(
                [
                    egui::pos2(canvas_rect.min.x, screen_y),
                    egui::pos2(canvas_rect.max.x, screen_y),
                ],
                stroke,
            );
            y += grid_size;
        }
    }

    /// Draws a connection from the source's output handle to the target's input handle.
    ///
    /// Connections with a missing endpoint are not drawn.
    pub fn draw_connection(&self, painter: &egui::Painter, connection: &Connection, is_selected: bool) {
        let (Some(from), Some(to)) = (self.graph.node(&connection.from), self.graph.node(&connection.to))
        else {
            return;
        };
        let start = self.world_to_screen(NodeGeometry::of(from).output);
        let end = self.world_to_screen(NodeGeometry::of(to).input);

        let (color, width) = if is_selected {
            (ACCENT, 3.0)
        } else if self.settings.dark_mode {
            (egui::Color32::LIGHT_GRAY, 2.0)
        } else {
            (egui::Color32::DARK_GRAY, 2.0)
        };

        painter.line_segment([start, end], egui::Stroke::new(width, color));
        self.draw_arrow_at_center(painter, start, end, color);

        if let Some(label) = &connection.label {
            let center = start + (end - start) * 0.5;
            let font_size = (11.0 * self.canvas.zoom_factor).clamp(8.0, 32.0);
            painter.text(
                center - egui::vec2(0.0, 10.0 * self.canvas.zoom_factor),
                egui::Align2::CENTER_BOTTOM,
                label,
                egui::FontId::proportional(font_size),
                color,
            );
        }
    }

    /// Filled triangle at the midpoint of a connection, pointing at the target.
    fn draw_arrow_at_center(
        &self,
        painter: &egui::Painter,
        start: egui::Pos2,
        end: egui::Pos2,
        color: egui::Color32,
    ) {
        let center = start + (end - start) * 0.5;
        let direction = (end - start).normalized();
        let perpendicular = egui::vec2(-direction.y, direction.x);

        let arrow_size = 8.0 * self.canvas.zoom_factor;
        let arrow_width = 6.0 * self.canvas.zoom_factor;

        let tip = center + direction * arrow_size;
        let left = center - direction * arrow_size + perpendicular * arrow_width;
        let right = center - direction * arrow_size - perpendicular * arrow_width;

        painter.add(egui::Shape::convex_polygon(
            vec![tip, left, right],
            color,
            egui::Stroke::NONE,
        ));
    }

    /// Dashed line from the draft's source handle to the pointer.
    pub fn draw_connection_draft(&self, painter: &egui::Painter, from: egui::Pos2, to: egui::Pos2) {
        let stroke = egui::Stroke::new(2.0, ACCENT);
        painter.extend(egui::Shape::dashed_line(
            &[from, to],
            stroke,
            DRAFT_DASH_LENGTH,
            DRAFT_GAP_LENGTH,
        ));
        painter.circle_filled(to, 4.0, ACCENT);
    }

    /// Draws a node card with its handles and delete button.
    pub fn draw_node(&self, painter: &egui::Painter, node: &BotNode) {
        let geometry = NodeGeometry::of(node);
        let zoom = self.canvas.zoom_factor;
        let rect = egui::Rect::from_min_max(
            self.world_to_screen(geometry.body.min),
            self.world_to_screen(geometry.body.max),
        );

        let body_fill = if self.settings.dark_mode {
            egui::Color32::from_gray(45)
        } else {
            egui::Color32::from_gray(245)
        };
        let text_color = if self.settings.dark_mode {
            egui::Color32::from_gray(230)
        } else {
            egui::Color32::from_gray(30)
        };
        let accent = kind_color(node.kind());

        painter.rect_filled(rect, 6.0, body_fill);

        // Coloured header strip
        let header = egui::Rect::from_min_size(rect.min, egui::vec2(rect.width(), 6.0 * zoom));
        painter.rect_filled(header, 6.0, accent);

        let is_dragging = self.interaction.dragging_node() == Some(&node.id);
        let is_selected = self.graph.selected() == Some(&node.id);
        let (stroke_color, stroke_width) = if is_dragging {
            (egui::Color32::from_rgb(255, 165, 0), 3.0)
        } else if is_selected {
            (egui::Color32::YELLOW, 3.0)
        } else {
            (accent, 1.5)
        };
        painter.rect_stroke(
            rect,
            6.0,
            egui::Stroke::new(stroke_width, stroke_color),
            StrokeKind::Outside,
        );

        let title_size = (13.0 * zoom).clamp(6.0, 48.0);
        let summary_size = (11.0 * zoom).clamp(6.0, 40.0);
        painter.text(
            egui::pos2(rect.min.x + 10.0 * zoom, rect.min.y + 24.0 * zoom),
            egui::Align2::LEFT_CENTER,
            truncate(&node.label, 18),
            egui::FontId::proportional(title_size),
            text_color,
        );
        painter.text(
            egui::pos2(rect.min.x + 10.0 * zoom, rect.min.y + 46.0 * zoom),
            egui::Align2::LEFT_CENTER,
            truncate(&node_summary(node), 24),
            egui::FontId::proportional(summary_size),
            text_color.gamma_multiply(0.7),
        );

        // Handles
        let radius = HANDLE_RADIUS * zoom * 0.75;
        let handle_stroke = egui::Stroke::new(1.5, body_fill);
        for handle in [geometry.input, geometry.output] {
            let center = self.world_to_screen(handle);
            painter.circle_filled(center, radius, accent);
            painter.circle_stroke(center, radius, handle_stroke);
        }

        // Delete button
        let delete = egui::Rect::from_min_max(
            self.world_to_screen(geometry.delete.min),
            self.world_to_screen(geometry.delete.max),
        );
        painter.rect_filled(delete, 3.0, egui::Color32::from_rgba_unmultiplied(239, 68, 68, 180));
        painter.text(
            delete.center(),
            egui::Align2::CENTER_CENTER,
            "×",
            egui::FontId::proportional((12.0 * zoom).clamp(6.0, 36.0)),
            egui::Color32::WHITE,
        );
    }
}
