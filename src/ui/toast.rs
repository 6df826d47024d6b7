//! Short-lived notifications drawn over the bottom-right corner of the window.

use crate::constants::{MAX_TOASTS, TOAST_SECONDS};
use crate::interaction::Notice;
use eframe::egui;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    fn fill(self) -> egui::Color32 {
        match self {
            ToastKind::Success => egui::Color32::from_rgb(22, 163, 74),
            ToastKind::Error => egui::Color32::from_rgb(220, 38, 38),
            ToastKind::Info => egui::Color32::from_rgb(37, 99, 235),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    expires_at: f64,
}

/// Bounded queue of toasts, newest last.
#[derive(Debug, Default)]
pub struct Toasts {
    entries: VecDeque<Toast>,
    now: f64,
}

impl Toasts {
    pub fn success(&mut self, message: impl Into<String>) {
        self.show(message, ToastKind::Success);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(message, ToastKind::Error);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.show(message, ToastKind::Info);
    }

    /// Shows a graph-edit confirmation.
    pub fn notice(&mut self, notice: &Notice) {
        self.success(notice.message());
    }

    pub fn show(&mut self, message: impl Into<String>, kind: ToastKind) {
        if self.entries.len() == MAX_TOASTS {
            self.entries.pop_front();
        }
        self.entries.push_back(Toast {
            message: message.into(),
            kind,
            expires_at: self.now + TOAST_SECONDS,
        });
    }

    /// Advances the clock to `now` (seconds) and drops expired toasts.
    pub fn tick(&mut self, now: f64) {
        self.now = now;
        self.entries.retain(|toast| toast.expires_at > now);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn draw(&mut self, ctx: &egui::Context) {
        self.tick(ctx.input(|i| i.time));
        if self.entries.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
            .interactable(false)
            .show(ctx, |ui| {
                ui.with_layout(egui::Layout::bottom_up(egui::Align::Max), |ui| {
                    for toast in self.entries.iter().rev() {
                        egui::Frame::new()
                            .fill(toast.kind.fill())
                            .corner_radius(4.0)
                            .inner_margin(egui::Margin::symmetric(16, 10))
                            .show(ui, |ui| {
                                ui.label(
                                    egui::RichText::new(&toast.message).color(egui::Color32::WHITE),
                                );
                            });
                        ui.add_space(8.0);
                    }
                });
            });

        // Keep frames coming until the oldest toast has expired
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}
