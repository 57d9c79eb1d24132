//! Transient notifications, stacked in the top-right corner. Every success
//! and failure surface in the app reports through here.

use egui::{Align2, Color32, RichText, Vec2};

const TOAST_SECONDS: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

struct Toast {
    kind: ToastKind,
    text: String,
    /// Assigned on first paint; `ui.input(|i| i.time)` based.
    expires_at: Option<f64>,
}

#[derive(Default)]
pub struct Toasts {
    queue: Vec<Toast>,
}

impl Toasts {
    pub fn success(&mut self, text: impl Into<String>) {
        self.push(ToastKind::Success, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::error!("{text}");
        self.push(ToastKind::Error, text);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(ToastKind::Info, text.into());
    }

    fn push(&mut self, kind: ToastKind, text: String) {
        self.queue.push(Toast {
            kind,
            text,
            expires_at: None,
        });
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        if self.queue.is_empty() {
            return;
        }
        let now = ctx.input(|i| i.time);
        for toast in &mut self.queue {
            toast.expires_at.get_or_insert(now + TOAST_SECONDS);
        }
        self.queue.retain(|t| t.expires_at.unwrap_or(now) > now);

        egui::Area::new(egui::Id::new("toast_stack"))
            .anchor(Align2::RIGHT_TOP, Vec2::new(-12.0, 12.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for toast in &self.queue {
                    let (accent, icon) = match toast.kind {
                        ToastKind::Success => (Color32::from_rgb(120, 180, 120), "✔"),
                        ToastKind::Error => (Color32::from_rgb(211, 109, 109), "⚠"),
                        ToastKind::Info => (Color32::from_rgb(110, 200, 255), "ℹ"),
                    };
                    egui::Frame::popup(ui.style())
                        .stroke(egui::Stroke::new(1.0, accent))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label(RichText::new(icon).color(accent));
                                ui.label(&toast.text);
                            });
                        });
                    ui.add_space(4.0);
                }
            });

        // keep ticking so toasts disappear without pointer activity
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}
