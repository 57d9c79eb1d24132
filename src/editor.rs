//! Interactive region editors: drag out rectangles over a photo.
//!
//! `BodyZoneEditor` tags rectangles with a body-zone kind (one rectangle per
//! kind, redrawing replaces); `GarmentZoneEditor` marks the single placement
//! rectangle on a garment image. Both repaint everything every frame: photo,
//! committed zones, and the in-progress drag as a dashed outline. Saving
//! hands the finalized set back to the caller; cancelling hands back nothing.

use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke, Vec2};

use crate::images::ImageStore;
use crate::zones::{
    self, process_drag, BodyZone, BodyZoneKind, DragEvent, DragState, ZoneRect, ZoneSet,
};

const CANVAS_MAX_HEIGHT: f32 = 420.0;

pub enum BodyEditorAction {
    Save(Vec<BodyZone>),
    Cancel,
}

pub struct BodyZoneEditor {
    image_url: String,
    selected: BodyZoneKind,
    zones: ZoneSet,
    drag: DragState,
}

impl BodyZoneEditor {
    pub fn new(image_url: String, existing: &[BodyZone]) -> Self {
        Self {
            image_url,
            selected: BodyZoneKind::UpperBody,
            zones: ZoneSet::from_vec(existing),
            drag: DragState::default(),
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, images: &mut ImageStore) -> Option<BodyEditorAction> {
        let mut action = None;
        egui::Window::new("Mark body zones")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for kind in BodyZoneKind::ALL {
                        let marked = self.zones.get(kind).is_some();
                        let text = egui::RichText::new(if marked {
                            format!("{} ✓", kind.label())
                        } else {
                            kind.label().to_string()
                        })
                        .color(kind.color());
                        ui.selectable_value(&mut self.selected, kind, text);
                    }
                });
                ui.separator();

                let Some(texture) = images.get(ctx, &self.image_url).cloned() else {
                    ui.spinner();
                    return;
                };
                let (quad, response) = image_canvas(ui, &texture);
                let image_size = Vec2::new(texture.size()[0] as f32, texture.size()[1] as f32);

                for (kind, zone) in self.zones.iter() {
                    let on_screen = zones::zone_to_screen(zone, quad, image_size);
                    paint_zone(ui.painter(), on_screen, kind.color(), kind.label());
                }

                match process_drag(&response, &mut self.drag) {
                    DragEvent::Finished { start, end } => {
                        let a = clamp_to_image(zones::to_image_coords(start, quad, image_size), image_size);
                        let b = clamp_to_image(zones::to_image_coords(end, quad, image_size), image_size);
                        self.zones.place(self.selected, ZoneRect::from_corners(a, b));
                    }
                    DragEvent::Rejected => {
                        log::debug!("drag below threshold, ignored");
                    }
                    _ => {}
                }
                paint_drag_preview(ui.painter(), &self.drag, self.selected.color());

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        action = Some(BodyEditorAction::Save(self.zones.to_vec()));
                    }
                    if ui.button("Clear zone").clicked() {
                        self.zones.remove(self.selected);
                    }
                    if ui.button("Cancel").clicked() {
                        action = Some(BodyEditorAction::Cancel);
                    }
                });
            });
        action
    }
}

pub enum GarmentEditorAction {
    Save(Option<ZoneRect>),
    Cancel,
}

pub struct GarmentZoneEditor {
    image_url: String,
    zone: Option<ZoneRect>,
    drag: DragState,
}

impl GarmentZoneEditor {
    pub fn new(image_url: String, existing: Option<ZoneRect>) -> Self {
        Self {
            image_url,
            zone: existing,
            drag: DragState::default(),
        }
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        images: &mut ImageStore,
    ) -> Option<GarmentEditorAction> {
        let mut action = None;
        egui::Window::new("Mark garment placement")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Drag a rectangle around the part of the garment to fit.");
                ui.separator();

                let Some(texture) = images.get(ctx, &self.image_url).cloned() else {
                    ui.spinner();
                    return;
                };
                let (quad, response) = image_canvas(ui, &texture);
                let image_size = Vec2::new(texture.size()[0] as f32, texture.size()[1] as f32);

                if let Some(zone) = self.zone {
                    let on_screen = zones::zone_to_screen(zone, quad, image_size);
                    paint_zone(ui.painter(), on_screen, Color32::LIGHT_BLUE, "placement");
                }

                // a new drag replaces the single rectangle
                if let DragEvent::Finished { start, end } = process_drag(&response, &mut self.drag)
                {
                    let a = clamp_to_image(zones::to_image_coords(start, quad, image_size), image_size);
                    let b = clamp_to_image(zones::to_image_coords(end, quad, image_size), image_size);
                    self.zone = Some(ZoneRect::from_corners(a, b));
                }
                paint_drag_preview(ui.painter(), &self.drag, Color32::LIGHT_BLUE);

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        action = Some(GarmentEditorAction::Save(self.zone));
                    }
                    if ui.button("Clear").clicked() {
                        self.zone = None;
                    }
                    if ui.button("Cancel").clicked() {
                        action = Some(GarmentEditorAction::Cancel);
                    }
                });
            });
        action
    }
}

// ── shared painting helpers ──────────────────────────────────────

/// Lay out the photo scaled to fit, return its on-screen quad and the drag
/// response covering it.
fn image_canvas(ui: &mut egui::Ui, texture: &egui::TextureHandle) -> (Rect, egui::Response) {
    let [w, h] = texture.size();
    let image_size = Vec2::new(w as f32, h as f32);
    let scale = (ui.available_width() / image_size.x).min(CANVAS_MAX_HEIGHT / image_size.y);
    let quad_size = image_size * scale;

    let (rect, response) = ui.allocate_exact_size(quad_size, egui::Sense::click_and_drag());
    ui.painter().image(
        texture.id(),
        rect,
        Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
        Color32::WHITE,
    );
    (rect, response)
}

fn paint_zone(painter: &egui::Painter, rect: Rect, color: Color32, label: &str) {
    painter.rect_filled(rect, 0.0, color.gamma_multiply(0.15));
    painter.rect_stroke(rect, 0.0, Stroke::new(2.0, color));
    painter.text(
        rect.min + Vec2::new(4.0, 2.0),
        Align2::LEFT_TOP,
        label,
        FontId::proportional(12.0),
        color,
    );
}

fn paint_drag_preview(painter: &egui::Painter, drag: &DragState, color: Color32) {
    if let (Some(start), Some(current)) = (drag.start, drag.current) {
        dashed_rect(
            painter,
            Rect::from_two_pos(start, current),
            Stroke::new(1.5, color),
        );
    }
}

fn dashed_rect(painter: &egui::Painter, rect: Rect, stroke: Stroke) {
    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
        rect.left_top(),
    ];
    for edge in corners.windows(2) {
        painter.extend(egui::Shape::dashed_line(edge, stroke, 6.0, 4.0));
    }
}

fn clamp_to_image(p: Pos2, image_size: Vec2) -> Pos2 {
    Pos2::new(p.x.clamp(0.0, image_size.x), p.y.clamp(0.0, image_size.y))
}
