//! Rectangle-zone geometry shared by both region editors.
//!
//! Coordinates are kept in source-image pixel space; the editors map pointer
//! positions from the on-screen quad into image space and back, compensating
//! for however the quad is scaled to fit the window.

use std::collections::BTreeMap;

use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A drag has to cover at least this many pixels in *both* axes before it
/// counts as a zone; anything smaller is an accidental click.
pub const MIN_DRAG_PX: f32 = 12.0;

/// Axis-aligned rectangle in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ZoneRect {
    /// Normalize two drag corners: origin at the min corner, positive size.
    pub fn from_corners(a: Pos2, b: Pos2) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn to_rect(self) -> Rect {
        Rect::from_min_size(
            Pos2::new(self.x, self.y),
            Vec2::new(self.width, self.height),
        )
    }
}

/// Body regions a try-on photo can be annotated with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BodyZoneKind {
    Head,
    UpperBody,
    LowerBody,
    Feet,
}

impl BodyZoneKind {
    pub const ALL: [BodyZoneKind; 4] = [
        BodyZoneKind::Head,
        BodyZoneKind::UpperBody,
        BodyZoneKind::LowerBody,
        BodyZoneKind::Feet,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BodyZoneKind::Head => "Head",
            BodyZoneKind::UpperBody => "Upper body",
            BodyZoneKind::LowerBody => "Lower body",
            BodyZoneKind::Feet => "Feet",
        }
    }

    pub fn color(&self) -> Color32 {
        match self {
            BodyZoneKind::Head => Color32::from_rgb(238, 207, 109),
            BodyZoneKind::UpperBody => Color32::from_rgb(110, 200, 255),
            BodyZoneKind::LowerBody => Color32::from_rgb(120, 180, 120),
            BodyZoneKind::Feet => Color32::from_rgb(211, 109, 109),
        }
    }
}

/// A finalized body annotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyZone {
    pub kind: BodyZoneKind,
    pub rect: ZoneRect,
}

/// The committed zones of one photo: at most one rectangle per kind,
/// redrawing a kind replaces its previous rectangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneSet {
    zones: BTreeMap<BodyZoneKind, ZoneRect>,
}

impl ZoneSet {
    pub fn place(&mut self, kind: BodyZoneKind, rect: ZoneRect) {
        self.zones.insert(kind, rect);
    }

    pub fn remove(&mut self, kind: BodyZoneKind) {
        self.zones.remove(&kind);
    }

    pub fn get(&self, kind: BodyZoneKind) -> Option<ZoneRect> {
        self.zones.get(&kind).copied()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyZoneKind, ZoneRect)> + '_ {
        self.zones.iter().map(|(k, r)| (*k, *r))
    }

    pub fn to_vec(&self) -> Vec<BodyZone> {
        self.iter()
            .map(|(kind, rect)| BodyZone { kind, rect })
            .collect()
    }

    /// Rebuild a set from a saved list; a duplicated kind keeps the last
    /// rectangle, matching the redraw-replaces rule.
    pub fn from_vec(zones: &[BodyZone]) -> Self {
        let mut set = Self::default();
        for zone in zones {
            set.place(zone.kind, zone.rect);
        }
        set
    }
}

// ── coordinate mapping ───────────────────────────────────────────

/// Pointer position on the on-screen quad → image pixel position.
/// `(p - quad.min) * (image_size / quad.size)` per axis.
pub fn to_image_coords(p: Pos2, quad: Rect, image_size: Vec2) -> Pos2 {
    Pos2::new(
        (p.x - quad.min.x) * (image_size.x / quad.width()),
        (p.y - quad.min.y) * (image_size.y / quad.height()),
    )
}

/// Image pixel position → position on the on-screen quad.
pub fn to_screen_coords(p: Pos2, quad: Rect, image_size: Vec2) -> Pos2 {
    Pos2::new(
        quad.min.x + p.x * (quad.width() / image_size.x),
        quad.min.y + p.y * (quad.height() / image_size.y),
    )
}

/// Map a committed image-space zone onto the on-screen quad for painting.
pub fn zone_to_screen(zone: ZoneRect, quad: Rect, image_size: Vec2) -> Rect {
    let min = to_screen_coords(Pos2::new(zone.x, zone.y), quad, image_size);
    let max = to_screen_coords(
        Pos2::new(zone.x + zone.width, zone.y + zone.height),
        quad,
        image_size,
    );
    Rect::from_min_max(min, max)
}

// ── drag gesture handling ────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct DragState {
    pub start: Option<Pos2>,
    pub current: Option<Pos2>,
}

/// What a frame's pointer input did to the drag in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    Started,
    Dragging,
    /// Drag ended and covered the threshold in both axes.
    Finished { start: Pos2, end: Pos2 },
    /// Drag ended below the threshold and was discarded.
    Rejected,
    None,
}

pub fn meets_drag_threshold(start: Pos2, end: Pos2) -> bool {
    (end.x - start.x).abs() >= MIN_DRAG_PX && (end.y - start.y).abs() >= MIN_DRAG_PX
}

/// Advance the drag state from this frame's `Response`.
pub fn process_drag(response: &egui::Response, drag: &mut DragState) -> DragEvent {
    if response.drag_started() {
        drag.start = response.interact_pointer_pos();
        drag.current = response.interact_pointer_pos();
        return DragEvent::Started;
    }

    if response.dragged() {
        drag.current = response.interact_pointer_pos();
        return DragEvent::Dragging;
    }

    if response.drag_stopped() {
        if let (Some(start), Some(end)) = (drag.start.take(), drag.current.take()) {
            if meets_drag_threshold(start, end) {
                return DragEvent::Finished { start, end };
            }
            return DragEvent::Rejected;
        }
    }

    DragEvent::None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_normalize_to_min_origin_and_positive_size() {
        let rect = ZoneRect::from_corners(Pos2::new(80.0, 20.0), Pos2::new(30.0, 95.0));
        assert_eq!(rect.x, 30.0);
        assert_eq!(rect.y, 20.0);
        assert_eq!(rect.width, 50.0);
        assert_eq!(rect.height, 75.0);
    }

    #[test]
    fn threshold_requires_both_axes() {
        let start = Pos2::new(10.0, 10.0);
        // wide but flat: a horizontal swipe is not a zone
        assert!(!meets_drag_threshold(start, Pos2::new(100.0, 15.0)));
        // tall but narrow
        assert!(!meets_drag_threshold(start, Pos2::new(15.0, 100.0)));
        // both axes covered
        assert!(meets_drag_threshold(start, Pos2::new(40.0, 40.0)));
    }

    #[test]
    fn tiny_click_stays_below_threshold() {
        assert!(!meets_drag_threshold(
            Pos2::new(5.0, 5.0),
            Pos2::new(9.0, 11.0)
        ));
    }

    #[test]
    fn saved_zone_lists_round_trip_through_a_set() {
        let mut zones = ZoneSet::default();
        zones.place(
            BodyZoneKind::Head,
            ZoneRect::from_corners(Pos2::new(10.0, 0.0), Pos2::new(40.0, 30.0)),
        );
        zones.place(
            BodyZoneKind::Feet,
            ZoneRect::from_corners(Pos2::new(0.0, 80.0), Pos2::new(50.0, 100.0)),
        );
        let saved = zones.to_vec();
        assert_eq!(saved.len(), 2);
        assert_eq!(ZoneSet::from_vec(&saved), zones);
    }

    #[test]
    fn redrawing_a_kind_replaces_the_previous_rect() {
        let mut zones = ZoneSet::default();
        zones.place(
            BodyZoneKind::UpperBody,
            ZoneRect::from_corners(Pos2::new(0.0, 0.0), Pos2::new(50.0, 50.0)),
        );
        zones.place(
            BodyZoneKind::UpperBody,
            ZoneRect::from_corners(Pos2::new(10.0, 10.0), Pos2::new(90.0, 90.0)),
        );
        assert_eq!(zones.len(), 1);
        assert_eq!(
            zones.get(BodyZoneKind::UpperBody).map(|r| r.width),
            Some(80.0)
        );

        zones.place(
            BodyZoneKind::LowerBody,
            ZoneRect::from_corners(Pos2::new(0.0, 50.0), Pos2::new(50.0, 100.0)),
        );
        assert_eq!(zones.len(), 2);
    }

    #[test]
    fn screen_to_image_mapping_compensates_for_scaling() {
        // 1000x500 image shown on a 200x100 quad at (40, 30): 5x scale.
        let quad = Rect::from_min_size(Pos2::new(40.0, 30.0), Vec2::new(200.0, 100.0));
        let image_size = Vec2::new(1000.0, 500.0);

        let p = to_image_coords(Pos2::new(140.0, 80.0), quad, image_size);
        assert_eq!(p, Pos2::new(500.0, 250.0));

        // and back
        let q = to_screen_coords(p, quad, image_size);
        assert_eq!(q, Pos2::new(140.0, 80.0));
    }

    #[test]
    fn zones_round_trip_between_spaces() {
        let quad = Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(300.0, 400.0));
        let image_size = Vec2::new(600.0, 800.0);
        let zone = ZoneRect {
            x: 100.0,
            y: 200.0,
            width: 300.0,
            height: 100.0,
        };
        let on_screen = zone_to_screen(zone, quad, image_size);
        assert_eq!(on_screen.min, Pos2::new(50.0, 100.0));
        assert_eq!(on_screen.size(), Vec2::new(150.0, 50.0));
    }
}
