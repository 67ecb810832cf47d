//! Transient items drawn over the canvas: live shapes, selection chrome and crop shading.
//!
//! Nothing here is part of the image until a tool rasterizes it. Removing an item that is
//! already gone is a successful no-op.

use egui::{Pos2, Rect};

use crate::id_generator::generate_overlay_id;
use crate::shape::{Handle, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(usize);

impl OverlayId {
    pub fn new() -> Self {
        Self(generate_overlay_id())
    }
}

impl Default for OverlayId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayItem {
    /// A shape that is being drawn, edited or typed
    Shape(Shape),
    /// Dashed selection outline
    Outline(Rect),
    /// Resize handle hit area
    Handle { handle: Handle, rect: Rect },
    /// Darkened region around a crop selection
    Shade(Rect),
    /// Rubber band of a crop selection
    CropBand(Rect),
    /// Anchor of the floating text formatting bar
    FormatBar { anchor: Pos2 },
}

#[derive(Debug, Default)]
pub struct Overlay {
    items: Vec<(OverlayId, OverlayItem)>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: OverlayItem) -> OverlayId {
        let id = OverlayId::new();
        self.items.push((id, item));
        id
    }

    /// Remove an item. Returns whether anything was removed.
    pub fn remove(&mut self, id: OverlayId) -> bool {
        let before = self.items.len();
        self.items.retain(|(item_id, _)| *item_id != id);
        before != self.items.len()
    }

    pub fn remove_all(&mut self, ids: &mut Vec<OverlayId>) {
        for id in ids.drain(..) {
            self.remove(id);
        }
    }

    pub fn contains(&self, id: OverlayId) -> bool {
        self.items.iter().any(|(item_id, _)| *item_id == id)
    }

    pub fn get(&self, id: OverlayId) -> Option<&OverlayItem> {
        self.items
            .iter()
            .find(|(item_id, _)| *item_id == id)
            .map(|(_, item)| item)
    }

    pub fn get_mut(&mut self, id: OverlayId) -> Option<&mut OverlayItem> {
        self.items
            .iter_mut()
            .find(|(item_id, _)| *item_id == id)
            .map(|(_, item)| item)
    }

    pub fn shape(&self, id: OverlayId) -> Option<&Shape> {
        match self.get(id) {
            Some(OverlayItem::Shape(shape)) => Some(shape),
            _ => None,
        }
    }

    pub fn shape_mut(&mut self, id: OverlayId) -> Option<&mut Shape> {
        match self.get_mut(id) {
            Some(OverlayItem::Shape(shape)) => Some(shape),
            _ => None,
        }
    }

    /// Take a shape out of the overlay
    pub fn take_shape(&mut self, id: OverlayId) -> Option<Shape> {
        let index = self.items.iter().position(|(item_id, _)| *item_id == id)?;
        match self.items.remove(index) {
            (_, OverlayItem::Shape(shape)) => Some(shape),
            other => {
                self.items.insert(index, other);
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &OverlayItem> {
        self.items.iter().map(|(_, item)| item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{ShapeKind, StrokeStyle};
    use egui::{pos2, Color32};

    #[test]
    fn test_remove_is_idempotent() {
        let mut overlay = Overlay::new();
        let id = overlay.insert(OverlayItem::Outline(Rect::NOTHING));
        assert!(overlay.remove(id));
        assert!(!overlay.remove(id));
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_take_shape_ignores_other_items() {
        let mut overlay = Overlay::new();
        let outline = overlay.insert(OverlayItem::Outline(Rect::NOTHING));
        let shape = Shape::new(
            ShapeKind::Rectangle,
            pos2(1.0, 1.0),
            StrokeStyle::new(Color32::RED, 2.0),
            15.0,
        );
        let shape_id = overlay.insert(OverlayItem::Shape(shape));

        assert!(overlay.take_shape(outline).is_none());
        assert!(overlay.contains(outline));
        assert!(overlay.take_shape(shape_id).is_some());
        assert!(!overlay.contains(shape_id));
    }
}
