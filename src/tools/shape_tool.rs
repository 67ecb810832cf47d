use egui::Pos2;

use super::{Tool, ToolContext, ToolKind};
use crate::command::Command;
use crate::geometry::{handle_rect, hit_handle};
use crate::overlay::{Overlay, OverlayId, OverlayItem};
use crate::raster::draw_shape;
use crate::shape::{Handle, Shape, ShapeGeometry, ShapeKind, StrokeStyle};

/// Extra hit slop around thin shapes, in handle sizes
const BODY_TOLERANCE: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeState {
    Idle,
    Drawing {
        id: OverlayId,
        origin: Pos2,
    },
    Selected {
        id: OverlayId,
    },
    Resizing {
        id: OverlayId,
        handle: Handle,
        original: ShapeGeometry,
    },
    Moving {
        id: OverlayId,
        original: ShapeGeometry,
        grab: Pos2,
    },
}

impl ShapeState {
    fn shape_id(&self) -> Option<OverlayId> {
        match self {
            Self::Idle => None,
            Self::Drawing { id, .. }
            | Self::Selected { id }
            | Self::Resizing { id, .. }
            | Self::Moving { id, .. } => Some(*id),
        }
    }
}

/// Rectangle, ellipse, line and arrow tool.
///
/// A finished shape stays selected in the overlay, where it can be moved or resized by
/// its handles, until it is committed by clicking elsewhere or switching tools.
#[derive(Debug, Clone)]
pub struct ShapeTool {
    tool_kind: ToolKind,
    shape_kind: ShapeKind,
    state: ShapeState,
    /// Outline and handles of the selected shape
    decorations: Vec<OverlayId>,
}

impl ShapeTool {
    pub fn new(tool_kind: ToolKind) -> Self {
        let shape_kind = tool_kind.shape_kind().unwrap_or(ShapeKind::Rectangle);
        Self {
            tool_kind,
            shape_kind,
            state: ShapeState::Idle,
            decorations: Vec::new(),
        }
    }

    pub fn state(&self) -> &ShapeState {
        &self.state
    }

    /// The live shape, if any
    pub fn shape_id(&self) -> Option<OverlayId> {
        self.state.shape_id()
    }

    fn clear_decorations(&mut self, overlay: &mut Overlay) {
        overlay.remove_all(&mut self.decorations);
    }

    fn update_decorations(&mut self, ctx: &mut ToolContext<'_>) {
        self.clear_decorations(ctx.overlay);
        let Some(id) = self.shape_id() else {
            return;
        };
        let Some(shape) = ctx.overlay.shape(id) else {
            return;
        };

        let outline = shape.bounds();
        let handles = shape.handles(ctx.config.extended_handles);
        self.decorations.push(ctx.overlay.insert(OverlayItem::Outline(outline)));
        for (handle, pos) in handles {
            let rect = handle_rect(pos, ctx.metrics.handle_size);
            self.decorations
                .push(ctx.overlay.insert(OverlayItem::Handle { handle, rect }));
        }
    }

    /// Give up on a shape whose overlay item was removed behind our back.
    fn abandon(&mut self, overlay: &mut Overlay) {
        log::debug!("{:?} shape is gone from the overlay; back to idle", self.tool_kind);
        self.clear_decorations(overlay);
        self.state = ShapeState::Idle;
    }

    /// Rasterize the live shape into the canvas. Empty shapes are dropped.
    fn finalize(&mut self, ctx: &mut ToolContext<'_>) -> Option<Command> {
        self.clear_decorations(ctx.overlay);
        let id = std::mem::replace(&mut self.state, ShapeState::Idle).shape_id()?;
        let shape = ctx.overlay.take_shape(id)?;
        if shape.is_empty() {
            log::debug!("Discarding empty {:?}", shape.kind());
            return None;
        }
        draw_shape(ctx.canvas, &shape, ctx.fonts);
        Some(Command::PushState)
    }
}

impl Tool for ShapeTool {
    fn name(&self) -> &'static str {
        self.tool_kind.label()
    }

    fn kind(&self) -> ToolKind {
        self.tool_kind
    }

    fn activate(&mut self) {
        self.state = ShapeState::Idle;
        self.decorations.clear();
    }

    fn deactivate(&mut self, ctx: &mut ToolContext<'_>) -> Option<Command> {
        self.finalize(ctx)
    }

    fn cancel(&mut self, overlay: &mut Overlay) {
        self.clear_decorations(overlay);
        if let Some(id) = std::mem::replace(&mut self.state, ShapeState::Idle).shape_id() {
            overlay.remove(id);
        }
    }

    fn is_busy(&self) -> bool {
        self.state != ShapeState::Idle
    }

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        match &self.state {
            ShapeState::Idle => {
                let style = StrokeStyle::new(
                    ctx.settings.shape_color,
                    ctx.settings.shape_width * ctx.metrics.stroke_scale,
                );
                let arrow_length = ctx.config.arrow_length * ctx.metrics.stroke_scale;
                let shape = Shape::new(self.shape_kind, pos, style, arrow_length);
                let id = ctx.overlay.insert(OverlayItem::Shape(shape));
                self.state = ShapeState::Drawing { id, origin: pos };
                None
            }
            ShapeState::Selected { id } => {
                let id = *id;
                let Some(shape) = ctx.overlay.shape(id) else {
                    self.abandon(ctx.overlay);
                    return None;
                };
                let handles = shape.handles(ctx.config.extended_handles);
                if let Some(handle) = hit_handle(pos, &handles, ctx.metrics.handle_size) {
                    self.state = ShapeState::Resizing {
                        id,
                        handle,
                        original: shape.geometry().clone(),
                    };
                    None
                } else if shape.contains(pos, ctx.metrics.handle_size * BODY_TOLERANCE) {
                    self.state = ShapeState::Moving {
                        id,
                        original: shape.geometry().clone(),
                        grab: pos,
                    };
                    None
                } else {
                    self.finalize(ctx)
                }
            }
            // A press without a release; treat it as the end of the gesture
            ShapeState::Drawing { .. } | ShapeState::Resizing { .. } | ShapeState::Moving { .. } => {
                self.on_pointer_up(pos, ctx)
            }
        }
    }

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        let Some(id) = self.shape_id() else {
            return None;
        };
        let Some(shape) = ctx.overlay.shape_mut(id) else {
            self.abandon(ctx.overlay);
            return None;
        };
        match &self.state {
            ShapeState::Drawing { origin, .. } => shape.span(*origin, pos),
            ShapeState::Resizing {
                handle, original, ..
            } => {
                shape.resize_from(original, *handle, pos);
                self.update_decorations(ctx);
            }
            ShapeState::Moving { original, grab, .. } => {
                shape.move_from(original, pos - *grab);
                self.update_decorations(ctx);
            }
            ShapeState::Idle | ShapeState::Selected { .. } => {}
        }
        None
    }

    fn on_pointer_up(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        self.on_pointer_move(pos, ctx);
        let Some(id) = self.shape_id() else {
            return None;
        };
        match &self.state {
            ShapeState::Drawing { .. } => {
                let empty = ctx.overlay.shape(id).is_none_or(Shape::is_empty);
                if empty {
                    ctx.overlay.remove(id);
                    self.state = ShapeState::Idle;
                } else {
                    self.state = ShapeState::Selected { id };
                    self.update_decorations(ctx);
                }
            }
            ShapeState::Resizing { .. } | ShapeState::Moving { .. } => {
                self.state = ShapeState::Selected { id };
                self.update_decorations(ctx);
            }
            ShapeState::Idle | ShapeState::Selected { .. } => {}
        }
        None
    }

    fn refresh_overlay(&mut self, ctx: &mut ToolContext<'_>) {
        if !matches!(self.state, ShapeState::Idle | ShapeState::Drawing { .. }) {
            self.update_decorations(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::Harness;
    use egui::{pos2, Rect};

    fn drawn(h: &mut Harness, kind: ToolKind, from: Pos2, to: Pos2) -> ShapeTool {
        let mut tool = ShapeTool::new(kind);
        tool.on_pointer_down(from, &mut h.ctx());
        tool.on_pointer_move(to, &mut h.ctx());
        tool.on_pointer_up(to, &mut h.ctx());
        tool
    }

    fn handle_count(overlay: &Overlay) -> usize {
        overlay
            .iter()
            .filter(|item| matches!(item, OverlayItem::Handle { .. }))
            .count()
    }

    #[test]
    fn test_drawn_shape_is_selected_with_handles() {
        let mut h = Harness::new(200, 200);
        let tool = drawn(&mut h, ToolKind::Rectangle, pos2(20.0, 20.0), pos2(80.0, 60.0));
        assert!(matches!(tool.state(), ShapeState::Selected { .. }));
        assert_eq!(handle_count(&h.overlay), 4);
        assert!(h.canvas.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_zero_size_shape_is_discarded() {
        let mut h = Harness::new(100, 100);
        let tool = drawn(&mut h, ToolKind::Ellipse, pos2(20.0, 20.0), pos2(20.0, 20.0));
        assert_eq!(tool.state(), &ShapeState::Idle);
        assert!(h.overlay.is_empty());
    }

    #[test]
    fn test_corner_resize_keeps_opposite_corner() {
        let mut h = Harness::new(200, 200);
        let mut tool = drawn(&mut h, ToolKind::Rectangle, pos2(20.0, 20.0), pos2(80.0, 60.0));
        tool.on_pointer_down(pos2(80.0, 60.0), &mut h.ctx());
        assert!(matches!(tool.state(), ShapeState::Resizing { handle: Handle::BottomRight, .. }));
        tool.on_pointer_move(pos2(120.0, 150.0), &mut h.ctx());
        tool.on_pointer_up(pos2(120.0, 150.0), &mut h.ctx());
        let id = tool.shape_id().unwrap();
        assert_eq!(
            h.overlay.shape(id).unwrap().bounds(),
            Rect::from_min_max(pos2(20.0, 20.0), pos2(120.0, 150.0))
        );
    }

    #[test]
    fn test_move_translates_and_click_away_commits() {
        let mut h = Harness::new(200, 200);
        let mut tool = drawn(&mut h, ToolKind::Rectangle, pos2(20.0, 20.0), pos2(80.0, 60.0));
        tool.on_pointer_down(pos2(50.0, 40.0), &mut h.ctx());
        tool.on_pointer_move(pos2(60.0, 50.0), &mut h.ctx());
        tool.on_pointer_up(pos2(60.0, 50.0), &mut h.ctx());
        let id = tool.shape_id().unwrap();
        assert_eq!(h.overlay.shape(id).unwrap().bounds().min, pos2(30.0, 30.0));

        let command = tool.on_pointer_down(pos2(190.0, 190.0), &mut h.ctx());
        assert_eq!(command, Some(Command::PushState));
        assert_eq!(tool.state(), &ShapeState::Idle);
        assert!(h.overlay.is_empty());
        assert_ne!(h.canvas.get_pixel(30, 45).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_missing_overlay_item_is_noop() {
        let mut h = Harness::new(200, 200);
        let mut tool = drawn(&mut h, ToolKind::Line, pos2(20.0, 20.0), pos2(80.0, 60.0));
        h.overlay.clear();
        assert_eq!(tool.on_pointer_down(pos2(20.0, 20.0), &mut h.ctx()), None);
        assert_eq!(tool.state(), &ShapeState::Idle);
        assert_eq!(tool.deactivate(&mut h.ctx()), None);
    }

    #[test]
    fn test_deactivate_commits_arrow() {
        let mut h = Harness::new(200, 200);
        let mut tool = drawn(&mut h, ToolKind::Arrow, pos2(20.0, 100.0), pos2(180.0, 100.0));
        assert_eq!(tool.deactivate(&mut h.ctx()), Some(Command::PushState));
        assert!(h.overlay.is_empty());
        assert_ne!(h.canvas.get_pixel(100, 100).0, [255, 255, 255, 255]);
    }
}
