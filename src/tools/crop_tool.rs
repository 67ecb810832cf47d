use egui::{Pos2, Rect};

use super::{Tool, ToolContext, ToolKind};
use crate::command::Command;
use crate::geometry::{normalized_rect, PixelRect};
use crate::overlay::{Overlay, OverlayId, OverlayItem};

#[derive(Debug, Clone, PartialEq)]
pub enum CropState {
    Idle,
    Selecting {
        origin: Pos2,
        band: OverlayId,
        shades: Vec<OverlayId>,
    },
}

/// Rubber-band crop. The area outside the selection is shaded while dragging; releasing
/// asks the editor to crop to the selection.
#[derive(Debug, Clone)]
pub struct CropTool {
    state: CropState,
}

impl Default for CropTool {
    fn default() -> Self {
        Self::new()
    }
}

/// The four bands of `canvas` around `selection`: above, below, left and right of it
pub fn shade_quadrants(canvas: Rect, selection: Rect) -> [Rect; 4] {
    let sel = selection.intersect(canvas);
    [
        Rect::from_min_max(canvas.min, Pos2::new(canvas.max.x, sel.min.y)),
        Rect::from_min_max(Pos2::new(canvas.min.x, sel.max.y), canvas.max),
        Rect::from_min_max(Pos2::new(canvas.min.x, sel.min.y), Pos2::new(sel.min.x, sel.max.y)),
        Rect::from_min_max(Pos2::new(sel.max.x, sel.min.y), Pos2::new(canvas.max.x, sel.max.y)),
    ]
}

impl CropTool {
    pub fn new() -> Self {
        Self {
            state: CropState::Idle,
        }
    }

    pub fn state(&self) -> &CropState {
        &self.state
    }

    fn canvas_rect(ctx: &ToolContext<'_>) -> Rect {
        Rect::from_min_size(
            Pos2::ZERO,
            egui::vec2(ctx.canvas.width() as f32, ctx.canvas.height() as f32),
        )
    }

    fn clear(&mut self, overlay: &mut Overlay) -> Option<Pos2> {
        match std::mem::replace(&mut self.state, CropState::Idle) {
            CropState::Idle => None,
            CropState::Selecting {
                origin,
                band,
                mut shades,
            } => {
                overlay.remove(band);
                overlay.remove_all(&mut shades);
                Some(origin)
            }
        }
    }
}

impl Tool for CropTool {
    fn name(&self) -> &'static str {
        "Crop"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Crop
    }

    fn activate(&mut self) {
        self.state = CropState::Idle;
    }

    /// An unfinished selection is never applied
    fn deactivate(&mut self, ctx: &mut ToolContext<'_>) -> Option<Command> {
        self.clear(ctx.overlay);
        None
    }

    fn cancel(&mut self, overlay: &mut Overlay) {
        self.clear(overlay);
    }

    fn is_busy(&self) -> bool {
        self.state != CropState::Idle
    }

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        self.clear(ctx.overlay);
        let full = Self::canvas_rect(ctx);
        let shades = vec![ctx.overlay.insert(OverlayItem::Shade(full))];
        let band = ctx
            .overlay
            .insert(OverlayItem::CropBand(Rect::from_min_max(pos, pos)));
        self.state = CropState::Selecting {
            origin: pos,
            band,
            shades,
        };
        None
    }

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        let full = Self::canvas_rect(ctx);
        let CropState::Selecting {
            origin,
            band,
            shades,
        } = &mut self.state
        else {
            return None;
        };
        let selection = normalized_rect(*origin, pos);
        if let Some(OverlayItem::CropBand(rect)) = ctx.overlay.get_mut(*band) {
            *rect = selection;
        }
        ctx.overlay.remove_all(shades);
        for quadrant in shade_quadrants(full, selection) {
            if quadrant.is_positive() {
                shades.push(ctx.overlay.insert(OverlayItem::Shade(quadrant)));
            }
        }
        None
    }

    fn on_pointer_up(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        let origin = self.clear(ctx.overlay)?;
        let selection = normalized_rect(origin, pos);
        match PixelRect::from_rect_clamped(selection, ctx.canvas.width(), ctx.canvas.height()) {
            Some(rect) => Some(Command::Crop { rect }),
            None => {
                log::debug!("Empty crop selection, cancelled");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::Harness;
    use egui::pos2;

    #[test]
    fn test_shade_surrounds_selection() {
        let canvas = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 80.0));
        let selection = Rect::from_min_max(pos2(10.0, 20.0), pos2(60.0, 50.0));
        let area: f32 = shade_quadrants(canvas, selection)
            .iter()
            .map(|r| r.area())
            .sum();
        assert_eq!(area, 100.0 * 80.0 - 50.0 * 30.0);
    }

    #[test]
    fn test_drag_produces_clamped_crop() {
        let mut h = Harness::new(1000, 800);
        let mut tool = CropTool::new();
        tool.on_pointer_down(pos2(500.0, 400.0), &mut h.ctx());
        tool.on_pointer_move(pos2(300.0, 200.0), &mut h.ctx());
        assert_eq!(
            h.overlay
                .iter()
                .filter(|i| matches!(i, OverlayItem::Shade(_)))
                .count(),
            4
        );
        let command = tool.on_pointer_up(pos2(100.0, 100.0), &mut h.ctx());
        assert_eq!(
            command,
            Some(Command::Crop {
                rect: PixelRect { x: 100, y: 100, width: 400, height: 300 }
            })
        );
        assert!(h.overlay.is_empty());
    }

    #[test]
    fn test_empty_selection_cancels() {
        let mut h = Harness::new(100, 100);
        let mut tool = CropTool::new();
        tool.on_pointer_down(pos2(50.0, 50.0), &mut h.ctx());
        assert_eq!(tool.on_pointer_up(pos2(50.0, 90.0), &mut h.ctx()), None);
        assert!(h.overlay.is_empty());
        assert!(!tool.is_busy());
    }

    #[test]
    fn test_selection_past_edges_is_clamped() {
        let mut h = Harness::new(100, 100);
        let mut tool = CropTool::new();
        tool.on_pointer_down(pos2(-20.0, 50.0), &mut h.ctx());
        let command = tool.on_pointer_up(pos2(150.0, 120.0), &mut h.ctx());
        assert_eq!(
            command,
            Some(Command::Crop {
                rect: PixelRect { x: 0, y: 50, width: 100, height: 50 }
            })
        );
    }
}
