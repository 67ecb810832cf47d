use egui::{Color32, Pos2};

use super::{Tool, ToolContext, ToolKind};
use crate::command::Command;
use crate::overlay::Overlay;
use crate::raster::shapes::draw_shape;
use crate::raster::Canvas;
use crate::shape::{LineCap, LineJoin, Shape, StrokeStyle};

#[derive(Debug, Clone)]
struct Stroke {
    /// Canvas as it was before the stroke started
    base: Canvas,
    path: Shape,
    last: Pos2,
}

/// Translucent marker. The whole path is redrawn over the untouched base on every move
/// so the stroke never darkens where it overlaps itself.
#[derive(Debug, Clone, Default)]
pub struct HighlighterTool {
    stroke: Option<Stroke>,
}

impl HighlighterTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn style(ctx: &ToolContext<'_>) -> StrokeStyle {
        let [r, g, b, _] = ctx.settings.highlighter_color.to_srgba_unmultiplied();
        let alpha = (ctx.config.highlighter_opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        StrokeStyle {
            color: Color32::from_rgba_unmultiplied(r, g, b, alpha),
            width: ctx.settings.highlighter_width * ctx.metrics.stroke_scale,
            cap: LineCap::Flat,
            join: LineJoin::Round,
        }
    }

    fn finish(&mut self, ctx: &mut ToolContext<'_>) -> Option<Command> {
        let stroke = self.stroke.take()?;
        if !stroke.path.is_empty() {
            Some(Command::PushState)
        } else {
            *ctx.canvas = stroke.base;
            None
        }
    }
}

impl Tool for HighlighterTool {
    fn name(&self) -> &'static str {
        "Highlighter"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Highlighter
    }

    fn activate(&mut self) {
        self.stroke = None;
    }

    fn deactivate(&mut self, ctx: &mut ToolContext<'_>) -> Option<Command> {
        self.finish(ctx)
    }

    fn cancel(&mut self, _overlay: &mut Overlay) {
        self.stroke = None;
    }

    fn is_busy(&self) -> bool {
        self.stroke.is_some()
    }

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        self.stroke = Some(Stroke {
            base: ctx.canvas.clone(),
            path: Shape::freehand(vec![pos], Self::style(ctx)),
            last: pos,
        });
        None
    }

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        let stroke = self.stroke.as_mut()?;
        if stroke.last == pos {
            return None;
        }
        stroke.path.push_point(pos);
        stroke.last = pos;
        ctx.canvas.clone_from(&stroke.base);
        draw_shape(ctx.canvas, &stroke.path, ctx.fonts);
        None
    }

    fn on_pointer_up(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        self.on_pointer_move(pos, ctx);
        self.finish(ctx)
    }
}
