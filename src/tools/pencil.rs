use egui::Pos2;

use super::{Tool, ToolContext, ToolKind};
use crate::command::Command;
use crate::overlay::Overlay;
use crate::raster::brush::draw_segment;

/// Freehand drawing straight into the canvas.
///
/// The undo entry is pushed when the stroke starts and amended once it is finished.
#[derive(Debug, Clone, Default)]
pub struct PencilTool {
    last: Option<Pos2>,
}

impl PencilTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn width(ctx: &ToolContext<'_>) -> f32 {
        ctx.settings.pencil_width * ctx.metrics.stroke_scale
    }
}

impl Tool for PencilTool {
    fn name(&self) -> &'static str {
        "Pencil"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Pencil
    }

    fn activate(&mut self) {
        self.last = None;
    }

    fn deactivate(&mut self, _ctx: &mut ToolContext<'_>) -> Option<Command> {
        self.last.take().map(|_| Command::AmendState)
    }

    fn cancel(&mut self, _overlay: &mut Overlay) {
        self.last = None;
    }

    fn is_busy(&self) -> bool {
        self.last.is_some()
    }

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        draw_segment(ctx.canvas, pos, pos, ctx.settings.pencil_color, Self::width(ctx));
        self.last = Some(pos);
        Some(Command::PushState)
    }

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        let last = self.last?;
        draw_segment(ctx.canvas, last, pos, ctx.settings.pencil_color, Self::width(ctx));
        self.last = Some(pos);
        None
    }

    fn on_pointer_up(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        self.on_pointer_move(pos, ctx);
        self.last.take().map(|_| Command::AmendState)
    }
}
