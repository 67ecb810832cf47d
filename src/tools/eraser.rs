use egui::Pos2;

use super::{Tool, ToolContext, ToolKind};
use crate::command::Command;
use crate::overlay::Overlay;
use crate::raster::brush::{erase_stamps, interpolate_stamps};

/// Stamps along the pointer path, either clearing pixels or painting a solid color.
#[derive(Debug, Clone, Default)]
pub struct EraserTool {
    last: Option<Pos2>,
}

impl EraserTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn stamp(positions: &[Pos2], ctx: &mut ToolContext<'_>) {
        let size = ctx.settings.eraser_size * ctx.metrics.stroke_scale;
        erase_stamps(
            ctx.canvas,
            positions,
            size,
            ctx.settings.eraser_shape,
            ctx.settings.eraser_mode,
        );
    }
}

impl Tool for EraserTool {
    fn name(&self) -> &'static str {
        "Eraser"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Eraser
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
        Self::stamp(&[pos], ctx);
        self.last = Some(pos);
        Some(Command::PushState)
    }

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        let last = self.last?;
        let stamps = interpolate_stamps(last, pos, ctx.config.eraser_spacing);
        Self::stamp(&stamps, ctx);
        self.last = Some(pos);
        None
    }

    fn on_pointer_up(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        self.on_pointer_move(pos, ctx);
        self.last.take().map(|_| Command::AmendState)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{EraserMode, StampShape};
    use crate::tools::test_support::Harness;
    use egui::pos2;

    #[test]
    fn test_erases_along_path_without_gaps() {
        let mut h = Harness::new(100, 20);
        h.settings.eraser_size = 4.0;
        h.settings.eraser_shape = StampShape::Square;
        h.settings.eraser_mode = EraserMode::Transparent;
        let mut tool = EraserTool::new();
        tool.on_pointer_down(pos2(10.0, 10.0), &mut h.ctx());
        tool.on_pointer_move(pos2(90.0, 10.0), &mut h.ctx());
        assert_eq!(tool.on_pointer_up(pos2(90.0, 10.0), &mut h.ctx()), Some(Command::AmendState));
        for x in 10..90 {
            assert_eq!(h.canvas.get_pixel(x, 10).0[3], 0, "gap at x={x}");
        }
        assert_eq!(h.canvas.get_pixel(50, 2).0[3], 255);
    }
}
