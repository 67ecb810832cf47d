use egui::{vec2, Pos2, Vec2};

use super::{Tool, ToolContext, ToolKind};
use crate::command::Command;
use crate::overlay::{Overlay, OverlayId, OverlayItem};
use crate::raster::{draw_shape, FontBook, TextLayout};
use crate::shape::{FontSpec, Shape};

/// Gap between the format bar and the top of the text box, in screen pixels
const FORMAT_BAR_OFFSET: f32 = 36.0;

/// Keyboard and toolbar edits applied to the text being typed
#[derive(Debug, Clone, PartialEq)]
pub enum TextEdit {
    Insert(String),
    Backspace,
    Newline,
    /// Replace the font of the whole box
    Format(FontSpec),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextState {
    Idle,
    Editing { id: OverlayId, bar: OverlayId },
}

#[derive(Debug, Clone)]
pub struct TextTool {
    state: TextState,
    /// Wrap width of the box being edited
    box_width: f32,
}

impl Default for TextTool {
    fn default() -> Self {
        Self::new()
    }
}

impl TextTool {
    pub fn new() -> Self {
        Self {
            state: TextState::Idle,
            box_width: 0.0,
        }
    }

    pub fn state(&self) -> TextState {
        self.state
    }

    pub fn editing_id(&self) -> Option<OverlayId> {
        match self.state {
            TextState::Editing { id, .. } => Some(id),
            TextState::Idle => None,
        }
    }

    /// Apply an edit to the box being typed. Edits with no box are ignored.
    pub fn edit(&mut self, edit: TextEdit, ctx: &mut ToolContext<'_>) {
        let TextState::Editing { id, bar } = self.state else {
            log::debug!("Text edit {:?} with no active text box", edit);
            return;
        };
        let fonts = ctx.fonts;
        let Some(shape) = ctx.overlay.shape_mut(id) else {
            ctx.overlay.remove(bar);
            self.state = TextState::Idle;
            return;
        };
        match edit {
            TextEdit::Insert(text) => shape.push_text(&text),
            TextEdit::Newline => shape.push_text("\n"),
            TextEdit::Backspace => {
                shape.pop_char();
            }
            TextEdit::Format(font) => shape.set_font(font),
        }
        relayout(shape, self.box_width, fonts);
    }

    fn bar_anchor(anchor: Pos2, ctx: &ToolContext<'_>) -> Pos2 {
        anchor - vec2(0.0, FORMAT_BAR_OFFSET / ctx.metrics.view_scale)
    }

    fn finalize(&mut self, ctx: &mut ToolContext<'_>) -> Option<Command> {
        let TextState::Editing { id, bar } = std::mem::replace(&mut self.state, TextState::Idle)
        else {
            return None;
        };
        ctx.overlay.remove(bar);
        let shape = ctx.overlay.take_shape(id)?;
        if shape.is_empty() {
            log::debug!("Discarding empty text box");
            return None;
        }
        draw_shape(ctx.canvas, &shape, ctx.fonts);
        Some(Command::PushState)
    }
}

/// Re-measure the box after its text or font changed
fn relayout(shape: &mut Shape, box_width: f32, fonts: &FontBook) {
    let (Some(font), Some(content)) = (shape.font(), shape.text_content()) else {
        return;
    };
    let layout = TextLayout::new(fonts, font, content, box_width);
    let height = layout.size.y.max(layout.line_height);
    shape.set_text_size(Vec2::new(layout.size.x, height));
}

impl Tool for TextTool {
    fn name(&self) -> &'static str {
        "Text"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn activate(&mut self) {
        self.state = TextState::Idle;
    }

    fn deactivate(&mut self, ctx: &mut ToolContext<'_>) -> Option<Command> {
        self.finalize(ctx)
    }

    fn cancel(&mut self, overlay: &mut Overlay) {
        if let TextState::Editing { id, bar } = std::mem::replace(&mut self.state, TextState::Idle)
        {
            overlay.remove(id);
            overlay.remove(bar);
        }
    }

    fn is_busy(&self) -> bool {
        self.state != TextState::Idle
    }

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        match self.state {
            TextState::Idle => {
                let defaults = &ctx.settings.font;
                let font = FontSpec {
                    size: defaults.size * ctx.metrics.text_scale,
                    ..defaults.clone()
                };
                self.box_width = ctx.config.text_box_width * ctx.metrics.text_scale;
                let mut shape = Shape::text(pos, font, Vec2::new(self.box_width, 0.0));
                relayout(&mut shape, self.box_width, ctx.fonts);

                let id = ctx.overlay.insert(OverlayItem::Shape(shape));
                let bar = ctx.overlay.insert(OverlayItem::FormatBar {
                    anchor: Self::bar_anchor(pos, ctx),
                });
                self.state = TextState::Editing { id, bar };
                None
            }
            TextState::Editing { id, .. } => {
                let inside = ctx
                    .overlay
                    .shape(id)
                    .is_some_and(|shape| shape.bounds().contains(pos));
                if inside {
                    None
                } else {
                    self.finalize(ctx)
                }
            }
        }
    }

    fn on_pointer_move(&mut self, _pos: Pos2, _ctx: &mut ToolContext<'_>) -> Option<Command> {
        None
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _ctx: &mut ToolContext<'_>) -> Option<Command> {
        None
    }

    fn refresh_overlay(&mut self, ctx: &mut ToolContext<'_>) {
        let TextState::Editing { id, bar } = self.state else {
            return;
        };
        let Some(anchor) = ctx.overlay.shape(id).map(|s| s.bounds().min) else {
            return;
        };
        let bar_anchor = Self::bar_anchor(anchor, ctx);
        if let Some(OverlayItem::FormatBar { anchor }) = ctx.overlay.get_mut(bar) {
            *anchor = bar_anchor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::Harness;
    use egui::{pos2, Color32};

    #[test]
    fn test_typed_text_commits_on_click_outside() {
        let mut h = Harness::new(400, 200);
        h.settings.font.color = Color32::BLACK;
        let mut tool = TextTool::new();
        assert_eq!(tool.on_pointer_down(pos2(10.0, 10.0), &mut h.ctx()), None);
        assert_eq!(h.overlay.len(), 2);

        tool.edit(TextEdit::Insert("Hello".into()), &mut h.ctx());
        // Inside the box keeps editing
        assert_eq!(tool.on_pointer_down(pos2(20.0, 20.0), &mut h.ctx()), None);
        assert!(tool.is_busy());

        let command = tool.on_pointer_down(pos2(390.0, 190.0), &mut h.ctx());
        assert_eq!(command, Some(Command::PushState));
        assert!(h.overlay.is_empty());
        assert!(h.canvas.pixels().any(|p| p.0[0] < 128));
    }

    #[test]
    fn test_whitespace_text_is_discarded() {
        let mut h = Harness::new(400, 200);
        let mut tool = TextTool::new();
        tool.on_pointer_down(pos2(10.0, 10.0), &mut h.ctx());
        tool.edit(TextEdit::Insert("   ".into()), &mut h.ctx());
        tool.edit(TextEdit::Newline, &mut h.ctx());
        assert_eq!(tool.deactivate(&mut h.ctx()), None);
        assert!(h.overlay.is_empty());
        assert!(h.canvas.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_backspace_and_format() {
        let mut h = Harness::new(400, 200);
        let mut tool = TextTool::new();
        tool.on_pointer_down(pos2(10.0, 10.0), &mut h.ctx());
        tool.edit(TextEdit::Insert("abc".into()), &mut h.ctx());
        tool.edit(TextEdit::Backspace, &mut h.ctx());
        let bold = FontSpec {
            bold: true,
            size: 40.0,
            ..FontSpec::default()
        };
        tool.edit(TextEdit::Format(bold.clone()), &mut h.ctx());

        let shape = h.overlay.shape(tool.editing_id().unwrap()).unwrap();
        assert_eq!(shape.text_content(), Some("ab"));
        assert_eq!(shape.font(), Some(&bold));
        assert!(shape.bounds().height() >= 40.0);
    }
}
