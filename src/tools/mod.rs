//! Tool state machines. Exactly one tool is active at a time; each one turns pointer
//! input into overlay previews and canvas edits, and reports what should be recorded
//! in the undo history as a [`Command`].

use egui::Pos2;
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::config::EditorConfig;
use crate::geometry::ViewMetrics;
use crate::overlay::Overlay;
use crate::raster::{Canvas, FontBook};
use crate::shape::ShapeKind;

mod crop_tool;
mod eraser;
mod highlighter;
mod pencil;
mod settings;
mod shape_tool;
mod text_tool;

pub use crop_tool::{CropState, CropTool};
pub use eraser::EraserTool;
pub use highlighter::HighlighterTool;
pub use pencil::PencilTool;
pub use settings::ToolSettings;
pub use shape_tool::{ShapeState, ShapeTool};
pub use text_tool::{TextEdit, TextState, TextTool};

/// Everything a tool may touch while handling input
pub struct ToolContext<'a> {
    /// Working bitmap of the selected image
    pub canvas: &'a mut Canvas,
    pub overlay: &'a mut Overlay,
    pub settings: &'a ToolSettings,
    pub metrics: ViewMetrics,
    pub fonts: &'a FontBook,
    pub config: &'a EditorConfig,
}

/// Tool trait defines the interface for all annotation tools
pub trait Tool {
    fn name(&self) -> &'static str;

    fn kind(&self) -> ToolKind;

    /// Called when the tool becomes active. Resets any leftover state.
    fn activate(&mut self) {}

    /// Flush in-progress work: finalize what has content, discard what is empty, and
    /// remove every overlay item the tool owns.
    fn deactivate(&mut self, ctx: &mut ToolContext<'_>) -> Option<Command>;

    /// Drop in-progress work without touching the canvas. Used when the image under the
    /// tool goes away.
    fn cancel(&mut self, overlay: &mut Overlay);

    /// Whether the tool holds work that `deactivate` would commit or discard
    fn is_busy(&self) -> bool;

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command>;

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command>;

    fn on_pointer_up(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command>;

    /// Rebuild view-dependent overlay items, e.g. after a zoom change.
    fn refresh_overlay(&mut self, _ctx: &mut ToolContext<'_>) {}
}

/// Tag of each tool, used for activation and notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Crop,
    Pencil,
    Eraser,
    Highlighter,
    Rectangle,
    Ellipse,
    Line,
    Arrow,
    Text,
}

impl ToolKind {
    pub const ALL: [ToolKind; 9] = [
        ToolKind::Crop,
        ToolKind::Pencil,
        ToolKind::Eraser,
        ToolKind::Highlighter,
        ToolKind::Rectangle,
        ToolKind::Ellipse,
        ToolKind::Line,
        ToolKind::Arrow,
        ToolKind::Text,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Crop => "Crop",
            Self::Pencil => "Pencil",
            Self::Eraser => "Eraser",
            Self::Highlighter => "Highlighter",
            Self::Rectangle => "Rectangle",
            Self::Ellipse => "Ellipse",
            Self::Line => "Line",
            Self::Arrow => "Arrow",
            Self::Text => "Text",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Crop => "✂",
            Self::Pencil => "✏",
            Self::Eraser => "⌫",
            Self::Highlighter => "🖍",
            Self::Rectangle => "⬜",
            Self::Ellipse => "⭕",
            Self::Line => "╱",
            Self::Arrow => "➡",
            Self::Text => "T",
        }
    }

    /// Shape drawn by the shape tools
    pub fn shape_kind(&self) -> Option<ShapeKind> {
        match self {
            Self::Rectangle => Some(ShapeKind::Rectangle),
            Self::Ellipse => Some(ShapeKind::Ellipse),
            Self::Line => Some(ShapeKind::Line),
            Self::Arrow => Some(ShapeKind::Arrow),
            _ => None,
        }
    }
}

/// Enum representing all available tools
#[derive(Debug, Clone)]
pub enum ToolType {
    Crop(CropTool),
    Pencil(PencilTool),
    Eraser(EraserTool),
    Highlighter(HighlighterTool),
    Shape(ShapeTool),
    Text(TextTool),
}

impl ToolType {
    pub fn new(kind: ToolKind) -> Self {
        match kind {
            ToolKind::Crop => Self::Crop(CropTool::new()),
            ToolKind::Pencil => Self::Pencil(PencilTool::new()),
            ToolKind::Eraser => Self::Eraser(EraserTool::new()),
            ToolKind::Highlighter => Self::Highlighter(HighlighterTool::new()),
            ToolKind::Text => Self::Text(TextTool::new()),
            ToolKind::Rectangle | ToolKind::Ellipse | ToolKind::Line | ToolKind::Arrow => {
                Self::Shape(ShapeTool::new(kind))
            }
        }
    }

    pub fn as_text_tool_mut(&mut self) -> Option<&mut TextTool> {
        match self {
            Self::Text(tool) => Some(tool),
            _ => None,
        }
    }
}

impl Tool for ToolType {
    fn name(&self) -> &'static str {
        match self {
            Self::Crop(tool) => tool.name(),
            Self::Pencil(tool) => tool.name(),
            Self::Eraser(tool) => tool.name(),
            Self::Highlighter(tool) => tool.name(),
            Self::Shape(tool) => tool.name(),
            Self::Text(tool) => tool.name(),
        }
    }

    fn kind(&self) -> ToolKind {
        match self {
            Self::Crop(tool) => tool.kind(),
            Self::Pencil(tool) => tool.kind(),
            Self::Eraser(tool) => tool.kind(),
            Self::Highlighter(tool) => tool.kind(),
            Self::Shape(tool) => tool.kind(),
            Self::Text(tool) => tool.kind(),
        }
    }

    fn activate(&mut self) {
        match self {
            Self::Crop(tool) => tool.activate(),
            Self::Pencil(tool) => tool.activate(),
            Self::Eraser(tool) => tool.activate(),
            Self::Highlighter(tool) => tool.activate(),
            Self::Shape(tool) => tool.activate(),
            Self::Text(tool) => tool.activate(),
        }
    }

    fn deactivate(&mut self, ctx: &mut ToolContext<'_>) -> Option<Command> {
        match self {
            Self::Crop(tool) => tool.deactivate(ctx),
            Self::Pencil(tool) => tool.deactivate(ctx),
            Self::Eraser(tool) => tool.deactivate(ctx),
            Self::Highlighter(tool) => tool.deactivate(ctx),
            Self::Shape(tool) => tool.deactivate(ctx),
            Self::Text(tool) => tool.deactivate(ctx),
        }
    }

    fn cancel(&mut self, overlay: &mut Overlay) {
        match self {
            Self::Crop(tool) => tool.cancel(overlay),
            Self::Pencil(tool) => tool.cancel(overlay),
            Self::Eraser(tool) => tool.cancel(overlay),
            Self::Highlighter(tool) => tool.cancel(overlay),
            Self::Shape(tool) => tool.cancel(overlay),
            Self::Text(tool) => tool.cancel(overlay),
        }
    }

    fn is_busy(&self) -> bool {
        match self {
            Self::Crop(tool) => tool.is_busy(),
            Self::Pencil(tool) => tool.is_busy(),
            Self::Eraser(tool) => tool.is_busy(),
            Self::Highlighter(tool) => tool.is_busy(),
            Self::Shape(tool) => tool.is_busy(),
            Self::Text(tool) => tool.is_busy(),
        }
    }

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        match self {
            Self::Crop(tool) => tool.on_pointer_down(pos, ctx),
            Self::Pencil(tool) => tool.on_pointer_down(pos, ctx),
            Self::Eraser(tool) => tool.on_pointer_down(pos, ctx),
            Self::Highlighter(tool) => tool.on_pointer_down(pos, ctx),
            Self::Shape(tool) => tool.on_pointer_down(pos, ctx),
            Self::Text(tool) => tool.on_pointer_down(pos, ctx),
        }
    }

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        match self {
            Self::Crop(tool) => tool.on_pointer_move(pos, ctx),
            Self::Pencil(tool) => tool.on_pointer_move(pos, ctx),
            Self::Eraser(tool) => tool.on_pointer_move(pos, ctx),
            Self::Highlighter(tool) => tool.on_pointer_move(pos, ctx),
            Self::Shape(tool) => tool.on_pointer_move(pos, ctx),
            Self::Text(tool) => tool.on_pointer_move(pos, ctx),
        }
    }

    fn on_pointer_up(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> Option<Command> {
        match self {
            Self::Crop(tool) => tool.on_pointer_up(pos, ctx),
            Self::Pencil(tool) => tool.on_pointer_up(pos, ctx),
            Self::Eraser(tool) => tool.on_pointer_up(pos, ctx),
            Self::Highlighter(tool) => tool.on_pointer_up(pos, ctx),
            Self::Shape(tool) => tool.on_pointer_up(pos, ctx),
            Self::Text(tool) => tool.on_pointer_up(pos, ctx),
        }
    }

    fn refresh_overlay(&mut self, ctx: &mut ToolContext<'_>) {
        match self {
            Self::Shape(tool) => tool.refresh_overlay(ctx),
            Self::Text(tool) => tool.refresh_overlay(ctx),
            _ => {}
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use image::{Rgba, RgbaImage};

    /// Owned pieces a `ToolContext` borrows from
    pub struct Harness {
        pub canvas: Canvas,
        pub overlay: Overlay,
        pub settings: ToolSettings,
        pub metrics: ViewMetrics,
        pub fonts: FontBook,
        pub config: EditorConfig,
    }

    impl Harness {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                canvas: RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])),
                overlay: Overlay::new(),
                settings: ToolSettings::default(),
                metrics: ViewMetrics::default(),
                fonts: FontBook::new(),
                config: EditorConfig::default(),
            }
        }

        pub fn ctx(&mut self) -> ToolContext<'_> {
            ToolContext {
                canvas: &mut self.canvas,
                overlay: &mut self.overlay,
                settings: &self.settings,
                metrics: self.metrics,
                fonts: &self.fonts,
                config: &self.config,
            }
        }
    }
}
