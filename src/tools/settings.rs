use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::raster::{EraserMode, StampShape};
use crate::shape::FontSpec;

/// User-adjustable tool options. Widths are nominal and get multiplied by the view's
/// stroke scale when used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub pencil_color: Color32,
    pub pencil_width: f32,
    pub eraser_size: f32,
    pub eraser_mode: EraserMode,
    pub eraser_shape: StampShape,
    pub highlighter_color: Color32,
    pub highlighter_width: f32,
    pub shape_color: Color32,
    pub shape_width: f32,
    /// Defaults for new text boxes; the size is scaled by the view's text scale
    pub font: FontSpec,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            pencil_color: Color32::RED,
            pencil_width: 3.0,
            eraser_size: 20.0,
            eraser_mode: EraserMode::Transparent,
            eraser_shape: StampShape::Round,
            highlighter_color: Color32::YELLOW,
            highlighter_width: 20.0,
            shape_color: Color32::RED,
            shape_width: 4.0,
            font: FontSpec::default(),
        }
    }
}
