use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use crate::raster::Canvas;

/// Output size presets, by maximum width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResizePreset {
    #[default]
    Original,
    Small,
    Medium,
    Large,
}

impl ResizePreset {
    pub const ALL: [ResizePreset; 4] = [
        ResizePreset::Original,
        ResizePreset::Small,
        ResizePreset::Medium,
        ResizePreset::Large,
    ];

    /// Widest allowed output, `None` for no limit
    pub fn max_width(&self) -> Option<u32> {
        match self {
            Self::Original => None,
            Self::Small => Some(800),
            Self::Medium => Some(1200),
            Self::Large => Some(1600),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Small => "Small (800px)",
            Self::Medium => "Medium (1200px)",
            Self::Large => "Large (1600px)",
        }
    }
}

/// Fit `width` into the preset keeping the aspect ratio. Images that already fit are
/// never enlarged.
pub fn compute_target_dimensions(width: u32, height: u32, preset: ResizePreset) -> (u32, u32) {
    match preset.max_width() {
        Some(max) if width > max => {
            let height = (height as u64 * max as u64 / width as u64) as u32;
            (max, height.max(1))
        }
        _ => (width, height),
    }
}

/// Lanczos3 resample to the preset, or a plain copy if the size doesn't change.
pub fn resize_single(canvas: &Canvas, preset: ResizePreset) -> Canvas {
    let (width, height) = compute_target_dimensions(canvas.width(), canvas.height(), preset);
    if (width, height) == canvas.dimensions() {
        return canvas.clone();
    }
    log::debug!(
        "Resizing {}x{} to {}x{} ({:?})",
        canvas.width(),
        canvas.height(),
        width,
        height,
        preset
    );
    imageops::resize(canvas, width, height, FilterType::Lanczos3)
}
