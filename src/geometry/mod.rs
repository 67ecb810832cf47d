//! Pure geometry helpers shared by the shape model, the tools and the rasterizer.

pub mod arrow;
pub mod hit_testing;
pub mod scaling;

pub use arrow::arrowhead_points;
pub use hit_testing::{calculate_bounds, distance_to_line_segment, handle_rect, hit_handle};
pub use scaling::ViewMetrics;

use egui::{Pos2, Rect};

/// Normalize two arbitrary corner points into a rectangle with positive extent
pub fn normalized_rect(a: Pos2, b: Pos2) -> Rect {
    Rect::from_two_pos(a, b)
}

/// Integer pixel rectangle inside a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Round a canvas-space rectangle to whole pixels and clamp it to a `width`×`height`
    /// canvas. Returns `None` if nothing of it remains.
    pub fn from_rect_clamped(rect: Rect, width: u32, height: u32) -> Option<Self> {
        let min_x = rect.min.x.round().clamp(0.0, width as f32) as u32;
        let min_y = rect.min.y.round().clamp(0.0, height as f32) as u32;
        let max_x = rect.max.x.round().clamp(0.0, width as f32) as u32;
        let max_y = rect.max.y.round().clamp(0.0, height as f32) as u32;
        if max_x <= min_x || max_y <= min_y {
            return None;
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_normalized_rect_handles_negative_spans() {
        let rect = normalized_rect(pos2(50.0, 40.0), pos2(10.0, 5.0));
        assert_eq!(rect.min, pos2(10.0, 5.0));
        assert_eq!(rect.max, pos2(50.0, 40.0));
    }

    #[test]
    fn test_pixel_rect_clamps_to_canvas() {
        let rect = Rect::from_min_max(pos2(-20.0, 10.4), pos2(120.0, 60.6));
        let px = PixelRect::from_rect_clamped(rect, 100, 50).unwrap();
        assert_eq!(px, PixelRect { x: 0, y: 10, width: 100, height: 40 });
    }

    #[test]
    fn test_pixel_rect_outside_canvas_is_none() {
        let rect = Rect::from_min_max(pos2(200.0, 10.0), pos2(300.0, 60.0));
        assert!(PixelRect::from_rect_clamped(rect, 100, 50).is_none());
    }
}
