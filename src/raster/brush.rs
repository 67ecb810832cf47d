use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};
use tiny_skia::{BlendMode, FillRule, PathBuilder, Stroke, Transform};

use super::{paint_for, with_pixmap, Canvas};

/// What the eraser leaves behind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EraserMode {
    /// Clear pixels to full transparency
    Transparent,
    /// Paint over with a solid color
    Color(Color32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StampShape {
    Square,
    Round,
}

/// Draw one pencil segment with round caps.
pub fn draw_segment(canvas: &mut Canvas, from: Pos2, to: Pos2, color: Color32, width: f32) {
    let mut pb = PathBuilder::new();
    pb.move_to(from.x, from.y);
    pb.line_to(to.x, to.y);
    let Some(path) = pb.finish() else {
        return;
    };

    let stroke = Stroke {
        width,
        line_cap: tiny_skia::LineCap::Round,
        line_join: tiny_skia::LineJoin::Round,
        ..Default::default()
    };
    let paint = paint_for(color);
    with_pixmap(canvas, |pixmap| {
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    });
}

/// Positions to stamp when the pointer travels from `from` to `to`, never more than
/// `spacing` apart. `from` itself is excluded since it was stamped by the previous step.
pub fn interpolate_stamps(from: Pos2, to: Pos2, spacing: f32) -> Vec<Pos2> {
    let distance = from.distance(to);
    let spacing = spacing.max(0.1);
    let steps = ((distance / spacing).ceil() as usize).max(1);
    (1..=steps)
        .map(|i| from.lerp(to, i as f32 / steps as f32))
        .collect()
}

/// Stamp the eraser at every position in one pass.
pub fn erase_stamps(
    canvas: &mut Canvas,
    positions: &[Pos2],
    size: f32,
    shape: StampShape,
    mode: EraserMode,
) {
    if positions.is_empty() {
        return;
    }

    let mut paint = match mode {
        EraserMode::Transparent => {
            let mut paint = paint_for(Color32::BLACK);
            paint.blend_mode = BlendMode::Clear;
            paint
        }
        EraserMode::Color(color) => {
            let mut paint = paint_for(color);
            paint.blend_mode = BlendMode::Source;
            paint
        }
    };
    // Square stamps are pixel-exact
    paint.anti_alias = shape == StampShape::Round;

    let half = size / 2.0;
    with_pixmap(canvas, |pixmap| {
        for pos in positions {
            match shape {
                StampShape::Square => {
                    if let Some(rect) =
                        tiny_skia::Rect::from_xywh(pos.x - half, pos.y - half, size, size)
                    {
                        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
                    }
                }
                StampShape::Round => {
                    if let Some(path) = PathBuilder::from_circle(pos.x, pos.y, half) {
                        pixmap.fill_path(
                            &path,
                            &paint,
                            FillRule::Winding,
                            Transform::identity(),
                            None,
                        );
                    }
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_interpolation_has_no_gaps() {
        let stamps = interpolate_stamps(pos2(0.0, 0.0), pos2(10.0, 0.0), 2.0);
        assert_eq!(stamps.len(), 5);
        assert_eq!(*stamps.last().unwrap(), pos2(10.0, 0.0));
        let mut prev = pos2(0.0, 0.0);
        for p in stamps {
            assert!(prev.distance(p) <= 2.0 + 1e-4);
            prev = p;
        }
    }

    #[test]
    fn test_zero_travel_stamps_once() {
        assert_eq!(interpolate_stamps(pos2(3.0, 3.0), pos2(3.0, 3.0), 2.0).len(), 1);
    }

    #[test]
    fn test_transparent_eraser_clears_alpha() {
        let mut canvas = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        erase_stamps(
            &mut canvas,
            &[pos2(10.0, 10.0)],
            6.0,
            StampShape::Square,
            EraserMode::Transparent,
        );
        assert_eq!(canvas.get_pixel(10, 10).0[3], 0);
        assert_eq!(canvas.get_pixel(1, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_color_eraser_paints_solid() {
        let mut canvas = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        erase_stamps(
            &mut canvas,
            &[pos2(10.0, 10.0)],
            6.0,
            StampShape::Round,
            EraserMode::Color(Color32::from_rgb(0, 0, 255)),
        );
        assert_eq!(canvas.get_pixel(10, 10).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_segment_marks_pixels() {
        let mut canvas = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        draw_segment(&mut canvas, pos2(2.0, 10.0), pos2(18.0, 10.0), Color32::BLACK, 3.0);
        assert_eq!(canvas.get_pixel(10, 10).0, [0, 0, 0, 255]);
    }
}
