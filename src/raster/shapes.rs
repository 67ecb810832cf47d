use egui::Pos2;
use tiny_skia::{Path, PathBuilder, Stroke, Transform};

use super::text::{draw_text, TextLayout};
use super::{paint_for, with_pixmap, Canvas, FontBook};
use crate::shape::{LineCap, LineJoin, Shape, ShapeGeometry, StrokeStyle};

fn to_skia_stroke(style: &StrokeStyle) -> Stroke {
    Stroke {
        width: style.width.max(0.1),
        line_cap: match style.cap {
            LineCap::Round => tiny_skia::LineCap::Round,
            LineCap::Flat => tiny_skia::LineCap::Butt,
            LineCap::Square => tiny_skia::LineCap::Square,
        },
        line_join: match style.join {
            LineJoin::Round => tiny_skia::LineJoin::Round,
            LineJoin::Miter => tiny_skia::LineJoin::Miter,
        },
        ..Default::default()
    }
}

fn polyline(points: &[Pos2]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.finish()
}

fn stroke(canvas: &mut Canvas, path: &Path, style: &StrokeStyle) {
    let paint = paint_for(style.color);
    let stroke = to_skia_stroke(style);
    with_pixmap(canvas, |pixmap| {
        pixmap.stroke_path(path, &paint, &stroke, Transform::identity(), None);
    });
}

/// Stroke a connected path in one pass, so overlapping parts of a translucent stroke
/// don't darken each other.
pub fn stroke_polyline(canvas: &mut Canvas, points: &[Pos2], style: &StrokeStyle) {
    if let Some(path) = polyline(points) {
        stroke(canvas, &path, style);
    }
}

/// Rasterize a finished shape into the canvas.
pub fn draw_shape(canvas: &mut Canvas, shape: &Shape, fonts: &FontBook) {
    let style = shape.style();
    match shape.geometry() {
        ShapeGeometry::Box { a, b } => {
            let rect = egui::Rect::from_two_pos(*a, *b);
            let Some(bounds) =
                tiny_skia::Rect::from_ltrb(rect.min.x, rect.min.y, rect.max.x, rect.max.y)
            else {
                return;
            };
            let path = match shape.kind() {
                crate::shape::ShapeKind::Ellipse => PathBuilder::from_oval(bounds),
                _ => Some(PathBuilder::from_rect(bounds)),
            };
            if let Some(path) = path {
                stroke(canvas, &path, style);
            }
        }
        ShapeGeometry::Segment { start, end } => {
            let mut pb = PathBuilder::new();
            pb.move_to(start.x, start.y);
            pb.line_to(end.x, end.y);
            if let Some([left, right]) = shape.arrowhead() {
                pb.move_to(left.x, left.y);
                pb.line_to(end.x, end.y);
                pb.line_to(right.x, right.y);
            }
            if let Some(path) = pb.finish() {
                stroke(canvas, &path, style);
            }
        }
        ShapeGeometry::Path { points } => stroke_polyline(canvas, points, style),
        ShapeGeometry::Text {
            anchor,
            content,
            font,
            size,
        } => {
            let layout = TextLayout::new(fonts, font, content, size.x);
            draw_text(canvas, fonts, font, &layout, *anchor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeKind;
    use egui::{pos2, Color32};
    use image::{Rgba, RgbaImage};

    fn white(w: u32, h: u32) -> Canvas {
        RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn test_rectangle_outline_only() {
        let mut canvas = white(50, 50);
        let mut rect = Shape::new(
            ShapeKind::Rectangle,
            pos2(10.0, 10.0),
            StrokeStyle::new(Color32::BLACK, 2.0),
            15.0,
        );
        rect.span(pos2(10.0, 10.0), pos2(40.0, 40.0));
        draw_shape(&mut canvas, &rect, &FontBook::new());
        assert_eq!(canvas.get_pixel(25, 25).0, [255, 255, 255, 255]);
        assert_ne!(canvas.get_pixel(10, 25).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_arrow_draws_head() {
        let mut canvas = white(100, 100);
        let mut arrow = Shape::new(
            ShapeKind::Arrow,
            pos2(10.0, 50.0),
            StrokeStyle::new(Color32::BLACK, 2.0),
            15.0,
        );
        arrow.span(pos2(10.0, 50.0), pos2(90.0, 50.0));
        draw_shape(&mut canvas, &arrow, &FontBook::new());
        let [left, _] = arrow.arrowhead().unwrap();
        let p = canvas.get_pixel(left.x.round() as u32, left.y.round() as u32).0;
        assert_ne!(p, [255, 255, 255, 255]);
    }

    #[test]
    fn test_translucent_polyline_is_uniform() {
        let mut canvas = white(60, 60);
        let mut style = StrokeStyle::new(Color32::from_rgba_unmultiplied(255, 255, 0, 90), 10.0);
        style.cap = LineCap::Flat;
        // Doubles back over itself
        stroke_polyline(
            &mut canvas,
            &[pos2(10.0, 30.0), pos2(50.0, 30.0), pos2(20.0, 30.0)],
            &style,
        );
        assert_eq!(canvas.get_pixel(30, 30), canvas.get_pixel(45, 30));
    }
}
