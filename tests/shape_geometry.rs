mod common;

use common::{drag, ScratchDir};
use eframe_annotate::export::compute_target_dimensions;
use eframe_annotate::geometry::arrowhead_points;
use eframe_annotate::shape::{Shape, ShapeKind, StrokeStyle};
use eframe_annotate::{EditorContext, ResizePreset, ToolKind};
use egui::{pos2, vec2, Color32};

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn test_arrowhead_at_45_degrees() {
    let [a, b] = arrowhead_points(pos2(0.0, 0.0), pos2(100.0, 100.0), 10.0);
    let (s15, c15) = 15f32.to_radians().sin_cos();
    assert!(close(a.x, 100.0 - 10.0 * c15) && close(a.y, 100.0 - 10.0 * s15));
    assert!(close(b.x, 100.0 - 10.0 * s15) && close(b.y, 100.0 - 10.0 * c15));
    // Mirror images across the shaft
    assert!(close(a.x, b.y) && close(a.y, b.x));
}

#[test]
fn test_arrowhead_is_translation_invariant() {
    let style = StrokeStyle::new(Color32::RED, 4.0);
    let mut arrow = Shape::new(ShapeKind::Arrow, pos2(10.0, 20.0), style, 15.0);
    arrow.span(pos2(10.0, 20.0), pos2(90.0, 60.0));
    let before = arrow.arrowhead().unwrap();

    let original = arrow.geometry().clone();
    arrow.move_from(&original, vec2(35.0, -12.0));
    let after = arrow.arrowhead().unwrap();

    for (b, a) in before.iter().zip(after.iter()) {
        assert!(close(a.x - b.x, 35.0));
        assert!(close(a.y - b.y, -12.0));
    }
}

#[test]
fn test_aspect_ratio_presets() {
    assert_eq!(compute_target_dimensions(1600, 900, ResizePreset::Small), (800, 450));
    assert_eq!(compute_target_dimensions(600, 400, ResizePreset::Small), (600, 400));
    assert_eq!(compute_target_dimensions(4000, 3000, ResizePreset::Original), (4000, 3000));
    assert_eq!(compute_target_dimensions(2000, 1333, ResizePreset::Large), (1600, 1066));
}

#[test]
fn test_arrow_tool_draws_head_into_canvas() {
    let dir = ScratchDir::new("arrow");
    let path = dir.png("a.png", 400, 200);
    let mut editor = EditorContext::default();
    editor.load(&path).unwrap();

    editor.activate_tool(ToolKind::Arrow).unwrap();
    drag(&mut editor, (50.0, 100.0), (300.0, 100.0));
    editor.deactivate_tool().unwrap();
    assert!(editor.can_undo());

    let canvas = editor.canvas().unwrap();
    let is_red = |x: u32, y: u32| {
        let [r, g, b, _] = canvas.get_pixel(x, y).0;
        r > 200 && g < 80 && b < 80
    };
    assert!(is_red(175, 100));
    // One head segment ends near (287, 107.5)
    assert!(is_red(290, 106));
    assert!(!is_red(175, 150));
}
