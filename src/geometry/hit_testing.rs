use egui::{Pos2, Rect, Vec2};

/// Distance from `point` to the segment `line_start`–`line_end`
pub fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let len_sq = line_vec.length_sq();
    if len_sq == 0.0 {
        return point.distance(line_start);
    }

    let t = ((point - line_start).dot(line_vec) / len_sq).clamp(0.0, 1.0);
    point.distance(line_start + line_vec * t)
}

/// Bounding box of a point set, grown by `padding` on every side
pub fn calculate_bounds(points: &[Pos2], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    let mut rect = Rect::from_min_max(points[0], points[0]);
    for point in &points[1..] {
        rect.extend_with(*point);
    }
    rect.expand(padding)
}

/// Square hit area of a handle centred on `center`
pub fn handle_rect(center: Pos2, size: f32) -> Rect {
    Rect::from_center_size(center, Vec2::splat(size))
}

/// Return the first handle whose hit area contains `pos`.
///
/// Handles are tested in the given order, so callers list the preferred ones first.
pub fn hit_handle<H: Copy>(pos: Pos2, handles: &[(H, Pos2)], size: f32) -> Option<H> {
    handles
        .iter()
        .find(|(_, center)| handle_rect(*center, size).contains(pos))
        .map(|(handle, _)| *handle)
}
