use egui::Pos2;
use std::f32::consts::FRAC_PI_6;

/// Angle between each arrowhead segment and the reversed shaft
pub const HEAD_ANGLE: f32 = FRAC_PI_6;

/// Compute the two arrowhead tips for a shaft running from `start` to `end`.
///
/// Each tip lies `length` away from `end`, rotated ±30° off the shaft's reverse direction.
pub fn arrowhead_points(start: Pos2, end: Pos2, length: f32) -> [Pos2; 2] {
    let angle = (end.y - start.y).atan2(end.x - start.x);
    let tip = |offset: f32| {
        Pos2::new(
            end.x - length * (angle + offset).cos(),
            end.y - length * (angle + offset).sin(),
        )
    };
    [tip(-HEAD_ANGLE), tip(HEAD_ANGLE)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_horizontal_shaft() {
        let [a, b] = arrowhead_points(pos2(0.0, 0.0), pos2(100.0, 0.0), 10.0);
        let dx = 10.0 * HEAD_ANGLE.cos();
        assert!((a.x - (100.0 - dx)).abs() < 1e-4);
        assert!((a.y - 5.0).abs() < 1e-4);
        assert!((b.x - (100.0 - dx)).abs() < 1e-4);
        assert!((b.y + 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_shaft_still_yields_points() {
        let [a, b] = arrowhead_points(pos2(5.0, 5.0), pos2(5.0, 5.0), 10.0);
        assert!(a.x.is_finite() && b.y.is_finite());
    }
}
