use crate::config::ScaleConfig;

/// Sizes derived from the current view transform and image dimensions.
///
/// Recomputed from the image entry whenever needed, so undo/redo and resizes are picked
/// up without any bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewMetrics {
    /// Canvas-to-viewport scale factor
    pub view_scale: f32,
    /// Multiplier applied to stroke widths and arrowhead length
    pub stroke_scale: f32,
    /// Multiplier applied to default font sizes
    pub text_scale: f32,
    /// Handle extent in canvas units
    pub handle_size: f32,
}

impl Default for ViewMetrics {
    fn default() -> Self {
        Self {
            view_scale: 1.0,
            stroke_scale: 1.0,
            text_scale: 1.0,
            handle_size: 10.0,
        }
    }
}

impl ViewMetrics {
    /// `reference_width` is the width that stroke sizes should track: the current width
    /// after an explicit resize, the original width otherwise.
    pub fn compute(config: &ScaleConfig, view_scale: f32, reference_width: u32) -> Self {
        let view_scale = if view_scale > 0.0 { view_scale } else { 1.0 };
        let width_ratio = reference_width as f32 / config.reference_width.max(1.0);

        let mut stroke_scale = width_ratio.max(1.0);
        if view_scale > 1.0 {
            stroke_scale *= config.zoomed_in_factor;
        }
        let stroke_scale = stroke_scale.clamp(config.zoomed_in_factor, config.max_stroke_scale);

        let text_scale = width_ratio.clamp(config.min_text_scale, config.max_text_scale);

        Self {
            view_scale,
            stroke_scale,
            text_scale,
            handle_size: screen_invariant_size(config, config.handle_size_px, view_scale),
        }
    }
}

/// Convert a nominal on-screen size into canvas units so it stays constant on screen.
pub fn screen_invariant_size(config: &ScaleConfig, nominal_px: f32, view_scale: f32) -> f32 {
    let boost = if view_scale <= 1.0 { config.small_view_boost } else { 1.0 };
    nominal_px / view_scale * boost
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_size_is_inverse_to_zoom() {
        let config = ScaleConfig::default();
        let zoomed = ViewMetrics::compute(&config, 2.0, 1000);
        let zoomed_more = ViewMetrics::compute(&config, 4.0, 1000);
        assert!((zoomed.handle_size - 5.0).abs() < 1e-5);
        assert!((zoomed_more.handle_size - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_small_view_gets_boost() {
        let config = ScaleConfig::default();
        let metrics = ViewMetrics::compute(&config, 0.5, 1000);
        assert!((metrics.handle_size - 30.0).abs() < 1e-5);
    }

    #[test]
    fn test_stroke_scale_is_capped() {
        let config = ScaleConfig::default();
        let huge = ViewMetrics::compute(&config, 0.25, 12_000);
        assert_eq!(huge.stroke_scale, 3.0);
        assert_eq!(huge.text_scale, 5.0);
        let tiny = ViewMetrics::compute(&config, 1.0, 100);
        assert_eq!(tiny.stroke_scale, 1.0);
        assert_eq!(tiny.text_scale, 0.5);
    }

    #[test]
    fn test_zoomed_in_reduces_strokes() {
        let config = ScaleConfig::default();
        let metrics = ViewMetrics::compute(&config, 2.0, 2000);
        assert!((metrics.stroke_scale - 0.8).abs() < 1e-5);
    }
}
