//! Annotation shapes: transient vector objects that live in the overlay until they are
//! rasterized into the canvas.

mod handle;

pub use handle::Handle;

use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::geometry::{arrowhead_points, calculate_bounds, distance_to_line_segment};

/// Shapes smaller than this along an axis count as degenerate
pub const MIN_SHAPE_EXTENT: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Line,
    Arrow,
    Freehand,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Round,
    Flat,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Round,
    Miter,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color32,
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl StrokeStyle {
    pub fn new(color: Color32, width: f32) -> Self {
        Self {
            color,
            width,
            cap: LineCap::Round,
            join: LineJoin::Round,
        }
    }
}

/// Font description of a text annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: Color32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Default".to_owned(),
            size: 24.0,
            bold: false,
            italic: false,
            color: Color32::RED,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGeometry {
    /// Two opposite corners; used by rectangles and ellipses
    Box { a: Pos2, b: Pos2 },
    /// Shaft of a line or arrow
    Segment { start: Pos2, end: Pos2 },
    Path { points: Vec<Pos2> },
    /// Text anchored at its top-left corner; `size` is the laid-out box
    Text {
        anchor: Pos2,
        content: String,
        font: FontSpec,
        size: Vec2,
    },
}

impl ShapeGeometry {
    pub fn translated(&self, delta: Vec2) -> Self {
        match self {
            Self::Box { a, b } => Self::Box {
                a: *a + delta,
                b: *b + delta,
            },
            Self::Segment { start, end } => Self::Segment {
                start: *start + delta,
                end: *end + delta,
            },
            Self::Path { points } => Self::Path {
                points: points.iter().map(|p| *p + delta).collect(),
            },
            Self::Text {
                anchor,
                content,
                font,
                size,
            } => Self::Text {
                anchor: *anchor + delta,
                content: content.clone(),
                font: font.clone(),
                size: *size,
            },
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Self::Box { a, b } => Rect::from_two_pos(*a, *b),
            Self::Segment { start, end } => Rect::from_two_pos(*start, *end),
            Self::Path { points } => calculate_bounds(points, 0.0),
            Self::Text { anchor, size, .. } => Rect::from_min_size(*anchor, *size),
        }
    }
}

/// A live annotation
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    kind: ShapeKind,
    geometry: ShapeGeometry,
    style: StrokeStyle,
    arrow_length: f32,
    arrowhead: Option<[Pos2; 2]>,
}

impl Shape {
    /// Start a rectangle, ellipse, line or arrow at a zero-size origin.
    pub fn new(kind: ShapeKind, origin: Pos2, style: StrokeStyle, arrow_length: f32) -> Self {
        let geometry = match kind {
            ShapeKind::Rectangle | ShapeKind::Ellipse => ShapeGeometry::Box {
                a: origin,
                b: origin,
            },
            ShapeKind::Line | ShapeKind::Arrow => ShapeGeometry::Segment {
                start: origin,
                end: origin,
            },
            ShapeKind::Freehand => ShapeGeometry::Path {
                points: vec![origin],
            },
            ShapeKind::Text => ShapeGeometry::Text {
                anchor: origin,
                content: String::new(),
                font: FontSpec::default(),
                size: Vec2::ZERO,
            },
        };
        let mut shape = Self {
            kind,
            geometry,
            style,
            arrow_length,
            arrowhead: None,
        };
        shape.refresh_derived();
        shape
    }

    pub fn freehand(points: Vec<Pos2>, style: StrokeStyle) -> Self {
        Self {
            kind: ShapeKind::Freehand,
            geometry: ShapeGeometry::Path { points },
            style,
            arrow_length: 0.0,
            arrowhead: None,
        }
    }

    pub fn text(anchor: Pos2, font: FontSpec, size: Vec2) -> Self {
        let style = StrokeStyle::new(font.color, 1.0);
        Self {
            kind: ShapeKind::Text,
            geometry: ShapeGeometry::Text {
                anchor,
                content: String::new(),
                font,
                size,
            },
            style,
            arrow_length: 0.0,
            arrowhead: None,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn geometry(&self) -> &ShapeGeometry {
        &self.geometry
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn arrowhead(&self) -> Option<[Pos2; 2]> {
        self.arrowhead
    }

    pub fn bounds(&self) -> Rect {
        self.geometry.bounds()
    }

    /// Replace the geometry; derived data is recomputed.
    pub fn set_geometry(&mut self, geometry: ShapeGeometry) {
        self.geometry = geometry;
        self.refresh_derived();
    }

    /// Span the shape from `origin` to `current` while it is being drawn.
    pub fn span(&mut self, origin: Pos2, current: Pos2) {
        match &mut self.geometry {
            ShapeGeometry::Box { a, b } => {
                *a = origin;
                *b = current;
            }
            ShapeGeometry::Segment { start, end } => {
                *start = origin;
                *end = current;
            }
            ShapeGeometry::Path { points } => points.push(current),
            ShapeGeometry::Text { anchor, .. } => *anchor = current,
        }
        self.refresh_derived();
    }

    pub fn push_point(&mut self, pos: Pos2) {
        if let ShapeGeometry::Path { points } = &mut self.geometry {
            points.push(pos);
        }
    }

    /// Move the shape so it sits at `original` shifted by `delta`.
    pub fn move_from(&mut self, original: &ShapeGeometry, delta: Vec2) {
        self.set_geometry(original.translated(delta));
    }

    /// Drag `handle` of the `original` geometry to `pos`.
    pub fn resize_from(&mut self, original: &ShapeGeometry, handle: Handle, pos: Pos2) {
        let geometry = match (original, handle) {
            (ShapeGeometry::Segment { end, .. }, Handle::Start) => ShapeGeometry::Segment {
                start: pos,
                end: *end,
            },
            (ShapeGeometry::Segment { start, .. }, Handle::End) => ShapeGeometry::Segment {
                start: *start,
                end: pos,
            },
            (ShapeGeometry::Box { a, b }, handle) => {
                let rect = handle.drag_rect(Rect::from_two_pos(*a, *b), pos);
                ShapeGeometry::Box {
                    a: rect.min,
                    b: rect.max,
                }
            }
            (other, _) => other.clone(),
        };
        self.set_geometry(geometry);
    }

    /// Handles exposed while the shape is selected
    pub fn handles(&self, extended: bool) -> Vec<(Handle, Pos2)> {
        match &self.geometry {
            ShapeGeometry::Segment { start, end } => {
                vec![(Handle::End, *end), (Handle::Start, *start)]
            }
            ShapeGeometry::Box { a, b } => {
                let rect = Rect::from_two_pos(*a, *b);
                let edges: &[Handle] = if extended { &Handle::EDGES } else { &[] };
                Handle::CORNERS
                    .iter()
                    .chain(edges)
                    .filter_map(|h| h.position_on(rect).map(|p| (*h, p)))
                    .collect()
            }
            ShapeGeometry::Path { .. } | ShapeGeometry::Text { .. } => Vec::new(),
        }
    }

    /// Whether `pos` hits the shape body. `tolerance` widens thin shapes.
    pub fn contains(&self, pos: Pos2, tolerance: f32) -> bool {
        let reach = (self.style.width / 2.0).max(tolerance);
        match &self.geometry {
            ShapeGeometry::Box { .. } | ShapeGeometry::Text { .. } => {
                self.bounds().expand(reach).contains(pos)
            }
            ShapeGeometry::Segment { start, end } => {
                distance_to_line_segment(pos, *start, *end) <= reach
            }
            ShapeGeometry::Path { points } => points
                .windows(2)
                .any(|w| distance_to_line_segment(pos, w[0], w[1]) <= reach),
        }
    }

    /// Degenerate shapes are discarded instead of committed
    pub fn is_empty(&self) -> bool {
        match &self.geometry {
            ShapeGeometry::Box { a, b } => {
                let r = Rect::from_two_pos(*a, *b);
                r.width() < MIN_SHAPE_EXTENT || r.height() < MIN_SHAPE_EXTENT
            }
            ShapeGeometry::Segment { start, end } => start.distance(*end) < MIN_SHAPE_EXTENT,
            ShapeGeometry::Path { points } => points.len() < 2,
            ShapeGeometry::Text { content, .. } => content.trim().is_empty(),
        }
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.geometry {
            ShapeGeometry::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn font(&self) -> Option<&FontSpec> {
        match &self.geometry {
            ShapeGeometry::Text { font, .. } => Some(font),
            _ => None,
        }
    }

    pub fn push_text(&mut self, text: &str) {
        if let ShapeGeometry::Text { content, .. } = &mut self.geometry {
            content.push_str(text);
        }
    }

    pub fn pop_char(&mut self) -> Option<char> {
        match &mut self.geometry {
            ShapeGeometry::Text { content, .. } => content.pop(),
            _ => None,
        }
    }

    pub fn set_font(&mut self, new_font: FontSpec) {
        if let ShapeGeometry::Text { font, .. } = &mut self.geometry {
            self.style.color = new_font.color;
            *font = new_font;
        }
    }

    pub fn set_text_size(&mut self, new_size: Vec2) {
        if let ShapeGeometry::Text { size, .. } = &mut self.geometry {
            *size = new_size;
        }
    }

    fn refresh_derived(&mut self) {
        self.arrowhead = match (&self.kind, &self.geometry) {
            (ShapeKind::Arrow, ShapeGeometry::Segment { start, end }) => {
                Some(arrowhead_points(*start, *end, self.arrow_length))
            }
            _ => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    fn style() -> StrokeStyle {
        StrokeStyle::new(Color32::RED, 4.0)
    }

    #[test]
    fn test_new_shape_is_empty_until_spanned() {
        let mut rect = Shape::new(ShapeKind::Rectangle, pos2(10.0, 10.0), style(), 15.0);
        assert!(rect.is_empty());
        rect.span(pos2(10.0, 10.0), pos2(0.0, 30.0));
        assert!(!rect.is_empty());
        assert_eq!(rect.bounds(), Rect::from_min_max(pos2(0.0, 10.0), pos2(10.0, 30.0)));
    }

    #[test]
    fn test_arrowhead_follows_geometry() {
        let mut arrow = Shape::new(ShapeKind::Arrow, pos2(0.0, 0.0), style(), 15.0);
        arrow.span(pos2(0.0, 0.0), pos2(100.0, 0.0));
        let before = arrow.arrowhead().unwrap();
        let original = arrow.geometry().clone();
        arrow.move_from(&original, vec2(5.0, 7.0));
        let after = arrow.arrowhead().unwrap();
        for (b, a) in before.iter().zip(after.iter()) {
            assert!((a.x - b.x - 5.0).abs() < 1e-4);
            assert!((a.y - b.y - 7.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_line_has_no_arrowhead() {
        let mut line = Shape::new(ShapeKind::Line, pos2(0.0, 0.0), style(), 15.0);
        line.span(pos2(0.0, 0.0), pos2(20.0, 20.0));
        assert!(line.arrowhead().is_none());
    }

    #[test]
    fn test_segment_handles_are_endpoints() {
        let mut line = Shape::new(ShapeKind::Line, pos2(0.0, 0.0), style(), 15.0);
        line.span(pos2(0.0, 0.0), pos2(20.0, 10.0));
        let handles = line.handles(true);
        assert_eq!(handles.len(), 2);
        let original = line.geometry().clone();
        line.resize_from(&original, Handle::Start, pos2(-5.0, -5.0));
        assert_eq!(
            line.geometry(),
            &ShapeGeometry::Segment { start: pos2(-5.0, -5.0), end: pos2(20.0, 10.0) }
        );
    }

    #[test]
    fn test_box_handles_extended() {
        let mut ellipse = Shape::new(ShapeKind::Ellipse, pos2(0.0, 0.0), style(), 15.0);
        ellipse.span(pos2(0.0, 0.0), pos2(20.0, 10.0));
        assert_eq!(ellipse.handles(false).len(), 4);
        assert_eq!(ellipse.handles(true).len(), 8);
    }

    #[test]
    fn test_contains_line_uses_tolerance() {
        let mut line = Shape::new(ShapeKind::Line, pos2(0.0, 0.0), style(), 15.0);
        line.span(pos2(0.0, 0.0), pos2(100.0, 0.0));
        assert!(line.contains(pos2(50.0, 4.0), 5.0));
        assert!(!line.contains(pos2(50.0, 9.0), 5.0));
    }

    #[test]
    fn test_text_whitespace_is_empty() {
        let mut text = Shape::text(pos2(0.0, 0.0), FontSpec::default(), vec2(100.0, 20.0));
        text.push_text("  \n ");
        assert!(text.is_empty());
        text.push_text("hi");
        assert!(!text.is_empty());
        assert_eq!(text.pop_char(), Some('i'));
    }
}
