use egui::{CursorIcon, Pos2, Rect};

/// A grab point on a selected shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
    /// First endpoint of a line or arrow
    Start,
    /// Terminal endpoint of a line or arrow
    End,
}

impl Handle {
    pub const CORNERS: [Handle; 4] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
    ];

    pub const EDGES: [Handle; 4] = [Handle::Top, Handle::Bottom, Handle::Left, Handle::Right];

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            Handle::TopLeft | Handle::BottomRight => CursorIcon::ResizeNwSe,
            Handle::TopRight | Handle::BottomLeft => CursorIcon::ResizeNeSw,
            Handle::Top | Handle::Bottom => CursorIcon::ResizeVertical,
            Handle::Left | Handle::Right => CursorIcon::ResizeHorizontal,
            Handle::Start | Handle::End => CursorIcon::Crosshair,
        }
    }

    /// Position of this handle on `rect`. Endpoint handles have no box position.
    pub fn position_on(&self, rect: Rect) -> Option<Pos2> {
        let pos = match self {
            Handle::TopLeft => rect.left_top(),
            Handle::TopRight => rect.right_top(),
            Handle::BottomLeft => rect.left_bottom(),
            Handle::BottomRight => rect.right_bottom(),
            Handle::Top => rect.center_top(),
            Handle::Bottom => rect.center_bottom(),
            Handle::Left => rect.left_center(),
            Handle::Right => rect.right_center(),
            Handle::Start | Handle::End => return None,
        };
        Some(pos)
    }

    /// Drag this handle of `original` to `pos`, keeping the opposite corner or edge fixed.
    pub fn drag_rect(&self, original: Rect, pos: Pos2) -> Rect {
        match self {
            Handle::TopLeft => Rect::from_two_pos(original.right_bottom(), pos),
            Handle::TopRight => Rect::from_two_pos(original.left_bottom(), pos),
            Handle::BottomLeft => Rect::from_two_pos(original.right_top(), pos),
            Handle::BottomRight => Rect::from_two_pos(original.left_top(), pos),
            Handle::Top => Rect::from_two_pos(
                original.left_bottom(),
                Pos2::new(original.max.x, pos.y),
            ),
            Handle::Bottom => Rect::from_two_pos(
                original.left_top(),
                Pos2::new(original.max.x, pos.y),
            ),
            Handle::Left => Rect::from_two_pos(
                original.right_top(),
                Pos2::new(pos.x, original.max.y),
            ),
            Handle::Right => Rect::from_two_pos(
                original.left_top(),
                Pos2::new(pos.x, original.max.y),
            ),
            Handle::Start | Handle::End => original,
        }
    }
}
