use crate::geometry::PixelRect;

/// Requests a tool hands back to the editor after mutating the working canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Snapshot the working canvas onto the undo stack
    PushState,
    /// Refresh the newest undo entry with the working canvas
    AmendState,
    /// Replace the canvas with the given region of it
    Crop { rect: PixelRect },
}
