use std::path::PathBuf;

use crate::tools::ToolKind;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// `None` means no tool
    ActiveToolChanged {
        old: Option<ToolKind>,
        new: Option<ToolKind>,
    },
    /// The displayed bitmap of `path` changed
    CanvasChanged {
        path: PathBuf,
        width: u32,
        height: u32,
        file_size: u64,
    },
    HistoryChanged {
        can_undo: bool,
        can_redo: bool,
    },
    ImageLoaded {
        path: PathBuf,
    },
    ImageRenamed {
        old: PathBuf,
        new: PathBuf,
    },
    ImageRemoved {
        path: PathBuf,
    },
    /// The last image was removed; nothing is displayed any more
    CanvasCleared,
    BatchProgress {
        done: usize,
        total: usize,
    },
    /// Per-file problem that didn't stop the operation
    Warning {
        path: Option<PathBuf>,
        message: String,
    },
}
