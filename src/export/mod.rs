//! Resizing to presets, encoding to files, and batch jobs over every loaded image.

mod batch;
mod encode;
mod preset;

pub use batch::{BatchExport, BatchItem, BatchJob, BatchOutcome, BatchResize};
pub use encode::{
    coerce_extension, encode, is_encodable_extension, save, EncodeSettings, SaveReport,
};
pub use preset::{compute_target_dimensions, resize_single, ResizePreset};
