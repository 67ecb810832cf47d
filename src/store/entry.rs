use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::history::{HistoryEntry, SnapshotHistory};
use crate::raster::Canvas;

/// Width × height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn of(canvas: &Canvas) -> Self {
        Self::new(canvas.width(), canvas.height())
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// Container format an image was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Raster(ImageFormat),
    /// Decoded through a `HeifDecoder`; always re-encoded on export
    Heif,
}

impl SourceFormat {
    pub fn is_heif(&self) -> bool {
        matches!(self, Self::Heif)
    }
}

/// Scale an on-disk size by the pixel area ratio
pub fn estimate_file_size(original_size: u64, original: Dimensions, current: Dimensions) -> u64 {
    if original.area() == 0 {
        return original_size;
    }
    (original_size as f64 * current.area() as f64 / original.area() as f64).round() as u64
}

/// Everything known about one loaded image
#[derive(Debug, Clone)]
pub struct ImageEntry {
    /// Stable id, used for texture caching
    pub(crate) id: usize,
    pub(crate) source_path: PathBuf,
    pub(crate) display_name: String,
    pub(crate) original_pixels: Canvas,
    pub(crate) current_pixels: Option<Canvas>,
    pub(crate) original_dimensions: Dimensions,
    pub(crate) current_dimensions: Dimensions,
    pub(crate) original_file_size: u64,
    pub(crate) current_file_size_estimate: u64,
    pub(crate) is_resized: bool,
    pub(crate) view_scale: f32,
    pub(crate) source_format: SourceFormat,
    pub(crate) history: SnapshotHistory,
}

impl ImageEntry {
    pub(crate) fn new(
        id: usize,
        source_path: PathBuf,
        pixels: Canvas,
        file_size: u64,
        source_format: SourceFormat,
        max_history: usize,
    ) -> Self {
        let dimensions = Dimensions::of(&pixels);
        Self {
            id,
            display_name: display_name_of(&source_path),
            source_path,
            original_pixels: pixels,
            current_pixels: None,
            original_dimensions: dimensions,
            current_dimensions: dimensions,
            original_file_size: file_size,
            current_file_size_estimate: file_size,
            is_resized: false,
            view_scale: 1.0,
            source_format,
            history: SnapshotHistory::new(max_history),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn original_pixels(&self) -> &Canvas {
        &self.original_pixels
    }

    /// The edited bitmap, or the original when nothing was committed
    pub fn canvas(&self) -> &Canvas {
        self.current_pixels.as_ref().unwrap_or(&self.original_pixels)
    }

    pub fn is_edited(&self) -> bool {
        self.current_pixels.is_some()
    }

    pub fn original_dimensions(&self) -> Dimensions {
        self.original_dimensions
    }

    pub fn current_dimensions(&self) -> Dimensions {
        self.current_dimensions
    }

    pub fn original_file_size(&self) -> u64 {
        self.original_file_size
    }

    /// Estimate when edited, on-disk size otherwise
    pub fn reported_file_size(&self) -> u64 {
        if self.is_edited() {
            self.current_file_size_estimate
        } else {
            self.original_file_size
        }
    }

    pub fn is_resized(&self) -> bool {
        self.is_resized
    }

    pub fn view_scale(&self) -> f32 {
        self.view_scale
    }

    pub fn source_format(&self) -> SourceFormat {
        self.source_format
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    /// Width stroke sizes track: the current one after an explicit resize, the original
    /// one otherwise.
    pub fn reference_width(&self) -> u32 {
        if self.is_resized {
            self.current_dimensions.width
        } else {
            self.original_dimensions.width
        }
    }

    /// Replace the working bitmap. Dimensions and size estimate follow it.
    pub(crate) fn set_canvas(&mut self, canvas: Canvas) {
        self.current_dimensions = Dimensions::of(&canvas);
        self.current_file_size_estimate = estimate_file_size(
            self.original_file_size,
            self.original_dimensions,
            self.current_dimensions,
        );
        self.current_pixels = Some(canvas);
    }

    /// Mutable working bitmap. The first call copies the original.
    pub(crate) fn canvas_mut(&mut self) -> &mut Canvas {
        self.current_pixels
            .get_or_insert_with(|| self.original_pixels.clone())
    }

    pub(crate) fn snapshot(&self) -> HistoryEntry {
        HistoryEntry {
            bitmap: self.canvas().clone(),
            dimensions: self.current_dimensions,
            file_size_estimate: self.current_file_size_estimate,
            is_resized: self.is_resized,
            view_scale: self.view_scale,
        }
    }

    /// Record the current state on the undo stack
    pub(crate) fn push_state(&mut self) {
        let snapshot = self.snapshot();
        self.history.push(snapshot);
    }

    /// Overwrite the newest undo entry with the current state
    pub(crate) fn amend_state(&mut self) {
        let snapshot = self.snapshot();
        self.history.amend_top(snapshot);
    }

    pub(crate) fn restore(&mut self, entry: HistoryEntry) {
        self.current_dimensions = entry.dimensions;
        self.current_file_size_estimate = entry.file_size_estimate;
        self.is_resized = entry.is_resized;
        self.view_scale = entry.view_scale;
        self.current_pixels = Some(entry.bitmap);
    }

    pub(crate) fn revert_to_original(&mut self) {
        self.current_pixels = None;
        self.current_dimensions = self.original_dimensions;
        self.current_file_size_estimate = self.original_file_size;
        self.is_resized = false;
    }

    pub(crate) fn rekey(&mut self, path: PathBuf) {
        self.display_name = display_name_of(&path);
        self.source_path = path;
    }
}

fn display_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
