use std::fs;
use std::path::{Path, PathBuf};

use super::encode::{coerce_extension, save, EncodeSettings, SaveReport};
use super::preset::{resize_single, ResizePreset};
use crate::error::{EditorError, EncodeError};
use crate::event::{EditorEvent, EventBus};
use crate::store::{Dimensions, ImageStore};

#[derive(Debug)]
pub enum BatchOutcome {
    Resized { from: Dimensions, to: Dimensions },
    /// Already within the preset
    Unchanged,
    Exported(SaveReport),
    /// Neither edited, resized nor in need of transcoding
    Skipped,
    Failed(EditorError),
}

/// Result of processing one image
#[derive(Debug)]
pub struct BatchItem {
    pub path: PathBuf,
    pub outcome: BatchOutcome,
}

/// A job over every loaded image that advances one image per `step`, so a UI can
/// repaint between images.
pub trait BatchJob {
    /// Process the next image. `None` once every image was handled.
    fn step(&mut self, store: &mut ImageStore, events: &EventBus) -> Option<BatchItem>;

    /// `(done, total)`
    fn progress(&self) -> (usize, usize);

    fn is_done(&self) -> bool {
        let (done, total) = self.progress();
        done >= total
    }

    fn run_to_end(&mut self, store: &mut ImageStore, events: &EventBus) -> Vec<BatchItem> {
        std::iter::from_fn(|| self.step(store, events)).collect()
    }
}

/// Paths still to process, in load order
#[derive(Debug, Clone)]
struct Queue {
    paths: Vec<PathBuf>,
    next: usize,
}

impl Queue {
    fn new(store: &ImageStore) -> Self {
        Self {
            paths: store.paths().map(Path::to_owned).collect(),
            next: 0,
        }
    }

    fn pop(&mut self) -> Option<PathBuf> {
        let path = self.paths.get(self.next)?.clone();
        self.next += 1;
        Some(path)
    }

    fn progress(&self) -> (usize, usize) {
        (self.next, self.paths.len())
    }
}

fn report(item: &BatchItem, queue: &Queue, events: &EventBus) {
    if let BatchOutcome::Failed(err) = &item.outcome {
        events.emit(EditorEvent::Warning {
            path: Some(item.path.clone()),
            message: err.to_string(),
        });
    }
    let (done, total) = queue.progress();
    events.emit(EditorEvent::BatchProgress { done, total });
}

/// Resize every image to a preset. Each resize is one undo step of that image.
#[derive(Debug, Clone)]
pub struct BatchResize {
    queue: Queue,
    preset: ResizePreset,
}

impl BatchResize {
    pub fn new(store: &ImageStore, preset: ResizePreset) -> Self {
        Self {
            queue: Queue::new(store),
            preset,
        }
    }

    fn resize_one(&self, store: &mut ImageStore, path: &Path) -> Result<BatchOutcome, EditorError> {
        let entry = store.get_mut(path)?;
        let from = entry.current_dimensions();
        let resized = resize_single(entry.canvas(), self.preset);
        let to = Dimensions::of(&resized);
        if to == from {
            return Ok(BatchOutcome::Unchanged);
        }
        entry.set_canvas(resized);
        entry.is_resized = true;
        entry.push_state();
        Ok(BatchOutcome::Resized { from, to })
    }
}

impl BatchJob for BatchResize {
    fn step(&mut self, store: &mut ImageStore, events: &EventBus) -> Option<BatchItem> {
        let path = self.queue.pop()?;
        let outcome = self
            .resize_one(store, &path)
            .unwrap_or_else(BatchOutcome::Failed);
        let item = BatchItem { path, outcome };
        report(&item, &self.queue, events);
        Some(item)
    }

    fn progress(&self) -> (usize, usize) {
        self.queue.progress()
    }
}

/// Write every edited image (and every HEIF image) into `dir` as `<stem>.<ext>`.
#[derive(Debug, Clone)]
pub struct BatchExport {
    queue: Queue,
    dir: PathBuf,
    settings: EncodeSettings,
}

impl BatchExport {
    pub fn new(store: &ImageStore, dir: impl Into<PathBuf>, settings: EncodeSettings) -> Self {
        Self {
            queue: Queue::new(store),
            dir: dir.into(),
            settings,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn export_one(&self, store: &ImageStore, path: &Path) -> Result<BatchOutcome, EditorError> {
        let entry = store.get(path)?;
        let format = entry.source_format();
        if !entry.is_edited() && !entry.is_resized() && !format.is_heif() {
            return Ok(BatchOutcome::Skipped);
        }

        let file_name = path
            .file_name()
            .ok_or_else(|| EncodeError::MissingExtension(path.to_owned()))?;
        let target = coerce_extension(&self.dir.join(file_name), format);
        fs::create_dir_all(&self.dir).map_err(EncodeError::from)?;
        let report = save(entry.canvas(), &target, &self.settings, format, path)?;
        Ok(BatchOutcome::Exported(report))
    }
}

impl BatchJob for BatchExport {
    fn step(&mut self, store: &mut ImageStore, events: &EventBus) -> Option<BatchItem> {
        let path = self.queue.pop()?;
        let outcome = self
            .export_one(store, &path)
            .unwrap_or_else(BatchOutcome::Failed);
        let item = BatchItem { path, outcome };
        report(&item, &self.queue, events);
        Some(item)
    }

    fn progress(&self) -> (usize, usize) {
        self.queue.progress()
    }
}
