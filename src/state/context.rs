//! The editor façade.
//!
//! `EditorContext` owns the image store, the active tool and the overlay. The
//! presentation layer feeds it input and reads back the canvas, the overlay and the
//! events it emits. Every commit goes through [`EditorContext::apply`], which keeps the
//! undo stack of the selected image in step with what is displayed.

use std::path::{Path, PathBuf};

use egui::Pos2;

use crate::command::Command;
use crate::config::EditorConfig;
use crate::error::{DecodeError, EditorError, EditorResult};
use crate::event::{EditorEvent, EventBus, EventHandler};
use crate::export::{
    coerce_extension, resize_single, save, BatchExport, BatchItem, BatchJob, BatchOutcome,
    BatchResize, EncodeSettings, ResizePreset, SaveReport,
};
use crate::geometry::ViewMetrics;
use crate::history::Restore;
use crate::input::InputEvent;
use crate::overlay::Overlay;
use crate::raster::{self, Canvas, FontBook};
use crate::shape::Shape;
use crate::store::{Dimensions, HeifDecoder, ImageEntry, ImageStore};
use crate::tools::{TextEdit, Tool, ToolContext, ToolKind, ToolSettings, ToolType};

pub struct EditorContext {
    config: EditorConfig,
    store: ImageStore,
    /// Image shown on the canvas
    active_path: Option<PathBuf>,
    tool: Option<ToolType>,
    settings: ToolSettings,
    overlay: Overlay,
    fonts: FontBook,
    events: EventBus,
    /// Bumped whenever the displayed bitmap may have changed
    canvas_version: u64,
}

impl std::fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorContext")
            .field("active_path", &self.active_path)
            .field("tool", &self.active_tool())
            .field("images", &self.store.len())
            .field("canvas_version", &self.canvas_version)
            .finish_non_exhaustive()
    }
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorContext {
    pub fn new(config: EditorConfig) -> Self {
        let fonts = FontBook::from_files(&config.font_files);
        Self {
            store: ImageStore::new(config.max_history),
            config,
            active_path: None,
            tool: None,
            settings: ToolSettings::default(),
            overlay: Overlay::new(),
            fonts,
            events: EventBus::new(),
            canvas_version: 0,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: ToolSettings) {
        self.settings = settings;
    }

    pub fn settings_mut(&mut self) -> &mut ToolSettings {
        &mut self.settings
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    pub fn set_heif_decoder(&mut self, decoder: Box<dyn HeifDecoder>) {
        self.store.set_heif_decoder(decoder);
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.events.subscribe(handler);
    }

    // ---- Images ----

    /// Load one file. The first loaded image becomes the active one.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<PathBuf, DecodeError> {
        let path = self.store.load(path)?.source_path().to_owned();
        self.after_load(&path);
        Ok(path)
    }

    /// Decode dropped file contents and register them under `path`.
    pub fn load_bytes(&mut self, path: impl AsRef<Path>, bytes: &[u8]) -> Result<PathBuf, DecodeError> {
        let path = self.store.load_bytes(path, bytes)?.source_path().to_owned();
        self.after_load(&path);
        Ok(path)
    }

    /// Load several files; a failing file is reported as a warning and skipped.
    pub fn load_many<P: AsRef<Path>>(
        &mut self,
        paths: impl IntoIterator<Item = P>,
    ) -> Vec<(PathBuf, DecodeError)> {
        let mut failures = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if let Err(err) = self.load(path) {
                self.events.emit(EditorEvent::Warning {
                    path: Some(path.to_owned()),
                    message: err.to_string(),
                });
                failures.push((path.to_owned(), err));
            }
        }
        failures
    }

    fn after_load(&mut self, path: &Path) {
        self.events.emit(EditorEvent::ImageLoaded {
            path: path.to_owned(),
        });
        let reloaded = self.active_path.as_deref() == Some(path);
        if reloaded {
            // Replaced under the tool's feet
            self.cancel_tool();
        }
        if reloaded || self.active_path.is_none() {
            self.active_path = Some(path.to_owned());
            self.emit_canvas(path);
        }
    }

    /// Show another image. In-progress tool work is committed to the current one first.
    pub fn select(&mut self, path: &Path) -> EditorResult<()> {
        let dimensions = self.store.select(path)?.dimensions;
        if self.active_path.as_deref() == Some(path) {
            return Ok(());
        }
        self.flush_tool()?;
        self.active_path = Some(path.to_owned());
        log::debug!(
            "Selected {} ({}x{})",
            path.display(),
            dimensions.width,
            dimensions.height
        );
        self.emit_canvas(path);
        Ok(())
    }

    pub fn active_path(&self) -> Option<&Path> {
        self.active_path.as_deref()
    }

    pub fn active_entry(&self) -> Option<&ImageEntry> {
        self.active_path
            .as_deref()
            .and_then(|path| self.store.get(path).ok())
    }

    /// Bitmap currently displayed
    pub fn canvas(&self) -> Option<&Canvas> {
        self.active_entry().map(ImageEntry::canvas)
    }

    pub fn canvas_version(&self) -> u64 {
        self.canvas_version
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn rename(&mut self, old: &Path, new_name: &str) -> EditorResult<PathBuf> {
        let new = self.store.rename(old, new_name)?;
        if self.active_path.as_deref() == Some(old) {
            self.active_path = Some(new.clone());
        }
        if new != old {
            self.events.emit(EditorEvent::ImageRenamed {
                old: old.to_owned(),
                new: new.clone(),
            });
        }
        Ok(new)
    }

    /// Forget an image. If it was displayed, the next image in load order is shown.
    pub fn delete(&mut self, path: &Path) -> EditorResult<()> {
        self.store.get(path)?;
        let was_active = self.active_path.as_deref() == Some(path);
        if was_active {
            self.cancel_tool();
        }
        self.store.delete(path)?;
        self.events.emit(EditorEvent::ImageRemoved {
            path: path.to_owned(),
        });

        if self.store.is_empty() {
            self.active_path = None;
            self.canvas_version += 1;
            self.events.emit(EditorEvent::CanvasCleared);
        } else if was_active {
            let next = self.store.paths().next().map(Path::to_owned);
            self.active_path = next.clone();
            if let Some(next) = next {
                self.emit_canvas(&next);
            }
        }
        Ok(())
    }

    // ---- View ----

    pub fn metrics(&self) -> ViewMetrics {
        self.active_entry()
            .map(|entry| metrics_for(&self.config, entry))
            .unwrap_or_default()
    }

    /// Record the canvas-to-viewport scale of the active image.
    pub fn set_view_scale(&mut self, view_scale: f32) -> EditorResult<()> {
        let path = self.require_active()?;
        let entry = self.store.get_mut(&path)?;
        if entry.view_scale == view_scale {
            return Ok(());
        }
        entry.view_scale = view_scale;
        self.with_tool(|tool, ctx| {
            tool.refresh_overlay(ctx);
            None
        })?;
        Ok(())
    }

    // ---- Tools ----

    pub fn active_tool(&self) -> Option<ToolKind> {
        self.tool.as_ref().map(Tool::kind)
    }

    pub fn tool(&self) -> Option<&ToolType> {
        self.tool.as_ref()
    }

    /// Make `kind` the active tool. The previous tool is flushed first.
    pub fn activate_tool(&mut self, kind: ToolKind) -> EditorResult<()> {
        if self.active_tool() == Some(kind) {
            return Ok(());
        }
        self.flush_tool()?;
        let mut tool = ToolType::new(kind);
        tool.activate();
        log::info!("Activated {} tool", tool.name());
        self.replace_tool(Some(tool));
        Ok(())
    }

    pub fn deactivate_tool(&mut self) -> EditorResult<()> {
        if self.tool.is_none() {
            return Ok(());
        }
        self.flush_tool()?;
        self.replace_tool(None);
        Ok(())
    }

    fn replace_tool(&mut self, tool: Option<ToolType>) {
        let old = self.active_tool();
        self.tool = tool;
        let new = self.active_tool();
        if old != new {
            self.events.emit(EditorEvent::ActiveToolChanged { old, new });
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) -> EditorResult<()> {
        match event {
            InputEvent::PointerDown { location } => self.pointer_down(location.position),
            InputEvent::PointerMove { location } => self.pointer_move(location.position),
            InputEvent::PointerUp { location } => self.pointer_up(location.position),
            InputEvent::KeyDown { key, .. } => match key {
                egui::Key::Escape => self.deactivate_tool(),
                egui::Key::Backspace if self.is_editing_text() => {
                    self.edit_text(TextEdit::Backspace)
                }
                egui::Key::Enter if self.is_editing_text() => self.edit_text(TextEdit::Newline),
                _ => Ok(()),
            },
            InputEvent::Text(text) if self.is_editing_text() => {
                self.edit_text(TextEdit::Insert(text))
            }
            InputEvent::Text(_) => Ok(()),
        }
    }

    pub fn pointer_down(&mut self, pos: Pos2) -> EditorResult<()> {
        let command = self.with_tool(|tool, ctx| tool.on_pointer_down(pos, ctx))?;
        self.apply_opt(command)
    }

    pub fn pointer_move(&mut self, pos: Pos2) -> EditorResult<()> {
        let command = self.with_tool(|tool, ctx| tool.on_pointer_move(pos, ctx))?;
        self.apply_opt(command)
    }

    pub fn pointer_up(&mut self, pos: Pos2) -> EditorResult<()> {
        let command = self.with_tool(|tool, ctx| tool.on_pointer_up(pos, ctx))?;
        self.apply_opt(command)
    }

    pub fn is_editing_text(&self) -> bool {
        matches!(&self.tool, Some(ToolType::Text(tool)) if tool.is_busy())
    }

    /// The text box being typed into
    pub fn editing_text(&self) -> Option<&Shape> {
        let Some(ToolType::Text(tool)) = &self.tool else {
            return None;
        };
        self.overlay.shape(tool.editing_id()?)
    }

    /// Apply a keyboard or format-bar edit to the text being typed.
    pub fn edit_text(&mut self, edit: TextEdit) -> EditorResult<()> {
        if !self.is_editing_text() {
            log::warn!("Text edit without an open text box");
            return Err(EditorError::MissingSelection);
        }
        self.with_tool(|tool, ctx| {
            if let Some(text) = tool.as_text_tool_mut() {
                text.edit(edit, ctx);
            }
            None
        })?;
        Ok(())
    }

    /// Commit or discard whatever the active tool holds, leaving it active and idle.
    pub fn flush_tool(&mut self) -> EditorResult<()> {
        if !self.tool.as_ref().is_some_and(Tool::is_busy) {
            return Ok(());
        }
        if self.active_path.is_none() {
            self.cancel_tool();
            return Ok(());
        }
        let command = self.with_tool(|tool, ctx| {
            let command = tool.deactivate(ctx);
            tool.activate();
            command
        })?;
        self.apply_opt(command)
    }

    /// Drop in-progress tool work without committing anything
    fn cancel_tool(&mut self) {
        if let Some(tool) = self.tool.as_mut() {
            tool.cancel(&mut self.overlay);
        }
        self.overlay.clear();
    }

    /// Run `f` with the active tool and a context over the active image.
    ///
    /// Tools draw straight into the working bitmap. For an image without edits that is
    /// a copy of the original. Once the tool is idle again without having committed
    /// anything, and nothing was committed before either, the copy is dropped so the
    /// image stays unedited.
    fn with_tool(
        &mut self,
        f: impl FnOnce(&mut ToolType, &mut ToolContext<'_>) -> Option<Command>,
    ) -> EditorResult<Option<Command>> {
        let path = self.require_active()?;
        let Some(tool) = self.tool.as_mut() else {
            return Ok(None);
        };
        let entry = self.store.get_mut(&path)?;
        let metrics = metrics_for(&self.config, entry);

        let mut ctx = ToolContext {
            canvas: entry.canvas_mut(),
            overlay: &mut self.overlay,
            settings: &self.settings,
            metrics,
            fonts: &self.fonts,
            config: &self.config,
        };
        let command = f(tool, &mut ctx);

        let untouched = !entry.history().can_undo() && !entry.is_resized();
        if command.is_none() && !tool.is_busy() && untouched {
            entry.current_pixels = None;
        }
        self.canvas_version += 1;
        Ok(command)
    }

    fn apply_opt(&mut self, command: Option<Command>) -> EditorResult<()> {
        match command {
            Some(command) => self.apply(command),
            None => Ok(()),
        }
    }

    /// Commit a tool's result into the active image and its history.
    pub fn apply(&mut self, command: Command) -> EditorResult<()> {
        let path = self.require_active()?;
        let entry = self.store.get_mut(&path)?;
        log::debug!("Applying {:?} to {}", command, path.display());
        match command {
            Command::PushState => entry.push_state(),
            Command::AmendState => entry.amend_state(),
            Command::Crop { rect } => {
                let cropped = raster::crop(entry.canvas(), rect);
                entry.set_canvas(cropped);
                entry.push_state();
                log::info!("Cropped {} to {}", path.display(), entry.current_dimensions());
                if let Some(tool) = self.tool.as_mut() {
                    tool.cancel(&mut self.overlay);
                }
                self.replace_tool(None);
            }
        }
        self.emit_canvas(&path);
        Ok(())
    }

    // ---- History ----

    /// Step back one state. Returns whether anything changed.
    pub fn undo(&mut self) -> EditorResult<bool> {
        self.flush_tool()?;
        let path = self.require_active()?;
        let entry = self.store.get_mut(&path)?;
        let Some(restore) = entry.history.undo() else {
            return Ok(false);
        };
        match restore {
            Restore::Snapshot(state) => entry.restore(state),
            Restore::Original => entry.revert_to_original(),
        }
        self.emit_canvas(&path);
        Ok(true)
    }

    /// Re-apply the last undone state. Returns whether anything changed.
    pub fn redo(&mut self) -> EditorResult<bool> {
        self.flush_tool()?;
        let path = self.require_active()?;
        let entry = self.store.get_mut(&path)?;
        let Some(state) = entry.history.redo() else {
            return Ok(false);
        };
        entry.restore(state);
        self.emit_canvas(&path);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.active_entry().is_some_and(|e| e.history().can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.active_entry().is_some_and(|e| e.history().can_redo())
    }

    // ---- Resize & export ----

    /// Resize the active image to `preset`. Returns whether the size changed.
    pub fn resize_active(&mut self, preset: ResizePreset) -> EditorResult<bool> {
        self.flush_tool()?;
        let path = self.require_active()?;
        let entry = self.store.get_mut(&path)?;
        let from = entry.current_dimensions();
        let resized = resize_single(entry.canvas(), preset);
        if Dimensions::of(&resized) == from {
            log::debug!("{} already fits {:?}", path.display(), preset);
            return Ok(false);
        }
        entry.set_canvas(resized);
        entry.is_resized = true;
        entry.push_state();
        log::info!(
            "Resized {} from {} to {}",
            path.display(),
            from,
            entry.current_dimensions()
        );
        self.emit_canvas(&path);
        Ok(true)
    }

    pub fn encode_settings(&self, quality: Option<u8>) -> EncodeSettings {
        EncodeSettings::new(
            quality.unwrap_or(self.config.default_quality),
            self.config.heif_quality_scale,
        )
    }

    /// Where the app exports an image by default: `<dir>/<export_dir_name>/<name>`
    pub fn default_export_path(&self, path: &Path) -> EditorResult<PathBuf> {
        let entry = self.store.get(path)?;
        let dir = path
            .parent()
            .unwrap_or(Path::new("."))
            .join(&self.config.export_dir_name);
        let name = path.file_name().unwrap_or(path.as_os_str());
        Ok(coerce_extension(&dir.join(name), entry.source_format()))
    }

    /// Encode the active image to `target`. A failure leaves the image and its history
    /// untouched.
    pub fn save_active(&mut self, target: &Path, quality: Option<u8>) -> EditorResult<SaveReport> {
        self.flush_tool()?;
        let path = self.require_active()?;
        let settings = self.encode_settings(quality);
        let entry = self.store.get(&path)?;
        let target = coerce_extension(target, entry.source_format());
        if let Some(dir) = target.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(crate::error::EncodeError::from)?;
        }
        let report = save(entry.canvas(), &target, &settings, entry.source_format(), &path)?;
        if report.original_size.is_none() {
            self.events.emit(EditorEvent::Warning {
                path: Some(path.clone()),
                message: EditorError::SourceFileMissing(path).to_string(),
            });
        }
        Ok(report)
    }

    pub fn batch_resize(&mut self, preset: ResizePreset) -> EditorResult<BatchResize> {
        self.flush_tool()?;
        Ok(BatchResize::new(&self.store, preset))
    }

    pub fn batch_export(
        &mut self,
        dir: impl Into<PathBuf>,
        quality: Option<u8>,
    ) -> EditorResult<BatchExport> {
        self.flush_tool()?;
        let settings = self.encode_settings(quality);
        Ok(BatchExport::new(&self.store, dir, settings))
    }

    /// Advance a batch job by one image.
    pub fn step_batch(&mut self, job: &mut impl BatchJob) -> Option<BatchItem> {
        if let Err(err) = self.flush_tool() {
            log::warn!("Could not flush tool before batch step: {err}");
        }
        let item = job.step(&mut self.store, &self.events)?;
        if matches!(item.outcome, BatchOutcome::Resized { .. })
            && self.active_path.as_deref() == Some(item.path.as_path())
        {
            self.emit_canvas(&item.path);
        }
        Some(item)
    }

    pub fn run_batch(&mut self, job: &mut impl BatchJob) -> Vec<BatchItem> {
        let mut items = Vec::new();
        while let Some(item) = self.step_batch(&mut *job) {
            items.push(item);
        }
        items
    }

    // ---- Helpers ----

    fn require_active(&self) -> EditorResult<PathBuf> {
        match &self.active_path {
            Some(path) => Ok(path.clone()),
            None => {
                log::warn!("Operation needs a selected image");
                Err(EditorError::MissingSelection)
            }
        }
    }

    fn emit_canvas(&mut self, path: &Path) {
        self.canvas_version += 1;
        let Ok(entry) = self.store.get(path) else {
            return;
        };
        let dimensions = entry.current_dimensions();
        self.events.emit(EditorEvent::CanvasChanged {
            path: path.to_owned(),
            width: dimensions.width,
            height: dimensions.height,
            file_size: entry.reported_file_size(),
        });
        self.events.emit(EditorEvent::HistoryChanged {
            can_undo: entry.history().can_undo(),
            can_redo: entry.history().can_redo(),
        });
    }
}

fn metrics_for(config: &EditorConfig, entry: &ImageEntry) -> ViewMetrics {
    ViewMetrics::compute(&config.scaling, entry.view_scale(), entry.reference_width())
}
