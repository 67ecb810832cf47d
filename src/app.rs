use std::path::PathBuf;

use egui::{Key, KeyboardShortcut, Modifiers};
use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::event::{EditorEvent, EventLog, LoggingHandler};
use crate::export::{BatchExport, BatchJob, BatchOutcome, BatchResize, ResizePreset};
use crate::file_handler::FileHandler;
use crate::input::InputHandler;
use crate::panels::{central_panel, images_panel, tools_panel};
use crate::state::EditorContext;
use crate::texture_manager::TextureManager;
use crate::tools::ToolSettings;

const UNDO: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Z);
const REDO: KeyboardShortcut =
    KeyboardShortcut::new(Modifiers::COMMAND.plus(Modifiers::SHIFT), Key::Z);
const REDO_ALT: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Y);

/// What survives a restart. Images and their histories don't.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub settings: ToolSettings,
    pub preset: ResizePreset,
    pub quality: u8,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            settings: ToolSettings::default(),
            preset: ResizePreset::Medium,
            quality: 85,
        }
    }
}

/// A batch job advanced one image per frame
pub enum RunningBatch {
    Resize(BatchResize),
    Export(BatchExport),
}

impl RunningBatch {
    fn step(&mut self, editor: &mut EditorContext) -> Option<crate::export::BatchItem> {
        match self {
            Self::Resize(job) => editor.step_batch(job),
            Self::Export(job) => editor.step_batch(job),
        }
    }

    pub fn progress(&self) -> (usize, usize) {
        match self {
            Self::Resize(job) => job.progress(),
            Self::Export(job) => job.progress(),
        }
    }
}

pub struct AnnotateApp {
    pub(crate) editor: EditorContext,
    pub(crate) preferences: Preferences,
    pub(crate) textures: TextureManager,
    pub(crate) input: InputHandler,
    pub(crate) files: FileHandler,
    pub(crate) events: EventLog,
    pub(crate) batch: Option<RunningBatch>,
    /// Last message shown in the status bar
    pub(crate) status: String,
    /// Text field contents of the rename box
    pub(crate) rename_buffer: String,
}

impl AnnotateApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: EditorConfig, paths: Vec<PathBuf>) -> Self {
        let preferences: Preferences = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let mut app = Self::with_preferences(config, preferences);
        app.editor.load_many(paths);
        app
    }

    pub fn with_preferences(config: EditorConfig, preferences: Preferences) -> Self {
        let mut editor = EditorContext::new(config);
        editor.set_settings(preferences.settings.clone());

        let events = EventLog::new();
        editor.subscribe(Box::new(LoggingHandler));
        editor.subscribe(events.handler());

        Self {
            editor,
            preferences,
            textures: TextureManager::new(8),
            input: InputHandler::new(egui::Rect::NOTHING, 1.0),
            files: FileHandler::new(),
            events,
            batch: None,
            status: String::new(),
            rename_buffer: String::new(),
        }
    }

    pub fn editor(&self) -> &EditorContext {
        &self.editor
    }

    pub fn undo(&mut self) {
        if let Err(err) = self.editor.undo() {
            self.status = err.to_string();
        }
    }

    pub fn redo(&mut self) {
        if let Err(err) = self.editor.redo() {
            self.status = err.to_string();
        }
    }

    pub fn start_batch_resize(&mut self) {
        match self.editor.batch_resize(self.preferences.preset) {
            Ok(job) => self.batch = Some(RunningBatch::Resize(job)),
            Err(err) => self.status = err.to_string(),
        }
    }

    pub fn start_batch_export(&mut self, dir: PathBuf) {
        match self.editor.batch_export(dir, Some(self.preferences.quality)) {
            Ok(job) => self.batch = Some(RunningBatch::Export(job)),
            Err(err) => self.status = err.to_string(),
        }
    }

    fn step_batch(&mut self, ctx: &egui::Context) {
        let Some(batch) = self.batch.as_mut() else {
            return;
        };
        match batch.step(&mut self.editor) {
            Some(item) => {
                if let BatchOutcome::Exported(report) = &item.outcome {
                    log::info!("Exported {}", report.target.display());
                }
                ctx.request_repaint();
            }
            None => self.batch = None,
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // Redo first: its shortcut is a superset of undo's
        let (redo, undo, escape) = ctx.input_mut(|i| {
            let redo = i.consume_shortcut(&REDO) || i.consume_shortcut(&REDO_ALT);
            let undo = i.consume_shortcut(&UNDO);
            (redo, undo, i.key_pressed(Key::Escape))
        });
        if redo {
            self.redo();
        } else if undo {
            self.undo();
        }
        if escape && !self.editor.is_editing_text() {
            if let Err(err) = self.editor.deactivate_tool() {
                self.status = err.to_string();
            }
        }
    }

    /// Turn editor events into status bar text
    fn drain_events(&mut self) {
        for event in self.events.drain() {
            match event {
                EditorEvent::Warning { message, .. } => self.status = message,
                EditorEvent::BatchProgress { done, total } => {
                    self.status = format!("Batch: {done}/{total}");
                }
                EditorEvent::ImageRenamed { new, .. } => {
                    self.status = format!("Renamed to {}", new.display());
                }
                EditorEvent::ImageRemoved { path } => {
                    self.status = format!("Removed {}", path.display());
                }
                EditorEvent::CanvasCleared => self.textures.clear_cache(),
                _ => {}
            }
        }
    }
}

impl eframe::App for AnnotateApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.preferences.settings = self.editor.settings().clone();
        eframe::set_value(storage, eframe::APP_KEY, &self.preferences);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.textures.begin_frame();

        self.files.preview_files_being_dropped(ctx);
        if self.files.check_for_dropped_files(ctx) {
            let loaded = self.files.process_dropped_files(&mut self.editor);
            if !loaded.is_empty() {
                self.status = format!("Loaded {} image(s)", loaded.len());
            }
        }

        self.handle_shortcuts(ctx);
        self.step_batch(ctx);

        tools_panel(self, ctx);
        images_panel(self, ctx);
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(entry) = self.editor.active_entry() {
                    ui.label(format!(
                        "{}  {}  {} KB",
                        entry.display_name(),
                        entry.current_dimensions(),
                        entry.reported_file_size() / 1024
                    ));
                    ui.separator();
                }
                ui.label(&self.status);
            });
        });
        central_panel(self, ctx);

        self.drain_events();
    }
}
