use std::path::PathBuf;

use eframe::egui;

use crate::state::EditorContext;
use crate::store::{extension_of, is_image_extension};

/// Picks up files dropped onto the window and loads them into the editor
#[derive(Debug, Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if new files were dropped this frame
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        ctx.input(|i| {
            if i.raw.dropped_files.is_empty() {
                false
            } else {
                self.dropped_files = i.raw.dropped_files.clone();
                true
            }
        })
    }

    /// Load the queued files. Returns the paths that were loaded.
    pub fn process_dropped_files(&mut self, editor: &mut EditorContext) -> Vec<PathBuf> {
        let mut loaded = Vec::new();
        for file in std::mem::take(&mut self.dropped_files) {
            if !is_image_file(&file) {
                log::warn!("Dropped file is not a supported type: {}", display_name(&file));
                continue;
            }

            let result = match (&file.bytes, &file.path) {
                (Some(bytes), path) => {
                    let path = path.clone().unwrap_or_else(|| PathBuf::from(&file.name));
                    log::info!("Loading dropped image from memory: {} ({} bytes)", path.display(), bytes.len());
                    editor.load_bytes(&path, bytes)
                }
                (None, Some(path)) => {
                    log::info!("Loading dropped image from path: {}", path.display());
                    editor.load(path)
                }
                (None, None) => {
                    log::warn!("Dropped file has no accessible data: {}", display_name(&file));
                    continue;
                }
            };

            match result {
                Ok(path) => loaded.push(path),
                Err(err) => log::error!("Failed to load dropped file: {err}"),
            }
        }
        loaded
    }

    /// Preview files being dragged over the application
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }
        let text = ctx.input(|i| {
            let mut text = "Dropping files:\n".to_owned();
            for file in &i.raw.hovered_files {
                if let Some(path) = &file.path {
                    text += &format!("\n{}", path.display());
                } else {
                    text += "\n(Path not available)";
                }
            }
            text
        });

        let painter =
            ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            text,
            egui::TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}

fn display_name(file: &egui::DroppedFile) -> String {
    match &file.path {
        Some(path) => path.display().to_string(),
        None if !file.name.is_empty() => file.name.clone(),
        None => "unknown".to_owned(),
    }
}

/// Check the extension first; fall back to the MIME type for path-less drops
fn is_image_file(file: &egui::DroppedFile) -> bool {
    let path = file
        .path
        .clone()
        .unwrap_or_else(|| PathBuf::from(&file.name));
    match extension_of(&path) {
        Some(ext) => is_image_extension(&ext),
        None => file.mime.starts_with("image/"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dropped(name: &str, mime: &str) -> egui::DroppedFile {
        egui::DroppedFile {
            name: name.to_owned(),
            mime: mime.to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn test_image_detection() {
        assert!(is_image_file(&dropped("photo.JPG", "")));
        assert!(is_image_file(&dropped("shot.heic", "")));
        assert!(is_image_file(&dropped("clipboard", "image/png")));
        assert!(!is_image_file(&dropped("notes.txt", "text/plain")));
    }
}
