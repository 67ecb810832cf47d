#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use eframe_annotate::EditorContext;
use egui::pos2;
use image::{Rgba, RgbaImage};

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// Temporary directory removed on drop
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "annotate_{}_{}_{}",
            name,
            std::process::id(),
            NEXT_DIR.fetch_add(1, Ordering::SeqCst)
        ));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a solid white PNG
    pub fn png(&self, name: &str, width: u32, height: u32) -> PathBuf {
        let path = self.path.join(name);
        RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
            .save(&path)
            .unwrap();
        path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Drag the active tool from `from` to `to`
pub fn drag(editor: &mut EditorContext, from: (f32, f32), to: (f32, f32)) {
    editor.pointer_down(pos2(from.0, from.1)).unwrap();
    editor.pointer_move(pos2(to.0, to.1)).unwrap();
    editor.pointer_up(pos2(to.0, to.1)).unwrap();
}

pub fn canvas(editor: &EditorContext) -> RgbaImage {
    editor.canvas().unwrap().clone()
}
