#![warn(clippy::all, rust_2018_idioms)]

use std::path::PathBuf;

use eframe_annotate::{AnnotateApp, EditorConfig};

/// Environment variable naming a JSON config file
const CONFIG_ENV: &str = "ANNOTATE_CONFIG";

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let config = EditorConfig::load_or_default(config_path.as_deref());
    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "Annotate",
        native_options,
        Box::new(|cc| Ok(Box::new(AnnotateApp::new(cc, config, paths)))),
    )
}
