#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod command;
pub mod components;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod file_handler;
pub mod geometry;
pub mod history;
pub mod id_generator;
pub mod input;
pub mod overlay;
pub mod panels;
pub mod raster;
pub mod shape;
pub mod state;
pub mod store;
pub mod texture_manager;
pub mod tools;

pub use app::AnnotateApp;
pub use command::Command;
pub use config::EditorConfig;
pub use error::{EditorError, EditorResult};
pub use event::{EditorEvent, EventHandler};
pub use export::{ResizePreset, SaveReport};
pub use input::{InputEvent, InputLocation};
pub use state::EditorContext;
pub use store::{ImageEntry, ImageStore};
pub use tools::{Tool, ToolKind, ToolSettings};
