use egui::Ui;

use crate::app::AnnotateApp;
use crate::components::tool_button::ToolButton;
use crate::export::ResizePreset;
use crate::raster::{EraserMode, StampShape};
use crate::tools::ToolKind;

pub fn tools_panel(app: &mut AnnotateApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let active = app.editor.active_tool();
            ui.horizontal_wrapped(|ui| {
                for kind in ToolKind::ALL {
                    let selected = active == Some(kind);
                    if ToolButton::new(kind, selected).show(ui).clicked() {
                        log::info!("Tool selected from UI: {}", kind.label());
                        let result = if selected {
                            app.editor.deactivate_tool()
                        } else {
                            app.editor.activate_tool(kind)
                        };
                        if let Err(err) = result {
                            app.status = err.to_string();
                        }
                    }
                }
            });

            if let Some(kind) = active {
                ui.separator();
                ui.strong(format!("{} options", kind.label()));
                tool_options(app, ui, kind);
            }

            ui.separator();
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(app.editor.can_undo(), egui::Button::new("Undo"))
                    .clicked()
                {
                    app.undo();
                }
                if ui
                    .add_enabled(app.editor.can_redo(), egui::Button::new("Redo"))
                    .clicked()
                {
                    app.redo();
                }
            });
            if let Some(entry) = app.editor.active_entry() {
                let history = entry.history();
                ui.horizontal(|ui| {
                    ui.label(format!("Undo stack size: {}", history.undo_len()));
                    ui.label(format!("Redo stack size: {}", history.redo_len()));
                });
            }

            ui.separator();
            export_section(app, ui);
        });
}

fn tool_options(app: &mut AnnotateApp, ui: &mut Ui, kind: ToolKind) {
    let settings = app.editor.settings_mut();
    match kind {
        ToolKind::Pencil => {
            ui.color_edit_button_srgba(&mut settings.pencil_color);
            ui.add(egui::Slider::new(&mut settings.pencil_width, 1.0..=50.0).text("Width"));
        }
        ToolKind::Eraser => {
            ui.add(egui::Slider::new(&mut settings.eraser_size, 2.0..=100.0).text("Size"));
            ui.horizontal(|ui| {
                ui.selectable_value(&mut settings.eraser_shape, StampShape::Round, "Round");
                ui.selectable_value(&mut settings.eraser_shape, StampShape::Square, "Square");
            });
            let mut transparent = settings.eraser_mode == EraserMode::Transparent;
            if ui.checkbox(&mut transparent, "Erase to transparency").changed() {
                settings.eraser_mode = if transparent {
                    EraserMode::Transparent
                } else {
                    EraserMode::Color(egui::Color32::WHITE)
                };
            }
            if let EraserMode::Color(color) = &mut settings.eraser_mode {
                ui.color_edit_button_srgba(color);
            }
        }
        ToolKind::Highlighter => {
            ui.color_edit_button_srgba(&mut settings.highlighter_color);
            ui.add(egui::Slider::new(&mut settings.highlighter_width, 4.0..=80.0).text("Width"));
        }
        ToolKind::Rectangle | ToolKind::Ellipse | ToolKind::Line | ToolKind::Arrow => {
            ui.color_edit_button_srgba(&mut settings.shape_color);
            ui.add(egui::Slider::new(&mut settings.shape_width, 1.0..=40.0).text("Width"));
        }
        ToolKind::Text => {
            ui.color_edit_button_srgba(&mut settings.font.color);
            ui.add(egui::Slider::new(&mut settings.font.size, 6.0..=200.0).text("Size"));
            ui.checkbox(&mut settings.font.bold, "Bold");
            ui.checkbox(&mut settings.font.italic, "Italic");
        }
        ToolKind::Crop => {
            ui.label("Drag a rectangle to keep");
        }
    }
}

fn export_section(app: &mut AnnotateApp, ui: &mut Ui) {
    ui.strong("Resize & export");

    egui::ComboBox::from_label("Preset")
        .selected_text(app.preferences.preset.label())
        .show_ui(ui, |ui| {
            for preset in ResizePreset::ALL {
                ui.selectable_value(&mut app.preferences.preset, preset, preset.label());
            }
        });
    ui.add(egui::Slider::new(&mut app.preferences.quality, 10..=100).text("JPEG quality"));

    let has_image = app.editor.active_path().is_some();
    let idle = app.batch.is_none();
    ui.horizontal(|ui| {
        if ui
            .add_enabled(has_image && idle, egui::Button::new("Resize"))
            .clicked()
        {
            match app.editor.resize_active(app.preferences.preset) {
                Ok(true) => {}
                Ok(false) => app.status = "Image already fits the preset".to_owned(),
                Err(err) => app.status = err.to_string(),
            }
        }
        if ui
            .add_enabled(has_image && idle, egui::Button::new("Resize all"))
            .clicked()
        {
            app.start_batch_resize();
        }
    });

    ui.horizontal(|ui| {
        if ui
            .add_enabled(has_image && idle, egui::Button::new("Save"))
            .clicked()
        {
            save_active(app);
        }
        if ui
            .add_enabled(has_image && idle, egui::Button::new("Export all"))
            .clicked()
        {
            if let Some(dir) = export_dir(app) {
                app.start_batch_export(dir);
            }
        }
    });

    if let Some(batch) = &app.batch {
        let (done, total) = batch.progress();
        ui.add(egui::ProgressBar::new(done as f32 / total.max(1) as f32).show_percentage());
    }
}

fn export_dir(app: &AnnotateApp) -> Option<std::path::PathBuf> {
    let path = app.editor.active_path()?;
    let parent = path.parent().unwrap_or(std::path::Path::new("."));
    Some(parent.join(&app.editor.config().export_dir_name))
}

fn save_active(app: &mut AnnotateApp) {
    let Some(path) = app.editor.active_path().map(ToOwned::to_owned) else {
        return;
    };
    let result = app
        .editor
        .default_export_path(&path)
        .and_then(|target| app.editor.save_active(&target, Some(app.preferences.quality)));
    app.status = match result {
        Ok(report) => match report.reduction_percent() {
            Some(reduction) => format!(
                "Saved {} ({} KB, {:.0}% smaller)",
                report.target.display(),
                report.bytes_written / 1024,
                reduction
            ),
            None => format!(
                "Saved {} ({} KB)",
                report.target.display(),
                report.bytes_written / 1024
            ),
        },
        Err(err) => err.to_string(),
    };
}
