use std::path::PathBuf;

use crate::app::AnnotateApp;

/// Loaded images in load order, with rename and delete for the selected one
pub fn images_panel(app: &mut AnnotateApp, ctx: &egui::Context) {
    egui::SidePanel::right("images_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Images");

            let active = app.editor.active_path().map(ToOwned::to_owned);
            let mut clicked: Option<PathBuf> = None;
            egui::ScrollArea::vertical()
                .max_height(ui.available_height() * 0.6)
                .show(ui, |ui| {
                    for entry in app.editor.store().entries() {
                        let selected = active.as_deref() == Some(entry.source_path());
                        let mut label = format!(
                            "{}\n{}  {} KB",
                            entry.display_name(),
                            entry.current_dimensions(),
                            entry.reported_file_size() / 1024
                        );
                        if entry.is_edited() {
                            label.push_str("  ✎");
                        }
                        if ui.selectable_label(selected, label).clicked() && !selected {
                            clicked = Some(entry.source_path().to_owned());
                        }
                    }
                });

            if let Some(path) = clicked {
                match app.editor.select(&path) {
                    Ok(()) => {
                        app.rename_buffer = app
                            .editor
                            .active_entry()
                            .map(|e| e.display_name().to_owned())
                            .unwrap_or_default();
                    }
                    Err(err) => app.status = err.to_string(),
                }
            }

            let Some(path) = app.editor.active_path().map(ToOwned::to_owned) else {
                return;
            };
            ui.separator();
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut app.rename_buffer);
                if ui.button("Rename").clicked() {
                    if let Err(err) = app.editor.rename(&path, app.rename_buffer.trim()) {
                        app.status = err.to_string();
                    }
                }
            });
            if ui.button("Remove image").clicked() {
                if let Err(err) = app.editor.delete(&path) {
                    app.status = err.to_string();
                }
            }
        });
}
