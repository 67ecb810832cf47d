use egui::{pos2, vec2, Color32, Pos2, Rect, Sense, Stroke};

use crate::app::AnnotateApp;
use crate::input::{InputEvent, InputHandler};
use crate::overlay::OverlayItem;
use crate::shape::{FontSpec, Shape, ShapeGeometry, ShapeKind};
use crate::texture_manager::canvas_to_color_image;
use crate::tools::{TextEdit, Tool};

/// Distance between the format bar and the top of the text box, in screen pixels
const FORMAT_BAR_GAP: f32 = 36.0;

pub fn central_panel(app: &mut AnnotateApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let available = ui.available_rect_before_wrap();
        let Some(entry) = app.editor.active_entry() else {
            ui.centered_and_justified(|ui| {
                ui.label("Drop images here or pass them on the command line");
            });
            return;
        };

        // Fit the canvas into the panel
        let dims = entry.current_dimensions();
        let size = vec2(dims.width as f32, dims.height as f32);
        let view_scale = (available.width() / size.x).min(available.height() / size.y);
        let canvas_rect = Rect::from_center_size(available.center(), size * view_scale);
        let image_id = entry.id();

        let texture = app.textures.get_or_create_texture(
            image_id,
            app.editor.canvas_version(),
            || canvas_to_color_image(entry.canvas()),
            ctx,
        );
        match texture {
            Ok(texture) => {
                ui.painter().image(
                    texture,
                    canvas_rect,
                    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            Err(err) => log::error!("Cannot show canvas: {err}"),
        }

        if let Err(err) = app.editor.set_view_scale(view_scale) {
            log::debug!("View scale not applied: {err}");
        }
        app.input.set_view(canvas_rect, view_scale);

        let response = ui.allocate_rect(canvas_rect, Sense::click_and_drag());
        let canvas_hovered = response.hovered();
        let version = app.editor.canvas_version();
        for event in app.input.process_input(ctx, app.editor.is_editing_text()) {
            // Presses on floating windows above the canvas are not meant for the tool
            if matches!(event, InputEvent::PointerDown { .. }) && !canvas_hovered {
                continue;
            }
            if let Err(err) = app.editor.handle_input(event) {
                log::debug!("Input not handled: {err}");
            }
        }

        let painter = ui.painter_at(available);
        let hover = response.hover_pos();
        let mut format_bar = None;
        for item in app.editor.overlay().iter() {
            match item {
                OverlayItem::Shape(shape) => paint_shape(&painter, &app.input, shape, view_scale),
                OverlayItem::Outline(rect) => {
                    let rect = to_screen_rect(&app.input, *rect);
                    let corners = [
                        rect.left_top(),
                        rect.right_top(),
                        rect.right_bottom(),
                        rect.left_bottom(),
                        rect.left_top(),
                    ];
                    painter.extend(egui::Shape::dashed_line(
                        &corners,
                        Stroke::new(1.0, Color32::from_rgb(33, 150, 243)),
                        6.0,
                        4.0,
                    ));
                }
                OverlayItem::Handle { rect, handle } => {
                    let rect = to_screen_rect(&app.input, *rect);
                    if hover.is_some_and(|pos| rect.expand(2.0).contains(pos)) {
                        ctx.set_cursor_icon(handle.cursor_icon());
                    }
                    painter.rect_filled(rect, 1.0, Color32::WHITE);
                    painter.rect_stroke(rect, 1.0, Stroke::new(1.0, Color32::from_rgb(33, 150, 243)));
                }
                OverlayItem::Shade(rect) => {
                    painter.rect_filled(to_screen_rect(&app.input, *rect), 0.0, Color32::from_black_alpha(128));
                }
                OverlayItem::CropBand(rect) => {
                    painter.rect_stroke(to_screen_rect(&app.input, *rect), 0.0, Stroke::new(1.0, Color32::WHITE));
                }
                OverlayItem::FormatBar { anchor } => format_bar = Some(*anchor),
            }
        }

        if let Some(anchor) = format_bar {
            let screen = app.input.to_screen(anchor) - vec2(0.0, FORMAT_BAR_GAP);
            show_format_bar(app, ctx, screen);
        }

        // The texture above was built before this frame's input
        if app.editor.canvas_version() != version || app.editor.tool().is_some_and(Tool::is_busy) {
            ctx.request_repaint();
        }
    });
}

fn to_screen_rect(input: &InputHandler, rect: Rect) -> Rect {
    Rect::from_min_max(input.to_screen(rect.min), input.to_screen(rect.max))
}

/// Live preview of a shape that isn't committed to the canvas yet
fn paint_shape(painter: &egui::Painter, input: &InputHandler, shape: &Shape, view_scale: f32) {
    let style = shape.style();
    let stroke = Stroke::new(style.width * view_scale, style.color);
    match shape.geometry() {
        ShapeGeometry::Box { a, b } => {
            let rect = Rect::from_two_pos(input.to_screen(*a), input.to_screen(*b));
            if shape.kind() == ShapeKind::Ellipse {
                painter.add(egui::Shape::ellipse_stroke(rect.center(), rect.size() / 2.0, stroke));
            } else {
                painter.rect_stroke(rect, 0.0, stroke);
            }
        }
        ShapeGeometry::Segment { start, end } => {
            let start = input.to_screen(*start);
            let end = input.to_screen(*end);
            painter.line_segment([start, end], stroke);
            if let Some([left, right]) = shape.arrowhead() {
                painter.line_segment([end, input.to_screen(left)], stroke);
                painter.line_segment([end, input.to_screen(right)], stroke);
            }
        }
        ShapeGeometry::Path { points } => {
            let points: Vec<Pos2> = points.iter().map(|p| input.to_screen(*p)).collect();
            painter.add(egui::Shape::line(points, stroke));
        }
        ShapeGeometry::Text {
            anchor,
            content,
            font,
            size,
        } => {
            let origin = input.to_screen(*anchor);
            let galley = painter.layout(
                content.clone(),
                egui::FontId::proportional(font.size * view_scale),
                font.color,
                size.x * view_scale,
            );
            let frame = Rect::from_min_size(origin, *size * view_scale);
            painter.rect_stroke(frame, 0.0, Stroke::new(1.0, Color32::from_gray(160)));
            painter.galley(origin, galley, font.color);
        }
    }
}

/// Floating font controls above the text box being typed
fn show_format_bar(app: &mut AnnotateApp, ctx: &egui::Context, pos: Pos2) {
    let Some(mut font) = app.editor.editing_text().and_then(Shape::font).cloned() else {
        return;
    };
    let before = font.clone();
    let families: Vec<String> = app.editor.fonts().families().map(str::to_owned).collect();

    egui::Area::new(egui::Id::new("text_format_bar"))
        .fixed_pos(pos)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    egui::ComboBox::from_id_salt("font_family")
                        .selected_text(font.family.as_str())
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut font.family, "Default".to_owned(), "Default");
                            for family in &families {
                                ui.selectable_value(&mut font.family, family.clone(), family.as_str());
                            }
                        });
                    ui.add(egui::DragValue::new(&mut font.size).range(6.0..=200.0).suffix(" pt"));
                    ui.toggle_value(&mut font.bold, egui::RichText::new("B").strong());
                    ui.toggle_value(&mut font.italic, egui::RichText::new("I").italics());
                    ui.color_edit_button_srgba(&mut font.color);
                });
            });
        });

    if font != before {
        // New boxes pick up the style; their size keeps following the view
        let size = app.editor.settings().font.size;
        app.editor.settings_mut().font = FontSpec {
            size,
            ..font.clone()
        };
        if let Err(err) = app.editor.edit_text(TextEdit::Format(font)) {
            log::debug!("Format not applied: {err}");
        }
    }
}
