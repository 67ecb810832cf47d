use egui::{Context, Key, Modifiers, PointerButton, Pos2, Rect};

/// Where an input event occurred
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputLocation {
    /// Position in canvas (image pixel) coordinates
    pub position: Pos2,
    /// Whether the position lies on the displayed canvas
    pub is_in_canvas: bool,
}

impl InputLocation {
    pub fn at(position: Pos2) -> Self {
        Self {
            position,
            is_in_canvas: true,
        }
    }
}

/// Input forwarded from the presentation layer to the editor
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { location: InputLocation },
    PointerMove { location: InputLocation },
    PointerUp { location: InputLocation },
    KeyDown { key: Key, modifiers: Modifiers },
    /// Typed text
    Text(String),
}

/// Converts raw egui input over the canvas widget into `InputEvent`s in canvas space
#[derive(Debug, Clone)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    /// Screen rectangle the canvas is drawn into
    canvas_rect: Rect,
    /// Screen pixels per canvas pixel
    view_scale: f32,
}

impl InputHandler {
    pub fn new(canvas_rect: Rect, view_scale: f32) -> Self {
        Self {
            last_pointer_pos: None,
            canvas_rect,
            view_scale,
        }
    }

    /// Update the transform, e.g. after the window or the image changed
    pub fn set_view(&mut self, canvas_rect: Rect, view_scale: f32) {
        self.canvas_rect = canvas_rect;
        self.view_scale = view_scale;
    }

    pub fn to_canvas(&self, screen: Pos2) -> Pos2 {
        let scale = if self.view_scale > 0.0 { self.view_scale } else { 1.0 };
        Pos2::ZERO + (screen - self.canvas_rect.min) / scale
    }

    pub fn to_screen(&self, canvas: Pos2) -> Pos2 {
        self.canvas_rect.min + canvas.to_vec2() * self.view_scale
    }

    fn make_location(&self, screen: Pos2) -> InputLocation {
        InputLocation {
            position: self.to_canvas(screen),
            is_in_canvas: self.canvas_rect.contains(screen),
        }
    }

    /// Pointer events are only produced for the primary button. Presses outside the
    /// canvas are ignored; moves and releases are always forwarded so drags can leave it.
    pub fn process_input(&mut self, ctx: &Context, text_focus: bool) -> Vec<InputEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            let pos = input.pointer.hover_pos().or(self.last_pointer_pos);

            if input.pointer.button_pressed(PointerButton::Primary) {
                if let Some(pos) = pos.filter(|p| self.canvas_rect.contains(*p)) {
                    events.push(InputEvent::PointerDown {
                        location: self.make_location(pos),
                    });
                }
            }

            if let Some(pos) = input.pointer.hover_pos() {
                if Some(pos) != self.last_pointer_pos
                    && input.pointer.button_down(PointerButton::Primary)
                {
                    events.push(InputEvent::PointerMove {
                        location: self.make_location(pos),
                    });
                }
                self.last_pointer_pos = Some(pos);
            }

            if input.pointer.button_released(PointerButton::Primary) {
                if let Some(pos) = pos {
                    events.push(InputEvent::PointerUp {
                        location: self.make_location(pos),
                    });
                }
            }

            if !text_focus {
                return;
            }
            for event in &input.raw.events {
                match event {
                    egui::Event::Text(text) => events.push(InputEvent::Text(text.clone())),
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => events.push(InputEvent::KeyDown {
                        key: *key,
                        modifiers: *modifiers,
                    }),
                    _ => {}
                }
            }
        });

        events
    }
}
