use std::cell::RefCell;

use crate::event::{EditorEvent, EventHandler};

/// Broadcasts editor events to every subscribed handler, in subscription order
pub struct EventBus {
    handlers: RefCell<Vec<Box<dyn EventHandler>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.len()))
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.handlers.borrow_mut().push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn emit(&self, event: EditorEvent) {
        log::trace!("Event: {:?}", event);
        // Handlers must not emit while being notified
        let Ok(mut handlers) = self.handlers.try_borrow_mut() else {
            log::error!("Re-entrant emit dropped: {:?}", event);
            return;
        };
        for handler in handlers.iter_mut() {
            handler.handle_event(&event);
        }
    }
}
