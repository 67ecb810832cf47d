use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::{EditorEvent, EventHandler};

/// Collects events so the presentation layer can drain them once per frame
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<EditorEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler feeding this log; subscribe it to the bus
    pub fn handler(&self) -> Box<dyn EventHandler> {
        Box::new(self.clone())
    }

    pub fn drain(&self) -> Vec<EditorEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn snapshot(&self) -> Vec<EditorEvent> {
        self.events.lock().clone()
    }
}

impl EventHandler for EventLog {
    fn handle_event(&mut self, event: &EditorEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Writes every event to the log at debug level, warnings at warn level
#[derive(Debug, Default)]
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn handle_event(&mut self, event: &EditorEvent) {
        match event {
            EditorEvent::Warning { path: Some(path), message } => {
                log::warn!("{}: {}", path.display(), message)
            }
            EditorEvent::Warning { path: None, message } => log::warn!("{message}"),
            other => log::debug!("{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventBus;

    #[test]
    fn test_log_collects_and_drains() {
        let bus = EventBus::new();
        let log = EventLog::new();
        bus.subscribe(log.handler());
        bus.subscribe(Box::new(LoggingHandler));
        bus.emit(EditorEvent::CanvasCleared);
        bus.emit(EditorEvent::HistoryChanged { can_undo: true, can_redo: false });
        assert_eq!(log.snapshot().len(), 2);
        assert_eq!(log.drain()[0], EditorEvent::CanvasCleared);
        assert!(log.drain().is_empty());
    }
}
