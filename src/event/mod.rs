//! Notifications from the editor core to whoever presents it.

mod bus;
mod events;
mod handlers;

pub use bus::EventBus;
pub use events::EditorEvent;
pub use handlers::{EventLog, LoggingHandler};

pub trait EventHandler: Send {
    fn handle_event(&mut self, event: &EditorEvent);
}
