mod central_panel;
mod images_panel;
mod tools_panel;

pub use central_panel::central_panel;
pub use images_panel::images_panel;
pub use tools_panel::tools_panel;
