mod bus;
mod events;
mod handlers;

pub use bus::EventBus;
pub use events::{EditorEvent, SurfaceEvent};
pub use handlers::LogEventHandler;

pub trait EventHandler {
    fn handle_event(&mut self, event: &EditorEvent);
}
