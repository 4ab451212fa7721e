use log::{debug, info, warn};

use crate::event::{EditorEvent, EventHandler, SurfaceEvent};

/// Writes every editor event to the log.
#[derive(Debug, Default)]
pub struct LogEventHandler;

impl EventHandler for LogEventHandler {
    fn handle_event(&mut self, event: &EditorEvent) {
        match event {
            EditorEvent::Surface(SurfaceEvent::LimitReached) => warn!("sticker limit reached"),
            EditorEvent::Surface(SurfaceEvent::Added(id)) => info!("sticker {id} added"),
            EditorEvent::Surface(SurfaceEvent::Deleted(_)) => info!("sticker deleted"),
            other => debug!("{other:?}"),
        }
    }
}

impl<F> EventHandler for F
where
    F: FnMut(&EditorEvent),
{
    fn handle_event(&mut self, event: &EditorEvent) {
        (*self)(event)
    }
}
