use crate::sticker::{StickerId, StickerKind};

/// What the sticker surface reports after handling input or an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Added(StickerId),
    /// The removed sticker, handed back to the owner.
    Deleted(StickerKind),
    Clicked(StickerId),
    DoubleTapped(StickerId),
    DragFinished(StickerId),
    ZoomFinished(StickerId),
    Flipped(StickerId),
    /// First finger landed on a sticker or on one of its icons.
    TouchedDown {
        id: StickerId,
        /// The press hit the edit icon.
        is_update: bool,
        /// The press hit the duplicate icon.
        is_duplicate: bool,
    },
    Replaced {
        old: StickerId,
        new: StickerId,
    },
    /// Every sticker was removed at once.
    Cleared,
    /// An add was refused because the surface is full.
    LimitReached,
}

impl SurfaceEvent {
    pub fn sticker_id(&self) -> Option<StickerId> {
        use crate::sticker::Sticker;
        match self {
            SurfaceEvent::Added(id)
            | SurfaceEvent::Clicked(id)
            | SurfaceEvent::DoubleTapped(id)
            | SurfaceEvent::DragFinished(id)
            | SurfaceEvent::ZoomFinished(id)
            | SurfaceEvent::Flipped(id)
            | SurfaceEvent::TouchedDown { id, .. } => Some(*id),
            SurfaceEvent::Replaced { new, .. } => Some(*new),
            SurfaceEvent::Deleted(sticker) => Some(sticker.id()),
            SurfaceEvent::Cleared | SurfaceEvent::LimitReached => None,
        }
    }
}

/// Events the editor broadcasts to the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    Surface(SurfaceEvent),
    /// Undo/redo availability of a sticker's history changed.
    HistoryChanged {
        id: StickerId,
        can_undo: bool,
        can_redo: bool,
    },
    /// The host should open its text editor for this sticker.
    EditRequested(StickerId),
    Duplicated {
        source: StickerId,
        duplicate: StickerId,
    },
}
