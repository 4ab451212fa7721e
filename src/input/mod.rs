use egui::Pos2;

mod gestures;
pub use gestures::{GestureConfig, GestureDelta, GestureInterpreter};

/// One active pointer of a touch event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub pos: Pos2,
}

impl TouchPoint {
    pub fn new(id: u64, pos: Pos2) -> Self {
        Self { id, pos }
    }
}

/// What happened in a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    /// First pointer went down.
    Down,
    /// An additional pointer went down.
    PointerDown,
    Move,
    /// A pointer other than the last one went up.
    PointerUp,
    /// Last pointer went up.
    Up,
    /// The platform took the gesture away.
    Cancel,
}

/// A pointer event from the host view, in surface pixel coordinates.
///
/// `pointers` lists every pointer that is down, including the one a
/// `PointerUp` or `Up` reports. `action_index` selects that pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub pointers: Vec<TouchPoint>,
    pub action_index: usize,
    pub time_ms: u64,
}

impl TouchEvent {
    pub fn new(action: TouchAction, pointers: Vec<TouchPoint>, time_ms: u64) -> Self {
        Self {
            action,
            pointers,
            action_index: 0,
            time_ms,
        }
    }

    pub fn down(pos: Pos2, time_ms: u64) -> Self {
        Self::new(TouchAction::Down, vec![TouchPoint::new(0, pos)], time_ms)
    }

    pub fn moved(pos: Pos2, time_ms: u64) -> Self {
        Self::new(TouchAction::Move, vec![TouchPoint::new(0, pos)], time_ms)
    }

    pub fn up(pos: Pos2, time_ms: u64) -> Self {
        Self::new(TouchAction::Up, vec![TouchPoint::new(0, pos)], time_ms)
    }

    pub fn cancel(time_ms: u64) -> Self {
        Self::new(TouchAction::Cancel, Vec::new(), time_ms)
    }

    pub fn with_action_index(mut self, index: usize) -> Self {
        self.action_index = index;
        self
    }

    /// Position of the first pointer.
    pub fn position(&self) -> Option<Pos2> {
        self.pointers.first().map(|p| p.pos)
    }

    pub fn action_pointer(&self) -> Option<&TouchPoint> {
        self.pointers.get(self.action_index)
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }
}
