use std::fmt;

use super::{Action, ActionValue, RegretListener, UndoRedoList};
use crate::error::HistoryResult;

/// An [`UndoRedoList`] that reports every change to a [`RegretListener`].
#[derive(Debug, Clone, Default)]
pub struct Regret {
    list: UndoRedoList,
}

impl Regret {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, previous: ActionValue, new: ActionValue, listener: &mut dyn RegretListener) {
        self.list.add(previous, new);
        self.notify_can_do(listener);
    }

    /// Step back and hand the restored action to `listener.on_do`.
    pub fn undo(&mut self, listener: &mut dyn RegretListener) -> HistoryResult<()> {
        let action = self.list.undo()?;
        listener.on_do(action);
        self.notify_can_do(listener);
        Ok(())
    }

    pub fn redo(&mut self, listener: &mut dyn RegretListener) -> HistoryResult<()> {
        let action = self.list.redo()?;
        listener.on_do(action);
        self.notify_can_do(listener);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.list.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.list.can_redo()
    }

    pub fn current(&self) -> Option<&Action> {
        self.list.current()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    fn notify_can_do(&self, listener: &mut dyn RegretListener) {
        listener.on_can_do(self.can_undo(), self.can_redo());
    }
}

impl fmt::Display for Regret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.list)
    }
}
