//! Undo/redo of text sticker edits.

mod action;
mod history;
mod manager;
mod tracker;

pub use action::{Action, ActionKey, ActionValue};
pub use history::UndoRedoList;
pub use manager::RegretManager;
pub use tracker::Regret;

/// Receives the effects of recorded edits.
pub trait RegretListener {
    /// Apply a value restored by undo or redo.
    fn on_do(&mut self, action: &Action);

    /// Called after every add, undo and redo.
    fn on_can_do(&mut self, can_undo: bool, can_redo: bool);
}
