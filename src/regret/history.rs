use log::debug;
use std::fmt;

use super::{Action, ActionValue};
use crate::error::{HistoryError, HistoryResult};

/// Linear history of edits across several categories.
///
/// The chain is stored contiguously: the node before index `i` is `i - 1` and
/// the node after it is `i + 1`, so no links have to be kept in sync. The
/// cursor sits on the node holding the value most recently applied.
///
/// An edit of a new category is recorded as a pair `[previous, new]`, while
/// consecutive edits of the same category extend the current run with a
/// single node. Crossing from one category's nodes into another's takes two
/// steps, so every undo or redo lands on a node that restores exactly one
/// value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UndoRedoList {
    nodes: Vec<Action>,
    pointer: Option<usize>,
}

impl UndoRedoList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change from `previous` to `new`.
    ///
    /// Any redo chain after the cursor is discarded first.
    pub fn add(&mut self, previous: ActionValue, new: ActionValue) {
        debug_assert_eq!(previous.key(), new.key(), "an edit never changes category");
        let key = new.key();

        match self.pointer {
            Some(pointer) if pointer > 0 => {
                self.nodes.truncate(pointer + 1);
                let continues_run =
                    self.nodes[pointer].key() == key || self.nodes[pointer - 1].key() == key;
                if !continues_run {
                    self.nodes.push(Action::new(previous));
                }
                self.nodes.push(Action::new(new));
            }
            // empty, or everything has been undone: start a fresh chain
            _ => {
                self.nodes.clear();
                self.nodes.push(Action::new(previous));
                self.nodes.push(Action::new(new));
            }
        }
        self.pointer = Some(self.nodes.len() - 1);
        debug!("history add {key}: {} nodes", self.nodes.len());
    }

    /// Step back and return the action to apply.
    pub fn undo(&mut self) -> HistoryResult<&Action> {
        let from = self.pointer.filter(|&p| p > 0).ok_or(HistoryError::NoPreviousState)?;
        let mut to = from - 1;
        if to > 0 && self.nodes[to].key() != self.nodes[from].key() {
            to -= 1;
        }
        self.pointer = Some(to);
        Ok(&self.nodes[to])
    }

    /// Step forward and return the action to apply.
    pub fn redo(&mut self) -> HistoryResult<&Action> {
        let from = self
            .pointer
            .filter(|&p| p + 1 < self.nodes.len())
            .ok_or(HistoryError::NoNextState)?;
        let mut to = from + 1;
        if to + 1 < self.nodes.len() && self.nodes[to].key() != self.nodes[from].key() {
            to += 1;
        }
        self.pointer = Some(to);
        Ok(&self.nodes[to])
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.pointer, Some(p) if p > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.pointer, Some(p) if p + 1 < self.nodes.len())
    }

    /// Action under the cursor.
    pub fn current(&self) -> Option<&Action> {
        self.pointer.map(|p| &self.nodes[p])
    }

    /// Cursor position counted from the head, `None` when empty.
    pub fn position(&self) -> Option<usize> {
        self.pointer
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.pointer = None;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.nodes.iter()
    }
}

impl fmt::Display for UndoRedoList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, action) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{action}")?;
        }
        f.write_str("}")
    }
}
