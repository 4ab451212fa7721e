use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sticker::{ColorIndex, FontRef};

/// Category of an undoable edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKey {
    Text,
    Typeface,
    TextColor,
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKey::Text => "TEXT",
            ActionKey::Typeface => "TYPEFACE",
            ActionKey::TextColor => "TEXT_COLOR",
        };
        f.write_str(name)
    }
}

/// Value carried by an edit, one variant per [`ActionKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionValue {
    Text(String),
    Typeface(FontRef),
    TextColor(ColorIndex),
}

impl ActionValue {
    pub fn key(&self) -> ActionKey {
        match self {
            ActionValue::Text(_) => ActionKey::Text,
            ActionValue::Typeface(_) => ActionKey::Typeface,
            ActionValue::TextColor(_) => ActionKey::TextColor,
        }
    }
}

impl fmt::Display for ActionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionValue::Text(text) => f.write_str(text),
            ActionValue::Typeface(font) => write!(f, "{font}"),
            ActionValue::TextColor(color) => write!(f, "{color}"),
        }
    }
}

/// One recorded edit. The category always matches the value's variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    value: ActionValue,
}

impl Action {
    pub fn new(value: ActionValue) -> Self {
        Self { value }
    }

    pub fn key(&self) -> ActionKey {
        self.value.key()
    }

    pub fn value(&self) -> &ActionValue {
        &self.value
    }
}

impl From<ActionValue> for Action {
    fn from(value: ActionValue) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key(), self.value)
    }
}
