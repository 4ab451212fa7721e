use log::{debug, warn};

use super::{ActionValue, Regret, RegretListener};
use crate::error::{RegretError, RegretResult};
use crate::sticker::{ColorIndex, FontRef, StickerId, TypefaceStyle};

/// Undo/redo coordinator for one text sticker.
///
/// Editing UI reports a baseline with `set_previous_*` and every committed
/// change with `set_new_*`. Values restored by undo/redo reach the sticker
/// through the [`RegretListener`] passed to each call.
#[derive(Debug, Clone)]
pub struct RegretManager {
    sticker_id: StickerId,
    regret: Regret,

    previous_text: String,
    previous_typeface: Option<FontRef>,
    previous_text_color: ColorIndex,

    is_undoing: bool,
    bold: bool,
    italic: bool,
    underline: bool,
    strike_through: bool,
}

impl RegretManager {
    pub fn new(sticker_id: StickerId) -> Self {
        Self {
            sticker_id,
            regret: Regret::new(),
            previous_text: String::new(),
            previous_typeface: None,
            previous_text_color: ColorIndex::default(),
            is_undoing: false,
            bold: false,
            italic: false,
            underline: false,
            strike_through: false,
        }
    }

    pub fn sticker_id(&self) -> StickerId {
        self.sticker_id
    }

    pub fn regret(&self) -> &Regret {
        &self.regret
    }

    pub fn set_previous_text(&mut self, text: impl Into<String>) {
        self.previous_text = text.into();
    }

    pub fn set_new_text(&mut self, text: impl Into<String>, listener: &mut dyn RegretListener) {
        if self.is_undoing {
            return;
        }
        let text = text.into();
        let previous = std::mem::replace(&mut self.previous_text, text.clone());
        self.regret
            .add(ActionValue::Text(previous), ActionValue::Text(text), listener);
    }

    pub fn set_previous_typeface(&mut self, typeface: FontRef) {
        self.previous_typeface = Some(typeface);
    }

    /// Fails when no baseline typeface was recorded for this sticker.
    pub fn set_new_typeface(
        &mut self,
        typeface: FontRef,
        listener: &mut dyn RegretListener,
    ) -> RegretResult<()> {
        let previous = self
            .previous_typeface
            .replace(typeface.clone())
            .ok_or(RegretError::MissingTypefaceBaseline)?;
        if self.is_undoing {
            self.previous_typeface = Some(previous);
            return Ok(());
        }
        self.regret.add(
            ActionValue::Typeface(previous),
            ActionValue::Typeface(typeface),
            listener,
        );
        Ok(())
    }

    pub fn set_previous_text_color(&mut self, color: ColorIndex) {
        self.previous_text_color = color;
    }

    pub fn set_new_text_color(&mut self, color: ColorIndex, listener: &mut dyn RegretListener) {
        if self.is_undoing {
            return;
        }
        let previous = std::mem::replace(&mut self.previous_text_color, color);
        self.regret.add(
            ActionValue::TextColor(previous),
            ActionValue::TextColor(color),
            listener,
        );
    }

    /// No-op when there is nothing to undo. Returns whether a step was taken.
    pub fn undo(&mut self, listener: &mut dyn RegretListener) -> bool {
        if !self.regret.can_undo() {
            return false;
        }
        self.is_undoing = true;
        let result = self.regret.undo(listener);
        self.is_undoing = false;
        self.finish_replay(result.is_ok(), "undo")
    }

    /// No-op when there is nothing to redo. Returns whether a step was taken.
    pub fn redo(&mut self, listener: &mut dyn RegretListener) -> bool {
        if !self.regret.can_redo() {
            return false;
        }
        self.is_undoing = true;
        let result = self.regret.redo(listener);
        self.is_undoing = false;
        self.finish_replay(result.is_ok(), "redo")
    }

    pub fn can_undo(&self) -> bool {
        self.regret.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.regret.can_redo()
    }

    pub fn is_undoing(&self) -> bool {
        self.is_undoing
    }

    // The replayed value becomes the baseline of its category so the next
    // edit records the right "from" side.
    fn finish_replay(&mut self, stepped: bool, direction: &str) -> bool {
        if !stepped {
            warn!("{direction} refused for sticker {}", self.sticker_id);
            return false;
        }
        match self.regret.current().map(|action| action.value().clone()) {
            Some(ActionValue::Text(text)) => self.previous_text = text,
            Some(ActionValue::Typeface(font)) => self.previous_typeface = Some(font),
            Some(ActionValue::TextColor(color)) => self.previous_text_color = color,
            None => {}
        }
        debug!("{direction} for sticker {}: {}", self.sticker_id, self.regret);
        true
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.bold = bold;
    }

    pub fn is_italic(&self) -> bool {
        self.italic
    }

    pub fn set_italic(&mut self, italic: bool) {
        self.italic = italic;
    }

    pub fn is_underline(&self) -> bool {
        self.underline
    }

    pub fn set_underline(&mut self, underline: bool) {
        self.underline = underline;
    }

    pub fn is_strike_through(&self) -> bool {
        self.strike_through
    }

    pub fn set_strike_through(&mut self, strike_through: bool) {
        self.strike_through = strike_through;
    }

    /// Typeface style implied by the bold and italic toggles.
    pub fn typeface_style(&self) -> TypefaceStyle {
        TypefaceStyle::from_flags(self.bold, self.italic)
    }
}
