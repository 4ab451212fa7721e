use egui::{Rect, Vec2, vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

use super::{DrawableHandle, Sticker, StickerBase};

const ELLIPSIS: &str = "\u{2026}";

/// Size of the transparent background used when no drawable is supplied.
pub const DEFAULT_BACKGROUND_SIZE: Vec2 = vec2(600.0, 300.0);
pub const DEFAULT_MIN_TEXT_SIZE: f32 = 18.0;
pub const DEFAULT_MAX_TEXT_SIZE: f32 = 96.0;
/// Amount the auto-fit loop shrinks the text by on every pass.
const RESIZE_STEP: f32 = 2.0;

/// Reference to a font owned by the host's font loader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontRef(pub String);

impl fmt::Display for FontRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Index into the host's colour palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ColorIndex(pub u32);

impl fmt::Display for ColorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TypefaceStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl TypefaceStyle {
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => TypefaceStyle::Normal,
            (true, false) => TypefaceStyle::Bold,
            (false, true) => TypefaceStyle::Italic,
            (true, true) => TypefaceStyle::BoldItalic,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, TypefaceStyle::Bold | TypefaceStyle::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, TypefaceStyle::Italic | TypefaceStyle::BoldItalic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    /// Start of line.
    Normal,
    #[default]
    Center,
    /// End of line.
    Opposite,
}

/// Text measurement used by [`TextSticker::resize_text`].
///
/// The host supplies a measurer backed by its real font engine; the core only
/// needs single-line widths and the natural line height for a text size.
pub trait TextLayout {
    fn measure_width(&self, text: &str, size: f32) -> f32;

    fn line_height(&self, size: f32) -> f32;
}

/// Fixed-advance measurer. Good enough for tests and headless fitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxTextLayout {
    /// Glyph advance as a fraction of the text size.
    pub advance: f32,
    /// Line height as a fraction of the text size.
    pub leading: f32,
}

impl Default for ApproxTextLayout {
    fn default() -> Self {
        Self {
            advance: 0.55,
            leading: 1.2,
        }
    }
}

impl TextLayout for ApproxTextLayout {
    fn measure_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * self.advance
    }

    fn line_height(&self, size: f32) -> f32 {
        size * self.leading
    }
}

/// Sticker rendering styled text over a background drawable.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSticker {
    base: StickerBase,
    text: String,
    typeface: Option<FontRef>,
    style: TypefaceStyle,
    text_color: ColorIndex,
    underline: bool,
    strike_through: bool,
    alignment: TextAlign,
    shadow_radius: f32,
    blur_radius: f32,
    text_size: f32,
    min_text_size: f32,
    max_text_size: f32,
    line_spacing_multiplier: f32,
    line_spacing_extra: f32,
    background: Option<DrawableHandle>,
    background_size: Vec2,
    text_rect: Rect,
}

impl TextSticker {
    pub fn new() -> Self {
        Self {
            base: StickerBase::new(),
            text: String::new(),
            typeface: None,
            style: TypefaceStyle::Normal,
            text_color: ColorIndex::default(),
            underline: false,
            strike_through: false,
            alignment: TextAlign::Center,
            shadow_radius: 0.0,
            blur_radius: 0.0,
            text_size: DEFAULT_MAX_TEXT_SIZE,
            min_text_size: DEFAULT_MIN_TEXT_SIZE,
            max_text_size: DEFAULT_MAX_TEXT_SIZE,
            line_spacing_multiplier: 1.0,
            line_spacing_extra: 0.0,
            background: None,
            background_size: DEFAULT_BACKGROUND_SIZE,
            text_rect: Rect::from_min_size(egui::Pos2::ZERO, DEFAULT_BACKGROUND_SIZE),
        }
    }

    pub fn with_background(background: DrawableHandle, size: Vec2) -> Self {
        let mut sticker = Self::new();
        sticker.set_background(background, size, None);
        sticker
    }

    /// Set the background drawable. `region` limits where text is laid out
    /// and defaults to the whole drawable.
    pub fn set_background(&mut self, background: DrawableHandle, size: Vec2, region: Option<Rect>) {
        self.background = Some(background);
        self.background_size = size;
        self.text_rect = region.unwrap_or_else(|| Rect::from_min_size(egui::Pos2::ZERO, size));
    }

    pub fn background(&self) -> Option<DrawableHandle> {
        self.background
    }

    pub fn text_rect(&self) -> Rect {
        self.text_rect
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn typeface(&self) -> Option<&FontRef> {
        self.typeface.as_ref()
    }

    pub fn set_typeface(&mut self, typeface: Option<FontRef>) {
        self.typeface = typeface;
    }

    pub fn style(&self) -> TypefaceStyle {
        self.style
    }

    pub fn set_style(&mut self, style: TypefaceStyle) {
        self.style = style;
    }

    pub fn text_color(&self) -> ColorIndex {
        self.text_color
    }

    pub fn set_text_color(&mut self, color: ColorIndex) {
        self.text_color = color;
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

    pub fn alignment(&self) -> TextAlign {
        self.alignment
    }

    pub fn set_alignment(&mut self, alignment: TextAlign) {
        self.alignment = alignment;
    }

    pub fn shadow_radius(&self) -> f32 {
        self.shadow_radius
    }

    pub fn set_shadow(&mut self, radius: f32) {
        self.shadow_radius = radius.max(0.0);
    }

    pub fn blur_radius(&self) -> f32 {
        self.blur_radius
    }

    pub fn set_blur(&mut self, radius: f32) {
        self.blur_radius = radius.max(0.0);
    }

    /// Text size chosen by the last [`TextSticker::resize_text`].
    pub fn text_size(&self) -> f32 {
        self.text_size
    }

    pub fn min_text_size(&self) -> f32 {
        self.min_text_size
    }

    pub fn max_text_size(&self) -> f32 {
        self.max_text_size
    }

    pub fn set_min_text_size(&mut self, size: f32) {
        self.min_text_size = size;
    }

    /// Also resets the current size, mirroring a fresh fit.
    pub fn set_max_text_size(&mut self, size: f32) {
        self.max_text_size = size;
        self.text_size = size;
    }

    pub fn line_spacing(&self) -> (f32, f32) {
        (self.line_spacing_extra, self.line_spacing_multiplier)
    }

    pub fn set_line_spacing(&mut self, extra: f32, multiplier: f32) {
        self.line_spacing_extra = extra;
        self.line_spacing_multiplier = multiplier;
    }

    /// Fit the text into the text region.
    ///
    /// Starts at the maximum size and shrinks in 2px steps until the wrapped
    /// text fits or the minimum size is reached. Text that still overflows at
    /// the minimum size is cut after the last fully visible line and ends
    /// with an ellipsis.
    pub fn resize_text(&mut self, layout: &dyn TextLayout) {
        let available_width = self.text_rect.width();
        let available_height = self.text_rect.height();
        if self.text.is_empty()
            || available_width <= 0.0
            || available_height <= 0.0
            || self.max_text_size <= 0.0
        {
            return;
        }

        let mut target_size = self.max_text_size;
        let mut target_height = self.text_height(layout, &self.text, available_width, target_size);
        while target_height > available_height && target_size > self.min_text_size {
            target_size = (target_size - RESIZE_STEP).max(self.min_text_size);
            target_height = self.text_height(layout, &self.text, available_width, target_size);
        }

        if target_size == self.min_text_size && target_height > available_height {
            self.ellipsize(layout, available_width, available_height, target_size);
        }
        self.text_size = target_size;
    }

    fn ellipsize(&mut self, layout: &dyn TextLayout, available_width: f32, available_height: f32, size: f32) {
        let lines = wrap_lines(layout, &self.text, available_width, size);
        if lines.is_empty() {
            return;
        }
        let pitch = self.line_pitch(layout, size);
        let cut_line = if pitch > 0.0 {
            ((available_height / pitch).floor() as usize).min(lines.len() - 1)
        } else {
            0
        };
        // the line at the cut would be clipped, keep the one before it
        let Some(last_line) = cut_line.checked_sub(1) else {
            return;
        };

        let line = lines[last_line].clone();
        let ellipsis_width = layout.measure_width(ELLIPSIS, size);
        let mut end = line.end;
        while end > line.start
            && available_width < layout.measure_width(&self.text[line.start..end], size) + ellipsis_width
        {
            end = previous_char_boundary(&self.text, end);
        }
        let trimmed = format!("{}{}", &self.text[..end], ELLIPSIS);
        self.text = trimmed;
    }

    fn line_pitch(&self, layout: &dyn TextLayout, size: f32) -> f32 {
        layout.line_height(size) * self.line_spacing_multiplier + self.line_spacing_extra
    }

    fn text_height(&self, layout: &dyn TextLayout, text: &str, width: f32, size: f32) -> f32 {
        let count = wrap_lines(layout, text, width, size).len();
        if count == 0 {
            return 0.0;
        }
        count as f32 * layout.line_height(size) * self.line_spacing_multiplier
            + (count - 1) as f32 * self.line_spacing_extra
    }

    pub(crate) fn duplicate(&self) -> Self {
        Self {
            base: self.base.duplicate(),
            ..self.clone()
        }
    }
}

impl Default for TextSticker {
    fn default() -> Self {
        Self::new()
    }
}

impl Sticker for TextSticker {
    fn sticker_type(&self) -> &'static str {
        "text"
    }

    fn size(&self) -> Vec2 {
        self.background_size
    }

    fn base(&self) -> &StickerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut StickerBase {
        &mut self.base
    }
}

fn previous_char_boundary(text: &str, index: usize) -> usize {
    text[..index]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Greedy word wrap. Returns the byte range of every line; breaking
/// whitespace and newlines are not part of any range.
pub(crate) fn wrap_lines(layout: &dyn TextLayout, text: &str, max_width: f32, size: f32) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut last_space: Option<usize> = None;

    for (i, c) in text.char_indices() {
        if c == '\n' {
            lines.push(line_start..i);
            line_start = i + 1;
            last_space = None;
            continue;
        }
        if c == ' ' {
            last_space = Some(i);
        }

        let end = i + c.len_utf8();
        if i > line_start && layout.measure_width(&text[line_start..end], size) > max_width {
            match last_space {
                Some(space) if space > line_start => {
                    lines.push(line_start..space);
                    line_start = space + 1;
                }
                _ => {
                    lines.push(line_start..i);
                    line_start = i;
                }
            }
            last_space = text[line_start..end].rfind(' ').map(|p| p + line_start);
        }
    }
    if line_start < text.len() || lines.is_empty() || text.ends_with('\n') {
        lines.push(line_start..text.len());
    }
    lines
}
