use egui::Vec2;

use super::{DrawableHandle, Sticker, StickerBase};

/// Sticker backed by decoded image content (emoji, clip art, photos).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSticker {
    base: StickerBase,
    drawable: DrawableHandle,
    size: Vec2,
}

impl ImageSticker {
    pub fn new(drawable: DrawableHandle, size: Vec2) -> Self {
        Self {
            base: StickerBase::new(),
            drawable,
            size,
        }
    }

    pub fn drawable(&self) -> DrawableHandle {
        self.drawable
    }

    /// Swap the content, keeping transform and flips.
    pub fn set_drawable(&mut self, drawable: DrawableHandle, size: Vec2) {
        self.drawable = drawable;
        self.size = size;
    }

    pub(crate) fn duplicate(&self) -> Self {
        Self {
            base: self.base.duplicate(),
            drawable: self.drawable,
            size: self.size,
        }
    }
}

impl Sticker for ImageSticker {
    fn sticker_type(&self) -> &'static str {
        "image"
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn base(&self) -> &StickerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut StickerBase {
        &mut self.base
    }
}
