use egui::{Pos2, Rect, Vec2, pos2};

mod common;
pub(crate) mod image;
pub(crate) mod text;

pub use common::{DrawableHandle, MIN_STICKER_SIZE, StickerBase, StickerId};
pub(crate) use common::is_valid_size;
pub use image::ImageSticker;
pub use text::{
    ApproxTextLayout, ColorIndex, FontRef, TextAlign, TextLayout, TextSticker, TypefaceStyle,
};

use crate::geometry::{Matrix, hit_testing};

/// Capability shared by every sticker variant.
///
/// Implementors only provide their intrinsic size and access to the shared
/// [`StickerBase`]; all geometry is derived from those.
pub trait Sticker {
    /// Get the sticker type as a string
    fn sticker_type(&self) -> &'static str;

    /// Intrinsic, untransformed content size.
    fn size(&self) -> Vec2;

    fn base(&self) -> &StickerBase;

    fn base_mut(&mut self) -> &mut StickerBase;

    fn id(&self) -> StickerId {
        self.base().id
    }

    fn width(&self) -> f32 {
        self.size().x
    }

    fn height(&self) -> f32 {
        self.size().y
    }

    fn matrix(&self) -> &Matrix {
        &self.base().matrix
    }

    fn set_matrix(&mut self, matrix: &Matrix) {
        self.base_mut().matrix.set(matrix);
    }

    fn matrix_mut(&mut self) -> &mut Matrix {
        &mut self.base_mut().matrix
    }

    fn is_flipped_horizontally(&self) -> bool {
        self.base().flipped_horizontally
    }

    fn set_flipped_horizontally(&mut self, flipped: bool) {
        self.base_mut().flipped_horizontally = flipped;
    }

    fn is_flipped_vertically(&self) -> bool {
        self.base().flipped_vertically
    }

    fn set_flipped_vertically(&mut self, flipped: bool) {
        self.base_mut().flipped_vertically = flipped;
    }

    fn alpha(&self) -> u8 {
        self.base().alpha
    }

    fn set_alpha(&mut self, alpha: u8) {
        self.base_mut().alpha = alpha;
    }

    /// Untransformed corners: top-left, top-right, bottom-left, bottom-right.
    fn bound_points(&self) -> [Pos2; 4] {
        common::bound_points(
            self.size(),
            self.is_flipped_horizontally(),
            self.is_flipped_vertically(),
        )
    }

    /// Corners mapped through the sticker's matrix, in [`Sticker::bound_points`] order.
    fn mapped_bound_points(&self) -> [Pos2; 4] {
        self.matrix().map_points(self.bound_points())
    }

    fn bound(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, self.size())
    }

    fn mapped_bound(&self) -> Rect {
        self.matrix().map_rect(self.bound())
    }

    fn center_point(&self) -> Pos2 {
        pos2(self.width() / 2.0, self.height() / 2.0)
    }

    fn mapped_center_point(&self) -> Pos2 {
        self.matrix().map_point(self.center_point())
    }

    fn current_scale(&self) -> f32 {
        self.matrix().scale()
    }

    fn current_angle(&self) -> f32 {
        self.matrix().rotation()
    }

    fn current_width(&self) -> f32 {
        self.current_scale() * self.width()
    }

    fn current_height(&self) -> f32 {
        self.current_scale() * self.height()
    }

    /// Whether `point` lies inside the transformed sticker.
    fn contains(&self, point: Pos2) -> bool {
        hit_testing::quad_contains(&self.mapped_bound_points(), point)
    }
}

/// Every sticker kind the surface can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum StickerKind {
    Image(ImageSticker),
    Text(TextSticker),
}

impl StickerKind {
    pub fn as_text(&self) -> Option<&TextSticker> {
        match self {
            StickerKind::Text(t) => Some(t),
            StickerKind::Image(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextSticker> {
        match self {
            StickerKind::Text(t) => Some(t),
            StickerKind::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageSticker> {
        match self {
            StickerKind::Image(i) => Some(i),
            StickerKind::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, StickerKind::Text(_))
    }

    /// Same content, transform and flips under a new id.
    pub fn duplicate(&self) -> StickerKind {
        match self {
            StickerKind::Image(i) => StickerKind::Image(i.duplicate()),
            StickerKind::Text(t) => StickerKind::Text(t.duplicate()),
        }
    }
}

impl Sticker for StickerKind {
    fn sticker_type(&self) -> &'static str {
        match self {
            StickerKind::Image(i) => i.sticker_type(),
            StickerKind::Text(t) => t.sticker_type(),
        }
    }

    fn size(&self) -> Vec2 {
        match self {
            StickerKind::Image(i) => i.size(),
            StickerKind::Text(t) => t.size(),
        }
    }

    fn base(&self) -> &StickerBase {
        match self {
            StickerKind::Image(i) => i.base(),
            StickerKind::Text(t) => t.base(),
        }
    }

    fn base_mut(&mut self) -> &mut StickerBase {
        match self {
            StickerKind::Image(i) => i.base_mut(),
            StickerKind::Text(t) => t.base_mut(),
        }
    }
}

/// Factory functions for creating stickers
pub mod factory {
    use super::*;

    pub fn create_image(drawable: DrawableHandle, size: Vec2) -> StickerKind {
        StickerKind::Image(ImageSticker::new(drawable, size))
    }

    pub fn create_text(text: impl Into<String>) -> StickerKind {
        let mut sticker = TextSticker::new();
        sticker.set_text(text);
        StickerKind::Text(sticker)
    }

    /// Text sticker drawn over a host-provided background drawable.
    pub fn create_text_with_background(
        text: impl Into<String>,
        background: DrawableHandle,
        background_size: Vec2,
    ) -> StickerKind {
        let mut sticker = TextSticker::with_background(background, background_size);
        sticker.set_text(text);
        StickerKind::Text(sticker)
    }
}
