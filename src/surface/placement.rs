use egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};

use crate::geometry::Matrix;
use crate::sticker::{Sticker, StickerKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HorizontalPosition {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalPosition {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Where a new sticker lands on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub horizontal: HorizontalPosition,
    pub vertical: VerticalPosition,
}

impl Position {
    pub const CENTER: Position = Position::new(HorizontalPosition::Center, VerticalPosition::Center);
    pub const TOP: Position = Position::new(HorizontalPosition::Center, VerticalPosition::Top);
    pub const BOTTOM: Position = Position::new(HorizontalPosition::Center, VerticalPosition::Bottom);
    pub const LEFT: Position = Position::new(HorizontalPosition::Left, VerticalPosition::Center);
    pub const RIGHT: Position = Position::new(HorizontalPosition::Right, VerticalPosition::Center);
    pub const TOP_LEFT: Position = Position::new(HorizontalPosition::Left, VerticalPosition::Top);
    pub const TOP_RIGHT: Position = Position::new(HorizontalPosition::Right, VerticalPosition::Top);
    pub const BOTTOM_LEFT: Position = Position::new(HorizontalPosition::Left, VerticalPosition::Bottom);
    pub const BOTTOM_RIGHT: Position = Position::new(HorizontalPosition::Right, VerticalPosition::Bottom);

    pub const fn new(horizontal: HorizontalPosition, vertical: VerticalPosition) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Translation that puts an unscaled `sticker` sized box at this position.
    ///
    /// The free space on each axis is split 1/4, 1/2 or 3/4 before the box.
    pub fn offset(self, surface: Vec2, sticker: Vec2) -> Vec2 {
        let free = surface - sticker;
        let x = match self.horizontal {
            HorizontalPosition::Left => free.x / 4.0,
            HorizontalPosition::Center => free.x / 2.0,
            HorizontalPosition::Right => free.x * 3.0 / 4.0,
        };
        let y = match self.vertical {
            VerticalPosition::Top => free.y / 4.0,
            VerticalPosition::Center => free.y / 2.0,
            VerticalPosition::Bottom => free.y * 3.0 / 4.0,
        };
        vec2(x, y)
    }
}

/// How a sticker waiting to be added gets its initial transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Placement {
    At(Position),
    /// Copy of an existing sticker's transform, shifted by the duplicate offset.
    NextTo(Matrix),
}

impl Placement {
    pub(crate) fn apply(self, sticker: &mut StickerKind, surface: Vec2, initial_fill: f32, duplicate_offset: Vec2) {
        let matrix = match self {
            Placement::At(position) => fit_at(sticker, position, surface, initial_fill),
            Placement::NextTo(source) => {
                let mut matrix = source;
                matrix.post_translate(duplicate_offset.x, duplicate_offset.y);
                matrix
            }
        };
        sticker.set_matrix(&matrix);
    }
}

/// Position the sticker, then scale it about its own center to
/// `initial_fill` of the largest size that fits the surface.
pub(crate) fn fit_at(sticker: &StickerKind, position: Position, surface: Vec2, initial_fill: f32) -> Matrix {
    let size = sticker.size();
    let offset = position.offset(surface, size);
    let mut matrix = Matrix::from_translation(offset);
    let fit = (surface.x / size.x).min(surface.y / size.y);
    let scale = fit * initial_fill;
    let center = matrix.map_point(sticker.center_point());
    matrix.post_scale(scale, scale, center);
    matrix
}
