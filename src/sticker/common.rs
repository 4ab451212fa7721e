use egui::{Pos2, Vec2, pos2};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::geometry::Matrix;

/// Smallest intrinsic side length a sticker may have.
pub const MIN_STICKER_SIZE: f32 = 1.0;

/// Unique identity of a sticker, stable for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StickerId(Uuid);

impl StickerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StickerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StickerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to decoded image content owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawableHandle(pub u64);

/// State every sticker variant carries: identity, transform, flips and opacity.
#[derive(Debug, Clone, PartialEq)]
pub struct StickerBase {
    pub(crate) id: StickerId,
    pub(crate) matrix: Matrix,
    pub(crate) flipped_horizontally: bool,
    pub(crate) flipped_vertically: bool,
    pub(crate) alpha: u8,
}

impl StickerBase {
    pub fn new() -> Self {
        Self {
            id: StickerId::new(),
            matrix: Matrix::IDENTITY,
            flipped_horizontally: false,
            flipped_vertically: false,
            alpha: u8::MAX,
        }
    }

    /// Copy of this state under a fresh identity.
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            id: StickerId::new(),
            ..self.clone()
        }
    }
}

impl Default for StickerBase {
    fn default() -> Self {
        Self::new()
    }
}

/// Untransformed corners of a `size` rectangle in top-left, top-right,
/// bottom-left, bottom-right order, mirrored by the flip flags.
pub(crate) fn bound_points(size: Vec2, flipped_horizontally: bool, flipped_vertically: bool) -> [Pos2; 4] {
    let (left, right) = if flipped_horizontally {
        (size.x, 0.0)
    } else {
        (0.0, size.x)
    };
    let (top, bottom) = if flipped_vertically {
        (size.y, 0.0)
    } else {
        (0.0, size.y)
    };
    [
        pos2(left, top),
        pos2(right, top),
        pos2(left, bottom),
        pos2(right, bottom),
    ]
}

pub(crate) fn is_valid_size(size: Vec2) -> bool {
    size.x.is_finite() && size.y.is_finite() && size.x >= MIN_STICKER_SIZE && size.y >= MIN_STICKER_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    #[test]
    fn flipped_bounds_swap_edges() {
        let size = vec2(10.0, 20.0);
        assert_eq!(bound_points(size, false, false)[1], pos2(10.0, 0.0));
        assert_eq!(bound_points(size, true, false)[0], pos2(10.0, 0.0));
        assert_eq!(bound_points(size, false, true)[0], pos2(0.0, 20.0));
        assert_eq!(bound_points(size, true, true)[3], pos2(0.0, 0.0));
    }

    #[test]
    fn duplicate_gets_new_identity() {
        let mut base = StickerBase::new();
        base.matrix.post_translate(4.0, 2.0);
        let copy = base.duplicate();
        assert_ne!(copy.id, base.id);
        assert_eq!(copy.matrix, base.matrix);
    }
}
