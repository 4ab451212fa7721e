use egui::Pos2;
use serde::{Deserialize, Serialize};

use crate::sticker::DrawableHandle;

/// Corner of the current sticker an icon is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconAnchor {
    LeftTop,
    RightTop,
    LeftBottom,
    RightBottom,
}

impl IconAnchor {
    /// Index into the sticker's bound points.
    pub fn corner_index(self) -> usize {
        match self {
            IconAnchor::LeftTop => 0,
            IconAnchor::RightTop => 1,
            IconAnchor::LeftBottom => 2,
            IconAnchor::RightBottom => 3,
        }
    }
}

/// Behaviour bound to an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconAction {
    /// Removes the sticker when the press is released.
    Delete,
    /// Single-finger scale and rotate around the sticker's center.
    ZoomRotate,
    /// Reported through the touched-down event; the owner makes the copy.
    Duplicate,
    /// Reported through the touched-down event; the owner opens an editor.
    Edit,
    FlipHorizontal,
    FlipVertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerIcon {
    pub anchor: IconAnchor,
    pub action: IconAction,
    /// Artwork supplied by the host, if any.
    pub drawable: Option<DrawableHandle>,
}

impl StickerIcon {
    pub fn new(anchor: IconAnchor, action: IconAction) -> Self {
        Self {
            anchor,
            action,
            drawable: None,
        }
    }

    pub fn with_drawable(mut self, drawable: DrawableHandle) -> Self {
        self.drawable = Some(drawable);
        self
    }
}

/// Delete, duplicate, zoom/rotate and edit on the four corners.
pub fn default_icons() -> Vec<StickerIcon> {
    vec![
        StickerIcon::new(IconAnchor::LeftTop, IconAction::Delete),
        StickerIcon::new(IconAnchor::RightTop, IconAction::Duplicate),
        StickerIcon::new(IconAnchor::RightBottom, IconAction::ZoomRotate),
        StickerIcon::new(IconAnchor::LeftBottom, IconAction::Edit),
    ]
}

/// Where an icon is drawn for the current sticker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconPlacement {
    pub icon: StickerIcon,
    pub center: Pos2,
    /// Degrees, follows the sticker's bottom edge.
    pub rotation: f32,
}
