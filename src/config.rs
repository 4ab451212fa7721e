use egui::{Vec2, vec2};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::input::GestureConfig;
use crate::sticker::{ColorIndex, FontRef};

/// Behaviour switches of the sticker surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub show_icons: bool,
    pub show_border: bool,
    /// Move a touched sticker to the top of the z-order.
    pub bring_to_front_current: bool,
    /// Keep a dragged sticker's center inside the surface.
    pub constrained: bool,
    /// Ignore all touch input.
    pub locked: bool,
    pub icon_radius: f32,
    /// Offset of a duplicate from its source.
    pub duplicate_offset: Vec2,
    /// Fraction of the fit-to-surface scale a new sticker starts at.
    pub initial_fill: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            show_icons: true,
            show_border: true,
            bring_to_front_current: false,
            constrained: false,
            locked: false,
            icon_radius: 30.0,
            duplicate_offset: vec2(0.0, 50.0),
            initial_fill: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub surface: SurfaceConfig,
    pub gesture: GestureConfig,
    pub max_stickers: usize,
    pub default_text_color: ColorIndex,
    pub default_typeface: FontRef,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            surface: SurfaceConfig::default(),
            gesture: GestureConfig::default(),
            max_stickers: 20,
            default_text_color: ColorIndex(0),
            default_typeface: FontRef("Proportional".to_string()),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Load from `path`, falling back to defaults when it is missing or broken.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::from_json_file(path).unwrap_or_else(|err| {
            warn!("using default editor config, {} not loaded: {err}", path.display());
            Self::default()
        })
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
