#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod config;
pub mod editor;
pub mod error;
pub mod event;
pub mod file_handler;
pub mod geometry;
pub mod input;
pub mod regret;
pub mod renderer;
pub mod sticker;
pub mod surface;
pub mod template;

pub use app::TemplateApp;
pub use config::{EditorConfig, SurfaceConfig};
pub use editor::{Editor, StickerSender};
pub use error::{ConfigError, HistoryError, RegretError, TemplateError};
pub use event::{EditorEvent, EventBus, EventHandler, SurfaceEvent};
pub use geometry::Matrix;
pub use input::{GestureConfig, TouchAction, TouchEvent, TouchPoint};
pub use regret::{Action, ActionKey, ActionValue, RegretListener, RegretManager, UndoRedoList};
pub use renderer::Renderer;
pub use sticker::{Sticker, StickerId, StickerKind, factory};
pub use surface::{AddOutcome, Flip, Position, StickerSurface, TouchMode};
pub use template::{TemplateCatalog, TemplateLayout, TemplateModel};
