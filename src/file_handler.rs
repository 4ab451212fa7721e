use eframe::egui;
use std::path::Path;

use log::{debug, error, info, warn};

/// An image file decoded to RGBA and ready to upload.
#[derive(Debug)]
pub struct DecodedImage {
    pub name: String,
    pub image: egui::ColorImage,
}

/// Decode encoded image bytes (PNG, JPEG, ...) to an egui image.
pub fn decode_image(bytes: &[u8]) -> Result<egui::ColorImage, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    debug!("decoded image: {}x{}", decoded.width(), decoded.height());
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_flat_samples().as_slice()))
}

/// Read and decode an image file.
pub fn load_image_file(path: impl AsRef<Path>) -> Option<egui::ColorImage> {
    let path = path.as_ref();
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            error!("failed to read image file {}: {err}", path.display());
            return None;
        }
    };
    match decode_image(&bytes) {
        Ok(image) => Some(image),
        Err(err) => {
            error!("failed to decode {}: {err}", path.display());
            None
        }
    }
}

/// Turns files dropped on the window into decoded images.
#[derive(Debug, Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick up files dropped this frame. Returns true if there are any.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files = i.raw.dropped_files.clone();
            }
        });
        !self.dropped_files.is_empty()
    }

    /// Decode every pending dropped image. Files that are not images, or
    /// fail to decode, are logged and skipped.
    pub fn take_images(&mut self) -> Vec<DecodedImage> {
        std::mem::take(&mut self.dropped_files)
            .into_iter()
            .filter_map(|file| {
                let name = file_name(&file);
                if !is_image_file(&file) {
                    warn!("dropped file is not a supported image: {name}");
                    return None;
                }
                let image = read_dropped(&file, &name)?;
                info!("loaded dropped image {name}");
                Some(DecodedImage { name, image })
            })
            .collect()
    }

    /// Darken the window while files hover over it.
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

        let hovering = ctx.input(|i| i.raw.hovered_files.len());
        if hovering == 0 {
            return;
        }
        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            format!("Drop {hovering} file(s) to add stickers"),
            TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}

fn file_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    file.path
        .as_ref()
        .and_then(|path| path.extension())
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp"))
}

fn read_dropped(file: &egui::DroppedFile, name: &str) -> Option<egui::ColorImage> {
    if let Some(bytes) = &file.bytes {
        return match decode_image(bytes) {
            Ok(image) => Some(image),
            Err(err) => {
                error!("failed to decode {name}: {err}");
                None
            }
        };
    }
    match &file.path {
        Some(path) => load_image_file(path),
        None => {
            warn!("dropped file has no accessible data: {name}");
            None
        }
    }
}
