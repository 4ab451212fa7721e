//! Background templates and the frame region the user's photo fills.

use egui::{Pos2, Rect, pos2, vec2};
use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::geometry::{Matrix, ScaleToFit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrameType {
    #[default]
    Rectangle,
    Circle,
}

/// A background template. All sizes are in template pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateModel {
    pub id: u32,
    #[serde(default)]
    pub frame_type: FrameType,
    pub width: f32,
    pub height: f32,
    pub frame_width: f32,
    pub frame_height: f32,
    pub frame_x: f32,
    pub frame_y: f32,
    /// Background artwork, resolved by the host.
    #[serde(default)]
    pub background: Option<String>,
}

impl TemplateModel {
    pub fn validate(&self) -> Result<(), TemplateError> {
        let positive = [self.width, self.height, self.frame_width, self.frame_height]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0);
        let origin = [self.frame_x, self.frame_y].iter().all(|v| v.is_finite());
        if positive && origin {
            Ok(())
        } else {
            Err(TemplateError::InvalidDimensions { id: self.id })
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(self.width, self.height))
    }
}

/// The set of templates offered to the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateCatalog {
    pub templates: Vec<TemplateModel>,
}

impl TemplateCatalog {
    /// Parse a catalog, rejecting it if any template is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, TemplateError> {
        let catalog: TemplateCatalog = serde_json::from_str(json)?;
        for template in &catalog.templates {
            template.validate()?;
        }
        Ok(catalog)
    }

    pub fn get(&self, id: u32) -> Option<&TemplateModel> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Clip shape for the photo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameClip {
    Rect(Rect),
    Circle { center: Pos2, radius: f32 },
}

/// Screen-space geometry of a template shown in a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateLayout {
    /// Where the background is drawn, centered and letterboxed.
    pub background: Rect,
    pub frame: Rect,
    /// Photo bounds: covers the frame and keeps the photo's aspect ratio.
    pub photo: Rect,
    pub clip: FrameClip,
}

impl TemplateLayout {
    /// Lay `model` out in `view`. Without a photo aspect the photo fills the frame.
    pub fn compute(model: &TemplateModel, view: Rect, photo_aspect: Option<f32>) -> Result<Self, TemplateError> {
        model.validate()?;

        let mut matrix = Matrix::IDENTITY;
        if !matrix.set_rect_to_rect(model.rect(), view, ScaleToFit::Center) {
            return Err(TemplateError::InvalidDimensions { id: model.id });
        }
        let background = matrix.map_rect(model.rect());

        let scale = if model.width > model.height {
            background.width() / model.width
        } else {
            background.height() / model.height
        };
        let frame = Rect::from_min_size(
            pos2(
                background.min.x + background.width() * (model.frame_x / model.width),
                background.min.y + background.height() * (model.frame_y / model.height),
            ),
            vec2(model.frame_width * scale, model.frame_height * scale),
        );

        let photo = match photo_aspect.filter(|a| a.is_finite() && *a > 0.0) {
            Some(aspect) => cover(frame, aspect),
            None => frame,
        };

        let clip = match model.frame_type {
            FrameType::Rectangle => FrameClip::Rect(frame),
            FrameType::Circle => FrameClip::Circle {
                center: frame.center(),
                radius: frame.width().min(frame.height()) / 2.0,
            },
        };

        Ok(Self {
            background,
            frame,
            photo,
            clip,
        })
    }
}

/// Smallest rect with `aspect` (width / height) that covers `frame`, centered on it.
fn cover(frame: Rect, aspect: f32) -> Rect {
    let mut height = frame.height();
    let mut width = height * aspect;
    if width < frame.width() {
        width = frame.width();
        height = width / aspect;
    }
    Rect::from_center_size(frame.center(), vec2(width, height))
}
