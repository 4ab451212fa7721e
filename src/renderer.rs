use eframe::egui::{self, Color32, Pos2, Rect, Stroke, TextureHandle, pos2, vec2};
use egui::epaint::{Mesh, TextShape, Vertex};
use egui::text::{LayoutJob, TextFormat};
use std::collections::HashMap;

use crate::geometry::Matrix;
use crate::sticker::{ColorIndex, DrawableHandle, ImageSticker, Sticker, StickerKind, TextAlign, TextSticker};
use crate::surface::{IconAction, IconPlacement, StickerSurface};
use crate::template::{FrameClip, TemplateLayout};

const CIRCLE_SEGMENTS: usize = 64;
const BORDER_COLOR: Color32 = Color32::from_gray(220);
const ICON_FILL: Color32 = Color32::from_rgb(40, 40, 40);

const PALETTE: [Color32; 8] = [
    Color32::WHITE,
    Color32::BLACK,
    Color32::from_rgb(229, 57, 53),
    Color32::from_rgb(251, 140, 0),
    Color32::from_rgb(253, 216, 53),
    Color32::from_rgb(67, 160, 71),
    Color32::from_rgb(30, 136, 229),
    Color32::from_rgb(142, 36, 170),
];

/// Colour the demo palette assigns to an index. Indices wrap around.
pub fn palette_color(index: ColorIndex) -> Color32 {
    PALETTE[index.0 as usize % PALETTE.len()]
}

/// Paints a template, the user's photo and the sticker surface with egui.
///
/// Stickers only carry [`DrawableHandle`]s; the renderer owns the textures
/// behind them.
pub struct Renderer {
    ctx: egui::Context,
    textures: HashMap<DrawableHandle, TextureHandle>,
    next_handle: u64,
    background: Option<TextureHandle>,
    photo: Option<TextureHandle>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("textures", &self.textures.keys().collect::<Vec<_>>())
            .field("next_handle", &self.next_handle)
            .field("background", &self.background.as_ref().map(|t| t.id()))
            .field("photo", &self.photo.as_ref().map(|t| t.id()))
            .finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        Self::with_context(cc.egui_ctx.clone())
    }

    pub fn with_context(ctx: egui::Context) -> Self {
        Self {
            ctx,
            textures: HashMap::new(),
            next_handle: 1,
            background: None,
            photo: None,
        }
    }

    /// Upload image content and hand out the handle stickers refer to it by.
    pub fn register_image(&mut self, image: egui::ColorImage, name: &str) -> DrawableHandle {
        let handle = DrawableHandle(self.next_handle);
        self.next_handle += 1;
        let texture = self.create_texture(image, name);
        self.textures.insert(handle, texture);
        handle
    }

    pub fn release_image(&mut self, handle: DrawableHandle) {
        self.textures.remove(&handle);
    }

    pub fn set_background(&mut self, image: egui::ColorImage) {
        self.background = Some(self.create_texture(image, "template_background"));
    }

    pub fn set_photo(&mut self, image: egui::ColorImage) {
        self.photo = Some(self.create_texture(image, "user_photo"));
    }

    /// Width over height of the loaded photo.
    pub fn photo_aspect(&self) -> Option<f32> {
        self.photo.as_ref().map(|texture| {
            let size = texture.size_vec2();
            size.x / size.y
        })
    }

    fn create_texture(&self, image: egui::ColorImage, name: &str) -> TextureHandle {
        self.ctx.load_texture(name, image, egui::TextureOptions::LINEAR)
    }

    /// Background and photo, in canvas coordinates offset by `origin`.
    pub fn render_template(&self, painter: &egui::Painter, layout: &TemplateLayout, origin: Pos2) {
        let offset = origin.to_vec2();
        let background = layout.background.translate(offset);
        match &self.background {
            Some(texture) => painter.image(texture.id(), background, full_uv(), Color32::WHITE),
            None => painter.rect_filled(background, 0.0, Color32::from_gray(60)),
        };

        let photo = layout.photo.translate(offset);
        match (layout.clip, &self.photo) {
            (FrameClip::Rect(frame), Some(texture)) => {
                painter
                    .with_clip_rect(frame.translate(offset))
                    .image(texture.id(), photo, full_uv(), Color32::WHITE);
            }
            (FrameClip::Rect(frame), None) => {
                painter.rect_filled(frame.translate(offset), 0.0, Color32::from_gray(110));
            }
            (FrameClip::Circle { center, radius }, Some(texture)) => {
                painter.add(circle_mesh(texture.id(), center + offset, radius, photo));
            }
            (FrameClip::Circle { center, radius }, None) => {
                painter.circle_filled(center + offset, radius, Color32::from_gray(110));
            }
        }
    }

    /// Stickers back to front, then the current sticker's border and icons.
    pub fn render_surface(&self, painter: &egui::Painter, surface: &StickerSurface, origin: Pos2) {
        let to_screen = Matrix::from_translation(origin.to_vec2());
        for sticker in surface.stickers() {
            let mut matrix = *sticker.matrix();
            matrix.post_concat(&to_screen);
            match sticker {
                StickerKind::Image(image) => self.paint_image(painter, image, &matrix),
                StickerKind::Text(text) => self.paint_text(painter, text, &matrix),
            }
        }

        let Some(current) = surface.current() else {
            return;
        };
        if surface.config().show_border && !surface.is_locked() {
            let corners = to_screen.map_points(current.mapped_bound_points());
            let stroke = Stroke::new(1.5, BORDER_COLOR);
            for (a, b) in [(0, 1), (1, 3), (3, 2), (2, 0)] {
                painter.line_segment([corners[a], corners[b]], stroke);
            }
        }
        let radius = surface.config().icon_radius;
        for placement in surface.icon_placements() {
            self.paint_icon(painter, &placement, to_screen.map_point(placement.center), radius);
        }
    }

    fn paint_image(&self, painter: &egui::Painter, sticker: &ImageSticker, matrix: &Matrix) {
        let Some(texture) = self.textures.get(&sticker.drawable()) else {
            return;
        };
        let tint = Color32::WHITE.gamma_multiply(f32::from(sticker.alpha()) / 255.0);
        painter.add(quad_mesh(texture.id(), matrix, sticker.size(), tint));
    }

    fn paint_text(&self, painter: &egui::Painter, sticker: &TextSticker, matrix: &Matrix) {
        let opacity = f32::from(sticker.alpha()) / 255.0;
        match sticker.background().and_then(|handle| self.textures.get(&handle)) {
            Some(texture) => {
                let tint = Color32::WHITE.gamma_multiply(opacity);
                painter.add(quad_mesh(texture.id(), matrix, sticker.size(), tint));
            }
            None => {
                let corners = matrix.map_points(sticker.bound_points());
                painter.add(egui::Shape::convex_polygon(
                    vec![corners[0], corners[1], corners[3], corners[2]],
                    Color32::from_black_alpha(40),
                    Stroke::NONE,
                ));
            }
        }
        if sticker.text().is_empty() {
            return;
        }

        let scale = matrix.scale();
        let region = sticker.text_rect();
        let color = palette_color(sticker.text_color()).gamma_multiply(opacity);
        let mut format = TextFormat::simple(egui::FontId::proportional(sticker.text_size() * scale), color);
        format.italics = sticker.style().is_italic();
        if sticker.is_underline() {
            format.underline = Stroke::new(scale.max(1.0), color);
        }
        if sticker.is_strike_through() {
            format.strikethrough = Stroke::new(scale.max(1.0), color);
        }
        let mut job = LayoutJob::single_section(sticker.text().to_owned(), format);
        job.wrap.max_width = region.width() * scale;
        let anchor_x = match sticker.alignment() {
            TextAlign::Normal => region.left(),
            TextAlign::Center => region.center().x,
            TextAlign::Opposite => region.right(),
        };
        job.halign = match sticker.alignment() {
            TextAlign::Normal => egui::Align::LEFT,
            TextAlign::Center => egui::Align::Center,
            TextAlign::Opposite => egui::Align::RIGHT,
        };

        let galley = painter.layout_job(job);
        let local_height = galley.size().y / scale.max(f32::EPSILON);
        let anchor = matrix.map_point(pos2(anchor_x, region.center().y - local_height / 2.0));
        let text = TextShape::new(anchor, galley, color).with_angle(matrix.rotation().to_radians());
        painter.add(text);
    }

    fn paint_icon(&self, painter: &egui::Painter, placement: &IconPlacement, center: Pos2, radius: f32) {
        let drawable = placement
            .icon
            .drawable
            .and_then(|handle| self.textures.get(&handle));
        if let Some(texture) = drawable {
            let rect = Rect::from_center_size(center, vec2(radius * 2.0, radius * 2.0));
            painter.image(texture.id(), rect, full_uv(), Color32::WHITE);
            return;
        }
        painter.circle_filled(center, radius, ICON_FILL);
        let glyph = match placement.icon.action {
            IconAction::Delete => "✖",
            IconAction::ZoomRotate => "⤡",
            IconAction::Duplicate => "⧉",
            IconAction::Edit => "✎",
            IconAction::FlipHorizontal => "⇆",
            IconAction::FlipVertical => "⇅",
        };
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            glyph,
            egui::FontId::proportional(radius),
            Color32::WHITE,
        );
    }
}

fn full_uv() -> Rect {
    Rect::from_min_max(Pos2::ZERO, pos2(1.0, 1.0))
}

/// Textured quad of a `size` box mapped through `matrix`. Flips live in the
/// matrix, so the UVs always follow the unflipped corners.
pub(crate) fn quad_mesh(texture: egui::TextureId, matrix: &Matrix, size: egui::Vec2, tint: Color32) -> Mesh {
    let corners = matrix.map_points([
        Pos2::ZERO,
        pos2(size.x, 0.0),
        pos2(0.0, size.y),
        pos2(size.x, size.y),
    ]);
    let uvs = [Pos2::ZERO, pos2(1.0, 0.0), pos2(0.0, 1.0), pos2(1.0, 1.0)];
    let mut mesh = Mesh::with_texture(texture);
    for (pos, uv) in corners.into_iter().zip(uvs) {
        mesh.vertices.push(Vertex { pos, uv, color: tint });
    }
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(2, 1, 3);
    mesh
}

/// Triangle fan over a circle, sampling the texture as if it covered `photo`.
pub(crate) fn circle_mesh(texture: egui::TextureId, center: Pos2, radius: f32, photo: Rect) -> Mesh {
    let uv_of = |pos: Pos2| {
        pos2(
            (pos.x - photo.min.x) / photo.width(),
            (pos.y - photo.min.y) / photo.height(),
        )
    };
    let mut mesh = Mesh::with_texture(texture);
    mesh.vertices.push(Vertex {
        pos: center,
        uv: uv_of(center),
        color: Color32::WHITE,
    });
    for i in 0..CIRCLE_SEGMENTS {
        let angle = i as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
        let pos = center + radius * vec2(angle.cos(), angle.sin());
        mesh.vertices.push(Vertex {
            pos,
            uv: uv_of(pos),
            color: Color32::WHITE,
        });
    }
    for i in 0..CIRCLE_SEGMENTS as u32 {
        let next = (i + 1) % CIRCLE_SEGMENTS as u32;
        mesh.add_triangle(0, i + 1, next + 1);
    }
    mesh
}
