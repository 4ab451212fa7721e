use eframe::egui::{self, Pos2, Rect, TouchPhase};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use log::{error, info};

use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::event::{EditorEvent, LogEventHandler, SurfaceEvent};
use crate::file_handler::{FileHandler, load_image_file};
use crate::input::{TouchAction, TouchEvent, TouchPoint};
use crate::renderer::{Renderer, palette_color};
use crate::sticker::{ColorIndex, FontRef, Sticker, factory};
use crate::surface::Flip;
use crate::template::{TemplateCatalog, TemplateLayout, TemplateModel};

const BUILTIN_TEMPLATES: &str = r#"{
    "templates": [
        { "id": 1, "frame_type": "Rectangle", "width": 1080, "height": 1350,
          "frame_width": 600, "frame_height": 800, "frame_x": 240, "frame_y": 375 },
        { "id": 2, "frame_type": "Circle", "width": 1080, "height": 1080,
          "frame_width": 640, "frame_height": 640, "frame_x": 220, "frame_y": 220 }
    ]
}"#;

const FONTS: [&str; 2] = ["Proportional", "Monospace"];

/// Turns egui pointer and touch input into the surface's touch events.
///
/// Coordinates come out relative to the canvas origin. A press has to start
/// inside the canvas to be tracked.
#[derive(Debug, Default)]
struct PointerTracker {
    touches: Vec<TouchPoint>,
    mouse_down: bool,
    using_touch: bool,
}

impl PointerTracker {
    fn translate(&mut self, event: &egui::Event, canvas: Rect, time_ms: u64) -> Option<TouchEvent> {
        let local = |pos: Pos2| pos - canvas.min.to_vec2();
        match event {
            egui::Event::Touch { id, phase, pos, .. } => {
                self.using_touch = true;
                let point = TouchPoint::new(id.0, local(*pos));
                match phase {
                    TouchPhase::Start => {
                        if !canvas.contains(*pos) {
                            return None;
                        }
                        self.touches.push(point);
                        let action = if self.touches.len() == 1 {
                            TouchAction::Down
                        } else {
                            TouchAction::PointerDown
                        };
                        Some(
                            TouchEvent::new(action, self.touches.clone(), time_ms)
                                .with_action_index(self.touches.len() - 1),
                        )
                    }
                    TouchPhase::Move => {
                        let tracked = self.touches.iter_mut().find(|p| p.id == point.id)?;
                        tracked.pos = point.pos;
                        Some(TouchEvent::new(TouchAction::Move, self.touches.clone(), time_ms))
                    }
                    TouchPhase::End => {
                        let index = self.touches.iter().position(|p| p.id == point.id)?;
                        self.touches[index].pos = point.pos;
                        let action = if self.touches.len() == 1 {
                            TouchAction::Up
                        } else {
                            TouchAction::PointerUp
                        };
                        let event = TouchEvent::new(action, self.touches.clone(), time_ms)
                            .with_action_index(index);
                        self.touches.remove(index);
                        Some(event)
                    }
                    TouchPhase::Cancel => {
                        self.touches.clear();
                        Some(TouchEvent::cancel(time_ms))
                    }
                }
            }
            egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed,
                ..
            } if !self.using_touch => {
                if *pressed {
                    if !canvas.contains(*pos) {
                        return None;
                    }
                    self.mouse_down = true;
                    Some(TouchEvent::down(local(*pos), time_ms))
                } else if self.mouse_down {
                    self.mouse_down = false;
                    Some(TouchEvent::up(local(*pos), time_ms))
                } else {
                    None
                }
            }
            egui::Event::PointerMoved(pos) if self.mouse_down && !self.using_touch => {
                Some(TouchEvent::moved(local(*pos), time_ms))
            }
            _ => None,
        }
    }
}

/// Demo host: one template, an optional photo and a sticker surface on top.
/// Only the configuration and the chosen template survive a restart.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct TemplateApp {
    config: EditorConfig,
    template_id: u32,

    #[serde(skip)]
    editor: Editor,
    #[serde(skip)]
    renderer: Option<Renderer>,
    #[serde(skip)]
    catalog: TemplateCatalog,
    #[serde(skip)]
    files: FileHandler,
    #[serde(skip)]
    pointer: PointerTracker,
    #[serde(skip)]
    text_input: String,
    #[serde(skip)]
    opacity: f32,
    #[serde(skip)]
    notice: Option<String>,
    #[serde(skip)]
    ui_events: Rc<RefCell<Vec<EditorEvent>>>,
}

impl Default for TemplateApp {
    fn default() -> Self {
        Self {
            config: EditorConfig::default(),
            template_id: 1,
            editor: Editor::default(),
            renderer: None,
            catalog: TemplateCatalog::default(),
            files: FileHandler::new(),
            pointer: PointerTracker::default(),
            text_input: String::from("Hello"),
            opacity: 100.0,
            notice: None,
            ui_events: Rc::default(),
        }
    }
}

impl std::fmt::Debug for TemplateApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateApp")
            .field("template_id", &self.template_id)
            .field("editor", &self.editor)
            .finish()
    }
}

impl TemplateApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, photo: Option<&Path>) -> Self {
        let mut app: TemplateApp = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        app.catalog = TemplateCatalog::from_json_str(BUILTIN_TEMPLATES).unwrap_or_else(|err| {
            error!("built-in templates rejected: {err}");
            TemplateCatalog::default()
        });
        app.editor = Editor::new(app.config.clone());
        app.editor.subscribe(Box::new(LogEventHandler));
        let ui_events = Rc::clone(&app.ui_events);
        app.editor.subscribe(Box::new(move |event: &EditorEvent| {
            if matches!(
                event,
                EditorEvent::Surface(SurfaceEvent::LimitReached) | EditorEvent::EditRequested(_)
            ) {
                ui_events.borrow_mut().push(event.clone());
            }
        }));

        let mut renderer = Renderer::new(cc);
        if let Some(image) = photo.and_then(load_image_file) {
            info!("using photo {}x{}", image.size[0], image.size[1]);
            renderer.set_photo(image);
        }
        app.renderer = Some(renderer);
        app
    }

    fn template(&self) -> Option<&TemplateModel> {
        self.catalog
            .get(self.template_id)
            .or_else(|| self.catalog.templates.first())
    }

    fn handle_ui_events(&mut self) {
        let events = std::mem::take(&mut *self.ui_events.borrow_mut());
        for event in events {
            match event {
                EditorEvent::Surface(SurfaceEvent::LimitReached) => {
                    self.notice = Some(format!(
                        "You can add up to {} stickers",
                        self.config.max_stickers
                    ));
                }
                EditorEvent::EditRequested(id) => {
                    if let Some(text) = self.editor.surface().get(id).and_then(|s| s.as_text()) {
                        self.text_input = text.text().to_owned();
                    }
                }
                _ => {}
            }
        }
    }

    fn add_dropped_images(&mut self, ctx: &egui::Context) {
        self.files.preview_files_being_dropped(ctx);
        if !self.files.check_for_dropped_files(ctx) {
            return;
        }
        let Some(renderer) = &mut self.renderer else {
            return;
        };
        for decoded in self.files.take_images() {
            let size = decoded.image.size;
            let handle = renderer.register_image(decoded.image, &decoded.name);
            let sticker = factory::create_image(handle, egui::vec2(size[0] as f32, size[1] as f32));
            if self.editor.add_sticker(sticker).id().is_none() {
                renderer.release_image(handle);
            }
        }
    }

    fn tools_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Template");
        let current = self.template_id;
        egui::ComboBox::from_id_salt("template")
            .selected_text(format!("Template {current}"))
            .show_ui(ui, |ui| {
                for template in &self.catalog.templates {
                    ui.selectable_value(
                        &mut self.template_id,
                        template.id,
                        format!("Template {} ({:?})", template.id, template.frame_type),
                    );
                }
            });

        ui.separator();
        ui.heading("Text");
        ui.text_edit_singleline(&mut self.text_input);
        ui.horizontal(|ui| {
            if ui.button("Add").clicked() {
                self.editor.add_text(self.text_input.clone());
            }
            if ui.button("Apply").clicked() {
                self.editor.apply_new_text(self.text_input.clone());
            }
        });
        ui.horizontal(|ui| {
            if ui.add_enabled(self.editor.can_undo(), egui::Button::new("Undo")).clicked() {
                self.editor.undo();
            }
            if ui.add_enabled(self.editor.can_redo(), egui::Button::new("Redo")).clicked() {
                self.editor.redo();
            }
        });
        ui.horizontal(|ui| {
            if ui.button("B").clicked() {
                self.editor.toggle_bold();
            }
            if ui.button("I").clicked() {
                self.editor.toggle_italic();
            }
            if ui.button("U").clicked() {
                self.editor.toggle_underline();
            }
            if ui.button("S").clicked() {
                self.editor.toggle_strike_through();
            }
        });
        ui.horizontal_wrapped(|ui| {
            for index in 0..8 {
                let color = ColorIndex(index);
                let swatch = egui::Button::new("  ").fill(palette_color(color));
                if ui.add(swatch).clicked() {
                    self.editor.apply_text_color(color);
                }
            }
        });
        ui.horizontal(|ui| {
            for font in FONTS {
                if ui.button(font).clicked() {
                    if let Err(err) = self.editor.apply_typeface(FontRef(font.to_owned())) {
                        error!("typeface not applied: {err}");
                    }
                }
            }
        });
        if ui
            .add(egui::Slider::new(&mut self.opacity, 0.0..=100.0).text("Opacity"))
            .changed()
        {
            self.editor.apply_text_opacity(self.opacity);
        }

        ui.separator();
        ui.heading("Sticker");
        ui.horizontal(|ui| {
            if ui.button("Flip ⇆").clicked() {
                self.editor.flip_current(Flip::Horizontal);
            }
            if ui.button("Flip ⇅").clicked() {
                self.editor.flip_current(Flip::Vertical);
            }
            if ui.button("Duplicate").clicked() {
                self.editor.duplicate_current();
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Delete").clicked() {
                self.editor.remove_current();
            }
            if ui.button("Clear").clicked() {
                self.editor.remove_all();
            }
        });

        let mut surface = self.config.surface.clone();
        ui.checkbox(&mut surface.constrained, "Keep inside canvas");
        ui.checkbox(&mut surface.bring_to_front_current, "Bring touched to front");
        ui.checkbox(&mut surface.locked, "Lock");
        if surface != self.config.surface {
            self.config.surface = surface.clone();
            self.editor.update_surface(|s| s.set_config(surface));
        }

        ui.separator();
        ui.label(format!(
            "{} / {} stickers",
            self.editor.surface().sticker_count(),
            self.config.max_stickers
        ));
        if let Some(current) = self.editor.surface().current() {
            ui.label(format!(
                "{} {:.0}x{:.0} at {:.0}°",
                current.sticker_type(),
                current.current_width(),
                current.current_height(),
                current.current_angle()
            ));
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        self.editor.set_size(rect.size());

        let time_ms = (ui.input(|i| i.time) * 1000.0) as u64;
        let events = ui.input(|i| i.events.clone());
        for event in &events {
            if let Some(touch) = self.pointer.translate(event, rect, time_ms) {
                self.editor.on_touch_event(&touch);
            }
        }
        self.editor.poll_inbox();

        let Some(renderer) = &self.renderer else {
            return;
        };
        if let Some(template) = self.template() {
            let view = Rect::from_min_size(Pos2::ZERO, rect.size());
            match TemplateLayout::compute(template, view, renderer.photo_aspect()) {
                Ok(layout) => renderer.render_template(&painter, &layout, rect.min),
                Err(err) => error!("cannot lay out template: {err}"),
            }
        }
        renderer.render_surface(&painter, self.editor.surface(), rect.min);
    }
}

impl eframe::App for TemplateApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.add_dropped_images(ctx);

        egui::SidePanel::left("tools").show(ctx, |ui| self.tools_panel(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.canvas(ui));

        self.handle_ui_events();
        if let Some(notice) = self.notice.clone() {
            egui::Window::new("Notice")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(notice);
                    if ui.button("Close").clicked() {
                        self.notice = None;
                    }
                });
        }

        if self.editor.take_redraw() {
            ctx.request_repaint();
        }
    }
}
