//! The editing session: one sticker surface plus a history per text sticker.

use egui::Vec2;
use futures::channel::mpsc;
use log::{debug, info, warn};
use std::collections::HashMap;

use crate::config::EditorConfig;
use crate::error::RegretResult;
use crate::event::{EditorEvent, EventBus, EventHandler, SurfaceEvent};
use crate::input::TouchEvent;
use crate::regret::{Action, ActionValue, RegretListener, RegretManager};
use crate::sticker::{
    ApproxTextLayout, ColorIndex, FontRef, Sticker, StickerId, StickerKind, TextLayout, TextSticker,
};
use crate::surface::{AddOutcome, Flip, Position, StickerSurface};

/// Hands finished stickers to an [`Editor`] from any thread.
///
/// Nothing is placed until the owning editor calls [`Editor::poll_inbox`].
#[derive(Debug, Clone)]
pub struct StickerSender {
    tx: mpsc::UnboundedSender<StickerKind>,
}

impl StickerSender {
    /// Queue a sticker. Returns `false` once the editor is gone.
    pub fn submit(&self, sticker: StickerKind) -> bool {
        self.tx.unbounded_send(sticker).is_ok()
    }
}

/// Applies replayed history to the text sticker it is bound to.
struct StickerBinding<'a> {
    id: StickerId,
    sticker: Option<&'a mut TextSticker>,
    layout: &'a dyn TextLayout,
    events: &'a mut Vec<EditorEvent>,
}

impl RegretListener for StickerBinding<'_> {
    fn on_do(&mut self, action: &Action) {
        let Some(sticker) = self.sticker.as_deref_mut() else {
            warn!("history replay for missing sticker {}", self.id);
            return;
        };
        match action.value() {
            ActionValue::Text(text) => {
                sticker.set_text(text.clone());
                sticker.resize_text(self.layout);
            }
            ActionValue::Typeface(font) => {
                sticker.set_typeface(Some(font.clone()));
                sticker.resize_text(self.layout);
            }
            ActionValue::TextColor(color) => sticker.set_text_color(*color),
        }
    }

    fn on_can_do(&mut self, can_undo: bool, can_redo: bool) {
        self.events.push(EditorEvent::HistoryChanged {
            id: self.id,
            can_undo,
            can_redo,
        });
    }
}

/// Owns the sticker surface and keeps one [`RegretManager`] per text sticker,
/// keyed by sticker id.
///
/// Every call that can change the surface forwards the resulting events to
/// the subscribed handlers before returning.
pub struct Editor {
    config: EditorConfig,
    surface: StickerSurface,
    managers: HashMap<StickerId, RegretManager>,
    bus: EventBus,
    layout: Box<dyn TextLayout>,
    inbox_tx: mpsc::UnboundedSender<StickerKind>,
    inbox_rx: mpsc::UnboundedReceiver<StickerKind>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("surface", &self.surface)
            .field("histories", &self.managers.len())
            .field("bus", &self.bus)
            .finish()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let surface = StickerSurface::new(
            config.surface.clone(),
            config.gesture.clone(),
            config.max_stickers,
        );
        let (inbox_tx, inbox_rx) = mpsc::unbounded();
        Self {
            config,
            surface,
            managers: HashMap::new(),
            bus: EventBus::new(),
            layout: Box::new(ApproxTextLayout::default()),
            inbox_tx,
            inbox_rx,
        }
    }

    /// Replace the measurer used to fit text stickers.
    pub fn with_text_layout(mut self, layout: Box<dyn TextLayout>) -> Self {
        self.layout = layout;
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn text_layout(&self) -> &dyn TextLayout {
        self.layout.as_ref()
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.bus.subscribe(handler);
    }

    pub fn surface(&self) -> &StickerSurface {
        &self.surface
    }

    /// Run `f` against the surface, then dispatch whatever it reported.
    pub fn update_surface<R>(&mut self, f: impl FnOnce(&mut StickerSurface) -> R) -> R {
        let result = f(&mut self.surface);
        self.dispatch_events();
        result
    }

    /// History of a text sticker, if it has one.
    pub fn history(&self, id: StickerId) -> Option<&RegretManager> {
        self.managers.get(&id)
    }

    pub fn history_count(&self) -> usize {
        self.managers.len()
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.surface.set_size(size);
        self.dispatch_events();
    }

    pub fn on_touch_event(&mut self, event: &TouchEvent) -> bool {
        let handled = self.surface.on_touch_event(event);
        self.dispatch_events();
        handled
    }

    pub fn take_redraw(&mut self) -> bool {
        self.surface.take_redraw()
    }

    pub fn add_sticker(&mut self, sticker: StickerKind) -> AddOutcome {
        self.add_sticker_at(sticker, Position::CENTER)
    }

    pub fn add_sticker_at(&mut self, sticker: StickerKind, position: Position) -> AddOutcome {
        let outcome = self.surface.add_sticker_at(sticker, position);
        self.dispatch_events();
        outcome
    }

    /// Add a text sticker in the configured default typeface and colour,
    /// fitted to its text region.
    pub fn add_text(&mut self, text: impl Into<String>) -> AddOutcome {
        let mut sticker = TextSticker::new();
        sticker.set_text(text);
        sticker.set_typeface(Some(self.config.default_typeface.clone()));
        sticker.set_text_color(self.config.default_text_color);
        sticker.resize_text(self.layout.as_ref());
        self.add_sticker(StickerKind::Text(sticker))
    }

    pub fn duplicate_current(&mut self) -> Option<AddOutcome> {
        let source = self.surface.current_id()?;
        let outcome = self.surface.duplicate(source)?;
        self.dispatch_events();
        if let Some(duplicate) = outcome.id() {
            self.bus.emit(&EditorEvent::Duplicated { source, duplicate });
        }
        Some(outcome)
    }

    pub fn remove_current(&mut self) -> bool {
        let removed = self.surface.remove_current();
        self.dispatch_events();
        removed
    }

    /// Remove every sticker together with every history.
    pub fn remove_all(&mut self) {
        self.surface.remove_all();
        self.dispatch_events();
    }

    pub fn flip_current(&mut self, flip: Flip) -> bool {
        let flipped = self.surface.flip_current(flip);
        self.dispatch_events();
        flipped
    }

    /// Swap the current sticker for `sticker`. The old history is dropped and
    /// the replacement starts a fresh one.
    pub fn replace_current(&mut self, sticker: StickerKind, keep_state: bool) -> bool {
        let replaced = self.surface.replace_current(sticker, keep_state);
        self.dispatch_events();
        replaced
    }

    /// A sender for stickers produced away from the UI thread.
    pub fn sender(&self) -> StickerSender {
        StickerSender {
            tx: self.inbox_tx.clone(),
        }
    }

    /// Add every sticker submitted through a [`StickerSender`] since the last
    /// poll. Returns how many were taken from the inbox.
    pub fn poll_inbox(&mut self) -> usize {
        let mut received = 0;
        while let Ok(Some(sticker)) = self.inbox_rx.try_next() {
            received += 1;
            if let AddOutcome::Rejected(reason) = self.add_sticker(sticker) {
                debug!("inbox sticker rejected: {reason:?}");
            }
        }
        received
    }

    pub fn can_undo(&self) -> bool {
        self.current_history().is_some_and(RegretManager::can_undo)
    }

    pub fn can_redo(&self) -> bool {
        self.current_history().is_some_and(RegretManager::can_redo)
    }

    /// Undo the last edit of the current text sticker.
    pub fn undo(&mut self) -> bool {
        self.with_history(|manager, binding| manager.undo(binding))
            .unwrap_or(false)
    }

    pub fn redo(&mut self) -> bool {
        self.with_history(|manager, binding| manager.redo(binding))
            .unwrap_or(false)
    }

    /// Record `text` as the current sticker's text baseline.
    pub fn apply_default_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.with_history(|manager, _| manager.set_previous_text(text))
            .is_some()
    }

    pub fn apply_new_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.with_history(|manager, binding| {
            manager.set_new_text(text.clone(), binding);
            if let Some(sticker) = binding.sticker.as_deref_mut() {
                sticker.set_text(text);
                sticker.resize_text(binding.layout);
            }
        })
        .is_some()
    }

    /// Record the configured default colour as the colour baseline.
    pub fn apply_default_color(&mut self) -> bool {
        let color = self.config.default_text_color;
        self.with_history(|manager, _| manager.set_previous_text_color(color))
            .is_some()
    }

    pub fn apply_text_color(&mut self, color: ColorIndex) -> bool {
        self.with_history(|manager, binding| {
            manager.set_new_text_color(color, binding);
            if let Some(sticker) = binding.sticker.as_deref_mut() {
                sticker.set_text_color(color);
            }
        })
        .is_some()
    }

    /// Change the current sticker's typeface. Returns `Ok(false)` without a
    /// current text sticker.
    pub fn apply_typeface(&mut self, typeface: FontRef) -> RegretResult<bool> {
        let result = self.with_history(|manager, binding| -> RegretResult<()> {
            manager.set_new_typeface(typeface.clone(), binding)?;
            if let Some(sticker) = binding.sticker.as_deref_mut() {
                sticker.set_typeface(Some(typeface));
                sticker.resize_text(binding.layout);
            }
            Ok(())
        });
        match result {
            Some(applied) => applied.map(|()| true),
            None => Ok(false),
        }
    }

    pub fn toggle_bold(&mut self) -> bool {
        self.edit_style(|manager, sticker| {
            manager.set_bold(!manager.is_bold());
            sticker.set_style(manager.typeface_style());
        })
    }

    pub fn toggle_italic(&mut self) -> bool {
        self.edit_style(|manager, sticker| {
            manager.set_italic(!manager.is_italic());
            sticker.set_style(manager.typeface_style());
        })
    }

    pub fn toggle_underline(&mut self) -> bool {
        self.edit_style(|manager, sticker| {
            manager.set_underline(!manager.is_underline());
            sticker.set_underline(manager.is_underline());
        })
    }

    pub fn toggle_strike_through(&mut self) -> bool {
        self.edit_style(|manager, sticker| {
            manager.set_strike_through(!manager.is_strike_through());
            sticker.set_strike_through(manager.is_strike_through());
        })
    }

    /// Opacity in percent, 0 transparent to 100 opaque.
    pub fn apply_text_opacity(&mut self, percent: f32) -> bool {
        let alpha = (percent.clamp(0.0, 100.0) * 2.55) as u8;
        self.edit_text(|sticker| sticker.set_alpha(alpha))
    }

    pub fn apply_text_shadow(&mut self, radius: f32) -> bool {
        self.edit_text(|sticker| sticker.set_shadow(radius))
    }

    pub fn apply_text_blur(&mut self, radius: f32) -> bool {
        self.edit_text(|sticker| sticker.set_blur(radius))
    }

    /// Replace the current sticker's text from the edit affordance.
    ///
    /// Not recorded as an undoable step; the text becomes the new baseline.
    pub fn update_current_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        let Some(id) = self.current_text_id() else {
            return false;
        };
        if let Some(manager) = self.managers.get_mut(&id) {
            manager.set_previous_text(text.clone());
        }
        let layout = self.layout.as_ref();
        match self.surface.get_mut(id).and_then(StickerKind::as_text_mut) {
            Some(sticker) => {
                sticker.set_text(text);
                sticker.resize_text(layout);
                self.surface.request_redraw();
                true
            }
            None => false,
        }
    }

    fn current_text_id(&self) -> Option<StickerId> {
        self.surface
            .current()
            .filter(|sticker| sticker.is_text())
            .map(|sticker| sticker.id())
    }

    fn current_history(&self) -> Option<&RegretManager> {
        self.current_text_id().and_then(|id| self.managers.get(&id))
    }

    // Runs `f` with the current sticker's history and a binding to the sticker
    // itself, then redraws and broadcasts what the history reported.
    fn with_history<R>(
        &mut self,
        f: impl FnOnce(&mut RegretManager, &mut StickerBinding<'_>) -> R,
    ) -> Option<R> {
        let id = self.current_text_id()?;
        let manager = self.managers.get_mut(&id)?;
        let mut events = Vec::new();
        let result = {
            let mut binding = StickerBinding {
                id,
                sticker: self.surface.get_mut(id).and_then(StickerKind::as_text_mut),
                layout: self.layout.as_ref(),
                events: &mut events,
            };
            f(manager, &mut binding)
        };
        self.surface.request_redraw();
        for event in &events {
            self.bus.emit(event);
        }
        Some(result)
    }

    fn edit_style(&mut self, f: impl FnOnce(&mut RegretManager, &mut TextSticker)) -> bool {
        let Some(id) = self.current_text_id() else {
            return false;
        };
        let Some(manager) = self.managers.get_mut(&id) else {
            return false;
        };
        let Some(sticker) = self.surface.get_mut(id).and_then(StickerKind::as_text_mut) else {
            return false;
        };
        f(manager, sticker);
        self.surface.request_redraw();
        true
    }

    fn edit_text(&mut self, f: impl FnOnce(&mut TextSticker)) -> bool {
        let Some(id) = self.current_text_id() else {
            return false;
        };
        let Some(sticker) = self.surface.get_mut(id).and_then(StickerKind::as_text_mut) else {
            return false;
        };
        f(sticker);
        self.surface.request_redraw();
        true
    }

    // Keeps the histories in step with the surface and forwards every event.
    // Handling one event may produce more (duplicate on touch down), so this
    // drains until the surface has nothing left to report.
    fn dispatch_events(&mut self) {
        loop {
            let events = self.surface.drain_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                self.sync_histories(&event);
                let touched = match event {
                    SurfaceEvent::TouchedDown {
                        id,
                        is_update,
                        is_duplicate,
                    } => Some((id, is_update, is_duplicate)),
                    _ => None,
                };
                self.bus.emit(&EditorEvent::Surface(event));

                if let Some((id, is_update, is_duplicate)) = touched {
                    if is_duplicate {
                        self.duplicate_from_touch(id);
                    }
                    if is_update {
                        self.bus.emit(&EditorEvent::EditRequested(id));
                    }
                }
            }
        }
    }

    fn duplicate_from_touch(&mut self, source: StickerId) {
        let Some(outcome) = self.surface.duplicate(source) else {
            return;
        };
        if let Some(duplicate) = outcome.id() {
            self.bus.emit(&EditorEvent::Duplicated { source, duplicate });
        }
    }

    fn sync_histories(&mut self, event: &SurfaceEvent) {
        match event {
            SurfaceEvent::Added(id) => self.bind(*id),
            SurfaceEvent::Deleted(sticker) => self.unbind(sticker.id()),
            SurfaceEvent::Replaced { old, new } => {
                self.unbind(*old);
                self.bind(*new);
            }
            SurfaceEvent::Cleared => {
                info!("dropping {} sticker histories", self.managers.len());
                self.managers.clear();
            }
            _ => {}
        }
    }

    // Fresh history seeded with the sticker's own values as baselines.
    fn bind(&mut self, id: StickerId) {
        let Some(sticker) = self.surface.get(id).and_then(StickerKind::as_text) else {
            return;
        };
        let mut manager = RegretManager::new(id);
        manager.set_previous_text(sticker.text());
        manager.set_previous_typeface(
            sticker
                .typeface()
                .cloned()
                .unwrap_or_else(|| self.config.default_typeface.clone()),
        );
        manager.set_previous_text_color(sticker.text_color());
        manager.set_bold(sticker.style().is_bold());
        manager.set_italic(sticker.style().is_italic());
        manager.set_underline(sticker.is_underline());
        manager.set_strike_through(sticker.is_strike_through());
        debug!("history bound to sticker {id}");
        self.managers.insert(id, manager);
    }

    fn unbind(&mut self, id: StickerId) {
        if self.managers.remove(&id).is_some() {
            debug!("history dropped for sticker {id}");
        }
    }
}
