//! The sticker container: z-order, selection and the touch state machine.

use egui::{Pos2, Vec2};
use log::{debug, info, warn};
use std::collections::VecDeque;

mod icon;
mod placement;

pub use icon::{IconAction, IconAnchor, IconPlacement, StickerIcon, default_icons};
pub use placement::{HorizontalPosition, Position, VerticalPosition};

use crate::config::SurfaceConfig;
use crate::event::SurfaceEvent;
use crate::geometry::{Matrix, hit_testing};
use crate::input::{GestureConfig, GestureInterpreter, TouchAction, TouchEvent};
use crate::sticker::{Sticker, StickerId, StickerKind, is_valid_size};
use placement::{Placement, fit_at};

/// Default ceiling on the number of stickers a surface holds.
pub const DEFAULT_MAX_STICKERS: usize = 20;

/// Touch state machine modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchMode {
    None,
    Drag,
    ZoomRotate,
    Icon,
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flip {
    Horizontal,
    Vertical,
    Both,
}

impl Flip {
    fn horizontal(self) -> bool {
        matches!(self, Flip::Horizontal | Flip::Both)
    }

    fn vertical(self) -> bool {
        matches!(self, Flip::Vertical | Flip::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    LimitReached,
    /// The content has no usable intrinsic size.
    EmptyContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added(StickerId),
    /// Queued until the surface learns its size.
    Deferred(StickerId),
    Rejected(RejectReason),
}

impl AddOutcome {
    pub fn id(self) -> Option<StickerId> {
        match self {
            AddOutcome::Added(id) | AddOutcome::Deferred(id) => Some(id),
            AddOutcome::Rejected(_) => None,
        }
    }
}

/// Z-ordered stickers (index 0 at the back) with at most one current sticker.
///
/// Operations report what happened through [`StickerSurface::drain_events`]
/// and mark the surface dirty; the host repaints when
/// [`StickerSurface::take_redraw`] says so.
#[derive(Debug)]
pub struct StickerSurface {
    config: SurfaceConfig,
    gestures: GestureInterpreter,
    max_stickers: usize,

    stickers: Vec<StickerKind>,
    current: Option<StickerId>,
    icons: Vec<StickerIcon>,
    size: Option<Vec2>,
    pending: VecDeque<(StickerKind, Placement)>,

    mode: TouchMode,
    current_icon: Option<StickerIcon>,
    down_matrix: Matrix,

    events: Vec<SurfaceEvent>,
    needs_redraw: bool,
}

impl StickerSurface {
    pub fn new(config: SurfaceConfig, gesture: GestureConfig, max_stickers: usize) -> Self {
        Self {
            config,
            gestures: GestureInterpreter::new(gesture),
            max_stickers,
            stickers: Vec::new(),
            current: None,
            icons: default_icons(),
            size: None,
            pending: VecDeque::new(),
            mode: TouchMode::None,
            current_icon: None,
            down_matrix: Matrix::IDENTITY,
            events: Vec::new(),
            needs_redraw: false,
        }
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Locking through the new config interrupts any gesture in progress.
    pub fn set_config(&mut self, config: SurfaceConfig) {
        if config.locked && !self.config.locked {
            self.abort_gesture();
        }
        self.config = config;
        self.request_redraw();
    }

    pub fn set_gesture_config(&mut self, config: GestureConfig) {
        self.gestures.set_config(config);
    }

    pub fn is_locked(&self) -> bool {
        self.config.locked
    }

    /// A locked surface ignores input, so locking mid-gesture puts the
    /// sticker back where the press found it.
    pub fn set_locked(&mut self, locked: bool) {
        if locked && !self.config.locked {
            self.abort_gesture();
        }
        self.config.locked = locked;
        self.request_redraw();
    }

    pub fn set_constrained(&mut self, constrained: bool) {
        self.config.constrained = constrained;
    }

    pub fn max_stickers(&self) -> usize {
        self.max_stickers
    }

    pub fn icons(&self) -> &[StickerIcon] {
        &self.icons
    }

    pub fn set_icons(&mut self, icons: Vec<StickerIcon>) {
        self.icons = icons;
        self.request_redraw();
    }

    pub fn mode(&self) -> TouchMode {
        self.mode
    }

    pub fn size(&self) -> Option<Vec2> {
        self.size
    }

    pub fn is_laid_out(&self) -> bool {
        self.size.is_some()
    }

    /// Report the surface's pixel size. The first valid size places every
    /// sticker queued while the size was unknown.
    ///
    /// Stickers already placed keep their transforms; they are not re-fitted.
    pub fn set_size(&mut self, size: Vec2) {
        if !(size.x > 0.0 && size.y > 0.0) {
            debug!("ignoring surface size {size:?}");
            return;
        }
        if self.size == Some(size) {
            return;
        }
        self.size = Some(size);
        self.request_redraw();

        if !self.pending.is_empty() {
            info!("placing {} queued stickers", self.pending.len());
        }
        while let Some((sticker, placement)) = self.pending.pop_front() {
            self.place(sticker, placement, size);
        }
    }

    pub fn stickers(&self) -> &[StickerKind] {
        &self.stickers
    }

    /// Placed stickers plus those still waiting for a size.
    pub fn sticker_count(&self) -> usize {
        self.stickers.len() + self.pending.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sticker_count() == 0
    }

    pub fn index_of(&self, id: StickerId) -> Option<usize> {
        self.stickers.iter().position(|s| s.id() == id)
    }

    pub fn get(&self, id: StickerId) -> Option<&StickerKind> {
        self.stickers.iter().find(|s| s.id() == id)
    }

    /// Direct access for content edits. Call [`StickerSurface::request_redraw`] after.
    pub fn get_mut(&mut self, id: StickerId) -> Option<&mut StickerKind> {
        self.stickers.iter_mut().find(|s| s.id() == id)
    }

    pub fn current_id(&self) -> Option<StickerId> {
        self.current
    }

    pub fn current(&self) -> Option<&StickerKind> {
        self.current.and_then(|id| self.get(id))
    }

    pub fn current_mut(&mut self) -> Option<&mut StickerKind> {
        let id = self.current?;
        self.get_mut(id)
    }

    /// Select a sticker, or clear the selection with `None`. Unknown ids are ignored.
    pub fn set_current(&mut self, id: Option<StickerId>) -> bool {
        if let Some(id) = id {
            if self.index_of(id).is_none() {
                return false;
            }
        }
        if self.current != id {
            self.current = id;
            self.request_redraw();
        }
        true
    }

    pub fn add_sticker(&mut self, sticker: StickerKind) -> AddOutcome {
        self.add_sticker_at(sticker, Position::CENTER)
    }

    /// Add a sticker scaled to fit and placed at `position`. It becomes current.
    pub fn add_sticker_at(&mut self, sticker: StickerKind, position: Position) -> AddOutcome {
        self.insert(sticker, Placement::At(position))
    }

    /// Copy a sticker next to the original. The copy becomes current.
    pub fn duplicate(&mut self, id: StickerId) -> Option<AddOutcome> {
        let source = self.get(id)?;
        let copy = source.duplicate();
        let matrix = *source.matrix();
        info!("duplicating sticker {id} as {}", copy.id());
        Some(self.insert(copy, Placement::NextTo(matrix)))
    }

    pub fn duplicate_current(&mut self) -> Option<AddOutcome> {
        let id = self.current?;
        self.duplicate(id)
    }

    fn insert(&mut self, sticker: StickerKind, placement: Placement) -> AddOutcome {
        if self.sticker_count() >= self.max_stickers {
            warn!("sticker limit of {} reached", self.max_stickers);
            self.events.push(SurfaceEvent::LimitReached);
            return AddOutcome::Rejected(RejectReason::LimitReached);
        }
        if !is_valid_size(sticker.size()) {
            warn!("refusing {} sticker with size {:?}", sticker.sticker_type(), sticker.size());
            return AddOutcome::Rejected(RejectReason::EmptyContent);
        }

        let id = sticker.id();
        match self.size {
            Some(size) => {
                self.place(sticker, placement, size);
                AddOutcome::Added(id)
            }
            None => {
                debug!("surface not laid out, queueing sticker {id}");
                self.pending.push_back((sticker, placement));
                AddOutcome::Deferred(id)
            }
        }
    }

    fn place(&mut self, mut sticker: StickerKind, placement: Placement, size: Vec2) {
        placement.apply(
            &mut sticker,
            size,
            self.config.initial_fill,
            self.config.duplicate_offset,
        );
        let id = sticker.id();
        info!("added {} sticker {id}", sticker.sticker_type());
        self.stickers.push(sticker);
        self.current = Some(id);
        self.events.push(SurfaceEvent::Added(id));
        self.request_redraw();
    }

    /// Swap the current sticker for `sticker` at the same layer.
    ///
    /// With `keep_state` the new sticker takes over the transform and flips,
    /// otherwise it is centered and fitted like a fresh add.
    pub fn replace_current(&mut self, mut sticker: StickerKind, keep_state: bool) -> bool {
        let Some(old_id) = self.current else {
            return false;
        };
        let Some(index) = self.index_of(old_id) else {
            return false;
        };

        let old = &self.stickers[index];
        if keep_state {
            let matrix = *old.matrix();
            sticker.set_matrix(&matrix);
            sticker.set_flipped_horizontally(old.is_flipped_horizontally());
            sticker.set_flipped_vertically(old.is_flipped_vertically());
        } else if let Some(size) = self.size {
            let matrix = fit_at(&sticker, Position::CENTER, size, self.config.initial_fill);
            sticker.set_matrix(&matrix);
        }

        let new_id = sticker.id();
        self.stickers[index] = sticker;
        self.current = Some(new_id);
        self.reset_touch();
        self.events.push(SurfaceEvent::Replaced {
            old: old_id,
            new: new_id,
        });
        self.request_redraw();
        true
    }

    pub fn remove(&mut self, id: StickerId) -> bool {
        let Some(index) = self.index_of(id) else {
            debug!("remove: sticker {id} is not on this surface");
            return false;
        };
        let sticker = self.stickers.remove(index);
        if self.current == Some(id) {
            self.current = None;
            self.reset_touch();
        }
        info!("removed {} sticker {id}", sticker.sticker_type());
        self.events.push(SurfaceEvent::Deleted(sticker));
        self.request_redraw();
        true
    }

    pub fn remove_current(&mut self) -> bool {
        match self.current {
            Some(id) => self.remove(id),
            None => false,
        }
    }

    /// Drop every sticker, queued ones included.
    pub fn remove_all(&mut self) {
        self.stickers.clear();
        self.pending.clear();
        self.current = None;
        self.reset_touch();
        info!("removed all stickers");
        self.events.push(SurfaceEvent::Cleared);
        self.request_redraw();
    }

    /// Mirror a sticker about its own center.
    pub fn flip(&mut self, id: StickerId, flip: Flip) -> bool {
        let Some(sticker) = self.get_mut(id) else {
            return false;
        };
        let center = sticker.center_point();
        if flip.horizontal() {
            sticker.matrix_mut().pre_scale(-1.0, 1.0, center);
            let flipped = !sticker.is_flipped_horizontally();
            sticker.set_flipped_horizontally(flipped);
        }
        if flip.vertical() {
            sticker.matrix_mut().pre_scale(1.0, -1.0, center);
            let flipped = !sticker.is_flipped_vertically();
            sticker.set_flipped_vertically(flipped);
        }
        self.events.push(SurfaceEvent::Flipped(id));
        self.request_redraw();
        true
    }

    pub fn flip_current(&mut self, flip: Flip) -> bool {
        match self.current {
            Some(id) => self.flip(id, flip),
            None => false,
        }
    }

    /// Exchange the stickers at two layers. Out-of-range layers do nothing.
    pub fn swap_layers(&mut self, first: usize, second: usize) -> bool {
        if first >= self.stickers.len() || second >= self.stickers.len() {
            return false;
        }
        self.stickers.swap(first, second);
        self.request_redraw();
        true
    }

    /// Move the sticker at layer `from` to layer `to`, shifting the ones between.
    pub fn send_to_layer(&mut self, from: usize, to: usize) -> bool {
        if from >= self.stickers.len() || to >= self.stickers.len() {
            return false;
        }
        let sticker = self.stickers.remove(from);
        self.stickers.insert(to, sticker);
        self.request_redraw();
        true
    }

    /// Icons to draw around the current sticker, empty when hidden.
    pub fn icon_placements(&self) -> Vec<IconPlacement> {
        if !self.config.show_icons || self.config.locked {
            return Vec::new();
        }
        let Some(sticker) = self.current() else {
            return Vec::new();
        };
        let corners = sticker.mapped_bound_points();
        let rotation = hit_testing::rotation_degrees(corners[3], corners[2]);
        self.icons
            .iter()
            .map(|icon| IconPlacement {
                icon: *icon,
                center: corners[icon.anchor.corner_index()],
                rotation,
            })
            .collect()
    }

    /// Events produced since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Whether anything changed since the last call. Clears the flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Feed one pointer event. Returns `false` when the event is not for the
    /// stickers and the host should route it elsewhere.
    pub fn on_touch_event(&mut self, event: &TouchEvent) -> bool {
        if self.config.locked {
            return false;
        }
        match event.action {
            TouchAction::Down => self.on_touch_down(event),
            TouchAction::PointerDown => {
                self.on_pointer_down(event);
                true
            }
            TouchAction::Move => {
                self.on_touch_move(event);
                true
            }
            TouchAction::PointerUp => {
                if self.mode == TouchMode::ZoomRotate {
                    if let Some(id) = self.current {
                        self.events.push(SurfaceEvent::ZoomFinished(id));
                    }
                }
                self.gestures.end_pinch();
                self.set_mode(TouchMode::None);
                true
            }
            TouchAction::Up => {
                self.on_touch_up(event);
                true
            }
            TouchAction::Cancel => {
                self.on_touch_cancel();
                true
            }
        }
    }

    fn on_touch_down(&mut self, event: &TouchEvent) -> bool {
        let Some(pos) = event.position() else {
            return false;
        };
        self.gestures.begin(pos);
        self.current_icon = self.find_icon_touched(pos);

        if let Some(icon) = self.current_icon {
            self.set_mode(TouchMode::Icon);
            if icon.action == IconAction::ZoomRotate {
                if let Some(center) = self.current().map(|s| s.mapped_center_point()) {
                    self.gestures.begin_pivot(center);
                }
            }
        } else {
            let touched = self.find_handling_sticker(pos);
            if touched != self.current {
                self.current = touched;
                self.request_redraw();
            }
            self.set_mode(if touched.is_some() {
                TouchMode::Drag
            } else {
                TouchMode::None
            });
        }

        let Some(id) = self.current else {
            return false;
        };
        let anchor = self.current_icon.map(|icon| icon.anchor);
        self.events.push(SurfaceEvent::TouchedDown {
            id,
            is_update: anchor == Some(IconAnchor::LeftBottom),
            is_duplicate: anchor == Some(IconAnchor::RightTop),
        });
        if let Some(index) = self.index_of(id) {
            self.down_matrix = *self.stickers[index].matrix();
            if self.config.bring_to_front_current && index + 1 != self.stickers.len() {
                let sticker = self.stickers.remove(index);
                self.stickers.push(sticker);
            }
        }
        self.request_redraw();
        true
    }

    fn on_pointer_down(&mut self, event: &TouchEvent) {
        if self.mode != TouchMode::Drag || event.pointers.len() < 2 {
            return;
        }
        let Some(matrix) = self.current().map(|s| *s.matrix()) else {
            return;
        };
        if self.gestures.begin_pinch(event.pointers[0], event.pointers[1]) {
            self.down_matrix = matrix;
            self.set_mode(TouchMode::ZoomRotate);
        }
    }

    fn on_touch_move(&mut self, event: &TouchEvent) {
        let Some(pos) = event.position() else {
            return;
        };
        let matrix = match self.mode {
            TouchMode::Drag => {
                let delta = self.gestures.drag_delta(pos);
                let mut matrix = self.down_matrix;
                matrix.post_translate(delta.x, delta.y);
                Some(matrix)
            }
            TouchMode::ZoomRotate => self
                .gestures
                .pinch_delta(&event.pointers)
                .map(|delta| delta.apply_to(&self.down_matrix)),
            TouchMode::Icon => match self.current_icon.map(|icon| icon.action) {
                Some(IconAction::ZoomRotate) => self
                    .gestures
                    .pivot_delta(pos)
                    .map(|delta| delta.apply_to(&self.down_matrix)),
                _ => None,
            },
            TouchMode::None | TouchMode::Click => None,
        };
        let Some(matrix) = matrix else {
            return;
        };
        if !self.current().is_some_and(|sticker| is_usable_transform(sticker, &matrix)) {
            debug!("dropping degenerate transform {:?}", matrix.values());
            return;
        }

        let constrain = self.mode == TouchMode::Drag && self.config.constrained;
        let size = self.size;
        if let Some(sticker) = self.current_mut() {
            sticker.set_matrix(&matrix);
            if constrain {
                if let Some(size) = size {
                    constrain_center(sticker, size);
                }
            }
            self.request_redraw();
        }
    }

    fn on_touch_up(&mut self, event: &TouchEvent) {
        let pos = event.position().unwrap_or(self.gestures.down_pos());
        match (self.mode, self.current) {
            (TouchMode::Icon, Some(id)) => {
                if let Some(icon) = self.current_icon {
                    self.release_icon(icon, id);
                }
            }
            (TouchMode::Drag, Some(id)) => {
                if self.gestures.is_within_slop(pos) {
                    self.set_mode(TouchMode::Click);
                    self.events.push(SurfaceEvent::Clicked(id));
                    if self.gestures.register_click(event.time_ms) {
                        self.events.push(SurfaceEvent::DoubleTapped(id));
                    }
                } else {
                    self.events.push(SurfaceEvent::DragFinished(id));
                }
            }
            _ => {}
        }
        self.reset_touch();
        self.request_redraw();
    }

    fn on_touch_cancel(&mut self) {
        self.abort_gesture();
    }

    // Puts the current sticker back on its down matrix and forgets the gesture.
    fn abort_gesture(&mut self) {
        if self.mode != TouchMode::None {
            debug!("aborting {:?} gesture", self.mode);
        }
        let restores = matches!(
            self.mode,
            TouchMode::Drag | TouchMode::ZoomRotate | TouchMode::Icon
        );
        if restores {
            let down = self.down_matrix;
            if let Some(sticker) = self.current_mut() {
                sticker.set_matrix(&down);
                self.request_redraw();
            }
        }
        self.reset_touch();
    }

    fn release_icon(&mut self, icon: StickerIcon, id: StickerId) {
        match icon.action {
            IconAction::Delete => {
                self.remove(id);
            }
            IconAction::ZoomRotate => self.events.push(SurfaceEvent::ZoomFinished(id)),
            IconAction::FlipHorizontal => {
                self.flip(id, Flip::Horizontal);
            }
            IconAction::FlipVertical => {
                self.flip(id, Flip::Vertical);
            }
            IconAction::Duplicate | IconAction::Edit => {}
        }
    }

    /// Closest icon of the current sticker within reach of `pos`.
    fn find_icon_touched(&self, pos: Pos2) -> Option<StickerIcon> {
        self.icon_placements()
            .into_iter()
            .filter_map(|placement| {
                hit_testing::icon_hit_distance_sq(placement.center, pos, self.config.icon_radius)
                    .map(|distance| (placement.icon, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(icon, _)| icon)
    }

    /// Topmost sticker containing `pos`.
    fn find_handling_sticker(&self, pos: Pos2) -> Option<StickerId> {
        self.stickers
            .iter()
            .rev()
            .find(|sticker| sticker.contains(pos))
            .map(|sticker| sticker.id())
    }

    fn set_mode(&mut self, mode: TouchMode) {
        if self.mode != mode {
            debug!("touch mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    fn reset_touch(&mut self) {
        self.set_mode(TouchMode::None);
        self.current_icon = None;
        self.gestures.reset();
    }
}

impl Default for StickerSurface {
    fn default() -> Self {
        Self::new(
            SurfaceConfig::default(),
            GestureConfig::default(),
            DEFAULT_MAX_STICKERS,
        )
    }
}

/// Whether `matrix` keeps the sticker invertible and at least
/// [`MIN_STICKER_SIZE`](crate::sticker::MIN_STICKER_SIZE) on each side.
fn is_usable_transform(sticker: &StickerKind, matrix: &Matrix) -> bool {
    matrix.is_invertible() && is_valid_size(sticker.size() * matrix.scale())
}

/// Pull the sticker back so its mapped center lies inside `[0, w] x [0, h]`.
fn constrain_center(sticker: &mut StickerKind, size: Vec2) {
    let center = sticker.mapped_center_point();
    let mut dx = 0.0;
    let mut dy = 0.0;
    if center.x < 0.0 {
        dx = -center.x;
    }
    if center.x > size.x {
        dx = size.x - center.x;
    }
    if center.y < 0.0 {
        dy = -center.y;
    }
    if center.y > size.y {
        dy = size.y - center.y;
    }
    if dx != 0.0 || dy != 0.0 {
        sticker.matrix_mut().post_translate(dx, dy);
    }
}
