use egui::{Pos2, Vec2};
use log::debug;
use serde::{Deserialize, Serialize};

use super::TouchPoint;
use crate::geometry::{Matrix, hit_testing};

/// Configuration for gesture recognition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Maximum movement, per axis, for a press to still count as a click (pixels)
    pub touch_slop: f32,
    /// Maximum time between two clicks for a double tap (milliseconds)
    pub min_click_delay_ms: u64,
    /// Scale ratios at or below this are treated as degenerate
    pub min_scale_delta: f32,
    /// Icon rotations smaller than this are ignored (degrees)
    pub min_rotation_delta: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            touch_slop: 8.0,
            min_click_delay_ms: 200,
            min_scale_delta: 1e-3,
            min_rotation_delta: 0.01,
        }
    }
}

/// Transform change produced by a gesture relative to its start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureDelta {
    pub scale: f32,
    /// Degrees, clockwise on screen.
    pub rotation: f32,
    pub translation: Vec2,
    pub pivot: Pos2,
}

impl GestureDelta {
    /// `down` followed by scale and rotation about the pivot, then translation.
    pub fn apply_to(&self, down: &Matrix) -> Matrix {
        let mut matrix = *down;
        matrix.post_scale(self.scale, self.scale, self.pivot);
        matrix.post_rotate(self.rotation, self.pivot);
        matrix.post_translate(self.translation.x, self.translation.y);
        matrix
    }
}

#[derive(Debug, Clone, Copy)]
struct PinchStart {
    ids: (u64, u64),
    distance: f32,
    angle: f32,
    midpoint: Pos2,
}

#[derive(Debug, Clone, Copy)]
struct PivotStart {
    center: Pos2,
    distance: f32,
    angle: f32,
}

/// Classifies a pointer stream and measures it against its starting state.
///
/// Every delta is computed from the recorded start of the gesture, never
/// from the previous event, so replaying the same pointers always yields the
/// same transform.
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    config: GestureConfig,
    down_pos: Pos2,
    last_click_time: Option<u64>,
    pinch: Option<PinchStart>,
    pivot: Option<PivotStart>,
}

impl GestureInterpreter {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            down_pos: Pos2::ZERO,
            last_click_time: None,
            pinch: None,
            pivot: None,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }

    /// First pointer went down.
    pub fn begin(&mut self, pos: Pos2) {
        self.down_pos = pos;
        self.pinch = None;
        self.pivot = None;
    }

    pub fn down_pos(&self) -> Pos2 {
        self.down_pos
    }

    /// Translation of the first pointer since [`GestureInterpreter::begin`].
    pub fn drag_delta(&self, pos: Pos2) -> Vec2 {
        pos - self.down_pos
    }

    /// Whether `pos` stayed within the click slop of the down position.
    pub fn is_within_slop(&self, pos: Pos2) -> bool {
        let delta = self.drag_delta(pos);
        delta.x.abs() < self.config.touch_slop && delta.y.abs() < self.config.touch_slop
    }

    /// Start a two-finger gesture. Fails for coincident pointers.
    pub fn begin_pinch(&mut self, first: TouchPoint, second: TouchPoint) -> bool {
        let distance = hit_testing::distance(first.pos, second.pos);
        if distance <= f32::EPSILON {
            debug!("pinch start rejected, pointers coincide");
            return false;
        }
        self.pinch = Some(PinchStart {
            ids: (first.id, second.id),
            distance,
            angle: hit_testing::rotation_degrees(first.pos, second.pos),
            midpoint: hit_testing::midpoint(first.pos, second.pos),
        });
        true
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    pub fn end_pinch(&mut self) {
        self.pinch = None;
    }

    /// Scale, rotation and midpoint travel of the two tracked pointers,
    /// anchored at the starting midpoint.
    pub fn pinch_delta(&self, pointers: &[TouchPoint]) -> Option<GestureDelta> {
        let start = self.pinch?;
        let first = pointers.iter().find(|p| p.id == start.ids.0)?;
        let second = pointers.iter().find(|p| p.id == start.ids.1)?;

        let scale = hit_testing::distance(first.pos, second.pos) / start.distance;
        if !self.is_usable_scale(scale) {
            debug!("pinch delta rejected, scale {scale}");
            return None;
        }
        let angle = hit_testing::rotation_degrees(first.pos, second.pos);
        Some(GestureDelta {
            scale,
            rotation: normalize_degrees(angle - start.angle),
            translation: hit_testing::midpoint(first.pos, second.pos) - start.midpoint,
            pivot: start.midpoint,
        })
    }

    /// Start a single-finger zoom/rotate around `center` from the down position.
    pub fn begin_pivot(&mut self, center: Pos2) -> bool {
        let distance = hit_testing::distance(center, self.down_pos);
        if distance <= f32::EPSILON {
            debug!("pivot start rejected, pointer on the pivot");
            self.pivot = None;
            return false;
        }
        self.pivot = Some(PivotStart {
            center,
            distance,
            angle: hit_testing::rotation_degrees(self.down_pos, center),
        });
        true
    }

    /// Scale and rotation of `pos` around the pivot, compared to the down position.
    pub fn pivot_delta(&self, pos: Pos2) -> Option<GestureDelta> {
        let start = self.pivot?;
        let scale = hit_testing::distance(start.center, pos) / start.distance;
        if !self.is_usable_scale(scale) {
            debug!("pivot delta rejected, scale {scale}");
            return None;
        }
        let mut rotation = normalize_degrees(hit_testing::rotation_degrees(pos, start.center) - start.angle);
        if rotation.abs() < self.config.min_rotation_delta {
            rotation = 0.0;
        }
        Some(GestureDelta {
            scale,
            rotation,
            translation: Vec2::ZERO,
            pivot: start.center,
        })
    }

    /// Record a click at `time_ms`. Returns true if it completes a double tap.
    pub fn register_click(&mut self, time_ms: u64) -> bool {
        let double = self
            .last_click_time
            .is_some_and(|last| time_ms.saturating_sub(last) < self.config.min_click_delay_ms);
        self.last_click_time = Some(time_ms);
        double
    }

    /// Forget the active gesture; click timing survives.
    pub fn reset(&mut self) {
        self.pinch = None;
        self.pivot = None;
    }

    fn is_usable_scale(&self, scale: f32) -> bool {
        scale.is_finite() && scale > self.config.min_scale_delta
    }
}

impl Default for GestureInterpreter {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

/// Wraps an angle difference into (-180, 180].
fn normalize_degrees(degrees: f32) -> f32 {
    let mut d = degrees % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d <= -180.0 {
        d += 360.0;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn point(id: u64, x: f32, y: f32) -> TouchPoint {
        TouchPoint::new(id, pos2(x, y))
    }

    #[test]
    fn pinch_measures_scale_and_rotation() {
        let mut gestures = GestureInterpreter::default();
        assert!(gestures.begin_pinch(point(0, 0.0, 0.0), point(1, 100.0, 0.0)));
        let delta = gestures
            .pinch_delta(&[point(0, 0.0, 0.0), point(1, 0.0, 200.0)])
            .unwrap();
        assert!((delta.scale - 2.0).abs() < 0.001);
        assert!((delta.rotation - 90.0).abs() < 0.001);
        assert_eq!(delta.pivot, pos2(50.0, 0.0));

        assert!(gestures.is_pinching());
        gestures.end_pinch();
        assert!(!gestures.is_pinching());
        assert!(gestures.pinch_delta(&[point(0, 0.0, 0.0), point(1, 0.0, 200.0)]).is_none());
    }

    #[test]
    fn rotation_across_the_branch_cut_stays_small() {
        let mut gestures = GestureInterpreter::default();
        // the pointer line points along -x, where atan2 jumps from 180 to -180
        gestures.begin_pinch(point(0, 0.0, 0.0), point(1, 100.0, 1.0));
        let delta = gestures
            .pinch_delta(&[point(0, 0.0, 0.0), point(1, 100.0, -1.0)])
            .unwrap();
        assert!(delta.rotation.abs() < 2.0);
    }

    #[test]
    fn collapsed_pinch_is_rejected() {
        let mut gestures = GestureInterpreter::default();
        gestures.begin_pinch(point(0, 0.0, 0.0), point(1, 100.0, 0.0));
        assert!(gestures.pinch_delta(&[point(0, 50.0, 0.0), point(1, 50.0, 0.0)]).is_none());
        assert!(!gestures.begin_pinch(point(0, 5.0, 5.0), point(1, 5.0, 5.0)));
    }

    #[test]
    fn pinch_needs_both_tracked_pointers() {
        let mut gestures = GestureInterpreter::default();
        gestures.begin_pinch(point(3, 0.0, 0.0), point(7, 100.0, 0.0));
        assert!(gestures.pinch_delta(&[point(3, 0.0, 0.0)]).is_none());
    }

    #[test]
    fn slop_is_checked_per_axis() {
        let mut gestures = GestureInterpreter::default();
        gestures.begin(pos2(10.0, 10.0));
        assert!(gestures.is_within_slop(pos2(17.0, 3.0)));
        assert!(!gestures.is_within_slop(pos2(18.0, 10.0)));
    }

    #[test]
    fn double_tap_window() {
        let mut gestures = GestureInterpreter::default();
        assert!(!gestures.register_click(1_000));
        assert!(gestures.register_click(1_150));
        assert!(!gestures.register_click(1_400));
    }

    #[test]
    fn pivot_delta_follows_pointer_around_center() {
        let mut gestures = GestureInterpreter::default();
        gestures.begin(pos2(150.0, 100.0));
        assert!(gestures.begin_pivot(pos2(100.0, 100.0)));
        let delta = gestures.pivot_delta(pos2(100.0, 200.0)).unwrap();
        assert!((delta.scale - 2.0).abs() < 0.001);
        assert!((delta.rotation - 90.0).abs() < 0.001);
        assert_eq!(delta.translation, Vec2::ZERO);
    }

    #[test]
    fn normalize_wraps_into_half_open_range() {
        assert_eq!(normalize_degrees(350.0), -10.0);
        assert_eq!(normalize_degrees(-190.0), 170.0);
        assert_eq!(normalize_degrees(180.0), 180.0);
    }
}
