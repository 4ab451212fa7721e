use egui::{Pos2, pos2, vec2};
use photo_templates::config::SurfaceConfig;
use photo_templates::geometry::Matrix;
use photo_templates::input::{GestureConfig, GestureDelta, TouchAction, TouchEvent, TouchPoint};
use photo_templates::sticker::{DrawableHandle, MIN_STICKER_SIZE, Sticker, StickerId, factory};
use photo_templates::surface::{AddOutcome, Flip, StickerSurface, TouchMode};
use photo_templates::SurfaceEvent;

// With this fill a 100x100 sticker lands unscaled in the middle of the
// 1000x1000 surface, spanning (450, 450) to (550, 550).
fn surface() -> StickerSurface {
    let config = SurfaceConfig {
        initial_fill: 0.1,
        ..SurfaceConfig::default()
    };
    let mut surface = StickerSurface::new(config, GestureConfig::default(), 20);
    surface.set_size(vec2(1000.0, 1000.0));
    surface
}

fn add_square(surface: &mut StickerSurface) -> StickerId {
    let outcome = surface.add_sticker(factory::create_image(DrawableHandle(1), vec2(100.0, 100.0)));
    match outcome {
        AddOutcome::Added(id) => id,
        other => panic!("expected the sticker to be placed, got {other:?}"),
    }
}

fn approx_pos(a: Pos2, b: Pos2) -> bool {
    (a.x - b.x).abs() < 0.01 && (a.y - b.y).abs() < 0.01
}

fn approx_matrix(a: &Matrix, b: &Matrix) -> bool {
    a.values()
        .iter()
        .zip(b.values())
        .all(|(x, y)| (x - y).abs() < 0.01)
}

#[test]
fn replaying_a_gesture_does_not_drift() {
    let mut down = Matrix::from_translation(vec2(450.0, 450.0));
    down.post_rotate(12.0, pos2(500.0, 500.0));
    let delta = GestureDelta {
        scale: 1.37,
        rotation: -23.5,
        translation: vec2(14.0, -6.0),
        pivot: pos2(510.0, 490.0),
    };
    let first = delta.apply_to(&down);
    let second = delta.apply_to(&down);
    assert_eq!(first.values(), second.values());

    let mut expected = down;
    expected.post_scale(1.37, 1.37, pos2(510.0, 490.0));
    expected.post_rotate(-23.5, pos2(510.0, 490.0));
    expected.post_translate(14.0, -6.0);
    assert_eq!(first.values(), expected.values());
}

#[test]
fn repeated_moves_to_the_same_point_land_on_the_same_matrix() {
    let mut surface = surface();
    let id = add_square(&mut surface);
    surface.on_touch_event(&TouchEvent::down(pos2(500.0, 500.0), 0));
    surface.on_touch_event(&TouchEvent::moved(pos2(530.0, 480.0), 10));
    let once = *surface.get(id).unwrap().matrix();
    surface.on_touch_event(&TouchEvent::moved(pos2(700.0, 700.0), 20));
    surface.on_touch_event(&TouchEvent::moved(pos2(530.0, 480.0), 30));
    assert_eq!(surface.get(id).unwrap().matrix().values(), once.values());
}

#[test]
fn topmost_sticker_wins_the_touch() {
    let mut surface = surface();
    let bottom = add_square(&mut surface);
    let top = add_square(&mut surface);
    assert!(surface.set_current(Some(bottom)));

    assert!(surface.on_touch_event(&TouchEvent::down(pos2(500.0, 500.0), 0)));
    assert_eq!(surface.current_id(), Some(top));
    assert_eq!(surface.mode(), TouchMode::Drag);
}

#[test]
fn touch_on_empty_space_clears_the_selection() {
    let mut surface = surface();
    add_square(&mut surface);
    assert!(!surface.on_touch_event(&TouchEvent::down(pos2(50.0, 50.0), 0)));
    assert_eq!(surface.current_id(), None);
    assert_eq!(surface.mode(), TouchMode::None);
}

#[test]
fn constrained_drag_stops_the_center_on_the_edge() {
    let mut surface = surface();
    surface.set_constrained(true);
    let id = add_square(&mut surface);

    surface.on_touch_event(&TouchEvent::down(pos2(500.0, 500.0), 0));
    surface.on_touch_event(&TouchEvent::moved(pos2(1700.0, 500.0), 16));
    let center = surface.get(id).unwrap().mapped_center_point();
    assert_eq!(center, pos2(1000.0, 500.0));

    surface.on_touch_event(&TouchEvent::moved(pos2(500.0, -300.0), 32));
    let center = surface.get(id).unwrap().mapped_center_point();
    assert_eq!(center, pos2(500.0, 0.0));
}

#[test]
fn unconstrained_drag_can_leave_the_surface() {
    let mut surface = surface();
    let id = add_square(&mut surface);
    surface.on_touch_event(&TouchEvent::down(pos2(500.0, 500.0), 0));
    surface.on_touch_event(&TouchEvent::moved(pos2(1700.0, 500.0), 16));
    assert_eq!(surface.get(id).unwrap().mapped_center_point(), pos2(1700.0, 500.0));
}

#[test]
fn two_finger_gesture_scales_and_rotates_about_the_midpoint() {
    let mut surface = surface();
    let id = add_square(&mut surface);
    let down = *surface.get(id).unwrap().matrix();

    // the first finger stays clear of the corner icons
    let first = pos2(500.0, 500.0);
    let second = pos2(600.0, 500.0);
    let mid = pos2(550.0, 500.0);
    surface.on_touch_event(&TouchEvent::new(
        TouchAction::Down,
        vec![TouchPoint::new(0, first)],
        0,
    ));
    surface.on_touch_event(
        &TouchEvent::new(
            TouchAction::PointerDown,
            vec![TouchPoint::new(0, first), TouchPoint::new(1, second)],
            5,
        )
        .with_action_index(1),
    );
    assert_eq!(surface.mode(), TouchMode::ZoomRotate);

    let (sin, cos) = 30f32.to_radians().sin_cos();
    let arm = vec2(75.0 * cos, 75.0 * sin);
    surface.on_touch_event(&TouchEvent::new(
        TouchAction::Move,
        vec![TouchPoint::new(0, mid - arm), TouchPoint::new(1, mid + arm)],
        20,
    ));

    let sticker = surface.get(id).unwrap();
    assert!((sticker.current_scale() - 1.5).abs() < 0.001);
    assert!((sticker.current_angle() - 30.0).abs() < 0.01);

    let mut expected = down;
    expected.post_scale(1.5, 1.5, mid);
    expected.post_rotate(30.0, mid);
    assert!(approx_matrix(sticker.matrix(), &expected));

    surface.on_touch_event(
        &TouchEvent::new(
            TouchAction::PointerUp,
            vec![TouchPoint::new(0, mid - arm), TouchPoint::new(1, mid + arm)],
            30,
        )
        .with_action_index(1),
    );
    assert_eq!(surface.mode(), TouchMode::None);
    assert!(surface.drain_events().contains(&SurfaceEvent::ZoomFinished(id)));
}

#[test]
fn release_within_slop_is_a_click_and_a_quick_second_is_a_double_tap() {
    let mut surface = surface();
    let id = add_square(&mut surface);
    surface.drain_events();

    surface.on_touch_event(&TouchEvent::down(pos2(500.0, 500.0), 1_000));
    surface.on_touch_event(&TouchEvent::up(pos2(503.0, 502.0), 1_050));
    let events = surface.drain_events();
    assert!(events.contains(&SurfaceEvent::Clicked(id)));
    assert!(!events.contains(&SurfaceEvent::DoubleTapped(id)));

    surface.on_touch_event(&TouchEvent::down(pos2(500.0, 500.0), 1_100));
    surface.on_touch_event(&TouchEvent::up(pos2(500.0, 500.0), 1_150));
    let events = surface.drain_events();
    assert!(events.contains(&SurfaceEvent::Clicked(id)));
    assert!(events.contains(&SurfaceEvent::DoubleTapped(id)));
    assert_eq!(surface.mode(), TouchMode::None);
}

#[test]
fn release_beyond_slop_finishes_a_drag() {
    let mut surface = surface();
    let id = add_square(&mut surface);
    surface.drain_events();

    surface.on_touch_event(&TouchEvent::down(pos2(500.0, 500.0), 0));
    surface.on_touch_event(&TouchEvent::moved(pos2(540.0, 500.0), 10));
    surface.on_touch_event(&TouchEvent::up(pos2(540.0, 500.0), 20));
    let events = surface.drain_events();
    assert!(events.contains(&SurfaceEvent::DragFinished(id)));
    assert!(!events.contains(&SurfaceEvent::Clicked(id)));
    assert_eq!(surface.get(id).unwrap().mapped_center_point(), pos2(540.0, 500.0));
}

#[test]
fn cancel_restores_the_transform_from_the_press() {
    let mut surface = surface();
    let id = add_square(&mut surface);
    let before = *surface.get(id).unwrap().matrix();

    surface.on_touch_event(&TouchEvent::down(pos2(500.0, 500.0), 0));
    surface.on_touch_event(&TouchEvent::moved(pos2(640.0, 610.0), 10));
    surface.on_touch_event(&TouchEvent::cancel(20));
    assert_eq!(*surface.get(id).unwrap().matrix(), before);
    assert_eq!(surface.mode(), TouchMode::None);
}

#[test]
fn delete_icon_removes_the_sticker_on_release() {
    let mut surface = surface();
    let id = add_square(&mut surface);
    surface.drain_events();

    // the delete icon sits on the top-left corner at (450, 450)
    surface.on_touch_event(&TouchEvent::down(pos2(455.0, 452.0), 0));
    assert_eq!(surface.mode(), TouchMode::Icon);
    let events = surface.drain_events();
    assert!(events.contains(&SurfaceEvent::TouchedDown {
        id,
        is_update: false,
        is_duplicate: false,
    }));
    assert!(surface.get(id).is_some());

    surface.on_touch_event(&TouchEvent::up(pos2(455.0, 452.0), 10));
    assert!(surface.get(id).is_none());
    assert_eq!(surface.current_id(), None);
    let events = surface.drain_events();
    assert!(matches!(events.as_slice(), [SurfaceEvent::Deleted(sticker)] if sticker.id() == id));
}

#[test]
fn corner_icons_report_edit_and_duplicate_presses() {
    let mut surface = surface();
    let id = add_square(&mut surface);
    surface.drain_events();

    surface.on_touch_event(&TouchEvent::down(pos2(452.0, 548.0), 0));
    surface.on_touch_event(&TouchEvent::up(pos2(452.0, 548.0), 5));
    assert!(surface.drain_events().contains(&SurfaceEvent::TouchedDown {
        id,
        is_update: true,
        is_duplicate: false,
    }));

    surface.on_touch_event(&TouchEvent::down(pos2(548.0, 452.0), 10));
    surface.on_touch_event(&TouchEvent::up(pos2(548.0, 452.0), 15));
    assert!(surface.drain_events().contains(&SurfaceEvent::TouchedDown {
        id,
        is_update: false,
        is_duplicate: true,
    }));
    assert_eq!(surface.stickers().len(), 1);
}

#[test]
fn zoom_icon_scales_around_the_sticker_center() {
    let mut surface = surface();
    let id = add_square(&mut surface);
    surface.drain_events();

    surface.on_touch_event(&TouchEvent::down(pos2(550.0, 550.0), 0));
    assert_eq!(surface.mode(), TouchMode::Icon);
    surface.on_touch_event(&TouchEvent::moved(pos2(600.0, 600.0), 10));

    let sticker = surface.get(id).unwrap();
    assert!((sticker.current_scale() - 2.0).abs() < 0.001);
    assert!(sticker.current_angle().abs() < 0.01);
    assert!(approx_pos(sticker.mapped_center_point(), pos2(500.0, 500.0)));

    surface.on_touch_event(&TouchEvent::up(pos2(600.0, 600.0), 20));
    assert!(surface.drain_events().contains(&SurfaceEvent::ZoomFinished(id)));
}

#[test]
fn zoom_icon_cannot_collapse_the_sticker() {
    let mut surface = surface();
    let id = add_square(&mut surface);

    // shrink to a tenth: 10x10 around (500, 500)
    surface.on_touch_event(&TouchEvent::down(pos2(550.0, 550.0), 0));
    surface.on_touch_event(&TouchEvent::moved(pos2(505.0, 505.0), 10));
    surface.on_touch_event(&TouchEvent::up(pos2(505.0, 505.0), 20));
    let sticker = surface.get(id).unwrap();
    assert!((sticker.current_scale() - 0.1).abs() < 0.001);
    let shrunk = *sticker.matrix();

    // the zoom icon now sits on (505, 505); dragging it onto the center
    // would leave a sub-pixel sticker
    surface.on_touch_event(&TouchEvent::down(pos2(505.0, 505.0), 30));
    assert_eq!(surface.mode(), TouchMode::Icon);
    surface.on_touch_event(&TouchEvent::moved(pos2(500.1, 500.1), 40));
    surface.on_touch_event(&TouchEvent::up(pos2(500.1, 500.1), 50));

    let sticker = surface.get(id).unwrap();
    assert!(sticker.matrix().is_invertible());
    assert!(approx_matrix(sticker.matrix(), &shrunk));
    assert!(sticker.current_width() >= MIN_STICKER_SIZE);
    assert!(sticker.current_height() >= MIN_STICKER_SIZE);
    assert!(sticker.contains(pos2(500.0, 500.0)));
}

#[test]
fn adds_wait_for_the_first_size() {
    let mut surface = StickerSurface::default();
    let outcome = surface.add_sticker(factory::create_image(DrawableHandle(3), vec2(100.0, 50.0)));
    let AddOutcome::Deferred(id) = outcome else {
        panic!("expected a deferred add, got {outcome:?}");
    };
    assert!(surface.stickers().is_empty());
    assert_eq!(surface.sticker_count(), 1);
    assert!(surface.drain_events().is_empty());

    surface.set_size(vec2(800.0, 600.0));
    assert_eq!(surface.pending_count(), 0);
    assert_eq!(surface.current_id(), Some(id));
    assert_eq!(surface.drain_events(), vec![SurfaceEvent::Added(id)]);
    let center = surface.get(id).unwrap().mapped_center_point();
    assert!(approx_pos(center, pos2(400.0, 300.0)));
}

#[test]
fn stickers_without_content_are_refused() {
    let mut surface = surface();
    let outcome = surface.add_sticker(factory::create_image(DrawableHandle(1), vec2(0.0, 10.0)));
    assert!(matches!(outcome, AddOutcome::Rejected(_)));
    assert!(surface.is_empty());
}

#[test]
fn flipping_mirrors_in_place() {
    let mut surface = surface();
    let id = add_square(&mut surface);
    surface.drain_events();

    assert!(surface.flip(id, Flip::Horizontal));
    let sticker = surface.get(id).unwrap();
    assert!(sticker.is_flipped_horizontally());
    assert!(!sticker.is_flipped_vertically());
    assert!(approx_pos(sticker.mapped_center_point(), pos2(500.0, 500.0)));
    // the visual top-left corner stays top-left
    assert!(approx_pos(sticker.mapped_bound_points()[0], pos2(450.0, 450.0)));
    assert_eq!(surface.drain_events(), vec![SurfaceEvent::Flipped(id)]);

    assert!(surface.flip(id, Flip::Horizontal));
    assert!(!surface.get(id).unwrap().is_flipped_horizontally());
    assert!(!surface.flip(StickerId::new(), Flip::Both));
}

#[test]
fn layer_moves_are_bounds_checked() {
    let mut surface = surface();
    let a = add_square(&mut surface);
    let b = add_square(&mut surface);
    let c = add_square(&mut surface);

    assert!(surface.swap_layers(0, 2));
    assert_eq!(surface.index_of(c), Some(0));
    assert_eq!(surface.index_of(a), Some(2));

    assert!(surface.send_to_layer(0, 2));
    let order: Vec<_> = surface.stickers().iter().map(|s| s.id()).collect();
    assert_eq!(order, vec![b, a, c]);

    assert!(!surface.swap_layers(0, 3));
    assert!(!surface.send_to_layer(5, 0));
}

#[test]
fn bring_to_front_moves_the_touched_sticker_last() {
    let mut surface = surface();
    let mut config = surface.config().clone();
    config.bring_to_front_current = true;
    surface.set_config(config);

    let bottom = add_square(&mut surface);
    surface.add_sticker_at(
        factory::create_image(DrawableHandle(2), vec2(100.0, 100.0)),
        photo_templates::surface::Position::TOP_LEFT,
    );
    // the second sticker sits elsewhere, so only the first one is under the finger
    surface.on_touch_event(&TouchEvent::down(pos2(500.0, 500.0), 0));
    assert_eq!(surface.index_of(bottom), Some(1));
}

#[test]
fn locked_surface_ignores_touches() {
    let mut surface = surface();
    let id = add_square(&mut surface);
    surface.set_locked(true);
    let before = *surface.get(id).unwrap().matrix();

    assert!(!surface.on_touch_event(&TouchEvent::down(pos2(500.0, 500.0), 0)));
    assert!(!surface.on_touch_event(&TouchEvent::moved(pos2(600.0, 600.0), 10)));
    assert_eq!(*surface.get(id).unwrap().matrix(), before);
    assert!(surface.icon_placements().is_empty());
}

#[test]
fn locking_mid_drag_ends_the_gesture() {
    let mut surface = surface();
    let id = add_square(&mut surface);
    let before = *surface.get(id).unwrap().matrix();

    surface.on_touch_event(&TouchEvent::down(pos2(500.0, 500.0), 0));
    surface.on_touch_event(&TouchEvent::moved(pos2(520.0, 500.0), 10));
    surface.set_locked(true);
    assert_eq!(surface.mode(), TouchMode::None);
    assert_eq!(*surface.get(id).unwrap().matrix(), before);
    assert!(!surface.on_touch_event(&TouchEvent::up(pos2(520.0, 500.0), 20)));

    // a move without a new press must not drag anything
    surface.set_locked(false);
    surface.on_touch_event(&TouchEvent::moved(pos2(900.0, 900.0), 30));
    assert_eq!(surface.mode(), TouchMode::None);
    assert_eq!(*surface.get(id).unwrap().matrix(), before);
}

#[test]
fn locking_through_the_config_ends_the_gesture() {
    let mut surface = surface();
    let id = add_square(&mut surface);
    let before = *surface.get(id).unwrap().matrix();

    surface.on_touch_event(&TouchEvent::down(pos2(500.0, 500.0), 0));
    surface.on_touch_event(&TouchEvent::moved(pos2(560.0, 540.0), 10));
    let config = SurfaceConfig {
        locked: true,
        ..surface.config().clone()
    };
    surface.set_config(config);
    assert_eq!(surface.mode(), TouchMode::None);
    assert_eq!(*surface.get(id).unwrap().matrix(), before);
}

#[test]
fn replacing_can_keep_or_reset_the_transform() {
    let mut surface = surface();
    let old = add_square(&mut surface);
    surface.on_touch_event(&TouchEvent::down(pos2(500.0, 500.0), 0));
    surface.on_touch_event(&TouchEvent::moved(pos2(600.0, 500.0), 10));
    surface.on_touch_event(&TouchEvent::up(pos2(600.0, 500.0), 20));
    let moved = *surface.get(old).unwrap().matrix();
    surface.drain_events();

    let replacement = factory::create_image(DrawableHandle(9), vec2(100.0, 100.0));
    let new = replacement.id();
    assert!(surface.replace_current(replacement, true));
    assert_eq!(*surface.get(new).unwrap().matrix(), moved);
    assert_eq!(surface.index_of(new), Some(0));
    assert_eq!(surface.drain_events(), vec![SurfaceEvent::Replaced { old, new }]);

    let fresh = factory::create_image(DrawableHandle(10), vec2(100.0, 100.0));
    let fresh_id = fresh.id();
    assert!(surface.replace_current(fresh, false));
    assert!(approx_pos(
        surface.get(fresh_id).unwrap().mapped_center_point(),
        pos2(500.0, 500.0)
    ));
}
