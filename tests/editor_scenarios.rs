use egui::{pos2, vec2};
use std::cell::RefCell;
use std::rc::Rc;

use photo_templates::config::{EditorConfig, SurfaceConfig};
use photo_templates::input::TouchEvent;
use photo_templates::sticker::{
    ColorIndex, DrawableHandle, FontRef, Sticker, StickerId, StickerKind, TypefaceStyle, factory,
};
use photo_templates::surface::AddOutcome;
use photo_templates::{Editor, EditorEvent, SurfaceEvent};

fn editor() -> Editor {
    let mut editor = Editor::default();
    editor.set_size(vec2(1000.0, 1000.0));
    editor
}

// Image stickers of 100x100 land on (450, 450) to (550, 550).
fn small_fill_editor() -> Editor {
    let config = EditorConfig {
        surface: SurfaceConfig {
            initial_fill: 0.1,
            ..SurfaceConfig::default()
        },
        ..EditorConfig::default()
    };
    let mut editor = Editor::new(config);
    editor.set_size(vec2(1000.0, 1000.0));
    editor
}

fn record(editor: &Editor) -> Rc<RefCell<Vec<EditorEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    editor.subscribe(Box::new(move |event: &EditorEvent| {
        sink.borrow_mut().push(event.clone());
    }));
    seen
}

fn added(outcome: AddOutcome) -> StickerId {
    match outcome {
        AddOutcome::Added(id) => id,
        other => panic!("expected the sticker to be placed, got {other:?}"),
    }
}

fn text_of(editor: &Editor, id: StickerId) -> String {
    editor
        .surface()
        .get(id)
        .and_then(StickerKind::as_text)
        .map(|sticker| sticker.text().to_string())
        .unwrap()
}

#[test]
fn text_edit_undo_and_redo() {
    let mut editor = editor();
    let id = added(editor.add_text("Hello"));
    assert!(editor.apply_default_text("Hello"));
    assert!(editor.apply_new_text("World"));
    assert_eq!(text_of(&editor, id), "World");
    assert!(editor.can_undo());

    assert!(editor.undo());
    assert_eq!(text_of(&editor, id), "Hello");
    assert!(!editor.can_undo());
    assert!(editor.can_redo());

    assert!(editor.redo());
    assert_eq!(text_of(&editor, id), "World");
    assert!(!editor.can_redo());
}

#[test]
fn history_changes_are_broadcast() {
    let mut editor = editor();
    let id = added(editor.add_text("Hello"));
    let seen = record(&editor);

    editor.apply_new_text("World");
    editor.undo();
    let seen = seen.borrow();
    assert!(seen.contains(&EditorEvent::HistoryChanged {
        id,
        can_undo: true,
        can_redo: false,
    }));
    assert!(seen.contains(&EditorEvent::HistoryChanged {
        id,
        can_undo: false,
        can_redo: true,
    }));
}

#[test]
fn twenty_first_sticker_is_refused() {
    let mut editor = editor();
    for i in 0..20 {
        added(editor.add_text(format!("sticker {i}")));
    }
    let seen = record(&editor);

    let outcome = editor.add_text("one too many");
    assert!(matches!(outcome, AddOutcome::Rejected(_)));
    assert_eq!(editor.surface().sticker_count(), 20);
    assert_eq!(editor.history_count(), 20);
    assert!(
        seen.borrow()
            .contains(&EditorEvent::Surface(SurfaceEvent::LimitReached))
    );
}

#[test]
fn duplicate_is_offset_and_starts_a_fresh_history() {
    let mut editor = editor();
    let source = added(editor.add_text("Hello"));
    editor.apply_new_text("World");
    let mut expected = *editor.surface().get(source).unwrap().matrix();
    expected.post_translate(0.0, 50.0);
    let seen = record(&editor);

    let duplicate = added(editor.duplicate_current().unwrap());
    assert_ne!(duplicate, source);
    assert_eq!(editor.surface().current_id(), Some(duplicate));
    let matrix = *editor.surface().get(duplicate).unwrap().matrix();
    assert!(
        matrix
            .values()
            .iter()
            .zip(expected.values())
            .all(|(a, b)| (a - b).abs() < 0.001)
    );

    assert_eq!(text_of(&editor, duplicate), "World");
    assert!(!editor.can_undo());
    assert!(editor.history(source).unwrap().can_undo());
    assert!(
        seen.borrow()
            .contains(&EditorEvent::Duplicated { source, duplicate })
    );
}

#[test]
fn queued_text_gets_its_history_once_laid_out() {
    let mut editor = Editor::default();
    let outcome = editor.add_text("later");
    assert!(matches!(outcome, AddOutcome::Deferred(_)));
    assert_eq!(editor.history_count(), 0);

    editor.set_size(vec2(800.0, 600.0));
    assert_eq!(editor.surface().stickers().len(), 1);
    assert_eq!(editor.history_count(), 1);
}

#[test]
fn stickers_from_another_thread_arrive_on_poll() {
    let mut editor = editor();
    let sender = editor.sender();
    std::thread::spawn(move || {
        assert!(sender.submit(factory::create_text("from a worker")));
        assert!(sender.submit(factory::create_image(DrawableHandle(7), vec2(64.0, 64.0))));
    })
    .join()
    .unwrap();

    assert!(editor.surface().is_empty());
    assert_eq!(editor.poll_inbox(), 2);
    assert_eq!(editor.surface().stickers().len(), 2);
    assert_eq!(editor.history_count(), 1);
    assert_eq!(editor.poll_inbox(), 0);
}

#[test]
fn removing_stickers_drops_their_histories() {
    let mut editor = editor();
    added(editor.add_text("one"));
    added(editor.add_text("two"));
    assert_eq!(editor.history_count(), 2);

    assert!(editor.remove_current());
    assert_eq!(editor.history_count(), 1);

    added(editor.add_text("three"));
    editor.remove_all();
    assert_eq!(editor.history_count(), 0);
    assert!(editor.surface().is_empty());
}

#[test]
fn replacing_a_sticker_rebinds_its_history() {
    let mut editor = editor();
    let old = added(editor.add_text("before"));
    editor.apply_new_text("edited");
    assert!(editor.can_undo());

    assert!(editor.replace_current(factory::create_text("after"), true));
    let new = editor.surface().current_id().unwrap();
    assert_ne!(new, old);
    assert!(editor.history(old).is_none());
    assert!(editor.history(new).is_some());
    assert!(!editor.can_undo());
    assert_eq!(editor.history_count(), 1);
}

#[test]
fn mixed_edits_undo_in_reverse_order() {
    let mut editor = editor();
    let id = added(editor.add_text("Hello"));
    editor.apply_new_text("World");
    editor.apply_text_color(ColorIndex(5));

    assert!(editor.undo());
    let sticker = editor.surface().get(id).and_then(StickerKind::as_text).unwrap();
    assert_eq!(sticker.text_color(), ColorIndex(0));
    assert_eq!(sticker.text(), "World");

    assert!(editor.undo());
    assert_eq!(text_of(&editor, id), "Hello");
    assert!(!editor.undo());
}

#[test]
fn typeface_changes_are_undoable() {
    let mut editor = Editor::default();
    assert_eq!(editor.apply_typeface(FontRef("Serif".into())), Ok(false));

    editor.set_size(vec2(1000.0, 1000.0));
    let id = added(editor.add_text("Hello"));
    assert_eq!(editor.apply_typeface(FontRef("Serif".into())), Ok(true));
    assert!(editor.undo());
    let sticker = editor.surface().get(id).and_then(StickerKind::as_text).unwrap();
    assert_eq!(sticker.typeface(), Some(&editor.config().default_typeface));
}

#[test]
fn style_toggles_and_opacity_reach_the_sticker() {
    let mut editor = editor();
    assert!(!editor.toggle_bold());

    let id = added(editor.add_text("Hello"));
    assert!(editor.toggle_bold());
    assert!(editor.toggle_italic());
    assert!(editor.toggle_underline());
    assert!(editor.apply_text_opacity(50.0));

    let sticker = editor.surface().get(id).and_then(StickerKind::as_text).unwrap();
    assert_eq!(sticker.style(), TypefaceStyle::BoldItalic);
    assert!(sticker.is_underline());
    assert!(!sticker.is_strike_through());
    assert_eq!(sticker.alpha(), 127);

    assert!(editor.toggle_bold());
    let sticker = editor.surface().get(id).and_then(StickerKind::as_text).unwrap();
    assert_eq!(sticker.style(), TypefaceStyle::Italic);
}

#[test]
fn updating_text_sets_a_new_baseline() {
    let mut editor = editor();
    let id = added(editor.add_text("Hello"));
    assert!(editor.update_current_text("Draft"));
    assert!(!editor.can_undo());

    editor.apply_new_text("Final");
    assert!(editor.undo());
    assert_eq!(text_of(&editor, id), "Draft");
}

#[test]
fn duplicate_icon_press_makes_a_copy() {
    let mut editor = small_fill_editor();
    let source = added(editor.add_sticker(factory::create_image(DrawableHandle(1), vec2(100.0, 100.0))));
    let seen = record(&editor);

    // duplicate icon on the top-right corner
    editor.on_touch_event(&TouchEvent::down(pos2(548.0, 452.0), 0));
    assert_eq!(editor.surface().stickers().len(), 2);
    let duplicate = editor.surface().current_id().unwrap();
    assert_ne!(duplicate, source);
    assert!(
        seen.borrow()
            .contains(&EditorEvent::Duplicated { source, duplicate })
    );
}

#[test]
fn edit_icon_press_requests_the_editor() {
    let mut editor = small_fill_editor();
    let id = added(editor.add_sticker(factory::create_image(DrawableHandle(1), vec2(100.0, 100.0))));
    let seen = record(&editor);

    // edit icon on the bottom-left corner
    editor.on_touch_event(&TouchEvent::down(pos2(452.0, 548.0), 0));
    editor.on_touch_event(&TouchEvent::up(pos2(452.0, 548.0), 5));
    assert!(seen.borrow().contains(&EditorEvent::EditRequested(id)));
    assert_eq!(editor.surface().stickers().len(), 1);
}
