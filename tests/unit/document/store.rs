use super::*;

use crate::scene::model::{SceneDocument, SceneObject};

fn store() -> SlideDocumentStore {
    SlideDocumentStore::new(Canvas::default(), 20)
}

fn text_snapshot(text: &str) -> SceneSnapshot {
    let mut doc = SceneDocument::empty();
    doc.objects
        .push(SceneObject::new("textbox").with("text", text));
    SceneSnapshot::new(doc).unwrap()
}

#[test]
fn empty_store_has_no_active_slide() {
    let s = store();
    assert!(s.is_empty());
    assert_eq!(s.active_index(), None);
    assert!(s.active_slide().is_none());
    s.assert_invariants();
}

#[test]
fn add_appends_and_activates() {
    let mut s = store();
    let a = s.add_slide(SlideKind::Content, None).unwrap().id();
    let b = s.add_slide(SlideKind::Cast, None).unwrap().id();
    assert_eq!(s.ids(), vec![a, b]);
    assert_eq!(s.active_index(), Some(1));
    assert_eq!(s.active_slide().unwrap().kind(), SlideKind::Cast);
    assert_eq!(s.active_slide().unwrap().title(), Some("Cast"));
    s.assert_invariants();
}

#[test]
fn add_at_position_inserts_and_activates_it() {
    let mut s = store();
    let a = s.add_slide(SlideKind::Content, None).unwrap().id();
    let b = s.add_slide(SlideKind::Content, None).unwrap().id();
    let c = s.add_slide(SlideKind::Content, Some(0)).unwrap().id();
    assert_eq!(s.ids(), vec![c, a, b]);
    assert_eq!(s.active_index(), Some(0));
    assert!(matches!(
        s.add_slide(SlideKind::Content, Some(9)),
        Err(DeckError::IndexOutOfRange { index: 9, len: 3 })
    ));
    s.assert_invariants();
}

#[test]
fn ids_are_never_reused() {
    let mut s = store();
    let a = s.add_slide(SlideKind::Content, None).unwrap().id();
    let b = s.add_slide(SlideKind::Content, None).unwrap().id();
    s.delete_slide(b).unwrap();
    s.delete_slide(a).unwrap();
    let c = s.add_slide(SlideKind::Content, None).unwrap().id();
    assert!(c > b);
    assert_ne!(c, a);
    s.assert_invariants();
}

#[test]
fn deleting_before_active_reindexes() {
    let mut s = store();
    let ids: Vec<SlideId> = (0..3)
        .map(|_| s.add_slide(SlideKind::Content, None).unwrap().id())
        .collect();
    assert_eq!(s.active_index(), Some(2));

    s.delete_slide(ids[1]).unwrap();
    assert_eq!(s.ids(), vec![ids[0], ids[2]]);
    assert_eq!(s.active_index(), Some(1));
    assert_eq!(s.active_slide().unwrap().id(), ids[2]);
    s.assert_invariants();
}

#[test]
fn deleting_active_clamps() {
    let mut s = store();
    let ids: Vec<SlideId> = (0..3)
        .map(|_| s.add_slide(SlideKind::Content, None).unwrap().id())
        .collect();

    s.delete_slide(ids[2]).unwrap();
    assert_eq!(s.active_index(), Some(1));

    s.switch_active(0).unwrap();
    s.delete_slide(ids[0]).unwrap();
    assert_eq!(s.active_index(), Some(0));
    assert_eq!(s.active_slide().unwrap().id(), ids[1]);

    s.delete_slide(ids[1]).unwrap();
    assert!(s.is_empty());
    assert_eq!(s.active_index(), None);
    s.assert_invariants();
}

#[test]
fn deleting_after_active_keeps_position() {
    let mut s = store();
    let ids: Vec<SlideId> = (0..3)
        .map(|_| s.add_slide(SlideKind::Content, None).unwrap().id())
        .collect();
    s.switch_active(0).unwrap();
    s.delete_slide(ids[2]).unwrap();
    assert_eq!(s.active_index(), Some(0));
    s.assert_invariants();
}

#[test]
fn unknown_ids_and_positions_error() {
    let mut s = store();
    assert!(matches!(
        s.delete_slide(SlideId(77)),
        Err(DeckError::SlideNotFound(SlideId(77)))
    ));
    assert!(matches!(
        s.switch_active(0),
        Err(DeckError::IndexOutOfRange { index: 0, len: 0 })
    ));
    s.add_slide(SlideKind::Content, None).unwrap();
    assert!(s.switch_active(1).is_err());
    assert!(s.reorder(0, 1).is_err());
    assert!(s.undo(SlideId(99)).is_err());
}

#[test]
fn switch_active_does_not_touch_content() {
    let mut s = store();
    s.add_slide(SlideKind::Content, None).unwrap();
    s.add_slide(SlideKind::Cast, None).unwrap();
    let before = s.to_document();
    let rev = s.revision();
    s.switch_active(0).unwrap();
    assert_eq!(s.active_index(), Some(0));
    assert_eq!(s.to_document(), before);
    assert_eq!(s.revision(), rev);
}

#[test]
fn reorder_carries_history_and_active_identity() {
    let mut s = store();
    let a = s.add_slide(SlideKind::Content, None).unwrap().id();
    let b = s.add_slide(SlideKind::Content, None).unwrap().id();
    let c = s.add_slide(SlideKind::Content, None).unwrap().id();
    s.commit(a, text_snapshot("a1")).unwrap();
    s.switch_active(0).unwrap();

    s.reorder(0, 2).unwrap();
    assert_eq!(s.ids(), vec![b, c, a]);
    assert_eq!(s.active_index(), Some(2));
    let moved = s.slide(a).unwrap();
    assert_eq!(moved.title(), Some("a1"));
    assert_eq!(moved.history().undo_len(), 1);

    s.reorder(2, 0).unwrap();
    assert_eq!(s.ids(), vec![a, b, c]);
    assert_eq!(s.active_index(), Some(0));
    s.assert_invariants();
}

#[test]
fn histories_are_per_slide() {
    let mut s = store();
    let a = s.add_slide(SlideKind::Content, None).unwrap().id();
    let b = s.add_slide(SlideKind::Content, None).unwrap().id();
    s.commit(a, text_snapshot("a1")).unwrap();
    s.commit(b, text_snapshot("b1")).unwrap();
    s.commit(b, text_snapshot("b2")).unwrap();

    assert_eq!(s.undo(b).unwrap().unwrap().objects()[0].text(), Some("b1"));
    assert_eq!(s.slide(a).unwrap().title(), Some("a1"));
    assert!(s.undo(a).unwrap().is_some());
    assert!(s.undo(a).unwrap().is_none());
    assert_eq!(s.redo(a).unwrap().unwrap().objects()[0].text(), Some("a1"));
}

#[test]
fn revision_tracks_content_changes() {
    let mut s = store();
    let r0 = s.revision();
    let a = s.add_slide(SlideKind::Content, None).unwrap().id();
    let r1 = s.revision();
    assert!(r1 > r0);
    assert!(s.undo(a).unwrap().is_none());
    assert_eq!(s.revision(), r1);
    s.set_visual_prompt(a, Some("sunset over a city".to_string()))
        .unwrap();
    assert!(s.revision() > r1);
    assert_eq!(s.slide(a).unwrap().visual_prompt(), Some("sunset over a city"));
    s.set_visual_prompt(a, Some("  ".to_string())).unwrap();
    assert_eq!(s.slide(a).unwrap().visual_prompt(), None);
}

#[test]
fn document_roundtrip_restores_order_and_ids() {
    let mut s = store();
    let a = s.add_slide(SlideKind::Content, None).unwrap().id();
    let b = s.add_slide(SlideKind::Cast, None).unwrap().id();
    s.commit(a, text_snapshot("hello")).unwrap();
    s.set_visual_prompt(b, Some("hero portrait".to_string()))
        .unwrap();

    let doc = s.to_document();
    let restored = SlideDocumentStore::from_document(doc.clone(), Canvas::default(), 20).unwrap();
    assert_eq!(restored.ids(), vec![a, b]);
    assert_eq!(restored.active_index(), Some(0));
    assert_eq!(restored.to_document(), doc);
    assert!(!restored.slide(a).unwrap().history().can_undo());
    restored.assert_invariants();

    let mut restored = restored;
    let c = restored.add_slide(SlideKind::Content, None).unwrap().id();
    assert!(c > b);
}
