use super::*;
use crate::foundation::core::Color;
use crate::scene::model::{SceneDocument, SceneObject};

fn title_and_image() -> SceneSnapshot {
    let mut doc = SceneDocument::empty();
    doc.background = Some(Color::WHITE);
    doc.objects.push(
        SceneObject::new("textbox")
            .with("text", "Title")
            .with("left", 10.0)
            .with("fontSize", 48),
    );
    doc.objects.push(
        SceneObject::new("image")
            .with("src", "old.png")
            .with("left", 300.0)
            .with("width", 400)
            .with("crossOrigin", "anonymous"),
    );
    SceneSnapshot::new(doc).unwrap()
}

#[test]
fn only_image_src_changes() {
    let before = title_and_image();
    let after = patch_image(&before, "new.png").unwrap();

    let text_before = serde_json::to_string(&before.objects()[0]).unwrap();
    let text_after = serde_json::to_string(&after.objects()[0]).unwrap();
    assert_eq!(text_before, text_after);

    let mut expected = before.objects()[1].clone();
    expected.set("src", "new.png");
    assert_eq!(after.objects()[1], expected);
    assert_eq!(after.background_color(), before.background_color());
    assert_ne!(after.fingerprint(), before.fingerprint());
}

#[test]
fn every_image_element_is_patched() {
    let mut doc = title_and_image().to_document();
    doc.objects
        .push(SceneObject::new("image").with("src", "other.png"));
    let snap = SceneSnapshot::new(doc).unwrap();

    let out = patch_image(&snap, "https://cdn.example/gen.png").unwrap();
    let srcs: Vec<_> = out
        .objects_of_kind(ElementKind::Image)
        .map(|(_, o)| o.src().unwrap().to_string())
        .collect();
    assert_eq!(srcs, vec!["https://cdn.example/gen.png"; 2]);
}

#[test]
fn background_image_is_not_a_target() {
    let mut doc = SceneDocument::empty();
    doc.objects.push(SceneObject::new("textbox").with("text", "Only text"));
    doc.background_image = Some(
        SceneObject::new("image")
            .with("src", "bg.png")
            .with("selectable", false),
    );
    let snap = SceneSnapshot::new(doc).unwrap();

    let err = patch_image(&snap, "new.png").unwrap_err();
    assert!(matches!(err, DeckError::PatchTargetNotFound(_)));
}

#[test]
fn original_snapshot_is_untouched() {
    let before = title_and_image();
    let fp = before.fingerprint();
    patch_image(&before, "new.png").unwrap();
    assert_eq!(before.fingerprint(), fp);
    assert_eq!(before.objects()[1].src(), Some("old.png"));
}

#[test]
fn blank_url_is_rejected() {
    let err = patch_image(&title_and_image(), "  ").unwrap_err();
    assert!(matches!(err, DeckError::Validation(_)));
}
