use super::*;

use serde_json::json;

fn sample_json() -> serde_json::Value {
    json!({
        "version": "5.3.0",
        "objects": [
            { "type": "textbox", "text": "Title", "left": 10, "top": 20 },
            { "type": "image", "src": "old.png", "left": 300, "top": 200, "width": 100, "height": 80 }
        ],
        "background": "#ffffff",
        "backgroundImage": null,
        "deckBackground": { "mode": "color", "color": "#ffffff", "image": null }
    })
}

#[test]
fn parses_and_exposes_fields() {
    let snap = SceneSnapshot::from_json_value(sample_json()).unwrap();
    assert_eq!(snap.objects().len(), 2);
    assert_eq!(snap.background_color(), Some(Color::WHITE));
    assert!(snap.background_image().is_none());
    assert_eq!(snap.objects_of_kind(ElementKind::Image).count(), 1);
    assert_eq!(snap.image_urls(), vec!["old.png".to_string()]);
}

#[test]
fn fingerprint_is_content_addressed() {
    let a = SceneSnapshot::from_json_value(sample_json()).unwrap();
    let b = SceneSnapshot::from_json_str(&a.to_json_string().unwrap()).unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_eq!(a, b);

    let mut doc = a.to_document();
    doc.objects[0].set("text", "Other");
    let c = SceneSnapshot::new(doc).unwrap();
    assert_ne!(a.fingerprint(), c.fingerprint());
    assert_ne!(a, c);
    assert_eq!(a.fingerprint().to_string().len(), 32);
}

#[test]
fn garbage_is_corrupt() {
    assert!(matches!(
        SceneSnapshot::from_json_str("{not json"),
        Err(DeckError::CorruptSnapshot(_))
    ));
    assert!(matches!(
        SceneSnapshot::from_json_value(json!({ "version": "5.3.0", "objects": {} })),
        Err(DeckError::CorruptSnapshot(_))
    ));
    assert!(matches!(
        SceneSnapshot::from_json_value(json!({ "version": "5.3.0", "objects": [ { "left": 1 } ] })),
        Err(DeckError::CorruptSnapshot(_))
    ));
    assert!(matches!(
        SceneSnapshot::from_json_value(json!({ "version": "5.3.0", "objects": [], "background": "nope" })),
        Err(DeckError::CorruptSnapshot(_))
    ));
}

#[test]
fn encoded_json_always_has_background_fields() {
    let snap = SceneSnapshot::empty().unwrap();
    let v = snap.to_json_value().unwrap();
    let obj = v.as_object().unwrap();
    assert!(obj.contains_key("background"));
    assert!(obj.contains_key("backgroundImage"));
    assert_eq!(obj["deckBackground"]["mode"], json!("none"));
}

#[test]
fn image_urls_dedup_and_include_background() {
    let snap = SceneSnapshot::from_json_value(json!({
        "version": "5.3.0",
        "objects": [
            { "type": "image", "src": "a.png" },
            { "type": "image", "src": "bg.png" },
            { "type": "image", "src": "a.png" }
        ],
        "backgroundImage": { "type": "image", "src": "bg.png" }
    }))
    .unwrap();
    assert_eq!(
        snap.image_urls(),
        vec!["bg.png".to_string(), "a.png".to_string()]
    );
}

#[test]
fn serde_roundtrip_through_wrapper() {
    let snap = SceneSnapshot::from_json_value(sample_json()).unwrap();
    let text = serde_json::to_string(&snap).unwrap();
    let back: SceneSnapshot = serde_json::from_str(&text).unwrap();
    assert_eq!(back, snap);
}
