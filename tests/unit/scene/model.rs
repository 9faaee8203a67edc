use super::*;

use serde_json::json;

#[test]
fn kind_follows_type_tag() {
    assert_eq!(ElementKind::from_type_tag("textbox"), ElementKind::Text);
    assert_eq!(ElementKind::from_type_tag("i-text"), ElementKind::Text);
    assert_eq!(ElementKind::from_type_tag("text"), ElementKind::Text);
    assert_eq!(ElementKind::from_type_tag("image"), ElementKind::Image);
    assert_eq!(ElementKind::from_type_tag("rect"), ElementKind::Shape);
    assert_eq!(ElementKind::from_type_tag("path"), ElementKind::Shape);
}

#[test]
fn object_keeps_unknown_props() {
    let v = json!({
        "type": "rect",
        "left": 10.5,
        "fill": "#ff0000",
        "customData": { "nested": [1, 2, 3] }
    });
    let obj: SceneObject = serde_json::from_value(v.clone()).unwrap();
    assert_eq!(obj.type_tag, "rect");
    assert_eq!(obj.f64_or("left", 0.0), 10.5);
    assert_eq!(obj.color_prop("fill"), Some(Color::rgb(255, 0, 0)));
    assert_eq!(serde_json::to_value(&obj).unwrap(), v);
}

#[test]
fn object_accessors_fall_back() {
    let obj = SceneObject::new("rect")
        .with("left", "not a number")
        .with("fill", "")
        .with("visible", false);
    assert_eq!(obj.f64_or("left", 3.0), 3.0);
    assert_eq!(obj.f64_or("missing", 4.0), 4.0);
    assert_eq!(obj.color_prop("fill"), None);
    assert!(!obj.bool_or("visible", true));
    assert!(obj.bool_or("evented", true));
}

#[test]
fn scale_mode_names() {
    assert_eq!(ScaleMode::parse("fill").unwrap(), ScaleMode::Fill);
    assert_eq!(ScaleMode::parse("Cover").unwrap(), ScaleMode::Fill);
    assert_eq!(ScaleMode::parse("contain").unwrap(), ScaleMode::Fit);
    assert_eq!(ScaleMode::parse("tile").unwrap(), ScaleMode::Tile);
    assert!(ScaleMode::parse("zoom").is_err());
    assert_eq!(
        serde_json::to_value(ScaleMode::Stretch).unwrap(),
        json!("stretch")
    );
}

#[test]
fn background_spec_serializes_camel_case() {
    let spec = BackgroundSpec::image(BackgroundImageSpec {
        url: "bg.png".to_string(),
        scale_mode: ScaleMode::Fit,
        opacity: 0.5,
    });
    assert_eq!(
        serde_json::to_value(&spec).unwrap(),
        json!({
            "mode": "image",
            "color": null,
            "image": { "url": "bg.png", "scaleMode": "fit", "opacity": 0.5 }
        })
    );
}

#[test]
fn background_spec_inference() {
    assert_eq!(BackgroundSpec::infer(None, None), BackgroundSpec::none());
    assert_eq!(
        BackgroundSpec::infer(Some(Color::TRANSPARENT), None),
        BackgroundSpec::none()
    );
    assert_eq!(
        BackgroundSpec::infer(Some(Color::WHITE), None),
        BackgroundSpec::color(Color::WHITE)
    );

    let img = SceneObject::new("image")
        .with("src", "a.png")
        .with("opacity", 0.25)
        .with("repeat", "repeat");
    let spec = BackgroundSpec::infer(Some(Color::WHITE), Some(&img));
    assert_eq!(spec.mode, BackgroundMode::Image);
    let image = spec.image.unwrap();
    assert_eq!(image.url, "a.png");
    assert_eq!(image.scale_mode, ScaleMode::Tile);
    assert_eq!(image.opacity, 0.25);
}

#[test]
fn document_accepts_empty_background_string() {
    let doc: SceneDocument = serde_json::from_value(json!({
        "version": "5.3.0",
        "objects": [],
        "background": ""
    }))
    .unwrap();
    assert_eq!(doc.background, None);
    assert_eq!(doc.background_image, None);
    assert_eq!(doc.background_spec(), BackgroundSpec::none());
}

#[test]
fn document_validation() {
    let mut doc = SceneDocument::empty();
    doc.validate().unwrap();

    doc.objects.push(SceneObject::new("image"));
    assert!(matches!(doc.validate(), Err(DeckError::CorruptSnapshot(_))));

    let mut doc = SceneDocument::empty();
    doc.background_image = Some(SceneObject::new("rect"));
    assert!(doc.validate().is_err());

    let mut doc = SceneDocument::empty();
    doc.version = " ".to_string();
    assert!(doc.validate().is_err());
}
