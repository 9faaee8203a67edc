use super::*;

use crate::scene::model::SceneDocument;

fn canvas() -> Canvas {
    Canvas::new(100, 50).unwrap()
}

fn snapshot(background: Option<Color>, objects: Vec<SceneObject>) -> SceneSnapshot {
    let mut doc = SceneDocument::empty();
    doc.background = background;
    doc.objects = objects;
    SceneSnapshot::new(doc).unwrap()
}

fn solid(w: u32, h: u32, px: [u8; 4]) -> PreparedImage {
    PreparedImage {
        width: w,
        height: h,
        rgba8_premul: Arc::new(px.repeat((w * h) as usize)),
    }
}

#[test]
fn background_color_fills_every_pixel() {
    let snap = snapshot(Some(Color::rgb(0, 0, 255)), vec![]);
    let bmp = render_snapshot(&snap, canvas(), 100, 50, &ImageSet::new(), None).unwrap();
    assert_eq!((bmp.width, bmp.height), (100, 50));
    assert_eq!(bmp.pixel(0, 0), [0, 0, 255, 255]);
    assert_eq!(bmp.pixel(99, 49), [0, 0, 255, 255]);
}

#[test]
fn no_background_is_transparent() {
    let bmp = render_snapshot(&snapshot(None, vec![]), canvas(), 10, 5, &ImageSet::new(), None)
        .unwrap();
    assert!(bmp.data.iter().all(|&b| b == 0));
}

#[test]
fn rect_is_placed_by_origin_and_scaled_to_target() {
    let rect = SceneObject::new("rect")
        .with("left", 50.0)
        .with("top", 25.0)
        .with("width", 20.0)
        .with("height", 10.0)
        .with("originX", "center")
        .with("originY", "center")
        .with("fill", "#ff0000");
    let snap = snapshot(Some(Color::WHITE), vec![rect]);

    let full = render_snapshot(&snap, canvas(), 100, 50, &ImageSet::new(), None).unwrap();
    assert_eq!(full.pixel(50, 25), [255, 0, 0, 255]);
    assert_eq!(full.pixel(5, 5), [255, 255, 255, 255]);
    assert_eq!(full.pixel(45, 25), [255, 0, 0, 255]);
    assert_eq!(full.pixel(35, 25), [255, 255, 255, 255]);

    let half = render_snapshot(&snap, canvas(), 50, 25, &ImageSet::new(), None).unwrap();
    assert_eq!(half.pixel(25, 12), [255, 0, 0, 255]);
    assert_eq!(half.pixel(2, 2), [255, 255, 255, 255]);
}

#[test]
fn hidden_and_transparent_objects_are_skipped() {
    let hidden = SceneObject::new("rect")
        .with("width", 100.0)
        .with("height", 50.0)
        .with("fill", "#000000")
        .with("visible", false);
    let clear = SceneObject::new("circle")
        .with("radius", 20.0)
        .with("fill", "transparent");
    let snap = snapshot(Some(Color::WHITE), vec![hidden, clear]);
    let bmp = render_snapshot(&snap, canvas(), 100, 50, &ImageSet::new(), None).unwrap();
    assert!(bmp.data.iter().all(|&b| b == 255));
}

#[test]
fn image_object_draws_decoded_pixels() {
    let img = SceneObject::new("image")
        .with("src", "green.png")
        .with("left", 0.0)
        .with("top", 0.0)
        .with("width", 10.0)
        .with("height", 10.0);
    let mut images = ImageSet::new();
    images.insert("green.png".to_string(), solid(10, 10, [0, 255, 0, 255]));
    let snap = snapshot(Some(Color::WHITE), vec![img]);
    let bmp = render_snapshot(&snap, canvas(), 100, 50, &images, None).unwrap();
    assert_eq!(bmp.pixel(5, 5), [0, 255, 0, 255]);
    assert_eq!(bmp.pixel(20, 20), [255, 255, 255, 255]);
}

#[test]
fn missing_image_renders_placeholder() {
    let img = SceneObject::new("image")
        .with("src", "")
        .with("left", 0.0)
        .with("top", 0.0)
        .with("width", 40.0)
        .with("height", 40.0);
    let snap = snapshot(Some(Color::WHITE), vec![img]);
    let bmp = render_snapshot(&snap, canvas(), 100, 50, &ImageSet::new(), None).unwrap();
    let c = PLACEHOLDER_FILL;
    assert_eq!(bmp.pixel(20, 20), [c.r, c.g, c.b, 255]);
}

#[test]
fn background_image_covers_canvas() {
    let mut doc = SceneDocument::empty();
    doc.background_image = Some(
        SceneObject::new("image")
            .with("src", "bg.png")
            .with("width", 10.0)
            .with("height", 5.0)
            .with("scaleX", 10.0)
            .with("scaleY", 10.0)
            .with("left", 50.0)
            .with("top", 25.0)
            .with("originX", "center")
            .with("originY", "center"),
    );
    let snap = SceneSnapshot::new(doc).unwrap();
    let mut images = ImageSet::new();
    images.insert("bg.png".to_string(), solid(10, 5, [200, 100, 0, 255]));
    let bmp = render_snapshot(&snap, canvas(), 100, 50, &images, None).unwrap();
    assert_eq!(bmp.pixel(0, 0), [200, 100, 0, 255]);
    assert_eq!(bmp.pixel(99, 49), [200, 100, 0, 255]);
}

#[test]
fn tiled_background_repeats_around_center() {
    let mut doc = SceneDocument::empty();
    doc.background_image = Some(
        SceneObject::new("image")
            .with("src", "tile.png")
            .with("width", 2.0)
            .with("height", 2.0)
            .with("left", 50.0)
            .with("top", 25.0)
            .with("originX", "center")
            .with("originY", "center")
            .with("repeat", "repeat"),
    );
    let snap = SceneSnapshot::new(doc).unwrap();
    let tile = PreparedImage {
        width: 2,
        height: 2,
        rgba8_premul: Arc::new(vec![
            255, 0, 0, 255, 0, 0, 255, 255, //
            0, 0, 255, 255, 255, 0, 0, 255,
        ]),
    };
    let mut images = ImageSet::new();
    images.insert("tile.png".to_string(), tile);
    let bmp = render_snapshot(&snap, canvas(), 100, 50, &images, None).unwrap();
    // One tile spans x 49..51, y 24..26.
    assert_eq!(bmp.pixel(49, 24), [255, 0, 0, 255]);
    assert_eq!(bmp.pixel(50, 24), [0, 0, 255, 255]);
    assert_eq!(bmp.pixel(0, 0), [0, 0, 255, 255]);
    assert_eq!(bmp.pixel(1, 0), [255, 0, 0, 255]);
    assert_eq!(bmp.pixel(99, 49), [0, 0, 255, 255]);
}

#[test]
fn greeked_text_paints_without_a_font() {
    let text = SceneObject::new("textbox")
        .with("text", "Hello deck")
        .with("left", 10.0)
        .with("top", 10.0)
        .with("width", 80.0)
        .with("fontSize", 20.0)
        .with("fill", "#000000");
    let snap = snapshot(Some(Color::WHITE), vec![text]);
    let bmp = render_snapshot(&snap, canvas(), 100, 50, &ImageSet::new(), None).unwrap();
    assert_eq!(bmp.pixel(12, 20), [0, 0, 0, 255]);
}

#[test]
fn greeked_text_honors_alignment() {
    let aligned = |align: &str| {
        SceneObject::new("textbox")
            .with("text", "ab")
            .with("left", 0.0)
            .with("top", 0.0)
            .with("width", 80.0)
            .with("fontSize", 10.0)
            .with("textAlign", align)
            .with("fill", "#000000")
    };
    let render = |obj| {
        let snap = snapshot(Some(Color::WHITE), vec![obj]);
        render_snapshot(&snap, canvas(), 100, 50, &ImageSet::new(), None).unwrap()
    };

    let right = render(aligned("right"));
    assert_eq!(right.pixel(75, 5), [0, 0, 0, 255]);
    assert_eq!(right.pixel(5, 5), [255, 255, 255, 255]);

    let center = render(aligned("center"));
    assert_eq!(center.pixel(40, 5), [0, 0, 0, 255]);
    assert_eq!(center.pixel(5, 5), [255, 255, 255, 255]);
    assert_eq!(center.pixel(75, 5), [255, 255, 255, 255]);

    let left = render(aligned("left"));
    assert_eq!(left.pixel(5, 5), [0, 0, 0, 255]);
}

#[test]
fn greeked_lines_wrap_at_width() {
    assert_eq!(greeked_lines("abcd", 10.0, None), vec![20.0]);
    assert_eq!(greeked_lines("abcdefgh", 10.0, Some(15.0)), vec![15.0, 15.0, 10.0]);
    assert_eq!(greeked_lines("a\nbb", 10.0, None), vec![5.0, 10.0]);
}

#[test]
fn path_and_polygon_geometry_is_normalized() {
    let path = SceneObject::new("path").with(
        "path",
        serde_json::json!([["M", 10, 10], ["L", 30, 10], ["L", 30, 40], ["z"]]),
    );
    let geom = shape_geometry(&path).unwrap();
    assert_eq!((geom.width, geom.height), (20.0, 30.0));
    assert_eq!(geom.path.bounding_box().origin(), Point::ZERO);

    let poly = SceneObject::new("polygon").with(
        "points",
        serde_json::json!([{"x": -5, "y": 0}, {"x": 5, "y": 0}, {"x": 0, "y": 8}]),
    );
    let geom = shape_geometry(&poly).unwrap();
    assert_eq!((geom.width, geom.height), (10.0, 8.0));
    assert!(geom.closed);

    let line = SceneObject::new("line")
        .with("x1", 0.0)
        .with("y1", 5.0)
        .with("x2", 10.0)
        .with("y2", 0.0);
    let geom = shape_geometry(&line).unwrap();
    assert!(!geom.closed);
    assert_eq!((geom.width, geom.height), (10.0, 5.0));

    assert!(shape_geometry(&SceneObject::new("group")).is_none());
}

#[test]
fn zero_or_oversized_targets_are_rejected() {
    let snap = snapshot(None, vec![]);
    assert!(render_snapshot(&snap, canvas(), 0, 10, &ImageSet::new(), None).is_err());
    assert!(render_snapshot(&snap, canvas(), 70_000, 10, &ImageSet::new(), None).is_err());
}

#[test]
fn rasterizer_is_reusable_across_sizes() {
    let mut r = Rasterizer::new(None);
    let snap = snapshot(Some(Color::BLACK), vec![]);
    let a = r.render(&snap, canvas(), 20, 10, &ImageSet::new()).unwrap();
    let b = r.render(&snap, canvas(), 40, 20, &ImageSet::new()).unwrap();
    let c = r.render(&snap, canvas(), 20, 10, &ImageSet::new()).unwrap();
    assert_eq!(a, c);
    assert_eq!(b.data.len(), 40 * 20 * 4);
}
