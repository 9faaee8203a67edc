use super::*;

#[test]
fn defaults_validate() {
    let opts = EditorOpts::default();
    opts.validate().unwrap();
    assert_eq!(opts.canvas, Canvas::default());
    assert_eq!(opts.history_depth, 20);
    assert_eq!(opts.thumbnail_size(), (240, 137));
}

#[test]
fn partial_json_fills_defaults() {
    let opts: EditorOpts =
        serde_json::from_str(r#"{ "history_depth": 5, "canvas": { "width": 800, "height": 600 } }"#)
            .unwrap();
    assert_eq!(opts.history_depth, 5);
    assert_eq!(opts.canvas.width, 800);
    assert_eq!(opts.thumbnail_width, 240);
    assert_eq!(opts.thumbnail_size(), (240, 180));
}

#[test]
fn unknown_keys_are_rejected() {
    assert!(serde_json::from_str::<EditorOpts>(r#"{ "histroy_depth": 5 }"#).is_err());
}

#[test]
fn validate_rejects_zero_values() {
    let mut opts = EditorOpts::default();
    opts.history_depth = 0;
    assert!(opts.validate().is_err());

    let mut opts = EditorOpts::default();
    opts.thumbnail_width = 0;
    assert!(opts.validate().is_err());

    let mut opts = EditorOpts::default();
    opts.canvas.height = 0;
    assert!(opts.validate().is_err());

    let mut opts = EditorOpts::default();
    opts.image_cache_entries = 0;
    assert!(opts.validate().is_err());
}

#[test]
fn from_path_reads_and_validates() {
    let dir = std::env::temp_dir().join(format!(
        "pitchdeck_config_test_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();

    let good = dir.join("good.json");
    std::fs::write(&good, r#"{ "thumbnail_width": 320 }"#).unwrap();
    assert_eq!(EditorOpts::from_path(&good).unwrap().thumbnail_width, 320);

    let bad = dir.join("bad.json");
    std::fs::write(&bad, r#"{ "history_depth": 0 }"#).unwrap();
    assert!(EditorOpts::from_path(&bad).is_err());

    assert!(EditorOpts::from_path(dir.join("missing.json")).is_err());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_font_is_none() {
    assert!(EditorOpts::default().load_font().unwrap().is_none());
}
