use std::io::Cursor;
use std::sync::Mutex;

use base64::Engine;

use super::*;
use crate::foundation::core::BoxFuture;
use crate::scene::model::{ElementKind, ScaleMode};
use crate::scene::surface::TextStyle;

#[derive(Clone, Default)]
struct MemoryBackend {
    docs: Arc<Mutex<Vec<Arc<DeckDocument>>>>,
}

impl PersistenceBackend for MemoryBackend {
    fn persist(&self, doc: Arc<DeckDocument>) -> BoxFuture<DeckResult<()>> {
        let docs = Arc::clone(&self.docs);
        Box::pin(async move {
            docs.lock().unwrap().push(doc);
            Ok(())
        })
    }
}

struct FixedRegen {
    url: String,
    delay: Duration,
}

impl RegenerationBackend for FixedRegen {
    fn regenerate(&self, request: RegenerationRequest) -> BoxFuture<DeckResult<String>> {
        let url = format!("{}?slide={}", self.url, request.slide_id.0);
        let delay = self.delay;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            Ok(url)
        })
    }
}

fn png_data_url(w: u32, h: u32) -> String {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([200, 10, 10, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(buf)
    )
}

fn editor() -> (DeckEditor, MemoryBackend) {
    let backend = MemoryBackend::default();
    let ed = DeckEditor::new(EditorOpts::default(), Arc::new(backend.clone())).unwrap();
    (ed, backend)
}

fn with_regen(delay: Duration) -> DeckEditor {
    let (ed, _) = editor();
    ed.with_regeneration(Arc::new(FixedRegen {
        url: "https://img.example/gen.png".to_string(),
        delay,
    }))
}

#[test]
fn edits_flow_through_history() {
    let (mut ed, _) = editor();
    let first = ed.add_slide(SlideKind::Content, None).unwrap();
    ed.surface_mut().add_text("Hello", &TextStyle::default());
    ed.commit_surface().unwrap();

    ed.add_slide(SlideKind::Content, None).unwrap();
    assert_eq!(ed.surface().count_kind(ElementKind::Text), 0);

    ed.switch_slide(0).unwrap();
    assert_eq!(ed.active_id(), Some(first));
    assert_eq!(ed.surface().count_kind(ElementKind::Text), 1);

    assert!(ed.undo().unwrap());
    assert_eq!(ed.surface().count_kind(ElementKind::Text), 0);
    assert!(!ed.undo().unwrap());
    assert!(ed.redo().unwrap());
    assert_eq!(ed.surface().count_kind(ElementKind::Text), 1);
    assert!(!ed.redo().unwrap());
}

#[test]
fn switching_discards_uncommitted_edits() {
    let (mut ed, _) = editor();
    ed.add_slide(SlideKind::Content, None).unwrap();
    ed.add_slide(SlideKind::Cast, None).unwrap();
    ed.surface_mut().add_text("draft", &TextStyle::default());

    ed.switch_slide(0).unwrap();
    ed.switch_slide(1).unwrap();
    assert_eq!(ed.surface().count_kind(ElementKind::Text), 1);
    assert_eq!(
        codec::encode(ed.surface()).unwrap(),
        *ed.store().slide_at(1).unwrap().snapshot()
    );
}

#[test]
fn deleting_reloads_the_surface() {
    let (mut ed, _) = editor();
    let a = ed.add_slide(SlideKind::Cast, None).unwrap();
    let b = ed.add_slide(SlideKind::Content, None).unwrap();

    ed.delete_slide(b).unwrap();
    assert_eq!(ed.active_id(), Some(a));
    assert_eq!(ed.surface().count_kind(ElementKind::Image), 1);

    ed.delete_slide(a).unwrap();
    assert_eq!(ed.active_id(), None);
    assert!(ed.surface().objects().is_empty());
    assert!(matches!(ed.commit_surface(), Err(DeckError::Validation(_))));
}

#[test]
fn background_edit_on_inactive_slide_leaves_surface_alone() {
    let (mut ed, _) = editor();
    let a = ed.add_slide(SlideKind::Content, None).unwrap();
    ed.add_slide(SlideKind::Content, None).unwrap();
    let live = ed.surface().clone();

    let navy = Color::rgb(0, 0, 128);
    let snap = ed.set_background_color(a, navy).unwrap();
    assert_eq!(snap.background_color(), Some(navy));
    assert_eq!(ed.store().slide(a).unwrap().snapshot(), &snap);
    assert_eq!(ed.surface(), &live);
}

#[tokio::test]
async fn background_image_lands_on_the_live_surface() {
    let (mut ed, _) = editor();
    let id = ed.add_slide(SlideKind::Content, None).unwrap();
    let spec = BackgroundImageSpec {
        url: png_data_url(672, 384),
        scale_mode: ScaleMode::Fit,
        opacity: 0.5,
    };
    let snap = ed.set_background_image(id, spec).await.unwrap().unwrap();
    let bg = ed.surface().background_image().unwrap();
    assert_eq!(bg.f64_or("scaleX", 0.0), 2.0);
    assert_eq!(snap.background_image(), Some(bg));

    assert!(ed.undo().unwrap());
    assert!(ed.surface().background_image().is_none());
}

#[tokio::test]
async fn color_supersedes_pending_image_load() {
    let (mut ed, _) = editor();
    let id = ed.add_slide(SlideKind::Content, None).unwrap();
    let spec = BackgroundImageSpec {
        url: png_data_url(10, 10),
        scale_mode: ScaleMode::Fill,
        opacity: 1.0,
    };
    let load = ed.begin_background_image(id, spec).unwrap();
    let teal = Color::rgb(0, 128, 128);
    ed.set_background_color(id, teal).unwrap();
    let rev = ed.store().revision();

    let loaded = load.await.unwrap();
    assert_eq!(ed.apply_background_image(loaded).unwrap(), None);
    assert_eq!(ed.store().revision(), rev);
    assert_eq!(ed.surface().background_color(), Some(teal));
    assert!(ed.surface().background_image().is_none());
}

#[tokio::test]
async fn regeneration_patches_and_is_undoable() {
    let mut ed = with_regen(Duration::from_millis(5));
    let id = ed.add_slide(SlideKind::Cast, None).unwrap();
    ed.set_visual_prompt(id, Some("portrait of a detective".into()))
        .unwrap();

    let snap = ed.regenerate_active_image().await.unwrap();
    let expected = format!("https://img.example/gen.png?slide={}", id.0);
    let (_, img) = snap.objects_of_kind(ElementKind::Image).next().unwrap();
    assert_eq!(img.src(), Some(expected.as_str()));
    assert_eq!(codec::encode(ed.surface()).unwrap(), snap);

    assert!(ed.undo().unwrap());
    let (_, img) = ed
        .store()
        .slide(id)
        .unwrap()
        .snapshot()
        .objects_of_kind(ElementKind::Image)
        .next()
        .unwrap();
    assert_eq!(img.src(), Some(""));
}

#[tokio::test]
async fn regeneration_targets_the_captured_slide() {
    let mut ed = with_regen(Duration::from_millis(5));
    let cast = ed.add_slide(SlideKind::Cast, None).unwrap();
    ed.set_visual_prompt(cast, Some("hero".into())).unwrap();
    let pending = ed.begin_regeneration().unwrap();

    ed.add_slide(SlideKind::Content, None).unwrap();
    let live = ed.surface().clone();
    let image = pending.await.unwrap();
    assert_eq!(image.slide, cast);
    ed.apply_regeneration(image).unwrap();

    assert_eq!(ed.surface(), &live);
    let snap = ed.store().slide(cast).unwrap().snapshot();
    assert!(snap.image_urls().iter().any(|u| u.contains("gen.png")));
}

#[tokio::test]
async fn regeneration_after_delete_is_slide_not_found() {
    let mut ed = with_regen(Duration::from_millis(5));
    let cast = ed.add_slide(SlideKind::Cast, None).unwrap();
    ed.set_visual_prompt(cast, Some("hero".into())).unwrap();
    let pending = ed.begin_regeneration().unwrap();
    ed.delete_slide(cast).unwrap();

    let err = ed.apply_regeneration(pending.await.unwrap()).unwrap_err();
    assert!(matches!(err, DeckError::SlideNotFound(id) if id == cast));
}

#[tokio::test]
async fn regeneration_preconditions() {
    let (ed, _) = editor();
    assert!(matches!(
        ed.begin_regeneration().map(|_| ()),
        Err(DeckError::Validation(_))
    ));

    let mut ed = with_regen(Duration::ZERO);
    let id = ed.add_slide(SlideKind::Content, None).unwrap();
    assert!(matches!(
        ed.begin_regeneration().map(|_| ()),
        Err(DeckError::Validation(_))
    ));

    ed.set_visual_prompt(id, Some("sunrise".into())).unwrap();
    let rev = ed.store().revision();
    let err = ed.regenerate_active_image().await.unwrap_err();
    assert!(matches!(err, DeckError::PatchTargetNotFound(_)));
    assert_eq!(ed.store().revision(), rev);
}

#[tokio::test(start_paused = true)]
async fn regeneration_times_out() {
    let backend = MemoryBackend::default();
    let opts = EditorOpts {
        regeneration_timeout_ms: 1_000,
        ..EditorOpts::default()
    };
    let mut ed = DeckEditor::new(opts, Arc::new(backend))
        .unwrap()
        .with_regeneration(Arc::new(FixedRegen {
            url: "x.png".to_string(),
            delay: Duration::from_secs(600),
        }));
    let id = ed.add_slide(SlideKind::Cast, None).unwrap();
    ed.set_visual_prompt(id, Some("slow".into())).unwrap();

    match ed.regenerate_active_image().await.unwrap_err() {
        DeckError::Regeneration(msg) => assert!(msg.contains("timed out"), "{msg}"),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn save_tracks_unsaved_changes() {
    let (mut ed, backend) = editor();
    ed.add_slide(SlideKind::Content, None).unwrap();
    assert!(ed.has_unsaved_changes());

    ed.save().await.unwrap();
    assert!(!ed.has_unsaved_changes());
    assert_eq!(backend.docs.lock().unwrap().len(), 1);

    ed.set_background_color(ed.active_id().unwrap(), Color::BLACK)
        .unwrap();
    assert!(ed.has_unsaved_changes());
}

#[tokio::test(start_paused = true)]
async fn autosave_writes_latest_state_once() {
    let (mut ed, backend) = editor();
    ed.enable_autosave();
    for _ in 0..4 {
        ed.add_slide(SlideKind::Content, None).unwrap();
    }
    ed.flush_autosave().await;

    let docs = backend.docs.lock().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].slides.len(), 4);
    drop(docs);
    assert!(!ed.has_unsaved_changes());
}

#[test]
fn open_replaces_the_deck() {
    let (mut ed, _) = editor();
    ed.add_slide(SlideKind::Content, None).unwrap();
    ed.add_slide(SlideKind::Cast, None).unwrap();
    let doc = ed.store().to_document();

    let (mut other, _) = editor();
    other.open(doc.clone()).unwrap();
    assert_eq!(other.store().to_document(), doc);
    assert_eq!(other.store().active_index(), Some(0));
    assert!(!other.has_unsaved_changes());
    assert_eq!(
        codec::encode(other.surface()).unwrap(),
        doc.slides[0].snapshot
    );
}

#[tokio::test]
async fn thumbnails_and_full_resolution() {
    let (mut ed, _) = editor();
    let id = ed.add_slide(SlideKind::Content, None).unwrap();
    ed.set_background_color(id, Color::rgb(0, 255, 0)).unwrap();

    assert!(!ed.thumbnail(id).unwrap().is_fresh());
    let entry = ed.thumbnails().wait_for(id).await.unwrap();
    assert_eq!((entry.bitmap.width, entry.bitmap.height), (240, 137));
    assert!(ed.thumbnail(id).unwrap().is_fresh());
    assert_eq!(ed.all_thumbnails().len(), 1);

    let full = ed.render_full_resolution(id).unwrap().await.unwrap();
    assert_eq!((full.width, full.height), (1344, 768));
    assert_eq!(full.pixel(5, 5), [0, 255, 0, 255]);

    let deck = ed.export_deck(ExportOpts::default()).await.unwrap();
    assert_eq!(deck.len(), 1);
    assert_eq!(*deck[0].bitmap, full);
}
