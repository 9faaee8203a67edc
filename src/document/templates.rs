use crate::foundation::core::{Canvas, Color};
use crate::foundation::error::DeckResult;
use crate::scene::codec;
use crate::scene::model::{BackgroundSpec, SceneObject};
use crate::scene::snapshot::SceneSnapshot;
use crate::scene::surface::{Surface, TextStyle};

/// Slide flavor. Decides the starting template only; editing is identical afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideKind {
    /// Free-form content slide.
    Content,
    /// Character/cast slide with a title and a portrait image slot.
    Cast,
}

/// Starting snapshot for a new slide of `kind`.
pub fn initial_snapshot(kind: SlideKind, canvas: Canvas) -> DeckResult<SceneSnapshot> {
    let mut surface = Surface::new(canvas);
    surface.set_background_color(Some(Color::WHITE));
    surface.set_background_spec(BackgroundSpec::color(Color::WHITE));

    if kind == SlideKind::Cast {
        let title = TextStyle {
            font_size: 56.0,
            width: f64::from(canvas.width) * 0.45,
            ..TextStyle::default()
        };
        surface.add_text("Cast", &title);

        // Portrait slot on the right half; `src` stays empty until an image is generated.
        let w = f64::from(canvas.width) * 0.35;
        let h = f64::from(canvas.height) * 0.7;
        surface.add_object(
            SceneObject::new("image")
                .with("src", "")
                .with("left", f64::from(canvas.width) * 0.75)
                .with("top", f64::from(canvas.height) * 0.5)
                .with("width", w)
                .with("height", h)
                .with("originX", "center")
                .with("originY", "center"),
        );
    }

    codec::encode(&surface)
}
