use crate::foundation::core::Canvas;
use crate::scene::model::{BackgroundImageSpec, ScaleMode, SceneObject};

/// `(scale_x, scale_y)` mapping an image of natural size `image` onto `canvas`.
///
/// `fill` covers the canvas (overflow is cropped), `fit` keeps the whole image visible,
/// `stretch` scales the axes independently, `center` and `tile` keep the natural size.
pub fn scale_factors(mode: ScaleMode, image: (f64, f64), canvas: Canvas) -> (f64, f64) {
    let (iw, ih) = image;
    if !(iw > 0.0 && ih > 0.0) {
        return (1.0, 1.0);
    }
    let sx = f64::from(canvas.width) / iw;
    let sy = f64::from(canvas.height) / ih;
    match mode {
        ScaleMode::Fill => {
            let s = sx.max(sy);
            (s, s)
        }
        ScaleMode::Fit => {
            let s = sx.min(sy);
            (s, s)
        }
        ScaleMode::Stretch => (sx, sy),
        ScaleMode::Center | ScaleMode::Tile => (1.0, 1.0),
    }
}

/// Build the placed, non-interactive background image object for `spec`.
///
/// The image is centered on the canvas with a centered origin. `tile` is marked with a
/// `repeat` pattern so renderers fill the canvas with copies.
pub fn background_object(spec: &BackgroundImageSpec, natural: (f64, f64), canvas: Canvas) -> SceneObject {
    let (scale_x, scale_y) = scale_factors(spec.scale_mode, natural, canvas);
    let center = canvas.center();
    let mut obj = SceneObject::new("image")
        .with("src", spec.url.as_str())
        .with("width", natural.0)
        .with("height", natural.1)
        .with("scaleX", scale_x)
        .with("scaleY", scale_y)
        .with("left", center.x)
        .with("top", center.y)
        .with("originX", "center")
        .with("originY", "center")
        .with("opacity", spec.opacity.clamp(0.0, 1.0))
        .with("selectable", false)
        .with("evented", false);
    if spec.scale_mode == ScaleMode::Tile {
        obj.set("repeat", "repeat");
    }
    obj
}

#[cfg(test)]
#[path = "../../tests/unit/background/scale.rs"]
mod tests;
