use serde_json::{Map, Value};

use crate::foundation::core::{Canvas, Color};
use crate::foundation::error::{DeckError, DeckResult};
use crate::scene::model::{
    BackgroundSpec, ElementKind, SCENE_FORMAT_VERSION, SceneDocument, SceneObject,
};

/// Built-in shapes the editor can insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Axis-aligned rectangle.
    Rect,
    /// Circle.
    Circle,
    /// Isosceles triangle.
    Triangle,
}

/// Text styling for [`Surface::add_text`].
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in canvas pixels.
    pub font_size: f64,
    /// Font family name.
    pub font_family: String,
    /// Text color.
    pub fill: Color,
    /// Wrapping width in canvas pixels.
    pub width: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 40.0,
            font_family: "Inter".to_string(),
            fill: Color::BLACK,
            width: 600.0,
        }
    }
}

/// Live, mutable scene graph of the slide being edited.
///
/// A surface is an ordinary owned value: editors, tests and off-screen renderers each hold their
/// own. The background image lives outside `objects` and is never hit-tested.
///
/// Top-level keys of a loaded document that the editor does not interpret are carried along
/// untouched, so loading and re-encoding a document reproduces it.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    canvas: Canvas,
    version: String,
    objects: Vec<SceneObject>,
    background: Option<Color>,
    background_image: Option<SceneObject>,
    background_spec: BackgroundSpec,
    // false only for loaded documents that had no `deckBackground` and were not edited since
    spec_recorded: bool,
    extra: Map<String, Value>,
}

impl Surface {
    /// Empty transparent surface of the given size.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            version: SCENE_FORMAT_VERSION.to_string(),
            objects: Vec::new(),
            background: None,
            background_image: None,
            background_spec: BackgroundSpec::none(),
            spec_recorded: true,
            extra: Map::new(),
        }
    }

    /// Surface dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Drawable objects in z-order.
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Object at `index`.
    pub fn object(&self, index: usize) -> DeckResult<&SceneObject> {
        let len = self.objects.len();
        self.objects
            .get(index)
            .ok_or(DeckError::IndexOutOfRange { index, len })
    }

    /// Mutable object at `index`, for property edits.
    pub fn object_mut(&mut self, index: usize) -> DeckResult<&mut SceneObject> {
        let len = self.objects.len();
        self.objects
            .get_mut(index)
            .ok_or(DeckError::IndexOutOfRange { index, len })
    }

    /// Append an object on top and return its index.
    pub fn add_object(&mut self, obj: SceneObject) -> usize {
        self.objects.push(obj);
        self.objects.len() - 1
    }

    /// Add a wrapping text box near the top-left of the canvas.
    pub fn add_text(&mut self, text: &str, style: &TextStyle) -> usize {
        let c = self.canvas;
        let obj = SceneObject::new("textbox")
            .with("text", text)
            .with("left", f64::from(c.width) * 0.1)
            .with("top", f64::from(c.height) * 0.1)
            .with("width", style.width)
            .with("fontSize", style.font_size)
            .with("fontFamily", style.font_family.as_str())
            .with("fill", style.fill.to_css())
            .with("originX", "left")
            .with("originY", "top");
        self.add_object(obj)
    }

    /// Add a shape centered on the canvas.
    pub fn add_shape(&mut self, kind: ShapeKind, fill: Color) -> usize {
        let center = self.canvas.center();
        let base = |tag: &str| {
            SceneObject::new(tag)
                .with("left", center.x)
                .with("top", center.y)
                .with("originX", "center")
                .with("originY", "center")
                .with("fill", fill.to_css())
        };
        let obj = match kind {
            ShapeKind::Rect => base("rect").with("width", 200.0).with("height", 120.0),
            ShapeKind::Circle => base("circle").with("radius", 80.0),
            ShapeKind::Triangle => base("triangle").with("width", 180.0).with("height", 160.0),
        };
        self.add_object(obj)
    }

    /// Add an image element of natural size `width`×`height`, centered on the canvas.
    pub fn add_image(&mut self, url: &str, width: u32, height: u32) -> usize {
        let center = self.canvas.center();
        let obj = SceneObject::new("image")
            .with("src", url)
            .with("left", center.x)
            .with("top", center.y)
            .with("width", f64::from(width))
            .with("height", f64::from(height))
            .with("originX", "center")
            .with("originY", "center");
        self.add_object(obj)
    }

    /// Remove and return the object at `index`.
    pub fn remove_object(&mut self, index: usize) -> DeckResult<SceneObject> {
        self.object(index)?;
        Ok(self.objects.remove(index))
    }

    /// Move the object at `index` one step up in z-order. Returns its new index.
    pub fn bring_forward(&mut self, index: usize) -> DeckResult<usize> {
        self.object(index)?;
        if index + 1 < self.objects.len() {
            self.objects.swap(index, index + 1);
            return Ok(index + 1);
        }
        Ok(index)
    }

    /// Move the object at `index` one step down in z-order. Returns its new index.
    pub fn send_backward(&mut self, index: usize) -> DeckResult<usize> {
        self.object(index)?;
        if index > 0 {
            self.objects.swap(index, index - 1);
            return Ok(index - 1);
        }
        Ok(index)
    }

    /// Number of objects of the given kind.
    pub fn count_kind(&self, kind: ElementKind) -> usize {
        self.objects.iter().filter(|o| o.kind() == kind).count()
    }

    /// Solid background color.
    pub fn background_color(&self) -> Option<Color> {
        self.background
    }

    /// Set or clear the solid background color.
    pub fn set_background_color(&mut self, color: Option<Color>) {
        self.background = color;
    }

    /// Placed background image.
    pub fn background_image(&self) -> Option<&SceneObject> {
        self.background_image.as_ref()
    }

    /// Set or clear the background image. The object is forced non-interactive.
    pub fn set_background_image(&mut self, image: Option<SceneObject>) {
        self.background_image = image.map(|img| img.with("selectable", false).with("evented", false));
    }

    /// Editor-level background metadata.
    pub fn background_spec(&self) -> &BackgroundSpec {
        &self.background_spec
    }

    /// Replace the editor-level background metadata.
    pub fn set_background_spec(&mut self, spec: BackgroundSpec) {
        self.background_spec = spec;
        self.spec_recorded = true;
    }

    /// Uninterpreted top-level document keys carried through from the last load.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Remove every object and the background.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.background = None;
        self.background_image = None;
        self.background_spec = BackgroundSpec::none();
        self.spec_recorded = true;
        self.extra.clear();
        self.version = SCENE_FORMAT_VERSION.to_string();
    }

    pub(crate) fn from_document(canvas: Canvas, doc: &SceneDocument) -> Self {
        Self {
            canvas,
            version: doc.version.clone(),
            objects: doc.objects.clone(),
            background: doc.background,
            background_image: doc.background_image.clone(),
            background_spec: doc.background_spec(),
            spec_recorded: doc.deck_background.is_some(),
            extra: doc.extra.clone(),
        }
    }

    pub(crate) fn to_document(&self) -> SceneDocument {
        SceneDocument {
            version: self.version.clone(),
            objects: self.objects.clone(),
            background: self.background,
            background_image: self.background_image.clone(),
            deck_background: self
                .spec_recorded
                .then(|| self.background_spec.clone()),
            extra: self.extra.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/surface.rs"]
mod tests;
