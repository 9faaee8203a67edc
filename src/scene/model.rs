use serde_json::{Map, Value};

use crate::foundation::core::Color;
use crate::foundation::error::{DeckError, DeckResult};

/// Scene format version written into every encoded document.
pub const SCENE_FORMAT_VERSION: &str = "5.3.0";

/// Drawable element category, derived from an object's `type` tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `text`, `i-text` and `textbox` objects.
    Text,
    /// `image` objects.
    Image,
    /// Everything else (`rect`, `circle`, `triangle`, `path`, ...).
    Shape,
}

impl ElementKind {
    /// Classify a runtime `type` tag.
    pub fn from_type_tag(tag: &str) -> Self {
        match tag {
            "text" | "i-text" | "textbox" => Self::Text,
            "image" => Self::Image,
            _ => Self::Shape,
        }
    }
}

/// One object as the scene runtime serializes it: a `type` tag plus its full property map.
///
/// Properties are kept verbatim so that untouched objects survive a decode/encode cycle (and a
/// regeneration patch) unchanged.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneObject {
    /// Runtime type tag (`textbox`, `image`, `rect`, ...).
    #[serde(rename = "type")]
    pub type_tag: String,
    /// All remaining properties.
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

impl SceneObject {
    /// Create an object with no properties.
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            props: Map::new(),
        }
    }

    /// Builder-style property setter.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Element category of this object.
    pub fn kind(&self) -> ElementKind {
        ElementKind::from_type_tag(&self.type_tag)
    }

    /// Raw property lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// Set (or replace) a property.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.props.insert(key.to_string(), value.into());
    }

    /// Numeric property, or `default` when missing, non-numeric or non-finite.
    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.props
            .get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
            .unwrap_or(default)
    }

    /// String property.
    pub fn str_prop(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    /// Boolean property, or `default` when missing.
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.props
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    /// Parsed color property. Missing, empty and unparseable values read as `None`.
    pub fn color_prop(&self, key: &str) -> Option<Color> {
        self.str_prop(key)
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| Color::parse(s).ok())
    }

    /// Image source for image objects.
    pub fn src(&self) -> Option<&str> {
        self.str_prop("src")
    }

    /// Text content for text objects.
    pub fn text(&self) -> Option<&str> {
        self.str_prop("text")
    }
}

/// How the slide background is currently defined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    /// Solid color.
    Color,
    /// Placed (or tiled) image.
    Image,
    /// Transparent.
    #[default]
    None,
}

/// Strategy mapping a background image's natural size onto the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    /// Cover the canvas, cropping overflow.
    #[default]
    Fill,
    /// Fit inside the canvas, letterboxing if needed.
    Fit,
    /// Scale each axis independently to the canvas.
    Stretch,
    /// Natural size, centered.
    Center,
    /// Natural size, repeated.
    Tile,
}

impl ScaleMode {
    /// Parse a mode name as used in documents and on the command line.
    pub fn parse(s: &str) -> DeckResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fill" | "cover" => Ok(Self::Fill),
            "fit" | "contain" => Ok(Self::Fit),
            "stretch" => Ok(Self::Stretch),
            "center" => Ok(Self::Center),
            "tile" | "repeat" => Ok(Self::Tile),
            _ => Err(DeckError::validation(format!("unknown scale mode '{s}'"))),
        }
    }
}

/// Image half of a [`BackgroundSpec`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundImageSpec {
    /// Image URL as requested by the caller.
    pub url: String,
    /// Scale strategy.
    #[serde(default)]
    pub scale_mode: ScaleMode,
    /// Opacity in `0..=1`.
    #[serde(default = "one")]
    pub opacity: f64,
}

fn one() -> f64 {
    1.0
}

/// Editor-level background description.
///
/// The runtime only keeps the resolved `background` / `backgroundImage` fields; this spec is
/// carried next to them so the scale mode survives a round trip.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundSpec {
    /// Which background is visible.
    pub mode: BackgroundMode,
    /// Color, when `mode == Color`.
    #[serde(default)]
    pub color: Option<Color>,
    /// Image, when `mode == Image`.
    #[serde(default)]
    pub image: Option<BackgroundImageSpec>,
}

impl BackgroundSpec {
    /// Transparent background.
    pub fn none() -> Self {
        Self::default()
    }

    /// Solid color background.
    pub fn color(color: Color) -> Self {
        Self {
            mode: BackgroundMode::Color,
            color: Some(color),
            image: None,
        }
    }

    /// Image background.
    pub fn image(image: BackgroundImageSpec) -> Self {
        Self {
            mode: BackgroundMode::Image,
            color: None,
            image: Some(image),
        }
    }

    /// Reconstruct a spec from runtime fields when no out-of-band metadata is present.
    ///
    /// The scale mode cannot be recovered from placement alone, so images read back as `fill`
    /// unless they carry a `repeat` marker.
    pub fn infer(background: Option<Color>, background_image: Option<&SceneObject>) -> Self {
        if let Some(img) = background_image {
            let scale_mode = if img.str_prop("repeat").is_some() {
                ScaleMode::Tile
            } else {
                ScaleMode::Fill
            };
            return Self::image(BackgroundImageSpec {
                url: img.src().unwrap_or_default().to_string(),
                scale_mode,
                opacity: img.f64_or("opacity", 1.0),
            });
        }
        match background {
            Some(c) if !c.is_transparent() => Self::color(c),
            _ => Self::none(),
        }
    }
}

/// Full serialized content of one slide.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    /// Runtime format version.
    pub version: String,
    /// Drawable objects in z-order (first is bottom-most).
    pub objects: Vec<SceneObject>,
    /// Solid background color.
    #[serde(default, deserialize_with = "deserialize_opt_color")]
    pub background: Option<Color>,
    /// Placed background image object.
    #[serde(default)]
    pub background_image: Option<SceneObject>,
    /// Out-of-band background metadata. Omitted when the document never carried it.
    #[serde(
        rename = "deckBackground",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub deck_background: Option<BackgroundSpec>,
    /// Top-level runtime keys this crate does not interpret (`overlay`, `clipPath`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SceneDocument {
    /// Empty, transparent scene.
    pub fn empty() -> Self {
        Self {
            version: SCENE_FORMAT_VERSION.to_string(),
            objects: Vec::new(),
            background: None,
            background_image: None,
            deck_background: Some(BackgroundSpec::none()),
            extra: Map::new(),
        }
    }

    /// Background spec, inferred from the runtime fields when metadata is absent.
    pub fn background_spec(&self) -> BackgroundSpec {
        self.deck_background.clone().unwrap_or_else(|| {
            BackgroundSpec::infer(self.background, self.background_image.as_ref())
        })
    }

    /// Structural checks beyond what serde enforces.
    pub fn validate(&self) -> DeckResult<()> {
        if self.version.trim().is_empty() {
            return Err(DeckError::corrupt("scene version must be non-empty"));
        }
        for (i, obj) in self.objects.iter().enumerate() {
            if obj.type_tag.trim().is_empty() {
                return Err(DeckError::corrupt(format!("object {i} has an empty type")));
            }
            if obj.kind() == ElementKind::Image && obj.src().is_none() {
                return Err(DeckError::corrupt(format!("image object {i} has no src")));
            }
        }
        if let Some(img) = &self.background_image {
            if img.kind() != ElementKind::Image {
                return Err(DeckError::corrupt(format!(
                    "backgroundImage must be an image, got '{}'",
                    img.type_tag
                )));
            }
            if img.src().is_none() {
                return Err(DeckError::corrupt("backgroundImage has no src"));
            }
        }
        if let Some(spec) = &self.deck_background
            && let Some(img) = &spec.image
            && !(0.0..=1.0).contains(&img.opacity)
        {
            return Err(DeckError::corrupt("background opacity must be within 0..=1"));
        }
        Ok(())
    }
}

fn deserialize_opt_color<'de, D>(deserializer: D) -> Result<Option<Color>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = serde::Deserialize::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => Color::parse(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
