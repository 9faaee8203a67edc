use std::fmt;
use std::sync::Arc;

use xxhash_rust::xxh3::Xxh3;

use crate::foundation::core::Color;
use crate::foundation::error::{DeckError, DeckResult};
use crate::scene::model::{BackgroundSpec, ElementKind, SceneDocument, SceneObject};

const XXH3_SEED: u64 = 0x5d1c_e0a7_3b29_f481;

/// Stable 128-bit content fingerprint of a scene snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SnapshotFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl fmt::Display for SnapshotFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Immutable, self-contained scene state of one slide.
///
/// Cloning is cheap (the document is shared). Snapshots are validated on construction, so any
/// snapshot value can be replayed into a surface.
#[derive(Clone)]
pub struct SceneSnapshot {
    doc: Arc<SceneDocument>,
    fingerprint: SnapshotFingerprint,
}

impl SceneSnapshot {
    /// Validate `doc` and wrap it.
    pub fn new(doc: SceneDocument) -> DeckResult<Self> {
        doc.validate()?;
        let bytes = serde_json::to_vec(&doc).map_err(|e| DeckError::serde(e.to_string()))?;
        let fingerprint = fingerprint_bytes(&bytes);
        Ok(Self {
            doc: Arc::new(doc),
            fingerprint,
        })
    }

    /// Empty transparent scene.
    pub fn empty() -> DeckResult<Self> {
        Self::new(SceneDocument::empty())
    }

    /// Parse a snapshot from JSON text.
    pub fn from_json_str(json: &str) -> DeckResult<Self> {
        let doc: SceneDocument = serde_json::from_str(json)
            .map_err(|e| DeckError::corrupt(format!("unparseable scene json: {e}")))?;
        Self::new(doc)
    }

    /// Parse a snapshot from a JSON value.
    pub fn from_json_value(value: serde_json::Value) -> DeckResult<Self> {
        let doc: SceneDocument = serde_json::from_value(value)
            .map_err(|e| DeckError::corrupt(format!("invalid scene document: {e}")))?;
        Self::new(doc)
    }

    /// Serialize to compact JSON text.
    pub fn to_json_string(&self) -> DeckResult<String> {
        serde_json::to_string(self.doc.as_ref()).map_err(|e| DeckError::serde(e.to_string()))
    }

    /// Serialize to a JSON value.
    pub fn to_json_value(&self) -> DeckResult<serde_json::Value> {
        serde_json::to_value(self.doc.as_ref()).map_err(|e| DeckError::serde(e.to_string()))
    }

    /// Borrow the underlying document.
    pub fn document(&self) -> &SceneDocument {
        &self.doc
    }

    /// Copy of the document, for building a modified snapshot.
    pub fn to_document(&self) -> SceneDocument {
        self.doc.as_ref().clone()
    }

    /// Content fingerprint.
    pub fn fingerprint(&self) -> SnapshotFingerprint {
        self.fingerprint
    }

    /// Drawable objects in z-order.
    pub fn objects(&self) -> &[SceneObject] {
        &self.doc.objects
    }

    /// Objects of one element kind, with their positions in the object list.
    pub fn objects_of_kind(&self, kind: ElementKind) -> impl Iterator<Item = (usize, &SceneObject)> {
        self.doc
            .objects
            .iter()
            .enumerate()
            .filter(move |(_, o)| o.kind() == kind)
    }

    /// Solid background color, if any.
    pub fn background_color(&self) -> Option<Color> {
        self.doc.background
    }

    /// Placed background image object, if any.
    pub fn background_image(&self) -> Option<&SceneObject> {
        self.doc.background_image.as_ref()
    }

    /// Background spec (out-of-band metadata or inferred).
    pub fn background_spec(&self) -> BackgroundSpec {
        self.doc.background_spec()
    }

    /// Every image URL the snapshot references, background first, deduplicated.
    pub fn image_urls(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let bg = self.doc.background_image.iter();
        for obj in bg.chain(self.doc.objects.iter()) {
            if obj.kind() != ElementKind::Image {
                continue;
            }
            if let Some(src) = obj.src()
                && !out.iter().any(|u| u == src)
            {
                out.push(src.to_string());
            }
        }
        out
    }
}

impl PartialEq for SceneSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint && self.doc == other.doc
    }
}

impl fmt::Debug for SceneSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneSnapshot")
            .field("fingerprint", &format_args!("{}", self.fingerprint))
            .field("objects", &self.doc.objects.len())
            .field("background", &self.doc.background)
            .field("has_background_image", &self.doc.background_image.is_some())
            .finish()
    }
}

impl serde::Serialize for SceneSnapshot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(self.doc.as_ref(), serializer)
    }
}

impl<'de> serde::Deserialize<'de> for SceneSnapshot {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let doc = <SceneDocument as serde::Deserialize>::deserialize(deserializer)?;
        Self::new(doc).map_err(serde::de::Error::custom)
    }
}

fn fingerprint_bytes(bytes: &[u8]) -> SnapshotFingerprint {
    let mut h = Xxh3::with_seed(XXH3_SEED);
    h.update(bytes);
    let v = h.digest128();
    SnapshotFingerprint {
        hi: (v >> 64) as u64,
        lo: v as u64,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/snapshot.rs"]
mod tests;
