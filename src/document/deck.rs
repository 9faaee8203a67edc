use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;

use crate::document::templates::SlideKind;
use crate::foundation::core::SlideId;
use crate::foundation::error::{DeckError, DeckResult};
use crate::scene::snapshot::SceneSnapshot;

/// Persisted form of one slide.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideRecord {
    /// Stable slide id.
    pub id: SlideId,
    /// Slide flavor.
    pub kind: SlideKind,
    /// Committed scene.
    pub snapshot: SceneSnapshot,
    /// Image generation prompt.
    #[serde(default)]
    pub visual_prompt: Option<String>,
}

/// Whole-deck document exchanged with the persistence backend.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeckDocument {
    /// Slides in presentation order.
    pub slides: Vec<SlideRecord>,
}

impl DeckDocument {
    /// Parse a document from JSON text.
    pub fn from_json_str(json: &str) -> DeckResult<Self> {
        let doc: Self =
            serde_json::from_str(json).map_err(|e| DeckError::serde(format!("deck json: {e}")))?;
        doc.validate()?;
        Ok(doc)
    }

    /// Serialize to JSON bytes.
    pub fn to_json_vec(&self) -> DeckResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| DeckError::serde(e.to_string()))
    }

    /// Read and validate a document file.
    pub fn from_path(path: impl AsRef<Path>) -> DeckResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read deck '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Write the document as pretty JSON.
    pub fn to_path(&self, path: impl AsRef<Path>) -> DeckResult<()> {
        let path = path.as_ref();
        let text =
            serde_json::to_string_pretty(self).map_err(|e| DeckError::serde(e.to_string()))?;
        std::fs::write(path, text).with_context(|| format!("write deck '{}'", path.display()))?;
        Ok(())
    }

    /// Reject duplicate slide ids.
    pub fn validate(&self) -> DeckResult<()> {
        let mut seen = HashSet::new();
        for rec in &self.slides {
            if !seen.insert(rec.id) {
                return Err(DeckError::validation(format!(
                    "duplicate slide id {} in deck",
                    rec.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/deck.rs"]
mod tests;
