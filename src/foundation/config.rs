use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

use crate::foundation::core::Canvas;
use crate::foundation::error::{DeckError, DeckResult};

/// Editor-wide configuration.
///
/// Every field has a default, so a config file only needs the keys it overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorOpts {
    /// Canonical slide canvas. Thumbnail and export aspect derive from it.
    pub canvas: Canvas,
    /// Maximum number of undo entries kept per slide.
    pub history_depth: usize,
    /// Thumbnail width in pixels; height follows the canvas aspect.
    pub thumbnail_width: u32,
    /// Upper bound for one image fetch + decode.
    pub image_load_timeout_ms: u64,
    /// Upper bound for one save round trip.
    pub save_timeout_ms: u64,
    /// Upper bound for one regeneration round trip.
    pub regeneration_timeout_ms: u64,
    /// Quiet period before an autosave fires.
    pub autosave_debounce_ms: u64,
    /// Maximum number of decoded images kept in memory.
    pub image_cache_entries: usize,
    /// Maximum decoded pixel bytes kept in memory.
    pub image_cache_bytes: usize,
    /// Directory that relative image paths resolve against.
    pub asset_root: PathBuf,
    /// Font used to rasterize text in thumbnails and exports.
    pub font_path: Option<PathBuf>,
}

impl Default for EditorOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            history_depth: 20,
            thumbnail_width: 240,
            image_load_timeout_ms: 15_000,
            save_timeout_ms: 30_000,
            regeneration_timeout_ms: 120_000,
            autosave_debounce_ms: 1_500,
            image_cache_entries: 64,
            image_cache_bytes: 256 << 20,
            asset_root: PathBuf::from("."),
            font_path: None,
        }
    }
}

impl EditorOpts {
    /// Load options from a JSON file and validate them.
    pub fn from_path(path: impl AsRef<Path>) -> DeckResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read editor config '{}'", path.display()))?;
        let opts: Self = serde_json::from_slice(&bytes)
            .map_err(|e| DeckError::serde(format!("editor config '{}': {e}", path.display())))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Apply `PITCHDECK_*` environment overrides on top of `self`.
    ///
    /// Unparseable or zero values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(depth) = env_parse::<usize>("PITCHDECK_HISTORY_DEPTH").filter(|&n| n > 0) {
            self.history_depth = depth;
        }
        if let Some(w) = env_parse::<u32>("PITCHDECK_THUMBNAIL_WIDTH").filter(|&n| n > 0) {
            self.thumbnail_width = w;
        }
        if let Some(root) = std::env::var_os("PITCHDECK_ASSET_ROOT") {
            self.asset_root = PathBuf::from(root);
        }
        if let Some(font) = std::env::var_os("PITCHDECK_FONT") {
            self.font_path = Some(PathBuf::from(font));
        }
        self
    }

    /// Reject configurations the engine cannot honor.
    pub fn validate(&self) -> DeckResult<()> {
        Canvas::new(self.canvas.width, self.canvas.height)?;
        if self.history_depth == 0 {
            return Err(DeckError::validation("history_depth must be > 0"));
        }
        if self.thumbnail_width == 0 {
            return Err(DeckError::validation("thumbnail_width must be > 0"));
        }
        if self.image_cache_entries == 0 || self.image_cache_bytes == 0 {
            return Err(DeckError::validation("image cache limits must be > 0"));
        }
        Ok(())
    }

    /// Thumbnail size `(width, height)` following the canvas aspect.
    pub fn thumbnail_size(&self) -> (u32, u32) {
        (
            self.thumbnail_width,
            self.canvas.height_for_width(self.thumbnail_width),
        )
    }

    pub(crate) fn image_load_timeout(&self) -> Duration {
        Duration::from_millis(self.image_load_timeout_ms)
    }

    pub(crate) fn save_timeout(&self) -> Duration {
        Duration::from_millis(self.save_timeout_ms)
    }

    pub(crate) fn regeneration_timeout(&self) -> Duration {
        Duration::from_millis(self.regeneration_timeout_ms)
    }

    pub(crate) fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    /// Read the configured font, if any.
    pub(crate) fn load_font(&self) -> DeckResult<Option<Vec<u8>>> {
        let Some(path) = &self.font_path else {
            return Ok(None);
        };
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Ok(Some(bytes))
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
