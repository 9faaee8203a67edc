use crate::foundation::core::SlideId;

/// Convenience result type used across pitchdeck.
pub type DeckResult<T> = Result<T, DeckError>;

/// Error taxonomy for the slide engine.
///
/// Every failure is scoped to the operation that produced it; none of these leave committed
/// document state modified.
#[derive(thiserror::Error, Debug)]
pub enum DeckError {
    /// A scene snapshot could not be parsed or failed structural validation.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// A background or regenerated image could not be fetched or decoded.
    #[error("image load error: {0}")]
    ImageLoad(String),

    /// A positional index does not address an existing slide.
    #[error("index {index} out of range for {len} slides")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Number of slides at the time of the call.
        len: usize,
    },

    /// No slide with this id exists in the store.
    #[error("slide not found: {0}")]
    SlideNotFound(SlideId),

    /// A regeneration patch found no image element to replace.
    #[error("patch target not found: {0}")]
    PatchTargetNotFound(String),

    /// Another save is still in flight.
    #[error("save already in progress")]
    SaveInProgress,

    /// The persistence backend failed or timed out.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// The regeneration backend failed or timed out.
    #[error("regeneration error: {0}")]
    Regeneration(String),

    /// Off-screen rasterization failed.
    #[error("render error: {0}")]
    Render(String),

    /// Invalid caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeckError {
    /// Build a [`DeckError::CorruptSnapshot`] value.
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptSnapshot(msg.into())
    }

    /// Build a [`DeckError::ImageLoad`] value.
    pub fn image_load(msg: impl Into<String>) -> Self {
        Self::ImageLoad(msg.into())
    }

    /// Build a [`DeckError::PatchTargetNotFound`] value.
    pub fn patch_target(msg: impl Into<String>) -> Self {
        Self::PatchTargetNotFound(msg.into())
    }

    /// Build a [`DeckError::Persistence`] value.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Build a [`DeckError::Regeneration`] value.
    pub fn regeneration(msg: impl Into<String>) -> Self {
        Self::Regeneration(msg.into())
    }

    /// Build a [`DeckError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`DeckError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DeckError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for failures a user can retry without data loss.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ImageLoad(_) | Self::SaveInProgress | Self::Persistence(_) | Self::Regeneration(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
