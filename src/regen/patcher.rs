//! Targeted replacement of image sources inside an otherwise untouched snapshot.

use crate::foundation::error::{DeckError, DeckResult};
use crate::scene::model::ElementKind;
use crate::scene::snapshot::SceneSnapshot;

/// Return a copy of `snapshot` whose image elements point at `new_url`.
///
/// Only the `src` field of `image` objects in the object list changes. Every other object, every
/// other field and the background are carried over verbatim. A snapshot without image elements
/// fails with `PatchTargetNotFound`.
pub fn patch_image(snapshot: &SceneSnapshot, new_url: &str) -> DeckResult<SceneSnapshot> {
    let new_url = new_url.trim();
    if new_url.is_empty() {
        return Err(DeckError::validation("replacement image url is empty"));
    }

    let targets: Vec<usize> = snapshot
        .objects_of_kind(ElementKind::Image)
        .map(|(i, _)| i)
        .collect();
    if targets.is_empty() {
        return Err(DeckError::patch_target(
            "slide has no image element to replace; add an image before regenerating",
        ));
    }

    let mut doc = snapshot.to_document();
    for &i in &targets {
        doc.objects[i].set("src", new_url);
    }
    let patched = SceneSnapshot::new(doc)?;
    tracing::debug!(
        patched = targets.len(),
        from = %snapshot.fingerprint(),
        to = %patched.fingerprint(),
        "image sources patched"
    );
    Ok(patched)
}

#[cfg(test)]
#[path = "../../tests/unit/regen/patcher.rs"]
mod tests;
