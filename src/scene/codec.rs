//! Conversion between a live [`Surface`] and its portable [`SceneSnapshot`].

use crate::foundation::error::DeckResult;
use crate::scene::snapshot::SceneSnapshot;
use crate::scene::surface::Surface;

/// Read the full state of `surface` into a new snapshot.
///
/// Background fields are always written, as `null` when absent. The out-of-band background spec
/// is written when the surface was created or edited here, or was loaded from a document that
/// carried one; uninterpreted top-level keys from the last load are written back unchanged.
pub fn encode(surface: &Surface) -> DeckResult<SceneSnapshot> {
    SceneSnapshot::new(surface.to_document())
}

/// Replace the contents of `target` with `snapshot`.
///
/// The new state is assembled on a scratch surface and swapped in at the end, so nothing from a
/// previous load survives and a failure leaves `target` untouched.
#[tracing::instrument(skip_all, fields(fingerprint = %snapshot.fingerprint()))]
pub fn decode(snapshot: &SceneSnapshot, target: &mut Surface) -> DeckResult<()> {
    let doc = snapshot.document();
    doc.validate()?;
    let scratch = Surface::from_document(target.canvas(), doc);
    *target = scratch;
    Ok(())
}

/// Parse `json` and load it into `target`, returning the parsed snapshot.
///
/// Malformed input is reported as `CorruptSnapshot` and `target` is not modified.
pub fn decode_json(json: &str, target: &mut Surface) -> DeckResult<SceneSnapshot> {
    let snapshot = SceneSnapshot::from_json_str(json)?;
    decode(&snapshot, target)?;
    Ok(snapshot)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/codec.rs"]
mod tests;
