//! Background mutation of one slide: solid color, placed image, or none.
//!
//! Every successful mutation is read back from the surface and committed to the slide's history,
//! so background edits undo like any other edit.

use std::collections::HashMap;
use std::future::Future;

use crate::assets::store::ImageStore;
use crate::background::scale::background_object;
use crate::document::store::SlideDocumentStore;
use crate::foundation::core::{Color, SlideId};
use crate::foundation::error::{DeckError, DeckResult};
use crate::scene::codec;
use crate::scene::model::{BackgroundImageSpec, BackgroundMode, BackgroundSpec};
use crate::scene::snapshot::SceneSnapshot;
use crate::scene::surface::Surface;

/// One slide of a store together with the surface showing it.
pub struct SlideTarget<'a> {
    store: &'a mut SlideDocumentStore,
    slide: SlideId,
    surface: &'a mut Surface,
}

impl<'a> SlideTarget<'a> {
    /// Bind `slide` and the surface it is loaded into.
    pub fn new(
        store: &'a mut SlideDocumentStore,
        slide: SlideId,
        surface: &'a mut Surface,
    ) -> DeckResult<Self> {
        store.position_of(slide)?;
        Ok(Self {
            store,
            slide,
            surface,
        })
    }

    /// Targeted slide.
    pub fn slide(&self) -> SlideId {
        self.slide
    }

    /// Surface being mutated.
    pub fn surface(&self) -> &Surface {
        self.surface
    }

    fn commit(&mut self) -> DeckResult<SceneSnapshot> {
        let snapshot = codec::encode(self.surface)?;
        self.store.commit(self.slide, snapshot.clone())?;
        Ok(snapshot)
    }
}

/// Ticket for an asynchronous background image load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackgroundRequest {
    /// Slide the load was issued for.
    pub slide: SlideId,
    /// Monotonic request token.
    pub token: u64,
}

/// Result of a finished image load, ready to be applied.
#[derive(Clone, Debug)]
pub struct LoadedBackground {
    request: BackgroundRequest,
    spec: BackgroundImageSpec,
    natural: (f64, f64),
}

impl LoadedBackground {
    /// Request this load answers.
    pub fn request(&self) -> BackgroundRequest {
        self.request
    }
}

/// Applies background changes and guards image loads against being superseded.
#[derive(Debug)]
pub struct BackgroundCompositor {
    images: ImageStore,
    latest: HashMap<SlideId, u64>,
    next_token: u64,
}

impl BackgroundCompositor {
    /// Compositor loading images through `images`.
    pub fn new(images: ImageStore) -> Self {
        Self {
            images,
            latest: HashMap::new(),
            next_token: 1,
        }
    }

    /// Image cache shared with the compositor.
    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Solid color background. Any background image is cleared before the color is applied.
    pub fn set_color(&mut self, target: &mut SlideTarget<'_>, color: Color) -> DeckResult<SceneSnapshot> {
        self.supersede(target.slide);
        if target.surface.background_image().is_some() {
            target.surface.set_background_image(None);
        }
        target.surface.set_background_color(Some(color));
        target.surface.set_background_spec(BackgroundSpec::color(color));
        let snapshot = target.commit()?;
        tracing::debug!(slide = %target.slide, %color, "background color set");
        Ok(snapshot)
    }

    /// Transparent background. Always commits, even when there was nothing to remove.
    pub fn remove_background(&mut self, target: &mut SlideTarget<'_>) -> DeckResult<SceneSnapshot> {
        self.supersede(target.slide);
        target.surface.set_background_image(None);
        target.surface.set_background_color(None);
        target.surface.set_background_spec(BackgroundSpec::none());
        let snapshot = target.commit()?;
        tracing::debug!(slide = %target.slide, "background removed");
        Ok(snapshot)
    }

    /// Start an image load for `slide`, superseding any earlier one.
    pub fn begin_image(&mut self, slide: SlideId) -> BackgroundRequest {
        BackgroundRequest {
            slide,
            token: self.supersede(slide),
        }
    }

    /// Fetch and decode the image for `request`. The future does not touch compositor state.
    pub fn load_image(
        &self,
        request: BackgroundRequest,
        spec: BackgroundImageSpec,
    ) -> impl Future<Output = DeckResult<LoadedBackground>> + Send + 'static {
        let images = self.images.clone();
        async move {
            if !(0.0..=1.0).contains(&spec.opacity) {
                return Err(DeckError::validation(format!(
                    "background opacity {} outside 0..=1",
                    spec.opacity
                )));
            }
            let image = images.load(&spec.url).await?;
            Ok(LoadedBackground {
                request,
                natural: image.size(),
                spec,
            })
        }
    }

    /// Place a loaded image and commit.
    ///
    /// Returns `Ok(None)` without touching the slide when a newer background request was issued
    /// for it after `loaded` started.
    pub fn apply_image(
        &mut self,
        target: &mut SlideTarget<'_>,
        loaded: LoadedBackground,
    ) -> DeckResult<Option<SceneSnapshot>> {
        let req = loaded.request;
        if req.slide != target.slide {
            return Err(DeckError::validation(format!(
                "background loaded for slide {} applied to {}",
                req.slide, target.slide
            )));
        }
        if !self.is_current(req) {
            tracing::warn!(slide = %req.slide, token = req.token, "superseded background load discarded");
            return Ok(None);
        }

        let canvas = target.surface.canvas();
        let placed = background_object(&loaded.spec, loaded.natural, canvas);
        let color = target.surface.background_color();
        target.surface.set_background_image(Some(placed));
        target.surface.set_background_spec(BackgroundSpec {
            mode: BackgroundMode::Image,
            color,
            image: Some(loaded.spec),
        });
        let snapshot = target.commit()?;
        tracing::debug!(slide = %req.slide, fingerprint = %snapshot.fingerprint(), "background image set");
        Ok(Some(snapshot))
    }

    /// Load and apply in one step. A load failure leaves the previous background untouched.
    pub async fn set_image(
        &mut self,
        target: &mut SlideTarget<'_>,
        spec: BackgroundImageSpec,
    ) -> DeckResult<Option<SceneSnapshot>> {
        let request = self.begin_image(target.slide);
        let loaded = self.load_image(request, spec).await?;
        self.apply_image(target, loaded)
    }

    /// Whether `request` is still the latest background request for its slide.
    pub fn is_current(&self, request: BackgroundRequest) -> bool {
        self.latest.get(&request.slide) == Some(&request.token)
    }

    /// Drop bookkeeping for a deleted slide.
    pub fn forget(&mut self, slide: SlideId) {
        self.latest.remove(&slide);
    }

    fn supersede(&mut self, slide: SlideId) -> u64 {
        let token = self.next_token;
        self.next_token += 1;
        self.latest.insert(slide, token);
        token
    }
}

#[cfg(test)]
#[path = "../../tests/unit/background/compositor.rs"]
mod tests;
