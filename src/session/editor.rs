//! Editing session: one live surface over a slide document, wired to history, backgrounds,
//! thumbnails, persistence and regeneration.
//!
//! Every action follows the same path: mutate the surface, read it back into a snapshot, commit
//! the snapshot to the active slide's history. Thumbnails, exports and saves only ever read
//! committed snapshots.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::assets::fetch::{ImageFetcher, UrlFetcher};
use crate::assets::store::ImageStore;
use crate::background::compositor::{BackgroundCompositor, LoadedBackground, SlideTarget};
use crate::document::deck::DeckDocument;
use crate::document::store::{Slide, SlideDocumentStore};
use crate::document::templates::SlideKind;
use crate::foundation::config::EditorOpts;
use crate::foundation::core::{Color, SlideId};
use crate::foundation::error::{DeckError, DeckResult};
use crate::persist::autosave::Autosaver;
use crate::persist::backend::PersistenceBackend;
use crate::persist::coordinator::PersistenceCoordinator;
use crate::regen::client::{RegenerationBackend, RegenerationRequest};
use crate::regen::patcher::patch_image;
use crate::render::bitmap::Bitmap;
use crate::render::export::{ExportOpts, ExportedSlide, Exporter};
use crate::render::thumbnails::{Thumbnail, ThumbnailPipeline};
use crate::scene::codec;
use crate::scene::model::BackgroundImageSpec;
use crate::scene::snapshot::SceneSnapshot;
use crate::scene::surface::Surface;

/// Image URL produced by the regeneration backend for one slide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegeneratedImage {
    /// Slide the image was generated for.
    pub slide: SlideId,
    /// New image source.
    pub url: String,
}

/// A deck being edited.
pub struct DeckEditor {
    opts: EditorOpts,
    store: SlideDocumentStore,
    surface: Surface,
    background: BackgroundCompositor,
    thumbnails: ThumbnailPipeline,
    exporter: Exporter,
    persistence: PersistenceCoordinator,
    autosave: Option<Autosaver>,
    regeneration: Option<Arc<dyn RegenerationBackend>>,
}

impl DeckEditor {
    /// Empty deck resolving images under `opts.asset_root` and saving to `persistence`.
    pub fn new(opts: EditorOpts, persistence: Arc<dyn PersistenceBackend>) -> DeckResult<Self> {
        let fetcher = Arc::new(UrlFetcher::new(
            opts.asset_root.clone(),
            opts.image_load_timeout(),
        ));
        Self::with_fetcher(opts, fetcher, persistence)
    }

    /// Empty deck with a custom image fetcher.
    pub fn with_fetcher(
        opts: EditorOpts,
        fetcher: Arc<dyn ImageFetcher>,
        persistence: Arc<dyn PersistenceBackend>,
    ) -> DeckResult<Self> {
        opts.validate()?;
        let font = opts.load_font()?.map(Arc::new);
        let images = ImageStore::new(fetcher, opts.image_load_timeout())
            .with_limits(opts.image_cache_entries, opts.image_cache_bytes);
        let canvas = opts.canvas;
        Ok(Self {
            store: SlideDocumentStore::new(canvas, opts.history_depth),
            surface: Surface::new(canvas),
            background: BackgroundCompositor::new(images.clone()),
            thumbnails: ThumbnailPipeline::new(
                images.clone(),
                font.clone(),
                canvas,
                opts.thumbnail_size(),
            ),
            exporter: Exporter::new(images, font, canvas),
            persistence: PersistenceCoordinator::new(persistence, opts.save_timeout()),
            autosave: None,
            regeneration: None,
            opts,
        })
    }

    /// Use `backend` for image regeneration.
    pub fn with_regeneration(mut self, backend: Arc<dyn RegenerationBackend>) -> Self {
        self.regeneration = Some(backend);
        self
    }

    /// Save automatically after every edit, debounced by `autosave_debounce_ms`.
    ///
    /// Once enabled, edits must be made from within a Tokio runtime.
    pub fn enable_autosave(&mut self) {
        self.autosave = Some(Autosaver::new(
            self.persistence.clone(),
            self.opts.autosave_debounce(),
        ));
    }

    /// Replace the deck with `doc`. The loaded state counts as persisted.
    pub fn open(&mut self, doc: DeckDocument) -> DeckResult<()> {
        if self.persistence.is_saving() {
            return Err(DeckError::SaveInProgress);
        }
        let store = SlideDocumentStore::from_document(doc, self.opts.canvas, self.opts.history_depth)?;
        if let Some(saver) = &mut self.autosave {
            saver.cancel();
        }
        for id in self.store.ids() {
            self.background.forget(id);
            self.thumbnails.invalidate(id);
        }
        self.store = store;
        self.load_active()?;
        self.persistence.mark_persisted(&self.store);
        tracing::debug!(slides = self.store.len(), "deck opened");
        Ok(())
    }

    /// Editor configuration.
    pub fn opts(&self) -> &EditorOpts {
        &self.opts
    }

    /// Committed deck state.
    pub fn store(&self) -> &SlideDocumentStore {
        &self.store
    }

    /// Live surface showing the active slide.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Live surface for direct edits. Changes become part of the deck on [`Self::commit_surface`].
    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// Thumbnail pipeline.
    pub fn thumbnails(&self) -> &ThumbnailPipeline {
        &self.thumbnails
    }

    /// Persistence coordinator.
    pub fn persistence(&self) -> &PersistenceCoordinator {
        &self.persistence
    }

    /// Id of the active slide.
    pub fn active_id(&self) -> Option<SlideId> {
        self.store.active_slide().map(Slide::id)
    }

    /// Add a slide from the `kind` template and show it.
    pub fn add_slide(&mut self, kind: SlideKind, at: Option<usize>) -> DeckResult<SlideId> {
        let id = self.store.add_slide(kind, at)?.id();
        self.load_active()?;
        self.touch();
        Ok(id)
    }

    /// Delete a slide and show whichever slide is active afterwards.
    ///
    /// Pending background loads and thumbnails of the deleted slide are dropped.
    pub fn delete_slide(&mut self, id: SlideId) -> DeckResult<()> {
        let was_active = self.active_id() == Some(id);
        self.store.delete_slide(id)?;
        self.background.forget(id);
        self.thumbnails.invalidate(id);
        if was_active {
            self.load_active()?;
        }
        self.touch();
        Ok(())
    }

    /// Show the slide at `index`. Uncommitted surface edits are discarded.
    pub fn switch_slide(&mut self, index: usize) -> DeckResult<()> {
        self.store.switch_active(index)?;
        self.load_active()?;
        tracing::debug!(index, "switched slide");
        Ok(())
    }

    /// Move the slide at `from` to `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> DeckResult<()> {
        self.store.reorder(from, to)?;
        self.touch();
        Ok(())
    }

    /// Set or clear a slide's visual prompt.
    pub fn set_visual_prompt(&mut self, id: SlideId, prompt: Option<String>) -> DeckResult<()> {
        self.store.set_visual_prompt(id, prompt)?;
        self.touch();
        Ok(())
    }

    /// Read the live surface back and commit it to the active slide.
    pub fn commit_surface(&mut self) -> DeckResult<SceneSnapshot> {
        let id = self.require_active()?;
        let snapshot = codec::encode(&self.surface)?;
        self.store.commit(id, snapshot.clone())?;
        self.touch();
        Ok(snapshot)
    }

    /// Undo on the active slide. Returns `false` when there was nothing to undo.
    pub fn undo(&mut self) -> DeckResult<bool> {
        let id = self.require_active()?;
        let Some(snapshot) = self.store.undo(id)? else {
            return Ok(false);
        };
        codec::decode(&snapshot, &mut self.surface)?;
        self.touch();
        Ok(true)
    }

    /// Redo on the active slide. Returns `false` when there was nothing to redo.
    pub fn redo(&mut self) -> DeckResult<bool> {
        let id = self.require_active()?;
        let Some(snapshot) = self.store.redo(id)? else {
            return Ok(false);
        };
        codec::decode(&snapshot, &mut self.surface)?;
        self.touch();
        Ok(true)
    }

    /// Solid color background on `slide`.
    pub fn set_background_color(&mut self, slide: SlideId, color: Color) -> DeckResult<SceneSnapshot> {
        self.with_target(slide, |bg, target| bg.set_color(target, color))
    }

    /// Clear the background of `slide`.
    pub fn remove_background(&mut self, slide: SlideId) -> DeckResult<SceneSnapshot> {
        self.with_target(slide, |bg, target| bg.remove_background(target))
    }

    /// Start loading a background image for `slide`.
    ///
    /// The returned future borrows nothing, so the editor stays usable while it runs. Hand its
    /// result to [`Self::apply_background_image`].
    pub fn begin_background_image(
        &mut self,
        slide: SlideId,
        spec: BackgroundImageSpec,
    ) -> DeckResult<impl Future<Output = DeckResult<LoadedBackground>> + Send + 'static> {
        self.store.position_of(slide)?;
        let request = self.background.begin_image(slide);
        Ok(self.background.load_image(request, spec))
    }

    /// Place a loaded background image. `Ok(None)` when a newer background edit superseded it.
    pub fn apply_background_image(
        &mut self,
        loaded: LoadedBackground,
    ) -> DeckResult<Option<SceneSnapshot>> {
        let slide = loaded.request().slide;
        self.with_target(slide, |bg, target| bg.apply_image(target, loaded))
    }

    /// Load and place a background image in one step.
    pub async fn set_background_image(
        &mut self,
        slide: SlideId,
        spec: BackgroundImageSpec,
    ) -> DeckResult<Option<SceneSnapshot>> {
        let loaded = self.begin_background_image(slide, spec)?.await?;
        self.apply_background_image(loaded)
    }

    /// Ask the regeneration backend for a new image for the active slide.
    ///
    /// Slide id and prompt are captured now; the returned future borrows nothing.
    pub fn begin_regeneration(
        &self,
    ) -> DeckResult<impl Future<Output = DeckResult<RegeneratedImage>> + Send + 'static> {
        let backend = self
            .regeneration
            .clone()
            .ok_or_else(|| DeckError::validation("no regeneration backend configured"))?;
        let slide = self.require_active()?;
        let prompt = self
            .store
            .slide(slide)?
            .visual_prompt()
            .ok_or_else(|| DeckError::validation(format!("slide {slide} has no visual prompt")))?
            .to_string();
        let timeout = self.opts.regeneration_timeout();
        Ok(async move {
            let call = backend.regenerate(RegenerationRequest {
                slide_id: slide,
                visual_prompt: prompt,
            });
            let url = with_timeout(timeout, call).await?;
            tracing::debug!(%slide, %url, "image regenerated");
            Ok(RegeneratedImage { slide, url })
        })
    }

    /// Patch the regenerated image into the slide it was generated for and commit.
    ///
    /// The slide's current snapshot is patched, not the one from when the request started. If
    /// the slide is active the surface is reloaded.
    pub fn apply_regeneration(&mut self, image: RegeneratedImage) -> DeckResult<SceneSnapshot> {
        let current = self.store.slide(image.slide)?.snapshot().clone();
        let patched = patch_image(&current, &image.url)?;
        self.store.commit(image.slide, patched.clone())?;
        if self.active_id() == Some(image.slide) {
            codec::decode(&patched, &mut self.surface)?;
        }
        self.touch();
        Ok(patched)
    }

    /// Regenerate and apply in one step.
    #[tracing::instrument(skip(self))]
    pub async fn regenerate_active_image(&mut self) -> DeckResult<SceneSnapshot> {
        let image = self.begin_regeneration()?.await?;
        self.apply_regeneration(image)
    }

    /// Preview of one slide. Must be called from within a Tokio runtime.
    pub fn thumbnail(&self, slide: SlideId) -> DeckResult<Thumbnail> {
        let snapshot = self.store.slide(slide)?.snapshot();
        Ok(self.thumbnails.request(slide, snapshot))
    }

    /// Previews of every slide, in presentation order.
    pub fn all_thumbnails(&self) -> Vec<(SlideId, Thumbnail)> {
        self.store
            .slides()
            .iter()
            .map(|s| (s.id(), self.thumbnails.request(s.id(), s.snapshot())))
            .collect()
    }

    /// Render one committed slide at canvas resolution.
    pub fn render_full_resolution(
        &self,
        slide: SlideId,
    ) -> DeckResult<impl Future<Output = DeckResult<Bitmap>> + Send + 'static> {
        let snapshot = self.store.slide(slide)?.snapshot().clone();
        let exporter = self.exporter.clone();
        Ok(async move { exporter.render_full_resolution(&snapshot).await })
    }

    /// Render every slide for export.
    pub async fn export_deck(&self, opts: ExportOpts) -> DeckResult<Vec<ExportedSlide>> {
        self.exporter.render_deck(&self.store, opts).await
    }

    /// Save the committed deck. Fails with `SaveInProgress` while another save runs.
    pub fn save(&self) -> impl Future<Output = DeckResult<u64>> + Send + 'static {
        self.persistence.save(&self.store)
    }

    /// Whether the deck changed since the last successful save.
    pub fn has_unsaved_changes(&self) -> bool {
        self.persistence.has_unsaved_changes(&self.store)
    }

    /// Wait for a scheduled autosave to finish.
    pub async fn flush_autosave(&mut self) {
        if let Some(saver) = &mut self.autosave {
            saver.flush().await;
        }
    }

    fn require_active(&self) -> DeckResult<SlideId> {
        self.active_id()
            .ok_or_else(|| DeckError::validation("deck has no slides"))
    }

    fn load_active(&mut self) -> DeckResult<()> {
        match self.store.active_slide() {
            Some(slide) => codec::decode(slide.snapshot(), &mut self.surface),
            None => {
                self.surface.clear();
                Ok(())
            }
        }
    }

    /// Run a background edit against `slide`, using the live surface when the slide is active
    /// and a scratch surface otherwise.
    fn with_target<T>(
        &mut self,
        slide: SlideId,
        f: impl FnOnce(&mut BackgroundCompositor, &mut SlideTarget<'_>) -> DeckResult<T>,
    ) -> DeckResult<T> {
        let active = self.active_id() == Some(slide);
        let mut scratch: Surface;
        let surface = if active {
            &mut self.surface
        } else {
            scratch = Surface::new(self.store.canvas());
            codec::decode(self.store.slide(slide)?.snapshot(), &mut scratch)?;
            &mut scratch
        };
        let mut target = SlideTarget::new(&mut self.store, slide, surface)?;
        let out = f(&mut self.background, &mut target)?;
        self.touch();
        Ok(out)
    }

    fn touch(&mut self) {
        if let Some(saver) = &mut self.autosave {
            saver.schedule(&self.store);
        }
    }
}

impl std::fmt::Debug for DeckEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeckEditor")
            .field("slides", &self.store.len())
            .field("active", &self.store.active_index())
            .field("revision", &self.store.revision())
            .field("autosave", &self.autosave.is_some())
            .field("regeneration", &self.regeneration.is_some())
            .finish()
    }
}

async fn with_timeout<T>(
    timeout: Duration,
    fut: impl Future<Output = DeckResult<T>>,
) -> DeckResult<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(res) => res.map_err(|e| match e {
            e @ DeckError::Regeneration(_) => e,
            other => DeckError::regeneration(other.to_string()),
        }),
        Err(_) => Err(DeckError::regeneration(format!(
            "timed out after {}ms",
            timeout.as_millis()
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
