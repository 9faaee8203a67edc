use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::assets::store::{ImageSet, ImageStore};
use crate::foundation::core::{Canvas, SlideId};
use crate::foundation::error::{DeckError, DeckResult};
use crate::render::bitmap::Bitmap;
use crate::render::raster::render_snapshot;
use crate::scene::snapshot::{SceneSnapshot, SnapshotFingerprint};

/// Cached preview of one slide.
#[derive(Clone, Debug, PartialEq)]
pub struct ThumbnailEntry {
    /// Slide the preview belongs to.
    pub slide_id: SlideId,
    /// Fingerprint of the snapshot it was rendered from.
    pub fingerprint: SnapshotFingerprint,
    /// Rendered pixels.
    pub bitmap: Arc<Bitmap>,
    /// PNG data URI of `bitmap`.
    pub data_uri: Arc<str>,
}

/// Answer to a thumbnail request.
#[derive(Clone, Debug, PartialEq)]
pub enum Thumbnail {
    /// Matches the requested snapshot.
    Fresh(ThumbnailEntry),
    /// A render is in flight; this is the previous preview, if there was one.
    Stale(Option<ThumbnailEntry>),
}

impl Thumbnail {
    /// Preview to display, fresh or not.
    pub fn entry(&self) -> Option<&ThumbnailEntry> {
        match self {
            Self::Fresh(e) => Some(e),
            Self::Stale(e) => e.as_ref(),
        }
    }

    /// Whether the preview matches the requested snapshot.
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }
}

struct Pending {
    token: u64,
    fingerprint: SnapshotFingerprint,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Inner {
    cache: HashMap<SlideId, ThumbnailEntry>,
    pending: HashMap<SlideId, Pending>,
    next_token: u64,
}

/// Off-screen thumbnail renderer with a per-slide cache keyed by snapshot fingerprint.
///
/// Requests never block: a miss starts a background render and hands back the previous preview.
/// Renders for different slides run concurrently; a newer request for the same slide aborts the
/// older one, and a late result whose token no longer matches is dropped.
#[derive(Clone)]
pub struct ThumbnailPipeline {
    inner: Arc<Mutex<Inner>>,
    changed: Arc<Notify>,
    images: ImageStore,
    font: Option<Arc<Vec<u8>>>,
    canvas: Canvas,
    size: (u32, u32),
}

impl ThumbnailPipeline {
    /// Pipeline producing `size` previews of slides authored for `canvas`.
    pub fn new(
        images: ImageStore,
        font: Option<Arc<Vec<u8>>>,
        canvas: Canvas,
        size: (u32, u32),
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            changed: Arc::new(Notify::new()),
            images,
            font,
            canvas,
            size,
        }
    }

    /// Thumbnail size `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Preview for `slide` showing `snapshot`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn request(&self, slide: SlideId, snapshot: &SceneSnapshot) -> Thumbnail {
        let fingerprint = snapshot.fingerprint();
        let mut inner = self.lock();
        let previous = inner.cache.get(&slide).cloned();
        if let Some(entry) = &previous
            && entry.fingerprint == fingerprint
        {
            return Thumbnail::Fresh(entry.clone());
        }
        if inner
            .pending
            .get(&slide)
            .is_some_and(|p| p.fingerprint == fingerprint)
        {
            return Thumbnail::Stale(previous);
        }

        if let Some(old) = inner.pending.remove(&slide) {
            old.handle.abort();
            tracing::debug!(%slide, token = old.token, "superseded thumbnail render aborted");
        }
        inner.next_token += 1;
        let token = inner.next_token;
        let handle = tokio::spawn(self.clone().render_task(slide, token, snapshot.clone()));
        inner.pending.insert(
            slide,
            Pending {
                token,
                fingerprint,
                handle,
            },
        );
        Thumbnail::Stale(previous)
    }

    /// Cached preview without triggering a render.
    pub fn cached(&self, slide: SlideId) -> Option<ThumbnailEntry> {
        self.lock().cache.get(&slide).cloned()
    }

    /// Whether a render for `slide` is in flight.
    pub fn is_pending(&self, slide: SlideId) -> bool {
        self.lock().pending.contains_key(&slide)
    }

    /// Wait until no render is in flight for `slide`, then return its cached preview.
    pub async fn wait_for(&self, slide: SlideId) -> Option<ThumbnailEntry> {
        loop {
            let notified = self.changed.notified();
            let mut notified = std::pin::pin!(notified);
            notified.as_mut().enable();
            {
                let inner = self.lock();
                if !inner.pending.contains_key(&slide) {
                    return inner.cache.get(&slide).cloned();
                }
            }
            notified.await;
        }
    }

    /// Drop the cached preview and any in-flight render for `slide`.
    pub fn invalidate(&self, slide: SlideId) {
        let mut inner = self.lock();
        inner.cache.remove(&slide);
        if let Some(p) = inner.pending.remove(&slide) {
            p.handle.abort();
        }
        drop(inner);
        self.changed.notify_waiters();
    }

    /// Render `snapshot` off-screen at an arbitrary size, bypassing the cache.
    pub async fn render(&self, snapshot: &SceneSnapshot, width: u32, height: u32) -> DeckResult<Bitmap> {
        let images = self.images.load_all(snapshot.image_urls()).await;
        let snapshot = snapshot.clone();
        let font = self.font.clone();
        let canvas = self.canvas;
        tokio::task::spawn_blocking(move || {
            render_snapshot(&snapshot, canvas, width, height, &images, font)
        })
        .await
        .map_err(|e| DeckError::render(format!("render task failed: {e}")))?
    }

    async fn render_task(self, slide: SlideId, token: u64, snapshot: SceneSnapshot) {
        let images: ImageSet = self.images.load_all(snapshot.image_urls()).await;
        let font = self.font.clone();
        let canvas = self.canvas;
        let (w, h) = self.size;
        let fingerprint = snapshot.fingerprint();
        let rendered = tokio::task::spawn_blocking(move || -> DeckResult<(Bitmap, String)> {
            let bitmap = render_snapshot(&snapshot, canvas, w, h, &images, font)?;
            let uri = bitmap.to_data_uri()?;
            Ok((bitmap, uri))
        })
        .await
        .map_err(|e| DeckError::render(format!("thumbnail task failed: {e}")))
        .and_then(|r| r);

        let mut inner = self.lock();
        if inner.pending.get(&slide).map(|p| p.token) != Some(token) {
            tracing::debug!(%slide, token, "stale thumbnail discarded");
            return;
        }
        inner.pending.remove(&slide);
        match rendered {
            Ok((bitmap, uri)) => {
                inner.cache.insert(
                    slide,
                    ThumbnailEntry {
                        slide_id: slide,
                        fingerprint,
                        bitmap: Arc::new(bitmap),
                        data_uri: Arc::from(uri),
                    },
                );
                tracing::debug!(%slide, %fingerprint, "thumbnail ready");
            }
            Err(e) => tracing::warn!(%slide, error = %e, "thumbnail render failed"),
        }
        drop(inner);
        self.changed.notify_waiters();
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for ThumbnailPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("ThumbnailPipeline")
            .field("size", &self.size)
            .field("cached", &inner.cache.len())
            .field("pending", &inner.pending.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/thumbnails.rs"]
mod tests;
