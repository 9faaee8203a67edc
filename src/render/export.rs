use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::store::ImageStore;
use crate::document::store::SlideDocumentStore;
use crate::foundation::core::{Canvas, SlideId};
use crate::foundation::error::{DeckError, DeckResult};
use crate::render::bitmap::Bitmap;
use crate::render::raster::{Rasterizer, render_snapshot};
use crate::scene::snapshot::{SceneSnapshot, SnapshotFingerprint};

/// Export-time options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportOpts {
    /// Output width; `None` renders at canvas resolution. Height follows the canvas aspect.
    pub width: Option<u32>,
    /// Rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// One rendered slide of a deck export.
#[derive(Clone, Debug)]
pub struct ExportedSlide {
    /// Slide id.
    pub slide_id: SlideId,
    /// Rendered pixels. Slides with identical content share one bitmap.
    pub bitmap: Arc<Bitmap>,
}

/// Full-resolution renderer for export consumers, sharing the thumbnail raster path.
#[derive(Clone, Debug)]
pub struct Exporter {
    images: ImageStore,
    font: Option<Arc<Vec<u8>>>,
    canvas: Canvas,
}

impl Exporter {
    /// Exporter for slides authored for `canvas`.
    pub fn new(images: ImageStore, font: Option<Arc<Vec<u8>>>, canvas: Canvas) -> Self {
        Self {
            images,
            font,
            canvas,
        }
    }

    /// Render one snapshot at canvas resolution.
    pub async fn render_full_resolution(&self, snapshot: &SceneSnapshot) -> DeckResult<Bitmap> {
        let images = self.images.load_all(snapshot.image_urls()).await;
        let snapshot = snapshot.clone();
        let font = self.font.clone();
        let canvas = self.canvas;
        tokio::task::spawn_blocking(move || {
            render_snapshot(&snapshot, canvas, canvas.width, canvas.height, &images, font)
        })
        .await
        .map_err(|e| DeckError::render(format!("export task failed: {e}")))?
    }

    /// Render every slide in presentation order.
    ///
    /// Images for the whole deck are resolved first; rasterization then runs in parallel, one
    /// rasterizer per worker. Output order matches the store.
    #[tracing::instrument(skip(self, store), fields(slides = store.len()))]
    pub async fn render_deck(
        &self,
        store: &SlideDocumentStore,
        opts: ExportOpts,
    ) -> DeckResult<Vec<ExportedSlide>> {
        let slides: Vec<(SlideId, SceneSnapshot)> = store
            .slides()
            .iter()
            .map(|s| (s.id(), s.snapshot().clone()))
            .collect();
        let mut urls: Vec<String> = Vec::new();
        for (_, snap) in &slides {
            for url in snap.image_urls() {
                if !urls.contains(&url) {
                    urls.push(url);
                }
            }
        }
        let images = self.images.load_all(urls).await;

        let canvas = self.canvas;
        let width = opts.width.unwrap_or(canvas.width);
        let height = canvas.height_for_width(width);
        let font = self.font.clone();

        tokio::task::spawn_blocking(move || -> DeckResult<Vec<ExportedSlide>> {
            // Identical slides are rasterized once.
            let mut uniq: Vec<&SceneSnapshot> = Vec::new();
            let mut seen = HashMap::<SnapshotFingerprint, usize>::new();
            let mut map = Vec::with_capacity(slides.len());
            for (_, snap) in &slides {
                let u = *seen.entry(snap.fingerprint()).or_insert_with(|| {
                    uniq.push(snap);
                    uniq.len() - 1
                });
                map.push(u);
            }

            let pool = build_thread_pool(opts.threads)?;
            let rendered = pool.install(|| {
                uniq.par_iter()
                    .map_init(
                        || Rasterizer::new(font.clone()),
                        |r, snap| r.render(snap, canvas, width, height, &images).map(Arc::new),
                    )
                    .collect::<DeckResult<Vec<_>>>()
            })?;

            Ok(slides
                .iter()
                .zip(map)
                .map(|((id, _), u)| ExportedSlide {
                    slide_id: *id,
                    bitmap: rendered[u].clone(),
                })
                .collect())
        })
        .await
        .map_err(|e| DeckError::render(format!("export task failed: {e}")))?
    }
}

fn build_thread_pool(threads: Option<usize>) -> DeckResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(DeckError::validation("export 'threads' must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| DeckError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;
