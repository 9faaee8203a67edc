use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use xxhash_rust::xxh3::xxh3_128;

use crate::assets::decode::{PreparedImage, decode_image};
use crate::assets::fetch::ImageFetcher;
use crate::foundation::error::{DeckError, DeckResult};

/// Decoded images keyed by source URL.
pub type ImageSet = HashMap<String, PreparedImage>;

const DEFAULT_MAX_ENTRIES: usize = 64;
const DEFAULT_MAX_BYTES: usize = 256 << 20;

struct CacheEntry {
    image: PreparedImage,
    last_used: u64,
}

/// Least-recently-used image cache bounded by entry count and decoded pixel bytes.
///
/// Keys are URL hashes, so large `data:` URLs are not retained. The most recently inserted image
/// is always kept, even when it alone exceeds the byte budget.
struct ImageCache {
    entries: HashMap<u128, CacheEntry>,
    bytes: usize,
    tick: u64,
    max_entries: usize,
    max_bytes: usize,
}

impl ImageCache {
    fn new(max_entries: usize, max_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            bytes: 0,
            tick: 0,
            max_entries: max_entries.max(1),
            max_bytes,
        }
    }

    fn get(&mut self, url: &str) -> Option<PreparedImage> {
        self.tick += 1;
        let tick = self.tick;
        let entry = self.entries.get_mut(&xxh3_128(url.as_bytes()))?;
        entry.last_used = tick;
        Some(entry.image.clone())
    }

    fn insert(&mut self, url: &str, image: PreparedImage) {
        self.tick += 1;
        let size = image.rgba8_premul.len();
        let entry = CacheEntry {
            image,
            last_used: self.tick,
        };
        if let Some(old) = self.entries.insert(xxh3_128(url.as_bytes()), entry) {
            self.bytes -= old.image.rgba8_premul.len();
        }
        self.bytes += size;

        while self.entries.len() > 1
            && (self.entries.len() > self.max_entries || self.bytes > self.max_bytes)
        {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| *k)
            else {
                break;
            };
            if let Some(evicted) = self.entries.remove(&oldest) {
                self.bytes -= evicted.image.rgba8_premul.len();
                tracing::trace!(bytes = self.bytes, "image evicted");
            }
        }
    }
}

/// Shared cache of decoded images in front of an [`ImageFetcher`].
///
/// Every load (fetch plus decode) runs under the configured timeout. Clones share the cache,
/// which evicts least-recently-used images past its limits.
#[derive(Clone)]
pub struct ImageStore {
    fetcher: Arc<dyn ImageFetcher>,
    timeout: Duration,
    cache: Arc<Mutex<ImageCache>>,
}

impl ImageStore {
    /// Empty store with default cache limits.
    pub fn new(fetcher: Arc<dyn ImageFetcher>, timeout: Duration) -> Self {
        Self {
            fetcher,
            timeout,
            cache: Arc::new(Mutex::new(ImageCache::new(
                DEFAULT_MAX_ENTRIES,
                DEFAULT_MAX_BYTES,
            ))),
        }
    }

    /// Replace the cache limits. Anything cached so far is dropped.
    pub fn with_limits(mut self, max_entries: usize, max_bytes: usize) -> Self {
        self.cache = Arc::new(Mutex::new(ImageCache::new(max_entries, max_bytes)));
        self
    }

    /// Cached image for `url`, if it is still resident.
    pub fn get(&self, url: &str) -> Option<PreparedImage> {
        self.lock().get(url)
    }

    /// Seed the cache, e.g. with an image produced in-process.
    pub fn insert(&self, url: impl AsRef<str>, image: PreparedImage) {
        self.lock().insert(url.as_ref(), image);
    }

    /// Number of cached images.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Decoded pixel bytes currently cached.
    pub fn cached_bytes(&self) -> usize {
        self.lock().bytes
    }

    /// Load `url`, serving from the cache when possible.
    ///
    /// The returned future owns everything it needs and can be spawned.
    pub fn load(&self, url: &str) -> impl Future<Output = DeckResult<PreparedImage>> + Send + 'static {
        let this = self.clone();
        let url = url.to_string();
        async move {
            if let Some(hit) = this.get(&url) {
                return Ok(hit);
            }
            let fetch = this.fetcher.fetch(&url);
            let work = async move {
                let bytes = fetch.await?;
                tokio::task::spawn_blocking(move || decode_image(&bytes))
                    .await
                    .map_err(|e| DeckError::image_load(format!("decode task failed: {e}")))?
            };
            let image = match tokio::time::timeout(this.timeout, work).await {
                Ok(res) => res.map_err(|e| match e {
                    DeckError::ImageLoad(msg) => DeckError::image_load(format!("{url}: {msg}")),
                    other => other,
                })?,
                Err(_) => {
                    return Err(DeckError::image_load(format!(
                        "{url}: timed out after {}ms",
                        this.timeout.as_millis()
                    )));
                }
            };
            tracing::debug!(%url, width = image.width, height = image.height, "image loaded");
            this.insert(&url, image.clone());
            Ok(image)
        }
    }

    /// Load every URL in `urls`. Failures are logged and left out of the result, so callers
    /// render what they can.
    pub fn load_all(&self, urls: Vec<String>) -> impl Future<Output = ImageSet> + Send + 'static {
        let this = self.clone();
        async move {
            let mut out = ImageSet::new();
            for url in urls {
                if url.trim().is_empty() {
                    continue;
                }
                match this.load(&url).await {
                    Ok(img) => {
                        out.insert(url, img);
                    }
                    Err(e) => tracing::warn!(%url, error = %e, "image unavailable"),
                }
            }
            out
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ImageCache> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStore")
            .field("timeout", &self.timeout)
            .field("cached", &self.len())
            .field("bytes", &self.cached_bytes())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
