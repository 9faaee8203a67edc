use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::foundation::core::BoxFuture;
use crate::foundation::error::{DeckError, DeckResult};

const DEFAULT_MAX_BYTES: u64 = 50 * 1024 * 1024;

/// Source of raw image bytes.
///
/// Implementations must be cheap to call from async code: blocking work belongs on a blocking
/// thread inside the returned future.
pub trait ImageFetcher: Send + Sync + 'static {
    /// Fetch the bytes behind `url`.
    fn fetch(&self, url: &str) -> BoxFuture<DeckResult<Vec<u8>>>;
}

/// Fetcher for `data:`, `file://`, `http(s)://` and asset-root-relative image sources.
#[derive(Clone, Debug)]
pub struct UrlFetcher {
    root: PathBuf,
    http_timeout: Duration,
    max_bytes: u64,
}

impl UrlFetcher {
    /// Fetcher resolving relative paths against `root`.
    pub fn new(root: impl Into<PathBuf>, http_timeout: Duration) -> Self {
        Self {
            root: root.into(),
            http_timeout,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    /// Cap the size of HTTP response bodies.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn classify(&self, url: &str) -> DeckResult<ImageSource> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DeckError::image_load("image source is empty"));
        }
        if url.starts_with("data:") {
            return Ok(ImageSource::Data(url.to_string()));
        }
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(ImageSource::File(PathBuf::from(path)));
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(ImageSource::Http(url.to_string()));
        }
        let norm = normalize_rel_path(url)?;
        Ok(ImageSource::File(self.root.join(Path::new(&norm))))
    }
}

enum ImageSource {
    Data(String),
    File(PathBuf),
    Http(String),
}

impl ImageFetcher for UrlFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<DeckResult<Vec<u8>>> {
        let source = self.classify(url);
        let timeout = self.http_timeout;
        let max_bytes = self.max_bytes;
        Box::pin(async move {
            match source? {
                ImageSource::Data(url) => decode_data_url(&url),
                ImageSource::File(path) => {
                    tokio::task::spawn_blocking(move || {
                        std::fs::read(&path).map_err(|e| {
                            DeckError::image_load(format!(
                                "failed to read image '{}': {e}",
                                path.display()
                            ))
                        })
                    })
                    .await
                    .map_err(|e| DeckError::image_load(format!("read task failed: {e}")))?
                }
                ImageSource::Http(url) => {
                    tokio::task::spawn_blocking(move || fetch_http(&url, timeout, max_bytes))
                        .await
                        .map_err(|e| DeckError::image_load(format!("fetch task failed: {e}")))?
                }
            }
        })
    }
}

#[tracing::instrument(skip(timeout, max_bytes))]
fn fetch_http(url: &str, timeout: Duration, max_bytes: u64) -> DeckResult<Vec<u8>> {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    let agent: ureq::Agent = config.into();

    let mut response = agent
        .get(url)
        .call()
        .map_err(|e| DeckError::image_load(format!("GET {url}: {e}")))?;
    let bytes = response
        .body_mut()
        .with_config()
        .limit(max_bytes)
        .read_to_vec()
        .map_err(|e| DeckError::image_load(format!("read body of {url}: {e}")))?;
    if bytes.is_empty() {
        return Err(DeckError::image_load(format!("empty response from {url}")));
    }
    tracing::debug!(bytes = bytes.len(), "image fetched");
    Ok(bytes)
}

/// Decode a `data:` URL payload (base64 or percent-encoded).
pub(crate) fn decode_data_url(url: &str) -> DeckResult<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| DeckError::image_load("not a data: url"))?;
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| DeckError::image_load("missing comma in data url"))?;

    let is_base64 = header.ends_with(";base64") || header.contains(";base64;");
    if is_base64 {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|e| DeckError::image_load(format!("invalid base64 in data url: {e}")))
    } else {
        percent_decode(data)
    }
}

fn percent_decode(input: &str) -> DeckResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let hex = bytes
            .get(i + 1..i + 3)
            .and_then(|h| std::str::from_utf8(h).ok())
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(|| DeckError::image_load("invalid percent-escape in data url"))?;
        out.push(hex);
        i += 3;
    }
    Ok(out)
}

/// Normalize and validate asset-root-relative image paths.
///
/// The result uses `/` separators, drops `.` segments and rejects absolute paths or parent
/// traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> DeckResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(DeckError::image_load(
            "absolute image paths must use a file:// url",
        ));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(DeckError::image_load("image paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(DeckError::image_load("image path must contain a file name"));
    }
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
