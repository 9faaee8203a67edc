use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::document::deck::DeckDocument;
use crate::foundation::core::BoxFuture;
use crate::foundation::error::{DeckError, DeckResult};

/// Durable storage for whole-deck documents.
///
/// A backend receives the complete document on every save; there is no per-slide endpoint.
pub trait PersistenceBackend: Send + Sync + 'static {
    /// Store `doc`, replacing whatever was stored before.
    fn persist(&self, doc: Arc<DeckDocument>) -> BoxFuture<DeckResult<()>>;
}

/// Saves decks as pretty JSON files.
///
/// Writes go to a sibling temp file which is then renamed over the target, so a failed save
/// leaves the previous file intact.
#[derive(Clone, Debug)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Backend writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistenceBackend for FileBackend {
    fn persist(&self, doc: Arc<DeckDocument>) -> BoxFuture<DeckResult<()>> {
        let path = self.path.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || write_atomic(&path, &doc))
                .await
                .map_err(|e| DeckError::persistence(format!("save task failed: {e}")))?
        })
    }
}

fn write_atomic(path: &Path, doc: &DeckDocument) -> DeckResult<()> {
    let bytes = serde_json::to_vec_pretty(doc).map_err(|e| DeckError::serde(e.to_string()))?;
    let tmp = tmp_path(path);
    let res: anyhow::Result<()> = (|| {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create directory '{}'", dir.display()))?;
        }
        std::fs::write(&tmp, &bytes).with_context(|| format!("write '{}'", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("rename '{}' -> '{}'", tmp.display(), path.display()))?;
        Ok(())
    })();
    res.map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        DeckError::persistence(format!("{e:#}"))
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Posts decks as JSON to an HTTP endpoint.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    endpoint: String,
    timeout: Duration,
}

impl HttpBackend {
    /// Backend posting to `endpoint` with an agent-level `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

impl PersistenceBackend for HttpBackend {
    fn persist(&self, doc: Arc<DeckDocument>) -> BoxFuture<DeckResult<()>> {
        let endpoint = self.endpoint.clone();
        let timeout = self.timeout;
        Box::pin(async move {
            tokio::task::spawn_blocking(move || post_document(&endpoint, &doc, timeout))
                .await
                .map_err(|e| DeckError::persistence(format!("save task failed: {e}")))?
        })
    }
}

#[tracing::instrument(skip(doc, timeout), fields(slides = doc.slides.len()))]
fn post_document(endpoint: &str, doc: &DeckDocument, timeout: Duration) -> DeckResult<()> {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    let agent: ureq::Agent = config.into();

    agent
        .post(endpoint)
        .send_json(doc)
        .map_err(|e| DeckError::persistence(format!("POST {endpoint}: {e}")))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/persist/backend.rs"]
mod tests;
