//! At-most-one in-flight save of the whole deck.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;

use crate::document::deck::DeckDocument;
use crate::document::store::SlideDocumentStore;
use crate::foundation::error::{DeckError, DeckResult};
use crate::persist::backend::PersistenceBackend;

#[derive(Debug, Default)]
struct State {
    in_flight: Option<u64>,
    saved_revision: Option<u64>,
    completed: u64,
}

/// Serializes saves of a [`SlideDocumentStore`] to a [`PersistenceBackend`].
///
/// Only one save runs at a time; a second `save` while one is pending fails with
/// `SaveInProgress`. The document is captured when `save` is called, so later edits never leak
/// into a running save. On success the captured revision becomes the persisted baseline; on
/// failure nothing changes. Clones share state.
#[derive(Clone)]
pub struct PersistenceCoordinator {
    backend: Arc<dyn PersistenceBackend>,
    timeout: Duration,
    state: Arc<Mutex<State>>,
    idle: Arc<Notify>,
}

impl PersistenceCoordinator {
    /// Coordinator bounding every save by `timeout`.
    pub fn new(backend: Arc<dyn PersistenceBackend>, timeout: Duration) -> Self {
        Self {
            backend,
            timeout,
            state: Arc::new(Mutex::new(State::default())),
            idle: Arc::new(Notify::new()),
        }
    }

    /// Save the current state of `store`.
    ///
    /// The slot is claimed synchronously: a second call made before the returned future resolves
    /// gets `SaveInProgress`, even if the first future has not been polled yet. Dropping the
    /// future releases the slot. Resolves to the saved revision.
    pub fn save(
        &self,
        store: &SlideDocumentStore,
    ) -> impl Future<Output = DeckResult<u64>> + Send + 'static {
        self.save_document(store.to_document(), store.revision())
    }

    pub(crate) fn save_document(
        &self,
        doc: DeckDocument,
        revision: u64,
    ) -> impl Future<Output = DeckResult<u64>> + Send + 'static {
        let claim = self.claim(revision);
        let backend = Arc::clone(&self.backend);
        let timeout = self.timeout;
        async move {
            let guard = claim?;
            let slides = doc.slides.len();
            let persist = backend.persist(Arc::new(doc));
            let res = match tokio::time::timeout(timeout, persist).await {
                Ok(res) => res.map_err(|e| match e {
                    e @ DeckError::Persistence(_) => e,
                    other => DeckError::persistence(other.to_string()),
                }),
                Err(_) => Err(DeckError::persistence(format!(
                    "save timed out after {}ms",
                    timeout.as_millis()
                ))),
            };
            match &res {
                Ok(()) => {
                    tracing::debug!(revision, slides, "deck saved");
                    guard.succeed();
                }
                Err(e) => tracing::warn!(revision, error = %e, "deck save failed"),
            }
            res.map(|()| revision)
        }
    }

    /// Whether a save is running.
    pub fn is_saving(&self) -> bool {
        self.lock().in_flight.is_some()
    }

    /// Revision of the last successful save.
    pub fn saved_revision(&self) -> Option<u64> {
        self.lock().saved_revision
    }

    /// Whether `store` differs from the last persisted state.
    pub fn has_unsaved_changes(&self, store: &SlideDocumentStore) -> bool {
        self.saved_revision() != Some(store.revision())
    }

    /// Treat the current state of `store` as persisted, e.g. right after loading it.
    pub fn mark_persisted(&self, store: &SlideDocumentStore) {
        self.lock().saved_revision = Some(store.revision());
    }

    /// Number of saves that have finished, successfully or not.
    pub fn completed_saves(&self) -> u64 {
        self.lock().completed
    }

    /// Wait until no save is running.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            let mut notified = std::pin::pin!(notified);
            notified.as_mut().enable();
            if !self.is_saving() {
                return;
            }
            notified.await;
        }
    }

    fn claim(&self, revision: u64) -> DeckResult<SaveGuard> {
        let mut state = self.lock();
        if let Some(running) = state.in_flight {
            tracing::debug!(running, requested = revision, "save rejected, another is in flight");
            return Err(DeckError::SaveInProgress);
        }
        state.in_flight = Some(revision);
        Ok(SaveGuard {
            state: Arc::clone(&self.state),
            idle: Arc::clone(&self.idle),
            revision,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        lock_state(&self.state)
    }
}

impl std::fmt::Debug for PersistenceCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("PersistenceCoordinator")
            .field("timeout", &self.timeout)
            .field("in_flight", &state.in_flight)
            .field("saved_revision", &state.saved_revision)
            .finish()
    }
}

/// Releases the in-flight slot when the save finishes or is dropped.
struct SaveGuard {
    state: Arc<Mutex<State>>,
    idle: Arc<Notify>,
    revision: u64,
}

impl SaveGuard {
    fn succeed(&self) {
        let mut state = lock_state(&self.state);
        if state.saved_revision.is_none_or(|r| r < self.revision) {
            state.saved_revision = Some(self.revision);
        }
    }
}

impl Drop for SaveGuard {
    fn drop(&mut self) {
        {
            let mut state = lock_state(&self.state);
            state.in_flight = None;
            state.completed += 1;
        }
        self.idle.notify_waiters();
    }
}

fn lock_state(state: &Mutex<State>) -> std::sync::MutexGuard<'_, State> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
#[path = "../../tests/unit/persist/coordinator.rs"]
mod tests;
