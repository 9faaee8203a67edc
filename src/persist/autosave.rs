use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::document::store::SlideDocumentStore;
use crate::foundation::error::DeckError;
use crate::persist::coordinator::PersistenceCoordinator;

struct PendingSave {
    started: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Debounced background saver.
///
/// Holds at most one scheduled save. Each `schedule` replaces a save that is still waiting out
/// its debounce; a save that has already started runs to completion and the new one queues
/// behind it. When a scheduled save fires while another save is in flight it waits for that
/// one and then writes its own, newer document.
pub struct Autosaver {
    coordinator: PersistenceCoordinator,
    debounce: Duration,
    pending: Option<PendingSave>,
}

impl Autosaver {
    /// Autosaver writing through `coordinator` after `debounce` of quiet.
    pub fn new(coordinator: PersistenceCoordinator, debounce: Duration) -> Self {
        Self {
            coordinator,
            debounce,
            pending: None,
        }
    }

    /// Coordinator saves go through.
    pub fn coordinator(&self) -> &PersistenceCoordinator {
        &self.coordinator
    }

    /// (Re)schedule a save of the current state of `store`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&mut self, store: &SlideDocumentStore) {
        // A started save is detached and finishes; the new one coalesces behind it.
        if let Some(prev) = self.pending.take()
            && !prev.started.load(Ordering::SeqCst)
        {
            prev.handle.abort();
            tracing::debug!("pending autosave rescheduled");
        }

        let doc = store.to_document();
        let revision = store.revision();
        let coordinator = self.coordinator.clone();
        let debounce = self.debounce;
        let started = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&started);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            flag.store(true, Ordering::SeqCst);
            loop {
                if coordinator
                    .saved_revision()
                    .is_some_and(|saved| saved >= revision)
                {
                    tracing::debug!(revision, "autosave skipped, already persisted");
                    return;
                }
                match coordinator.save_document(doc.clone(), revision).await {
                    Err(DeckError::SaveInProgress) => coordinator.wait_idle().await,
                    Err(e) => {
                        tracing::warn!(revision, error = %e, "autosave failed");
                        return;
                    }
                    Ok(_) => return,
                }
            }
        });
        self.pending = Some(PendingSave { started, handle });
    }

    /// Whether a save is scheduled or running.
    pub fn is_scheduled(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.handle.is_finished())
    }

    /// Drop a save that has not started yet. A running save is left alone.
    pub fn cancel(&mut self) {
        if let Some(p) = self.pending.take() {
            if p.started.load(Ordering::SeqCst) {
                self.pending = Some(p);
            } else {
                p.handle.abort();
            }
        }
    }

    /// Wait for the scheduled save, if any, to finish.
    pub async fn flush(&mut self) {
        if let Some(p) = self.pending.take() {
            let _ = p.handle.await;
        }
    }
}

impl std::fmt::Debug for Autosaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autosaver")
            .field("debounce", &self.debounce)
            .field("scheduled", &self.is_scheduled())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/persist/autosave.rs"]
mod tests;
