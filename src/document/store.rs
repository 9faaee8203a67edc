use crate::document::deck::{DeckDocument, SlideRecord};
use crate::document::templates::{SlideKind, initial_snapshot};
use crate::foundation::core::{Canvas, SlideId};
use crate::foundation::error::{DeckError, DeckResult};
use crate::history::stack::HistoryStack;
use crate::scene::model::ElementKind;
use crate::scene::snapshot::SceneSnapshot;

/// One slide: identity, flavor, generation prompt and its private edit history.
///
/// The slide's current snapshot is its history cursor.
#[derive(Clone, Debug)]
pub struct Slide {
    id: SlideId,
    kind: SlideKind,
    visual_prompt: Option<String>,
    history: HistoryStack,
}

impl Slide {
    /// Stable id.
    pub fn id(&self) -> SlideId {
        self.id
    }

    /// Slide flavor.
    pub fn kind(&self) -> SlideKind {
        self.kind
    }

    /// Current committed scene.
    pub fn snapshot(&self) -> &SceneSnapshot {
        self.history.cursor()
    }

    /// Prompt used to generate this slide's imagery.
    pub fn visual_prompt(&self) -> Option<&str> {
        self.visual_prompt.as_deref()
    }

    /// Undo/redo history.
    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Text of the first text element, if any.
    pub fn title(&self) -> Option<&str> {
        self.snapshot()
            .objects_of_kind(ElementKind::Text)
            .find_map(|(_, o)| o.text())
    }
}

/// Ordered slide collection with an active position.
///
/// Invariants: ids are unique and never reused; `active` is `Some(i)` with `i < len` whenever the
/// store is non-empty and `None` when it is empty.
#[derive(Clone, Debug)]
pub struct SlideDocumentStore {
    slides: Vec<Slide>,
    active: Option<usize>,
    next_id: u64,
    canvas: Canvas,
    history_depth: usize,
    revision: u64,
}

impl SlideDocumentStore {
    /// Empty store producing slides for `canvas` with `history_depth` undo entries each.
    pub fn new(canvas: Canvas, history_depth: usize) -> Self {
        Self {
            slides: Vec::new(),
            active: None,
            next_id: 1,
            canvas,
            history_depth: history_depth.max(1),
            revision: 0,
        }
    }

    /// Rebuild a store from a persisted document. Histories start fresh; the first slide is active.
    pub fn from_document(
        doc: DeckDocument,
        canvas: Canvas,
        history_depth: usize,
    ) -> DeckResult<Self> {
        doc.validate()?;
        let mut store = Self::new(canvas, history_depth);
        store.next_id = doc.slides.iter().map(|s| s.id.0).max().unwrap_or(0) + 1;
        for rec in doc.slides {
            store.slides.push(Slide {
                id: rec.id,
                kind: rec.kind,
                visual_prompt: rec.visual_prompt,
                history: HistoryStack::new(rec.snapshot, store.history_depth),
            });
        }
        store.active = if store.slides.is_empty() { None } else { Some(0) };
        Ok(store)
    }

    /// Serializable view of the current state, in presentation order.
    pub fn to_document(&self) -> DeckDocument {
        DeckDocument {
            slides: self
                .slides
                .iter()
                .map(|s| SlideRecord {
                    id: s.id,
                    kind: s.kind,
                    snapshot: s.snapshot().clone(),
                    visual_prompt: s.visual_prompt.clone(),
                })
                .collect(),
        }
    }

    /// Insert a new slide built from the `kind` template and make it active.
    ///
    /// `at` defaults to appending; `at == len` also appends.
    pub fn add_slide(&mut self, kind: SlideKind, at: Option<usize>) -> DeckResult<&Slide> {
        let snapshot = initial_snapshot(kind, self.canvas)?;
        self.insert_slide(kind, snapshot, None, at)
    }

    /// Insert a new slide with explicit content and make it active.
    pub fn insert_slide(
        &mut self,
        kind: SlideKind,
        snapshot: SceneSnapshot,
        visual_prompt: Option<String>,
        at: Option<usize>,
    ) -> DeckResult<&Slide> {
        let len = self.slides.len();
        let pos = at.unwrap_or(len);
        if pos > len {
            return Err(DeckError::IndexOutOfRange { index: pos, len });
        }

        let id = SlideId(self.next_id);
        self.next_id += 1;
        self.slides.insert(
            pos,
            Slide {
                id,
                kind,
                visual_prompt,
                history: HistoryStack::new(snapshot, self.history_depth),
            },
        );
        self.active = Some(pos);
        self.bump();
        tracing::debug!(%id, pos, ?kind, "slide added");
        Ok(&self.slides[pos])
    }

    /// Remove the slide with `id` and return it.
    ///
    /// The active position is re-derived: removing a slide before the active one shifts it down
    /// so the same slide stays active; removing the active slide clamps to the nearest remaining
    /// position; removing the last slide leaves no active slide.
    pub fn delete_slide(&mut self, id: SlideId) -> DeckResult<Slide> {
        let pos = self.position_of(id)?;
        let removed = self.slides.remove(pos);

        // non-empty before the removal, so `active` was `Some`
        let a = self.active.unwrap_or(0);
        self.active = if self.slides.is_empty() {
            None
        } else if pos < a {
            Some(a - 1)
        } else {
            Some(a.min(self.slides.len() - 1))
        };
        self.bump();
        tracing::debug!(%id, pos, active = ?self.active, "slide deleted");
        Ok(removed)
    }

    /// Make the slide at `index` active. Snapshots are not touched.
    pub fn switch_active(&mut self, index: usize) -> DeckResult<()> {
        let len = self.slides.len();
        if index >= len {
            return Err(DeckError::IndexOutOfRange { index, len });
        }
        self.active = Some(index);
        Ok(())
    }

    /// Move the slide at `from` to position `to`. Ids, histories and snapshots move with it and
    /// the active slide (by identity) stays active.
    pub fn reorder(&mut self, from: usize, to: usize) -> DeckResult<()> {
        let len = self.slides.len();
        if from >= len {
            return Err(DeckError::IndexOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(DeckError::IndexOutOfRange { index: to, len });
        }
        if from == to {
            return Ok(());
        }

        let active_id = self.active_slide().map(Slide::id);
        let slide = self.slides.remove(from);
        self.slides.insert(to, slide);
        if let Some(id) = active_id {
            self.active = self.slides.iter().position(|s| s.id == id);
        }
        self.bump();
        Ok(())
    }

    /// Commit a new snapshot to the slide's history.
    pub fn commit(&mut self, id: SlideId, snapshot: SceneSnapshot) -> DeckResult<&SceneSnapshot> {
        let pos = self.position_of(id)?;
        self.slides[pos].history.commit(snapshot);
        self.bump();
        Ok(self.slides[pos].snapshot())
    }

    /// Undo on one slide. `Ok(None)` when its undo log is empty.
    pub fn undo(&mut self, id: SlideId) -> DeckResult<Option<SceneSnapshot>> {
        let pos = self.position_of(id)?;
        let out = self.slides[pos].history.undo();
        if out.is_some() {
            self.bump();
        }
        Ok(out)
    }

    /// Redo on one slide. `Ok(None)` when its redo log is empty.
    pub fn redo(&mut self, id: SlideId) -> DeckResult<Option<SceneSnapshot>> {
        let pos = self.position_of(id)?;
        let out = self.slides[pos].history.redo();
        if out.is_some() {
            self.bump();
        }
        Ok(out)
    }

    /// Set or clear a slide's visual prompt.
    pub fn set_visual_prompt(&mut self, id: SlideId, prompt: Option<String>) -> DeckResult<()> {
        let pos = self.position_of(id)?;
        self.slides[pos].visual_prompt = prompt.filter(|p| !p.trim().is_empty());
        self.bump();
        Ok(())
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether the store has no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Active position, `None` when empty.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Active slide, `None` when empty.
    pub fn active_slide(&self) -> Option<&Slide> {
        self.active.and_then(|i| self.slides.get(i))
    }

    /// Slide by id.
    pub fn slide(&self, id: SlideId) -> DeckResult<&Slide> {
        let pos = self.position_of(id)?;
        Ok(&self.slides[pos])
    }

    /// Slide by position.
    pub fn slide_at(&self, index: usize) -> DeckResult<&Slide> {
        let len = self.slides.len();
        self.slides
            .get(index)
            .ok_or(DeckError::IndexOutOfRange { index, len })
    }

    /// Current position of the slide with `id`.
    pub fn position_of(&self, id: SlideId) -> DeckResult<usize> {
        self.slides
            .iter()
            .position(|s| s.id == id)
            .ok_or(DeckError::SlideNotFound(id))
    }

    /// Canvas new slides are created for.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Monotonic counter bumped by every content-changing operation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Ids currently in the store, in order.
    pub fn ids(&self) -> Vec<SlideId> {
        self.slides.iter().map(|s| s.id).collect()
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    #[cfg(test)]
    fn assert_invariants(&self) {
        match self.active {
            Some(a) => assert!(a < self.slides.len(), "active {a} out of bounds"),
            None => assert!(self.slides.is_empty(), "non-empty store without active slide"),
        }
        let ids: std::collections::HashSet<SlideId> = self.slides.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), self.slides.len(), "duplicate slide ids");
        assert!(
            self.slides.iter().all(|s| s.id.0 < self.next_id),
            "id at or above next_id"
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/store.rs"]
mod tests;
