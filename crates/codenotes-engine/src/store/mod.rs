//! Owner of the authoritative anchor list.
//!
//! The store partitions anchors by document, feeds each reported edit through
//! the translator in arrival order, and turns pastes of a copied block into new
//! anchors. It holds no shared state; callers own it and pass `&mut` for updates.

use std::collections::{BTreeMap, HashMap};

use log::{debug, info, warn};

use crate::editing::{
    ChangeSummary, ContentChange, DocumentText, TextError, destination_range,
    pasted_text_matches, split_pasted_range, translate_anchor,
};
use crate::models::{Anchor, AnchorId, Range, range_contains};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document is not open: {0}")]
    DocumentNotOpen(String),
    #[error("Invalid range: {0}")]
    InvalidRange(#[from] TextError),
    #[error("No anchor with id {0}")]
    UnknownAnchor(AnchorId),
}

#[derive(Debug, Default)]
pub struct AnnotationStore {
    /// Live anchors per document, in insertion order
    documents: BTreeMap<String, Vec<Anchor>>,
    /// Text mirrors of the documents currently open
    texts: HashMap<String, DocumentText>,
    /// Anchors captured by the most recent copy
    clipboard: Vec<Anchor>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from previously persisted anchors; anchors marked for
    /// deletion are skipped.
    pub fn from_anchors(anchors: impl IntoIterator<Item = Anchor>) -> Self {
        let mut store = Self::new();
        for anchor in anchors.into_iter().filter(Anchor::is_live) {
            store.insert(anchor);
        }
        store
    }

    /// All anchors, grouped by document
    pub fn anchors(&self) -> impl Iterator<Item = &Anchor> {
        self.documents.values().flatten()
    }

    pub fn anchors_for(&self, document: &str) -> &[Anchor] {
        self.documents
            .get(document)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn get(&self, id: AnchorId) -> Option<&Anchor> {
        self.anchors().find(|anchor| anchor.id == id)
    }

    pub fn len(&self) -> usize {
        self.documents.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clipboard(&self) -> &[Anchor] {
        &self.clipboard
    }

    /// Start mirroring a document's text so annotations can be created in it
    pub fn open_document(&mut self, document: impl Into<String>, text: &str) {
        self.texts.insert(document.into(), DocumentText::new(text));
    }

    pub fn close_document(&mut self, document: &str) {
        self.texts.remove(document);
    }

    pub fn document_text(&self, document: &str) -> Option<&DocumentText> {
        self.texts.get(document)
    }

    /// Annotate a span of an open document
    pub fn annotate(
        &mut self,
        document: &str,
        range: Range,
        annotation: impl Into<String>,
    ) -> Result<AnchorId, StoreError> {
        let text = self
            .texts
            .get(document)
            .ok_or_else(|| StoreError::DocumentNotOpen(document.to_string()))?;
        let anchor_text = text.slice(&range)?;

        let anchor = Anchor::new(document, anchor_text, annotation, range);
        let id = anchor.id;
        self.insert(anchor);
        Ok(id)
    }

    /// Add a fully formed anchor
    pub fn insert(&mut self, anchor: Anchor) {
        debug!("adding anchor {} to {}", anchor.id, anchor.document);
        self.documents
            .entry(anchor.document.clone())
            .or_default()
            .push(anchor);
    }

    pub fn update_annotation(
        &mut self,
        id: AnchorId,
        annotation: impl Into<String>,
    ) -> Result<(), StoreError> {
        let anchor = self
            .documents
            .values_mut()
            .flatten()
            .find(|anchor| anchor.id == id)
            .ok_or(StoreError::UnknownAnchor(id))?;
        anchor.annotation = annotation.into();
        Ok(())
    }

    pub fn remove(&mut self, id: AnchorId) -> Result<Anchor, StoreError> {
        let (document, index) = self
            .documents
            .iter()
            .find_map(|(document, anchors)| {
                anchors
                    .iter()
                    .position(|anchor| anchor.id == id)
                    .map(|index| (document.clone(), index))
            })
            .ok_or(StoreError::UnknownAnchor(id))?;

        let anchors = self.documents.entry(document.clone()).or_default();
        let removed = anchors.remove(index);
        if anchors.is_empty() {
            self.documents.remove(&document);
        }
        debug!("removed anchor {id} from {document}");
        Ok(removed)
    }

    /// Record the anchors lying inside a copied selection.
    ///
    /// Replaces the previous clipboard block and returns how many anchors the
    /// new block holds.
    pub fn copy(&mut self, document: &str, selection: &Range) -> usize {
        self.clipboard = self
            .anchors_for(document)
            .iter()
            .filter(|anchor| range_contains(selection, &anchor.range()))
            .cloned()
            .collect();
        debug!(
            "copied {} anchors from {document} {:?}",
            self.clipboard.len(),
            selection
        );
        self.clipboard.len()
    }

    /// Carry a document's anchors through the changes of one edit.
    ///
    /// Changes are applied in the order given. After each one, anchors whose
    /// text was deleted are dropped, and if the change inserted the text of the
    /// clipboard block, anchors for the pasted copy are added.
    pub fn apply_changes(&mut self, document: &str, changes: &[ContentChange]) -> ChangeSummary {
        let mut summary = ChangeSummary::default();
        let mut anchors = self.documents.remove(document).unwrap_or_default();
        let mut fresh = 0;

        for change in changes {
            self.mirror_change(document, change);
            fresh = 0;

            let mut kept = Vec::with_capacity(anchors.len());
            for anchor in &anchors {
                let translated = translate_anchor(anchor, change);
                if translated.marked_for_deletion {
                    summary.removed.push(anchor.id);
                } else {
                    kept.push(translated);
                }
            }
            anchors = kept;

            if !self.clipboard.is_empty() && pasted_text_matches(&change.text, &self.clipboard) {
                let destination = destination_range(change);
                let pasted = split_pasted_range(&destination, &self.clipboard, document);
                info!(
                    "paste into {document} recreated {} anchors at {:?}",
                    pasted.len(),
                    destination
                );
                fresh = pasted.len();
                summary.pasted.extend(pasted.iter().map(|anchor| anchor.id));
                anchors.extend(pasted);
            }
        }

        // Anchors pasted by the last change have not been translated yet
        summary.translated = anchors.len() - fresh;

        if !anchors.is_empty() {
            self.documents.insert(document.to_string(), anchors);
        }
        summary
    }

    /// Move every anchor of a document to a new document id
    pub fn rename_document(&mut self, from: &str, to: &str) -> usize {
        if let Some(text) = self.texts.remove(from) {
            self.texts.insert(to.to_string(), text);
        }
        let Some(moved) = self.documents.remove(from) else {
            return 0;
        };
        let count = moved.len();
        let target = self.documents.entry(to.to_string()).or_default();
        target.extend(moved.into_iter().map(|anchor| Anchor {
            document: to.to_string(),
            ..anchor
        }));
        info!("moved {count} anchors from {from} to {to}");
        count
    }

    /// Drop every anchor of a document
    pub fn remove_document(&mut self, document: &str) -> Vec<Anchor> {
        self.texts.remove(document);
        self.documents.remove(document).unwrap_or_default()
    }

    fn mirror_change(&mut self, document: &str, change: &ContentChange) {
        let Some(text) = self.texts.get_mut(document) else {
            return;
        };
        if let Err(e) = text.apply(change) {
            // The mirror no longer matches the host; stop trusting it
            warn!("dropping text mirror for {document}: {e}");
            self.texts.remove(document);
        }
    }
}
