use crate::models::AnchorId;

/// Result of applying a document change through the store
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSummary {
    /// Surviving anchors carried through at least one change of the batch
    pub translated: usize,
    /// Anchors whose text was removed entirely
    pub removed: Vec<AnchorId>,
    /// Anchors created because the change pasted a copied block
    pub pasted: Vec<AnchorId>,
}

impl ChangeSummary {
    pub fn is_empty(&self) -> bool {
        self.translated == 0 && self.removed.is_empty() && self.pasted.is_empty()
    }
}
