use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::range::{Range, range_of};

/// Unique identifier for an anchor
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnchorId(pub Uuid);

impl AnchorId {
    /// Generate a fresh, collision-free identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AnchorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AnchorId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// An annotation attached to a span of text in one document.
///
/// Anchors are replaced rather than mutated: translating an anchor through an
/// edit yields a new value carrying the same `id`, while splitting, pasting or
/// deleting yields a fresh one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Anchor {
    pub id: AnchorId,
    /// Owning document (URI or path)
    pub document: String,
    /// Source text the anchor was created over, used to recognise pastes
    pub anchor_text: String,
    /// User content
    pub annotation: String,
    pub start_line: usize,
    pub end_line: usize,
    pub start_offset: usize,
    pub end_offset: usize,
    /// Set when an edit removed all of the anchored text
    pub marked_for_deletion: bool,
}

impl Anchor {
    pub fn new(
        document: impl Into<String>,
        anchor_text: impl Into<String>,
        annotation: impl Into<String>,
        range: Range,
    ) -> Self {
        Self {
            id: AnchorId::new(),
            document: document.into(),
            anchor_text: anchor_text.into(),
            annotation: annotation.into(),
            start_line: range.start.line,
            end_line: range.end.line,
            start_offset: range.start.offset,
            end_offset: range.end.offset,
            marked_for_deletion: false,
        }
    }

    pub fn range(&self) -> Range {
        range_of(self)
    }

    /// Same anchor (same id) with new boundaries
    pub fn with_range(&self, range: Range) -> Self {
        Self {
            start_line: range.start.line,
            end_line: range.end.line,
            start_offset: range.start.offset,
            end_offset: range.end.offset,
            ..self.clone()
        }
    }

    /// Number of lines the anchor spans beyond its first
    pub fn line_span(&self) -> usize {
        self.end_line.saturating_sub(self.start_line)
    }

    pub fn is_live(&self) -> bool {
        !self.marked_for_deletion
    }
}
