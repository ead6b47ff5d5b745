use serde::{Deserialize, Serialize};

use crate::models::Anchor;

/// A position in a document: zero-based line and character offset within that line.
///
/// Field order matters: the derived `Ord` compares `line` first, then `offset`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub line: usize,
    pub offset: usize,
}

impl Point {
    pub fn new(line: usize, offset: usize) -> Self {
        Self { line, offset }
    }
}

/// A span delimited by two points, `start` inclusive and `end` exclusive
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Point,
    pub end: Point,
}

impl Range {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Build a range from `(start_line, start_offset, end_line, end_offset)`
    pub fn from_coords(
        start_line: usize,
        start_offset: usize,
        end_line: usize,
        end_offset: usize,
    ) -> Self {
        Self::new(
            Point::new(start_line, start_offset),
            Point::new(end_line, end_offset),
        )
    }

    /// True when `inner` lies entirely within this range, boundaries included
    pub fn contains(&self, inner: &Range) -> bool {
        self.start <= inner.start && inner.end <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// A range whose end precedes its start
    pub fn is_reversed(&self) -> bool {
        self.end < self.start
    }

    pub fn line_span(&self) -> usize {
        self.end.line.saturating_sub(self.start.line)
    }
}

/// Rectangle spanned by an anchor's four boundary fields
pub fn range_of(anchor: &Anchor) -> Range {
    Range::from_coords(
        anchor.start_line,
        anchor.start_offset,
        anchor.end_line,
        anchor.end_offset,
    )
}

/// Containment test used throughout the engine: `outer.start <= inner.start` and
/// `inner.end <= outer.end` under `(line, offset)` ordering.
pub fn range_contains(outer: &Range, inner: &Range) -> bool {
    outer.contains(inner)
}
