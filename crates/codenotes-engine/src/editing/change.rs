use serde::{Deserialize, Serialize};

use crate::models::{Point, Range};

/// One atomic replacement of a document range, as reported by the editing host.
///
/// `range` is expressed in coordinates of the document *before* the edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChange {
    /// Region replaced by the edit
    pub range: Range,
    /// Text that replaced `range` (empty for a pure deletion)
    pub text: String,
    /// Characters removed by the edit (0 for a pure insertion)
    #[serde(default)]
    pub range_length: usize,
}

impl ContentChange {
    pub fn new(range: Range, text: impl Into<String>, range_length: usize) -> Self {
        Self {
            range,
            text: text.into(),
            range_length,
        }
    }

    /// Insert `text` at `at` without removing anything
    pub fn insert(at: Point, text: impl Into<String>) -> Self {
        Self::new(Range::new(at, at), text, 0)
    }

    /// Remove `range`, which held `range_length` characters
    pub fn delete(range: Range, range_length: usize) -> Self {
        Self::new(range, String::new(), range_length)
    }

    /// Lines spanned by the replaced region
    pub fn lines_in_range(&self) -> isize {
        self.range.end.line as isize - self.range.start.line as isize
    }

    /// Newlines carried by the inserted text
    pub fn lines_inserted(&self) -> isize {
        self.text.matches('\n').count() as isize
    }

    /// Net change in document line count caused by this edit
    pub fn line_delta(&self) -> isize {
        self.lines_inserted() - self.lines_in_range()
    }

    /// Inserted text length in characters
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Character shift applied to offsets on the edited line: the inserted
    /// length when text was inserted, otherwise minus the removed length.
    pub fn offset_delta(&self) -> isize {
        if self.text.is_empty() {
            -(self.range_length as isize)
        } else {
            self.text_len() as isize
        }
    }
}

/// Apply a signed delta to a position, clamping at zero
pub(crate) fn shift(position: usize, delta: isize) -> usize {
    position.saturating_add_signed(delta)
}
