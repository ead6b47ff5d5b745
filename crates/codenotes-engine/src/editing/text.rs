use xi_rope::Rope;
use xi_rope::delta::Builder;

use crate::editing::change::ContentChange;
use crate::models::{Point, Range};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    #[error("Position {}:{} is outside the document", .0.line, .0.offset)]
    OutOfBounds(Point),
    #[error("Range end precedes its start: {0:?}")]
    Reversed(Range),
}

/// Mirror of an open document's text, kept in step with reported edits.
///
/// Positions are `(line, char offset)` pairs as used by anchors; the rope
/// underneath is addressed in bytes.
#[derive(Clone, Debug)]
pub struct DocumentText {
    buffer: Rope,
}

impl DocumentText {
    pub fn new(text: &str) -> Self {
        Self {
            buffer: Rope::from(text),
        }
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn line_count(&self) -> usize {
        self.buffer.line_of_offset(self.buffer.len()) + 1
    }

    /// Byte offset of a point, or `None` when the point lies outside the text
    pub fn offset_of(&self, point: Point) -> Option<usize> {
        if point.line >= self.line_count() {
            return None;
        }
        let line_start = self.buffer.offset_of_line(point.line);
        let line_end = if point.line + 1 < self.line_count() {
            self.buffer.offset_of_line(point.line + 1)
        } else {
            self.buffer.len()
        };
        let line = self.buffer.slice_to_cow(line_start..line_end);
        let line = line.trim_end_matches('\n').trim_end_matches('\r');

        if point.offset == line.chars().count() {
            return Some(line_start + line.len());
        }
        line.char_indices()
            .nth(point.offset)
            .map(|(byte, _)| line_start + byte)
    }

    /// Text covered by `range`
    pub fn slice(&self, range: &Range) -> Result<String, TextError> {
        let (start, end) = self.byte_range(range)?;
        Ok(self.buffer.slice_to_cow(start..end).into_owned())
    }

    /// Apply an edit reported by the host
    pub fn apply(&mut self, change: &ContentChange) -> Result<(), TextError> {
        let (start, end) = self.byte_range(&change.range)?;
        let mut builder = Builder::new(self.buffer.len());
        builder.replace(start..end, Rope::from(&change.text));
        self.buffer = builder.build().apply(&self.buffer);
        Ok(())
    }

    fn byte_range(&self, range: &Range) -> Result<(usize, usize), TextError> {
        if range.is_reversed() {
            return Err(TextError::Reversed(*range));
        }
        let start = self
            .offset_of(range.start)
            .ok_or(TextError::OutOfBounds(range.start))?;
        let end = self
            .offset_of(range.end)
            .ok_or(TextError::OutOfBounds(range.end))?;
        Ok((start, end))
    }
}
