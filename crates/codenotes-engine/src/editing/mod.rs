/*!
 * # Anchor Tracking
 *
 * Anchors tie an annotation to a span of a document. As the host editor
 * reports edits, every anchor in the edited document is translated so that it
 * keeps covering the same text, and pastes of previously copied anchored text
 * produce new anchors at the paste site.
 *
 * ## Edits
 *
 * - The host reports each edit as a [`ContentChange`]: the replaced range in
 *   pre-edit coordinates, the inserted text and the removed length
 * - [`translate_anchor`] carries one anchor through one change by checking an
 *   ordered list of boundary rules (start line, end line, start offset, end
 *   offset); several may apply to one edit and their adjustments accumulate
 * - An anchor whose whole span was deleted comes back marked for deletion
 *   with a fresh id, and the caller drops it
 * - Changes must be applied in the order the host reports them: every line
 *   and offset in a change is relative to the document just before it
 *
 * ## Pastes
 *
 * - Copying records the anchors inside the copied selection as one block
 * - When inserted text contains the block's text (whitespace-insensitive),
 *   [`split_pasted_range`] spreads the paste destination over the block's
 *   anchors in top-to-bottom order, each with a fresh id
 *
 * ## Module Structure
 *
 * - **`change`**: `ContentChange` and line/offset delta arithmetic
 * - **`translate`**: the boundary rule list and `translate_anchor`
 * - **`paste`**: paste detection, destination ranges and `split_pasted_range`
 * - **`text`**: rope-backed mirror of an open document's text
 * - **`patch`**: summary of what a change did to a document's anchors
 *
 * ## Usage Pattern
 *
 * ```rust
 * use codenotes_engine::editing::*;
 * use codenotes_engine::models::{Anchor, Point, Range};
 *
 * let anchor = Anchor::new("src/main.rs", "hello", "greeting", Range::from_coords(2, 0, 2, 5));
 *
 * // Two lines inserted at the top of the file push the anchor down
 * let moved = translate_anchor(&anchor, &ContentChange::insert(Point::new(0, 0), "\n\n"));
 * assert_eq!((moved.start_line, moved.end_line), (4, 4));
 * assert_eq!(moved.id, anchor.id);
 * ```
 */

pub mod change;
pub mod paste;
pub mod patch;
pub mod text;
pub mod translate;

pub use change::ContentChange;
pub use paste::{destination_range, pasted_text_matches, split_pasted_range, strip_whitespace};
pub use patch::ChangeSummary;
pub use text::{DocumentText, TextError};
pub use translate::{translate_anchor, translate_anchors};
