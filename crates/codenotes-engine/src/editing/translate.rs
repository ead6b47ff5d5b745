//! Translation of anchor boundaries through a single document edit.
//!
//! An edit is checked against an ordered list of boundary rules. Each rule
//! looks at one relationship between the edit and the anchor's *pre-edit*
//! boundaries (start line, end line, start offset, end offset) and nudges the
//! working boundaries when it matches. Several rules can match one edit; they
//! are applied in list order and their adjustments accumulate. The only rule
//! that stops evaluation is the full-deletion check, which runs first.

use log::{debug, trace};

use crate::editing::change::{ContentChange, shift};
use crate::models::{Anchor, AnchorId, Range};

/// A boundary adjustment rule
struct Rule {
    name: &'static str,
    applies: fn(&Range, &ContentChange) -> bool,
    adjust: fn(&mut Range, &Range, &ContentChange),
}

/// Evaluated in order after the full-deletion check
const RULES: &[Rule] = &[
    Rule {
        name: "lines changed above anchor",
        applies: |anchor, change| {
            change.range.start.line < anchor.start.line && change.line_delta() != 0
        },
        adjust: |working, _, change| {
            working.start.line = shift(working.start.line, change.line_delta());
            working.end.line = shift(working.end.line, change.line_delta());
        },
    },
    Rule {
        name: "lines changed from anchor start",
        applies: |anchor, change| {
            change.range.start.line == anchor.start.line
                && change.range.start.offset <= anchor.start.offset
                && change.line_delta() != 0
        },
        adjust: |working, _, change| {
            working.end.line = shift(working.end.line, change.line_delta());
        },
    },
    Rule {
        name: "lines changed through anchor end",
        applies: |anchor, change| {
            change.range.end.line == anchor.end.line
                && change.range.end.offset >= anchor.end.offset
                && change.line_delta() != 0
        },
        adjust: |working, _, change| {
            working.end.line = shift(working.end.line, change.line_delta());
        },
    },
    Rule {
        name: "characters changed before anchor start",
        applies: |anchor, change| {
            change.range.start.line == anchor.start.line
                && change.range.start.offset < anchor.start.offset
        },
        adjust: |working, anchor, change| {
            working.start.offset = shift(working.start.offset, change.offset_delta());
            if moves_whole_line_anchor(anchor, change) {
                working.end.offset = shift(working.end.offset, change.offset_delta());
            }
        },
    },
    Rule {
        name: "characters changed inside anchor end line",
        applies: |anchor, change| {
            change.range.end.line == anchor.end.line
                && change.range.end.offset <= anchor.end.offset
                && change.line_delta() == 0
                && !inserts_at_anchor_start(anchor, change)
                && !moves_whole_line_anchor(anchor, change)
        },
        adjust: |working, _, change| {
            working.end.offset = shift(working.end.offset, change.offset_delta());
        },
    },
    Rule {
        name: "characters typed at anchor end",
        applies: |anchor, change| {
            change.range.end.line == anchor.end.line
                && change.range.end.offset == anchor.end.offset + change.text_len()
                && change.line_delta() == 0
        },
        adjust: |working, _, change| {
            working.end.offset += change.text_len();
        },
    },
    Rule {
        name: "lines changed inside anchor",
        applies: |anchor, change| {
            change.range.start > anchor.start
                && change.range.end < anchor.end
                && change.line_delta() != 0
        },
        adjust: |working, _, change| {
            working.end.line = shift(working.end.line, change.line_delta());
        },
    },
];

/// A same-line edit before a single-line anchor carries the whole anchor along
fn moves_whole_line_anchor(anchor: &Range, change: &ContentChange) -> bool {
    anchor.start.line == anchor.end.line
        && change.range.start.line == anchor.start.line
        && change.range.start.offset < anchor.start.offset
        && change.line_delta() == 0
}

/// Text typed exactly at the anchor's start stays outside the anchor
fn inserts_at_anchor_start(anchor: &Range, change: &ContentChange) -> bool {
    change.range_length == 0 && change.range.is_empty() && change.range.start == anchor.start
}

/// Compute an anchor's boundaries after `change` has been applied to its document.
///
/// Returns the same anchor (same id) with translated boundaries, or, when the
/// edit removed the whole anchored span without inserting anything, a copy
/// with a fresh id and `marked_for_deletion` set.
pub fn translate_anchor(anchor: &Anchor, change: &ContentChange) -> Anchor {
    let original = anchor.range();

    if change.text.is_empty() && change.range.contains(&original) {
        debug!("anchor {} deleted by edit at {:?}", anchor.id, change.range);
        return Anchor {
            id: AnchorId::new(),
            marked_for_deletion: true,
            ..anchor.clone()
        };
    }

    let mut working = original;
    for rule in RULES {
        if (rule.applies)(&original, change) {
            trace!("anchor {}: applying rule '{}'", anchor.id, rule.name);
            (rule.adjust)(&mut working, &original, change);
        }
    }

    if working != original {
        debug!(
            "anchor {} moved from {:?} to {:?}",
            anchor.id, original, working
        );
    }

    anchor.with_range(working)
}

/// Apply an ordered list of content changes to a document's anchors.
///
/// Changes are applied one at a time in the order given; anchors deleted by a
/// change are dropped before the next change is considered.
pub fn translate_anchors(anchors: &[Anchor], changes: &[ContentChange]) -> Vec<Anchor> {
    let mut current = anchors.to_vec();
    for change in changes {
        current = current
            .iter()
            .map(|anchor| translate_anchor(anchor, change))
            .filter(Anchor::is_live)
            .collect();
    }
    current
}
