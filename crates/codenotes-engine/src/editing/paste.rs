use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::editing::change::ContentChange;
use crate::models::{Anchor, Point, Range};

/// Range occupied by the text a change inserted, in post-edit coordinates
pub fn destination_range(change: &ContentChange) -> Range {
    let start = change.range.start;
    let end = match change.text.rfind('\n') {
        None => Point::new(start.line, start.offset + change.text_len()),
        Some(last_newline) => Point::new(
            start.line + change.text.matches('\n').count(),
            change.text[last_newline + 1..].chars().count(),
        ),
    };
    Range::new(start, end)
}

/// Remove every whitespace character
pub fn strip_whitespace(text: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let regex = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));
    regex.replace_all(text, "").into_owned()
}

/// Whether `inserted` reproduces the text of a copied block of anchors.
///
/// The anchors' texts are concatenated top to bottom and compared against
/// the inserted text with all whitespace removed, so re-indentation on paste
/// does not defeat the match.
pub fn pasted_text_matches(inserted: &str, copied: &[Anchor]) -> bool {
    let needle: String = sorted_by_start_line(copied)
        .iter()
        .map(|anchor| strip_whitespace(&anchor.anchor_text))
        .collect();
    if needle.is_empty() {
        return false;
    }
    strip_whitespace(inserted).contains(&needle)
}

/// Distribute a paste destination across the anchors of one copied block.
///
/// Anchors are processed top to bottom by their original start line. Each
/// keeps its own line span and boundary offsets; the first is pinned to the
/// start of the destination, the last to its end, and each one in between is
/// chained off the end of the anchor computed just before it. Every produced
/// anchor has a fresh id and belongs to `target_document`.
///
/// A block of one anchor yields a single anchor covering the whole destination.
pub fn split_pasted_range(
    destination: &Range,
    copied: &[Anchor],
    target_document: &str,
) -> Vec<Anchor> {
    let sorted = sorted_by_start_line(copied);

    if let [only] = sorted.as_slice() {
        return vec![pasted(only, *destination, target_document)];
    }

    let last_index = sorted.len().saturating_sub(1);
    let mut produced: Vec<Anchor> = Vec::with_capacity(sorted.len());

    for (index, anchor) in sorted.iter().enumerate() {
        let num_lines = anchor.line_span();

        let range = if index == 0 {
            Range::new(
                destination.start,
                Point::new(destination.start.line + num_lines, anchor.end_offset),
            )
        } else if index == last_index {
            Range::new(
                Point::new(
                    destination.end.line.saturating_sub(num_lines),
                    anchor.start_offset,
                ),
                destination.end,
            )
        } else {
            // Chain off the previous anchor as already recomputed
            let previous_end = produced[index - 1].range().end;
            Range::new(
                Point::new(
                    previous_end.line,
                    previous_end.offset + anchor.start_offset,
                ),
                Point::new(previous_end.line + num_lines, anchor.end_offset),
            )
        };

        produced.push(pasted(anchor, range, target_document));
    }

    debug!(
        "split paste {:?} across {} anchors in {}",
        destination,
        produced.len(),
        target_document
    );
    produced
}

fn pasted(source: &Anchor, range: Range, target_document: &str) -> Anchor {
    Anchor::new(
        target_document,
        source.anchor_text.clone(),
        source.annotation.clone(),
        range,
    )
}

fn sorted_by_start_line(anchors: &[Anchor]) -> Vec<&Anchor> {
    let mut sorted: Vec<&Anchor> = anchors.iter().collect();
    sorted.sort_by_key(|anchor| anchor.start_line);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn copied(text: &str, range: Range) -> Anchor {
        Anchor::new("file:///src/source.rs", text, format!("note on {text}"), range)
    }

    fn coords(anchor: &Anchor) -> (usize, usize, usize, usize) {
        (
            anchor.start_line,
            anchor.start_offset,
            anchor.end_line,
            anchor.end_offset,
        )
    }

    // ============ Destination range ============

    #[rstest]
    #[case::single_line("hello", (3, 4, 3, 9))]
    #[case::trailing_newline("hello\n", (3, 4, 4, 0))]
    #[case::multi_line("fn a() {\n    b();\n}", (3, 4, 5, 1))]
    #[case::empty("", (3, 4, 3, 4))]
    #[case::unicode_counted_in_chars("héllo wörld", (3, 4, 3, 15))]
    fn test_destination_range(#[case] text: &str, #[case] expected: (usize, usize, usize, usize)) {
        let change = ContentChange::insert(Point::new(3, 4), text);

        let range = destination_range(&change);

        assert_eq!(
            range,
            Range::from_coords(expected.0, expected.1, expected.2, expected.3)
        );
    }

    // ============ Paste detection ============

    #[test]
    fn test_pasted_text_matches_ignores_whitespace() {
        let block = vec![
            copied("let x = 1;", Range::from_coords(4, 4, 4, 14)),
            copied("let y = 2;", Range::from_coords(5, 4, 5, 14)),
        ];

        assert!(pasted_text_matches(
            "fn f() {\n        let x = 1;\n        let y = 2;\n}",
            &block
        ));
        assert!(!pasted_text_matches("let y = 2;\nlet x = 1;", &block));
        assert!(!pasted_text_matches("let x = 1;", &block));
    }

    #[test]
    fn test_pasted_text_matches_uses_line_order() {
        let block = vec![
            copied("second", Range::from_coords(9, 0, 9, 6)),
            copied("first", Range::from_coords(1, 0, 1, 5)),
        ];

        assert!(pasted_text_matches("first\nsecond", &block));
    }

    #[test]
    fn test_whitespace_only_anchor_text_never_matches() {
        let block = vec![copied("   ", Range::from_coords(0, 0, 0, 3))];

        assert!(!pasted_text_matches("anything", &block));
        assert!(!pasted_text_matches("anything", &[]));
    }

    // ============ Splitting ============

    #[test]
    fn test_single_anchor_covers_destination_exactly() {
        let block = vec![copied("hello", Range::from_coords(12, 7, 12, 12))];
        let destination = Range::from_coords(3, 0, 4, 2);

        let pasted = split_pasted_range(&destination, &block, "file:///src/target.rs");

        assert_eq!(pasted.len(), 1);
        assert_eq!(pasted[0].range(), destination);
        assert_eq!(pasted[0].document, "file:///src/target.rs");
        assert_eq!(pasted[0].anchor_text, "hello");
        assert_eq!(pasted[0].annotation, "note on hello");
        assert_ne!(pasted[0].id, block[0].id);
        assert!(!pasted[0].marked_for_deletion);
    }

    #[test]
    fn test_split_sorts_anchors_by_start_line() {
        let block = vec![
            copied("middle", Range::from_coords(10, 2, 11, 6)),
            copied("top", Range::from_coords(5, 0, 5, 4)),
            copied("bottom", Range::from_coords(20, 1, 21, 3)),
        ];
        let destination = Range::from_coords(0, 0, 4, 3);

        let pasted = split_pasted_range(&destination, &block, "target");

        let texts: Vec<&str> = pasted.iter().map(|a| a.anchor_text.as_str()).collect();
        assert_eq!(texts, vec!["top", "middle", "bottom"]);
        // First pinned to the destination start, keeps its own end offset
        assert_eq!(coords(&pasted[0]), (0, 0, 0, 4));
        // Middle chained off the first: start offset adds its own start offset
        assert_eq!(coords(&pasted[1]), (0, 6, 1, 6));
        // Last pinned to the destination end, keeps its own start offset
        assert_eq!(coords(&pasted[2]), (3, 1, 4, 3));
    }

    #[test]
    fn test_middle_anchors_chain_sequentially() {
        let block = vec![
            copied("a", Range::from_coords(0, 0, 1, 2)),
            copied("b", Range::from_coords(3, 1, 4, 5)),
            copied("c", Range::from_coords(6, 2, 8, 3)),
            copied("d", Range::from_coords(9, 0, 9, 7)),
        ];
        let destination = Range::from_coords(10, 4, 20, 7);

        let pasted = split_pasted_range(&destination, &block, "target");

        assert_eq!(coords(&pasted[0]), (10, 4, 11, 2));
        assert_eq!(coords(&pasted[1]), (11, 3, 12, 5));
        assert_eq!(coords(&pasted[2]), (12, 7, 14, 3));
        assert_eq!(coords(&pasted[3]), (20, 0, 20, 7));
    }

    #[test]
    fn test_split_generates_fresh_ids() {
        let block = vec![
            copied("a", Range::from_coords(0, 0, 0, 1)),
            copied("b", Range::from_coords(1, 0, 1, 1)),
        ];

        let pasted = split_pasted_range(&Range::from_coords(5, 0, 6, 1), &block, "target");

        assert_eq!(pasted.len(), 2);
        for anchor in &pasted {
            assert!(block.iter().all(|original| original.id != anchor.id));
            assert_eq!(anchor.document, "target");
        }
        assert_ne!(pasted[0].id, pasted[1].id);
    }

    #[test]
    fn test_empty_block_produces_nothing() {
        let pasted = split_pasted_range(&Range::from_coords(0, 0, 1, 0), &[], "target");
        assert!(pasted.is_empty());
    }
}
