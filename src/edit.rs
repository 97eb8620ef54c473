//! Translation of editor change events into tree-sitter edit descriptors.
//!
//! An incremental reparse needs every text mutation expressed as an
//! `InputEdit`: byte offsets plus (row, column) points for the start of the
//! change, the end of the replaced span, and the end of the inserted text.
//! The editor only reports the first two directly; the new end is derived
//! from the line structure of the inserted text.

use tree_sitter::{InputEdit, Point};

/// Builds the `InputEdit` describing one replacement of `replaced_bytes`
/// bytes at `start_byte` with `inserted`.
///
/// `start` and `old_end` are the points bounding the replaced span in the
/// pre-edit document, with byte columns. The new end point is computed from
/// `inserted`: its row advances by the number of line feeds, and its column
/// is relative to the last inserted line when one was started, otherwise to
/// `start`.
///
/// This function is total: an empty `inserted` describes a pure deletion
/// (`new_end == start`), an empty replaced span a pure insertion
/// (`old_end == start`).
pub fn input_edit(
    start: Point,
    old_end: Point,
    start_byte: usize,
    replaced_bytes: usize,
    inserted: &str,
) -> InputEdit {
    let lines: Vec<&str> = inserted.split('\n').collect();
    let new_end_row = start.row + lines.len() - 1;
    let new_end_column = if lines.len() == 1 {
        start.column + inserted.len()
    } else {
        lines.last().map_or(0, |last| last.len())
    };

    InputEdit {
        start_byte,
        old_end_byte: start_byte + replaced_bytes,
        new_end_byte: start_byte + inserted.len(),
        start_position: start,
        old_end_position: old_end,
        new_end_position: Point {
            row: new_end_row,
            column: new_end_column,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(row: usize, column: usize) -> Point {
        Point { row, column }
    }

    struct Case {
        name: &'static str,
        start: Point,
        old_end: Point,
        offset: usize,
        replaced: usize,
        text: &'static str,
        expected: InputEdit,
    }

    #[test]
    fn editor_change_conversion() {
        let cases = [
            Case {
                name: "insert first char",
                start: point(0, 0),
                old_end: point(0, 0),
                offset: 0,
                replaced: 0,
                text: "a",
                expected: InputEdit {
                    start_byte: 0,
                    old_end_byte: 0,
                    new_end_byte: 1,
                    start_position: point(0, 0),
                    old_end_position: point(0, 0),
                    new_end_position: point(0, 1),
                },
            },
            Case {
                name: "insert after first char",
                start: point(0, 1),
                old_end: point(0, 1),
                offset: 1,
                replaced: 0,
                text: "a",
                expected: InputEdit {
                    start_byte: 1,
                    old_end_byte: 1,
                    new_end_byte: 2,
                    start_position: point(0, 1),
                    old_end_position: point(0, 1),
                    new_end_position: point(0, 2),
                },
            },
            Case {
                name: "insert first char on second line",
                start: point(1, 0),
                old_end: point(1, 0),
                offset: 14,
                replaced: 0,
                text: "a",
                expected: InputEdit {
                    start_byte: 14,
                    old_end_byte: 14,
                    new_end_byte: 15,
                    start_position: point(1, 0),
                    old_end_position: point(1, 0),
                    new_end_position: point(1, 1),
                },
            },
            Case {
                name: "delete first char",
                start: point(0, 0),
                old_end: point(0, 1),
                offset: 0,
                replaced: 1,
                text: "",
                expected: InputEdit {
                    start_byte: 0,
                    old_end_byte: 1,
                    new_end_byte: 0,
                    start_position: point(0, 0),
                    old_end_position: point(0, 1),
                    new_end_position: point(0, 0),
                },
            },
            Case {
                name: "delete word on some line",
                start: point(1, 3),
                old_end: point(1, 6),
                offset: 17,
                replaced: 3,
                text: "",
                expected: InputEdit {
                    start_byte: 17,
                    old_end_byte: 20,
                    new_end_byte: 17,
                    start_position: point(1, 3),
                    old_end_position: point(1, 6),
                    new_end_position: point(1, 3),
                },
            },
            Case {
                name: "delete multiple lines",
                start: point(1, 0),
                old_end: point(3, 0),
                offset: 14,
                replaced: 14,
                text: "",
                expected: InputEdit {
                    start_byte: 14,
                    old_end_byte: 28,
                    new_end_byte: 14,
                    start_position: point(1, 0),
                    old_end_position: point(3, 0),
                    new_end_position: point(1, 0),
                },
            },
            Case {
                name: "insert newline",
                start: point(0, 13),
                old_end: point(0, 13),
                offset: 13,
                replaced: 0,
                text: "\n",
                expected: InputEdit {
                    start_byte: 13,
                    old_end_byte: 13,
                    new_end_byte: 14,
                    start_position: point(0, 13),
                    old_end_position: point(0, 13),
                    new_end_position: point(1, 0),
                },
            },
        ];

        for case in cases {
            let edit = input_edit(
                case.start,
                case.old_end,
                case.offset,
                case.replaced,
                case.text,
            );
            assert_eq!(edit, case.expected, "case: {}", case.name);
        }
    }

    #[test]
    fn multi_line_insert_ends_on_last_line() {
        let edit = input_edit(point(0, 2), point(0, 2), 2, 0, "abc\ndef\n");
        assert_eq!(edit.new_end_position, point(2, 0));
        assert_eq!(edit.new_end_byte, 10);
    }

    #[test]
    fn multi_line_insert_with_trailing_text() {
        let edit = input_edit(point(3, 7), point(3, 7), 40, 0, "first\nsecond");
        assert_eq!(edit.new_end_position, point(4, 6));
        assert_eq!(edit.old_end_byte, 40);
        assert_eq!(edit.new_end_byte, 52);
    }

    quickcheck::quickcheck! {
        fn start_and_old_end_pass_through(row: u8, col: u8, end_row: u8, end_col: u8, text: String) -> bool {
            let start = point(row as usize, col as usize);
            let old_end = point(end_row as usize, end_col as usize);
            let edit = input_edit(start, old_end, 0, 0, &text);
            edit.start_position == start && edit.old_end_position == old_end
        }

        fn byte_spans_match_inputs(offset: u16, replaced: u16, text: String) -> bool {
            let offset = offset as usize;
            let replaced = replaced as usize;
            let edit = input_edit(point(0, 0), point(0, 0), offset, replaced, &text);
            edit.old_end_byte - edit.start_byte == replaced
                && edit.new_end_byte - edit.start_byte == text.len()
        }

        fn new_end_row_counts_line_feeds(row: u8, col: u8, text: String) -> bool {
            let start = point(row as usize, col as usize);
            let edit = input_edit(start, start, 0, 0, &text);
            let line_feeds = text.bytes().filter(|b| *b == b'\n').count();
            edit.new_end_position.row == start.row + line_feeds
        }

        fn single_line_insert_extends_column(col: u8, text: String) -> quickcheck::TestResult {
            if text.contains('\n') {
                return quickcheck::TestResult::discard();
            }
            let start = point(0, col as usize);
            let edit = input_edit(start, start, 0, 0, &text);
            quickcheck::TestResult::from_bool(
                edit.new_end_position.column == start.column + text.len(),
            )
        }
    }
}
