//! Running the compiled highlight query over a syntax tree.

use streaming_iterator::StreamingIterator;
use tree_sitter::{Query, QueryCursor, Range, Tree};

/// One tagged node match: the query capture index and the node's range.
///
/// Storing the capture index (a `u32` into `Query::capture_names()`) instead
/// of the name avoids a `String` allocation per capture; the encoder resolves
/// indices through the context's legend table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capture {
    pub index: u32,
    pub range: Range,
}

/// Collects all captures of `query` over the tree's root node.
///
/// Captures come back in the order the query engine yields them, ascending by
/// document position; downstream encoding relies on that order rather than
/// re-sorting.
pub fn collect(query: &Query, tree: &Tree, source: &[u8]) -> Vec<Capture> {
    let mut cursor = QueryCursor::new();
    let mut collected = Vec::new();

    let mut captures = cursor.captures(query, tree.root_node(), source);
    while let Some((mat, capture_index)) = captures.next() {
        let capture = &mat.captures[*capture_index];
        collected.push(Capture {
            index: capture.index,
            range: capture.node.range(),
        });
    }

    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse(source: &str) -> Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    fn comment_query() -> Query {
        Query::new(
            &tree_sitter_rust::LANGUAGE.into(),
            "(line_comment) @comment",
        )
        .unwrap()
    }

    #[test]
    fn collects_one_capture_per_match() {
        let source = "// one\nfn main() {}\n// two\n";
        let tree = parse(source);
        let query = comment_query();

        let captures = collect(&query, &tree, source.as_bytes());
        assert_eq!(captures.len(), 2);
        assert_eq!(captures[0].range.start_point.row, 0);
        assert_eq!(captures[1].range.start_point.row, 2);
    }

    #[test]
    fn captures_carry_exact_node_ranges() {
        let source = "// hello\n";
        let tree = parse(source);
        let query = comment_query();

        let captures = collect(&query, &tree, source.as_bytes());
        assert_eq!(captures.len(), 1);
        let range = captures[0].range;
        assert_eq!(range.start_byte, 0);
        assert_eq!(range.end_byte, 8);
        assert_eq!(range.start_point.column, 0);
        assert_eq!(range.end_point.column, 8);
    }

    #[test]
    fn empty_source_yields_no_captures() {
        let source = "";
        let tree = parse(source);
        let query = comment_query();
        assert!(collect(&query, &tree, source.as_bytes()).is_empty());
    }

    #[test]
    fn captures_arrive_in_document_order() {
        let source = "// a\n// b\nfn first() {}\n// c\nfn second() {}\n";
        let tree = parse(source);
        let query = Query::new(
            &tree_sitter_rust::LANGUAGE.into(),
            r#"
            (line_comment) @comment
            (function_item name: (identifier) @function)
            "#,
        )
        .unwrap();

        let captures = collect(&query, &tree, source.as_bytes());
        let positions: Vec<(usize, usize)> = captures
            .iter()
            .map(|c| (c.range.start_point.row, c.range.start_point.column))
            .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }
}
