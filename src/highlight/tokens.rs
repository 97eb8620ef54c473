//! Delta encoding of ordered captures into LSP semantic tokens.

use tower_lsp::lsp_types::SemanticToken;

use super::captures::Capture;
use super::HighlightContext;

/// Helper for building semantic tokens using delta encoding.
///
/// LSP semantic tokens express each token's position relative to the
/// previous one: the line as a delta, and the start column as a delta when
/// the token stays on the same line, absolute otherwise.
pub struct SemanticTokensBuilder {
    tokens: Vec<SemanticToken>,
    prev_line: u32,
    prev_start: u32,
}

impl SemanticTokensBuilder {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            prev_line: 0,
            prev_start: 0,
        }
    }

    /// Adds a token at an absolute position, converting to delta encoding.
    pub fn push(&mut self, line: u32, start: u32, length: u32, token_type: u32) {
        let delta_line = if line >= self.prev_line {
            line - self.prev_line
        } else {
            // Should not happen: captures arrive in document order
            0
        };

        let delta_start = if delta_line == 0 && start >= self.prev_start {
            start - self.prev_start
        } else if delta_line == 0 {
            // Should not happen: same-line tokens arrive left to right
            0
        } else {
            start
        };

        self.tokens.push(SemanticToken {
            delta_line,
            delta_start,
            length,
            token_type,
            token_modifiers_bitset: 0,
        });

        self.prev_line = line;
        self.prev_start = start;
    }

    pub fn build(self) -> Vec<SemanticToken> {
        self.tokens
    }
}

impl Default for SemanticTokensBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encodes an ordered capture sequence into the flat token stream.
///
/// Token length is the column span of the capture; captures are single-line
/// by query design and a capture spanning lines is not split (the
/// subtraction saturates rather than wrapping). Modifier bits are always
/// zero in this token model.
pub fn encode(context: &HighlightContext, captures: &[Capture]) -> Vec<SemanticToken> {
    let mut builder = SemanticTokensBuilder::new();

    for capture in captures {
        let start = capture.range.start_point;
        let end = capture.range.end_point;
        let length = end.column.saturating_sub(start.column);

        builder.push(
            start.row as u32,
            start.column as u32,
            length as u32,
            context.token_type_index(capture.index),
        );
    }

    builder.build()
}
