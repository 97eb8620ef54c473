//! Applying editor change batches to document state.
//!
//! Each incremental change is translated into an edit descriptor against the
//! rope as it stands *before* that change, then the rope is mutated, so the
//! descriptors of a batch compose exactly like the editor produced them.

use ropey::Rope;
use thiserror::Error;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent};
use tracing::debug;
use tree_sitter::{InputEdit, Point};

use crate::edit::input_edit;
use crate::lsp::models::{LspDocument, LspDocumentState};

/// A change batch was rejected before any mutation happened.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("version {received} is not newer than {current}")]
    StaleVersion { received: i32, current: i32 },
}

/// The outcome of applying one change batch.
pub struct DocumentUpdate {
    /// Full document text after the batch.
    pub text: String,
    /// Edit descriptors in arrival order, for aging a cached syntax tree.
    pub edits: Vec<InputEdit>,
    /// True when a whole-document replacement made prior tree state useless.
    pub invalidated: bool,
}

/// Converts an LSP position (line + UTF-16 code-unit column) to a byte
/// offset in the rope.
///
/// Positions past the end of a line clamp to the line's content end, before
/// the terminator; lines past the end of the document clamp to the last
/// line.
pub fn position_to_byte(text: &Rope, position: &Position) -> usize {
    let line = (position.line as usize).min(text.len_lines().saturating_sub(1));
    let line_start = text.line_to_char(line);

    let mut code_units = 0u32;
    let mut chars = 0usize;
    for ch in text.line(line).chars() {
        if code_units >= position.character || ch == '\n' || ch == '\r' {
            break;
        }
        code_units += ch.len_utf16() as u32;
        chars += 1;
    }

    text.char_to_byte(line_start + chars)
}

/// Converts an LSP position to a tree-sitter point with a byte column.
pub fn position_to_point(text: &Rope, position: &Position) -> Point {
    let byte = position_to_byte(text, position);
    let row = text.byte_to_line(byte);
    Point {
        row,
        column: byte - text.line_to_byte(row),
    }
}

impl LspDocumentState {
    /// Applies a change batch in arrival order, updating the rope and
    /// collecting the edit descriptors for the syntax tree.
    ///
    /// Returns an error without touching anything when `version` is not
    /// strictly newer than the stored version.
    pub fn apply(
        &mut self,
        changes: &[TextDocumentContentChangeEvent],
        version: i32,
    ) -> Result<DocumentUpdate, ApplyError> {
        if version <= self.version {
            return Err(ApplyError::StaleVersion {
                received: version,
                current: self.version,
            });
        }

        let mut edits = Vec::with_capacity(changes.len());
        let mut invalidated = false;

        for change in changes {
            match change.range {
                Some(range) => {
                    let start_byte = position_to_byte(&self.text, &range.start);
                    let end_byte = position_to_byte(&self.text, &range.end);
                    let start = position_to_point(&self.text, &range.start);
                    let old_end = position_to_point(&self.text, &range.end);

                    edits.push(input_edit(
                        start,
                        old_end,
                        start_byte,
                        end_byte - start_byte,
                        &change.text,
                    ));

                    let start_char = self.text.byte_to_char(start_byte);
                    let end_char = self.text.byte_to_char(end_byte);
                    self.text.remove(start_char..end_char);
                    self.text.insert(start_char, &change.text);
                }
                None => {
                    debug!("Whole-document replacement for {}", self.uri);
                    self.text = Rope::from_str(&change.text);
                    edits.clear();
                    invalidated = true;
                }
            }
        }

        self.version = version;
        Ok(DocumentUpdate {
            text: self.text.to_string(),
            edits,
            invalidated,
        })
    }
}

impl LspDocument {
    /// Returns the current text of the document as a string.
    pub async fn text(&self) -> String {
        self.state.read().await.text.to_string()
    }

    /// Returns the current version of the document.
    pub async fn version(&self) -> i32 {
        self.state.read().await.version
    }

    /// Applies changes to the document, see [`LspDocumentState::apply`].
    pub async fn apply(
        &self,
        changes: &[TextDocumentContentChangeEvent],
        version: i32,
    ) -> Result<DocumentUpdate, ApplyError> {
        let mut state = self.state.write().await;
        state.apply(changes, version)
    }
}
