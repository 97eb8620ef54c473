//! Per-document syntax tree ownership and incremental reparsing.
//!
//! The cache holds at most one tree per open document. Text edits age the
//! cached tree in place via [`TreeCache::apply_edit`]; the next
//! [`TreeCache::ensure_parsed`] reparses the full text with the edited tree
//! as a reuse hint, so unchanged subtrees are recycled rather than rebuilt.

use std::collections::HashMap;

use thiserror::Error;
use tower_lsp::lsp_types::Url;
use tracing::{debug, warn};
use tree_sitter::{InputEdit, Language, LanguageError, Parser, Tree};

/// The parser produced no tree for the given document.
///
/// The cache entry for the document, if any, is left untouched so the caller
/// can retry on the next edit.
#[derive(Debug, Error)]
#[error("parse produced no tree for {uri}")]
pub struct ParseError {
    pub uri: Url,
}

/// Owns the parser and one syntax tree per open document.
///
/// Callers must serialize operations touching the same document; operations
/// for different documents carry no ordering requirement beyond that.
pub struct TreeCache {
    parser: Parser,
    trees: HashMap<Url, Tree>,
}

impl TreeCache {
    pub fn new(language: &Language) -> Result<Self, LanguageError> {
        let mut parser = Parser::new();
        parser.set_language(language)?;
        Ok(Self {
            parser,
            trees: HashMap::new(),
        })
    }

    /// Ages the cached tree with one edit descriptor.
    ///
    /// Mutates position bookkeeping only; no reparse happens here. When no
    /// tree is cached there is nothing to update and the call is a no-op;
    /// the next [`TreeCache::ensure_parsed`] cold-parses anyway. Batched
    /// edits must be applied in arrival order: each descriptor's coordinates
    /// assume all earlier edits in the batch have been applied.
    pub fn apply_edit(&mut self, uri: &Url, edit: &InputEdit) {
        if let Some(tree) = self.trees.get_mut(uri) {
            tree.edit(edit);
        } else {
            debug!("No cached tree for {}, skipping edit", uri);
        }
    }

    /// Parses `text` and caches the result, reusing the edited tree for the
    /// document as an incremental hint when one exists.
    ///
    /// The superseded tree is released only after the new parse succeeds. On
    /// failure the previous tree stays cached and usable.
    pub fn ensure_parsed(&mut self, uri: &Url, text: &str) -> Result<&Tree, ParseError> {
        let previous = self.trees.get(uri);
        match self.parser.parse(text, previous) {
            Some(tree) => {
                self.trees.insert(uri.clone(), tree);
                Ok(&self.trees[uri])
            }
            None => {
                warn!("Parser returned no tree for {}", uri);
                Err(ParseError { uri: uri.clone() })
            }
        }
    }

    /// Drops the cached tree for a document. Idempotent.
    pub fn close(&mut self, uri: &Url) {
        if self.trees.remove(uri).is_some() {
            debug!("Released tree for {}", uri);
        }
    }

    /// Releases every cached tree. Used on server shutdown.
    pub fn clear(&mut self) {
        self.trees.clear();
    }

    pub fn contains(&self, uri: &Url) -> bool {
        self.trees.contains_key(uri)
    }
}
