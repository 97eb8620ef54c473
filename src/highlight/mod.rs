//! Highlight query compilation, capture collection, and token encoding.
//!
//! A [`HighlightContext`] is built once at startup from the grammar and the
//! highlight query source, then shared by reference with everything that
//! needs it. The legend handed to the client is read structurally from the
//! compiled query's own capture names, so every capture the query can emit
//! already has a token type index: there is no name list to drift out of
//! sync with the patterns.

pub mod captures;
pub mod tokens;

use tower_lsp::lsp_types::{SemanticTokenType, SemanticTokensLegend};
use tree_sitter::{Language, Query, QueryError};

/// Compiled highlight query plus the token legend derived from it.
pub struct HighlightContext {
    language: Language,
    query: Query,
    /// Token type names in legend order (capture names, first occurrence wins).
    token_types: Vec<String>,
    /// Capture index -> index into `token_types`.
    capture_token_types: Vec<u32>,
}

impl HighlightContext {
    /// Compiles `query_source` against `language` and derives the legend.
    ///
    /// The query commonly names the same capture in several patterns;
    /// duplicates collapse onto one legend entry, keeping the order in which
    /// names first appear.
    pub fn new(language: Language, query_source: &str) -> Result<Self, QueryError> {
        let query = Query::new(&language, query_source)?;

        let mut token_types: Vec<String> = Vec::new();
        let mut capture_token_types = Vec::with_capacity(query.capture_names().len());
        for name in query.capture_names() {
            match token_types.iter().position(|t| t.as_str() == *name) {
                Some(index) => capture_token_types.push(index as u32),
                None => {
                    capture_token_types.push(token_types.len() as u32);
                    token_types.push((*name).to_string());
                }
            }
        }

        Ok(Self {
            language,
            query,
            token_types,
            capture_token_types,
        })
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The legend advertised in the server capabilities. Modifiers are not
    /// part of this token model and the modifier list stays empty.
    pub fn legend(&self) -> SemanticTokensLegend {
        SemanticTokensLegend {
            token_types: self
                .token_types
                .iter()
                .map(|name| SemanticTokenType::from(name.clone()))
                .collect(),
            token_modifiers: Vec::new(),
        }
    }

    /// Resolves a query capture index to its legend index.
    pub fn token_type_index(&self, capture_index: u32) -> u32 {
        self.capture_token_types[capture_index as usize]
    }
}
