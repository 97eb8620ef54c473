//! Backend state management.
//!
//! The backend holds the open-document table, the per-document syntax trees,
//! and the highlight context compiled at startup. The context is constructed
//! in `main` and passed in here; nothing reads it before it exists.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tower_lsp::lsp_types::Url;
use tower_lsp::Client;

use crate::highlight::HighlightContext;
use crate::lsp::models::LspDocument;
use crate::tree_cache::TreeCache;

/// The semantic highlighting backend, managing state and handling LSP
/// requests.
pub struct Backend {
    pub(super) client: Client,
    pub(super) context: Arc<HighlightContext>,
    pub(super) documents: DashMap<Url, Arc<LspDocument>>,
    /// Tree operations for a document must be serialized (edit application
    /// and reparse race otherwise); one lock over the cache satisfies that.
    pub(super) trees: Arc<Mutex<TreeCache>>,
}

impl Backend {
    pub fn new(client: Client, context: Arc<HighlightContext>, trees: Arc<Mutex<TreeCache>>) -> Self {
        Self {
            client,
            context,
            documents: DashMap::new(),
            trees,
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("documents_count", &self.documents.len())
            .finish()
    }
}
