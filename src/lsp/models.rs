use ropey::Rope;
use tower_lsp::lsp_types::{SemanticToken, Url};

/// The most recently published token set for a document, kept so the
/// full-delta request can answer "nothing changed" without re-sending data.
#[derive(Debug, Clone)]
pub struct StoredTokens {
    pub result_id: String,
    pub data: Vec<SemanticToken>,
}

/// State for an open text document managed by the server.
#[derive(Debug)]
pub struct LspDocumentState {
    pub uri: Url,
    pub text: Rope,
    pub version: i32,
    pub last_tokens: Option<StoredTokens>,
}

/// An open document: its state behind an async lock.
#[derive(Debug)]
pub struct LspDocument {
    pub state: tokio::sync::RwLock<LspDocumentState>,
}

impl LspDocument {
    pub fn new(uri: Url, text: &str, version: i32) -> Self {
        Self {
            state: tokio::sync::RwLock::new(LspDocumentState {
                uri,
                text: Rope::from_str(text),
                version,
                last_tokens: None,
            }),
        }
    }
}
