//! `tower_lsp::LanguageServer` implementation for the backend:
//! lifecycle (initialize, initialized, shutdown), document lifecycle
//! (did_open, did_change, did_close), and the semantic token requests
//! (full, full delta).

use std::sync::Arc;

use tower_lsp::jsonrpc;
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::{
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    InitializeParams, InitializeResult, InitializedParams, MessageType, SemanticToken,
    SemanticTokens,
    SemanticTokensDelta, SemanticTokensDeltaParams, SemanticTokensFullDeltaResult,
    SemanticTokensFullOptions, SemanticTokensOptions, SemanticTokensParams,
    SemanticTokensResult, SemanticTokensServerCapabilities, ServerCapabilities,
    TextDocumentSyncCapability, TextDocumentSyncKind,
};
use tower_lsp::LanguageServer;
use tracing::{debug, error, info, warn};

use crate::highlight::{captures, tokens};
use crate::lsp::models::{LspDocument, StoredTokens};
use crate::tree_cache::ParseError;

use super::state::Backend;

impl Backend {
    /// Recomputes the token stream for a document from its current text and
    /// stores it as the document's last published result.
    async fn compute_tokens(
        &self,
        document: &Arc<LspDocument>,
    ) -> Result<(String, Vec<SemanticToken>), ParseError> {
        let (uri, text, version) = {
            let state = document.state.read().await;
            (state.uri.clone(), state.text.to_string(), state.version)
        };

        let data = {
            let mut trees = self.trees.lock().await;
            let tree = trees.ensure_parsed(&uri, &text)?;
            let collected = captures::collect(self.context.query(), tree, text.as_bytes());
            tokens::encode(&self.context, &collected)
        };

        debug!("Generated {} semantic tokens for {}", data.len(), uri);

        let result_id = format!("ver-{version}");
        {
            let mut state = document.state.write().await;
            state.last_tokens = Some(StoredTokens {
                result_id: result_id.clone(),
                data: data.clone(),
            });
        }

        Ok((result_id, data))
    }

    fn document(&self, uri: &tower_lsp::lsp_types::Url) -> Option<Arc<LspDocument>> {
        self.documents.get(uri).map(|entry| entry.value().clone())
    }
}

fn internal_error(err: impl std::fmt::Display) -> jsonrpc::Error {
    let mut rpc_err = jsonrpc::Error::internal_error();
    rpc_err.message = err.to_string().into();
    rpc_err
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, _: InitializeParams) -> LspResult<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                semantic_tokens_provider: Some(
                    SemanticTokensServerCapabilities::SemanticTokensOptions(
                        SemanticTokensOptions {
                            legend: self.context.legend(),
                            full: Some(SemanticTokensFullOptions::Delta { delta: Some(true) }),
                            range: None,
                            ..Default::default()
                        },
                    ),
                ),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("Server initialized");
        self.client
            .log_message(MessageType::INFO, "semantic highlighting ready")
            .await;
    }

    async fn shutdown(&self) -> LspResult<()> {
        info!("Received shutdown request, releasing cached trees");
        self.trees.lock().await.clear();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        let version = params.text_document.version;
        info!("Opening document: URI={}, version={}", uri, version);

        let document = Arc::new(LspDocument::new(uri.clone(), &text, version));
        self.documents.insert(uri.clone(), document);

        let mut trees = self.trees.lock().await;
        // A re-opened document starts from scratch; any stale tree under the
        // same URI must not serve as a reuse hint for unrelated text.
        trees.close(&uri);
        if let Err(e) = trees.ensure_parsed(&uri, &text) {
            error!("Initial parse failed: {}", e);
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        debug!("textDocument/didChange: URI={}, version={}", uri, version);

        let Some(document) = self.document(&uri) else {
            warn!("Failed to find document with URI={}", uri);
            return;
        };

        let update = match document.apply(&params.content_changes, version).await {
            Ok(update) => update,
            Err(e) => {
                warn!("Dropping changes for {}: {}", uri, e);
                return;
            }
        };

        let mut trees = self.trees.lock().await;
        if update.invalidated {
            trees.close(&uri);
        }
        for edit in &update.edits {
            trees.apply_edit(&uri, edit);
        }
        if let Err(e) = trees.ensure_parsed(&uri, &update.text) {
            // The previous tree stays cached; the next request retries.
            warn!("Reparse failed: {}", e);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        info!("textDocument/didClose: URI={}", uri);

        if self.documents.remove(&uri).is_none() {
            warn!("Failed to find document with URI={}", uri);
        }
        self.trees.lock().await.close(&uri);
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> LspResult<Option<SemanticTokensResult>> {
        let uri = params.text_document.uri;
        debug!("Semantic tokens request for: {}", uri);

        let Some(document) = self.document(&uri) else {
            warn!("Failed to find document with URI={}", uri);
            return Ok(None);
        };

        let (result_id, data) = self.compute_tokens(&document).await.map_err(|e| {
            error!("Semantic tokens failed: {}", e);
            internal_error(e)
        })?;

        Ok(Some(SemanticTokensResult::Tokens(SemanticTokens {
            result_id: Some(result_id),
            data,
        })))
    }

    async fn semantic_tokens_full_delta(
        &self,
        params: SemanticTokensDeltaParams,
    ) -> LspResult<Option<SemanticTokensFullDeltaResult>> {
        let uri = params.text_document.uri;
        debug!("Semantic tokens delta request for: {}", uri);

        let Some(document) = self.document(&uri) else {
            warn!("Failed to find document with URI={}", uri);
            return Ok(None);
        };

        let previous = {
            let state = document.state.read().await;
            state.last_tokens.clone()
        };

        let (result_id, data) = self.compute_tokens(&document).await.map_err(|e| {
            error!("Semantic tokens delta failed: {}", e);
            internal_error(e)
        })?;

        // Always a fresh recomputation; when nothing changed since the
        // result the client is holding, an empty edit list says so.
        if let Some(prev) = previous {
            if prev.result_id == params.previous_result_id && prev.data == data {
                return Ok(Some(SemanticTokensFullDeltaResult::TokensDelta(
                    SemanticTokensDelta {
                        result_id: Some(result_id),
                        edits: Vec::new(),
                    },
                )));
            }
        }

        Ok(Some(SemanticTokensFullDeltaResult::Tokens(SemanticTokens {
            result_id: Some(result_id),
            data,
        })))
    }
}
