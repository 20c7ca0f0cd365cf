//! Messages between this server and the editor beyond standard LSP.

use crate::hover::HoverHost;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tower_lsp::Client;
use tower_lsp::lsp_types::request::Request;
use tower_lsp::lsp_types::*;
use tracing::warn;

/// Server → client request for every hover the editor shows at a position
///
/// Clients answer by running their own hover providers (VS Code:
/// `vscode.executeHoverProvider`).
#[derive(Debug)]
pub enum HoverProviders {}

impl Request for HoverProviders {
    type Params = TextDocumentPositionParams;
    type Result = Vec<Hover>;
    const METHOD: &'static str = "commentTranslate/hoverProviders";
}

/// Params of the `commentTranslate/selectionChanged` notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionChangedParams {
    pub text_document: TextDocumentIdentifier,
    #[serde(default)]
    pub selections: Vec<Range>,
}

pub const SELECTION_CHANGED: &str = "commentTranslate/selectionChanged";

#[async_trait]
impl HoverHost for Client {
    async fn hovers_at(&self, uri: &Url, position: Position) -> Vec<Hover> {
        let params = TextDocumentPositionParams {
            text_document: TextDocumentIdentifier::new(uri.clone()),
            position,
        };
        match self.send_request::<HoverProviders>(params).await {
            Ok(hovers) => hovers,
            Err(e) => {
                warn!(%uri, error = %e, "client hover request failed");
                Vec::new()
            }
        }
    }

    async fn log_error(&self, message: String) {
        self.log_message(MessageType::ERROR, message).await;
    }
}
