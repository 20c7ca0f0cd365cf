//! LSP server: document state, configuration and the hover entry point.

pub mod capabilities;
pub mod commands;
pub mod documents;
pub mod host;

pub use host::{HoverProviders, SelectionChangedParams};

use crate::config::Settings;
use crate::hover::HoverProvider;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::info;

/// Text and language of an open document
#[derive(Debug, Clone)]
pub struct Document {
    pub text: String,
    pub language_id: String,
}

/// The LSP backend state shared across all handlers
#[derive(Debug)]
pub struct Backend {
    pub client: Client,
    pub documents: DashMap<Url, Document>,
    /// Latest selections reported by the client, per document
    pub selections: DashMap<Url, Vec<Range>>,
    pub settings: RwLock<Settings>,
    pub hover: Arc<HoverProvider>,
}

impl Backend {
    pub fn new(client: Client, hover: Arc<HoverProvider>, settings: Settings) -> Self {
        Self {
            client,
            documents: DashMap::new(),
            selections: DashMap::new(),
            settings: RwLock::new(settings),
            hover,
        }
    }

    /// Merge a client settings payload into the current settings
    pub(crate) async fn apply_settings(&self, value: &Value) {
        let mut settings = self.settings.write().await;
        let updated = Settings::from_value(value, &settings);
        *settings = updated;
        self.hover.configure(&settings);
        info!(
            target_language = %settings.target_language,
            concise = settings.hover.concise,
            content = settings.hover.content,
            "settings applied"
        );
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        Ok(self.handle_initialize(params).await)
    }

    async fn initialized(&self, _: InitializedParams) {
        self.handle_initialized().await;
    }

    async fn shutdown(&self) -> Result<()> {
        self.hover.reset();
        self.documents.clear();
        self.selections.clear();
        info!("shutdown");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.handle_did_open(params);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        self.handle_did_change(params);
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.handle_did_close(params);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.apply_settings(&params.settings).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        Ok(self.handle_hover(params).await)
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        self.handle_execute_command(params).await
    }
}
