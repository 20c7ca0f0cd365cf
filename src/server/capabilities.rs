//! `initialize` and `initialized`: capability advertisement and startup.

use super::Backend;
use super::commands::COMMANDS;
use crate::position::POSITION_ENCODING;
use tower_lsp::lsp_types::*;
use tracing::{debug, info};

impl Backend {
    pub(crate) async fn handle_initialize(&self, params: InitializeParams) -> InitializeResult {
        if let Some(options) = params.initialization_options.as_ref() {
            self.apply_settings(options).await;
        } else {
            let settings = self.settings.read().await;
            self.hover.configure(&settings);
        }

        InitializeResult {
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: ServerCapabilities {
                position_encoding: Some(POSITION_ENCODING),
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        ..Default::default()
                    },
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
                    work_done_progress_options: Default::default(),
                }),
                ..ServerCapabilities::default()
            },
            ..Default::default()
        }
    }

    pub(crate) async fn handle_initialized(&self) {
        let provider = self.hover.translator().provider_name().to_string();
        debug!(provider, "initialized");
        self.client
            .log_message(
                MessageType::INFO,
                format!("comment translation ready ({provider})"),
            )
            .await;
        info!(provider, "server initialized");
    }
}
