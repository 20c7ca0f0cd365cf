//! `workspace/executeCommand` handlers.

use super::Backend;
use crate::model::CommentBlock;
use serde_json::Value;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tracing::debug;

/// `[uri]`: mark the document live for concise mode
pub const MARK_LIVE: &str = "commentTranslate.markLive";
/// `[text, target?]`: translate text, returns a `TranslationResult`
pub const TRANSLATE: &str = "commentTranslate.translate";
/// `[uri]`: range of the last comment hover in the document
pub const LAST_HOVER: &str = "commentTranslate.lastHover";

pub const COMMANDS: [&str; 3] = [MARK_LIVE, TRANSLATE, LAST_HOVER];

fn string_arg(args: &[Value], index: usize) -> Option<&str> {
    args.get(index).and_then(Value::as_str)
}

fn uri_arg(args: &[Value]) -> Result<Url> {
    string_arg(args, 0)
        .and_then(|s| Url::parse(s).ok())
        .ok_or_else(|| Error::invalid_params("expected a document URI as the first argument"))
}

impl Backend {
    pub(crate) async fn handle_execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> Result<Option<Value>> {
        let args = params.arguments;
        debug!(command = %params.command, args = args.len(), "execute command");

        match params.command.as_str() {
            MARK_LIVE => {
                let uri = uri_arg(&args)?;
                self.hover.mark_live(&uri);
                Ok(None)
            }
            LAST_HOVER => {
                let uri = uri_arg(&args)?;
                Ok(self
                    .hover
                    .last_hover(&uri)
                    .and_then(|range| serde_json::to_value(range).ok()))
            }
            TRANSLATE => {
                let text = string_arg(&args, 0)
                    .ok_or_else(|| Error::invalid_params("expected the text to translate"))?;
                let settings = self.settings.read().await.clone();
                let target = string_arg(&args, 1)
                    .filter(|t| !t.is_empty())
                    .unwrap_or(settings.target_language.as_str());

                let block = CommentBlock::selection(Range::default(), text);
                let Some(result) = self
                    .hover
                    .compiler(&settings)
                    .compile(&block, "plaintext", Some(target))
                    .await
                else {
                    return Ok(None);
                };
                serde_json::to_value(result)
                    .map(Some)
                    .map_err(|_| Error::internal_error())
            }
            other => Err(Error::invalid_params(format!("unknown command: {other}"))),
        }
    }
}
