//! Document lifecycle, selections and the hover handler.

use super::{Backend, Document, SelectionChangedParams};
use crate::hover::HoverRequest;
use crate::model::CommentBlock;
use crate::position::{range_contains, text_in_range};
use tower_lsp::lsp_types::*;
use tracing::debug;

impl Backend {
    pub(crate) fn handle_did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        debug!(uri = %doc.uri, language_id = %doc.language_id, "opened");
        self.documents.insert(
            doc.uri,
            Document {
                text: doc.text,
                language_id: doc.language_id,
            },
        );
    }

    /// Full sync: the last change carries the whole text
    pub(crate) fn handle_did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        match self.documents.get_mut(&uri) {
            Some(mut doc) => doc.text = change.text,
            None => debug!(%uri, "change for unknown document"),
        }
        // Offsets of old selections no longer apply
        self.selections.remove(&uri);
    }

    pub(crate) fn handle_did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri);
        self.selections.remove(&uri);
    }

    /// `commentTranslate/selectionChanged` notification
    pub async fn selection_changed(&self, params: SelectionChangedParams) {
        let uri = params.text_document.uri;
        let selections: Vec<Range> = params
            .selections
            .into_iter()
            .filter(|range| range.start != range.end)
            .collect();
        debug!(%uri, count = selections.len(), "selections changed");
        if selections.is_empty() {
            self.selections.remove(&uri);
        } else {
            self.selections.insert(uri, selections);
        }
    }

    /// A non-empty selection in `uri` that contains `position`
    pub(crate) fn selection_at(&self, uri: &Url, text: &str, position: Position) -> Option<CommentBlock> {
        let selections = self.selections.get(uri)?;
        let range = *selections
            .iter()
            .find(|range| range_contains(**range, position))?;
        let selected = text_in_range(text, range)?;
        Some(CommentBlock::selection(range, selected))
    }

    pub(crate) async fn handle_hover(&self, params: HoverParams) -> Option<Hover> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let (text, language_id) = {
            let doc = self.documents.get(&uri)?;
            (doc.text.clone(), doc.language_id.clone())
        };
        let request = HoverRequest {
            selection: self.selection_at(&uri, &text, position),
            uri,
            language_id,
            text,
            position,
        };

        let settings = self.settings.read().await.clone();
        self.hover.provide(&self.client, &request, &settings).await
    }
}
