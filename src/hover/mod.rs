/// Hover Module
///
/// Produces the translated hover for a document position. Two sources are
/// tried in order:
///
/// 1. **Comment hover** - the selection under the cursor, or else the comment
///    found by the locator, compiled and rendered as a code block
/// 2. **Content hover** - every other hover the client shows at the position,
///    with its prose re-translated
///
/// The content hover asks the client for those hovers, which makes the client
/// send a hover request for the same position back to this server. The
/// [`HoverGuard`] answers that nested request with `None`.
pub mod guard;
pub mod liveness;
pub mod markdown;
pub mod render;

pub use guard::{HoverGuard, InFlight, hover_key};
pub use liveness::{LastHovers, ShortLive};
pub use markdown::{TranslatedMarkdown, extract_text, translate_markdown};

use crate::compile::BlockCompiler;
use crate::config::Settings;
use crate::locator::CommentLocator;
use crate::model::CommentBlock;
use crate::mt::{TranslateManager, TranslateOptions};
use async_trait::async_trait;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tower_lsp::lsp_types::{Hover, Position, Range, Url};
use tracing::{debug, warn};

/// The editor side of a hover: its other hovers and its log
#[async_trait]
pub trait HoverHost: Send + Sync {
    async fn hovers_at(&self, uri: &Url, position: Position) -> Vec<Hover>;

    /// Report a failure the user can look up after seeing the error notice
    async fn log_error(&self, _message: String) {}
}

/// One hover request with the document state it needs
#[derive(Debug, Clone)]
pub struct HoverRequest {
    pub uri: Url,
    pub language_id: String,
    /// Full document text
    pub text: String,
    pub position: Position,
    /// A selection containing `position`, preferred over comment lookup
    pub selection: Option<CommentBlock>,
}

pub struct HoverProvider {
    translator: TranslateManager,
    locator: Arc<dyn CommentLocator>,
    guard: HoverGuard,
    live: ShortLive<String>,
    last: LastHovers,
}

impl HoverProvider {
    pub fn new(translator: TranslateManager, locator: Arc<dyn CommentLocator>) -> Self {
        Self {
            translator,
            locator,
            guard: HoverGuard::new(),
            live: ShortLive::default(),
            last: LastHovers::new(),
        }
    }

    pub fn translator(&self) -> &TranslateManager {
        &self.translator
    }

    pub fn guard(&self) -> &HoverGuard {
        &self.guard
    }

    /// Apply settings that outlive a single request
    pub fn configure(&self, settings: &Settings) {
        self.live.set_ttl(settings.hover.live_ms.map(Duration::from_millis));
        self.translator.configure(settings);
    }

    /// Mark `uri` as the document comment hovers are shown for in concise mode
    pub fn mark_live(&self, uri: &Url) {
        self.live.mark(uri.to_string());
    }

    pub fn is_live(&self, uri: &Url) -> bool {
        self.live.is_live(&uri.to_string())
    }

    /// Range of the last comment hover shown in `uri`
    pub fn last_hover(&self, uri: &Url) -> Option<Range> {
        self.last.get(uri)
    }

    /// Drop all session state
    pub fn reset(&self) {
        self.guard.clear();
        self.live.clear();
        self.last.clear();
    }

    pub fn compiler(&self, settings: &Settings) -> BlockCompiler {
        BlockCompiler::new(self.translator.clone(), settings.ignore.clone())
            .with_source_language(&settings.source_language)
    }

    pub async fn provide(
        &self,
        host: &dyn HoverHost,
        request: &HoverRequest,
        settings: &Settings,
    ) -> Option<Hover> {
        if !settings.hover.enabled {
            return None;
        }

        let key = hover_key(&request.uri, request.position);
        if self.guard.is_in_flight(&key) {
            debug!(key, "nested hover request ignored");
            return None;
        }

        if let Some(hover) = self.comment_hover(host, request, settings).await {
            return Some(hover);
        }
        if settings.hover.content {
            return self.content_hover(host, request, settings, key).await;
        }
        None
    }

    async fn comment_hover(
        &self,
        host: &dyn HoverHost,
        request: &HoverRequest,
        settings: &Settings,
    ) -> Option<Hover> {
        if settings.hover.concise && !self.is_live(&request.uri) {
            debug!(uri = %request.uri, "concise mode, document not live");
            return None;
        }

        let block = match &request.selection {
            Some(selection) => selection.clone(),
            None => self
                .locator
                .locate(&request.text, &request.language_id, request.position)?,
        };
        let target = Some(settings.target_language.as_str()).filter(|t| !t.is_empty());
        let Some(result) = self
            .compiler(settings)
            .compile(&block, &request.language_id, target)
            .await
        else {
            debug!(uri = %request.uri, "nothing to translate under the cursor");
            return None;
        };

        let markdown = if result.is_translated() {
            self.last.record(&request.uri, block.range);
            render::comment_markdown(&result, &request.language_id)
        } else {
            let line = block.range.start.line + 1;
            warn!(uri = %request.uri, line, "comment translation failed");
            host.log_error(format!(
                "{} could not translate the comment at {}:{}",
                self.translator.provider_name(),
                request.uri,
                line
            ))
            .await;
            render::error_markdown(&result)
        };

        let range = if settings.hover.near_show {
            render::near_range(block.range, request.position)
        } else {
            block.range
        };
        Some(render::markdown_hover(markdown, Some(range)))
    }

    async fn content_hover(
        &self,
        host: &dyn HoverHost,
        request: &HoverRequest,
        settings: &Settings,
        key: String,
    ) -> Option<Hover> {
        let hovers = {
            let _in_flight = self.guard.try_enter(key)?;
            host.hovers_at(&request.uri, request.position).await
        };
        if hovers.is_empty() {
            return None;
        }

        let options = TranslateOptions::to(settings.target_language.as_str())
            .with_source(settings.source_language.as_str());
        let range = hovers.iter().find_map(|hover| hover.range);
        let groups: Vec<Vec<String>> = hovers
            .into_iter()
            .map(|hover| markdown::hover_markdown(hover.contents))
            .collect();

        let translated = join_all(
            groups
                .iter()
                .flatten()
                .map(|content| translate_markdown(&self.translator, content, &options)),
        )
        .await;

        let mut translated = translated.into_iter();
        let mut shown = Vec::new();
        for group in &groups {
            let contents: Vec<TranslatedMarkdown> = translated.by_ref().take(group.len()).collect();
            if contents.iter().any(|c| c.has_translated) {
                shown.extend(contents.into_iter().map(|c| c.result));
            }
        }
        debug!(groups = groups.len(), shown = shown.len(), "re-translated hover contents");

        if shown.is_empty() {
            return None;
        }
        Some(render::markdown_hover(shown.join("\n\n---\n\n"), range))
    }
}

impl std::fmt::Debug for HoverProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoverProvider")
            .field("translator", &self.translator)
            .field("in_flight", &self.guard.len())
            .finish()
    }
}
