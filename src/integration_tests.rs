//! End-to-End Tests for the Hover Pipeline
//!
//! These tests run documents through the locator, compiler, hover provider and
//! LSP backend with the mock translator. Tests marked `#[ignore]` talk to the
//! live Google endpoints.
//!
//! # Running Live Tests
//!
//! ```bash
//! cargo test --lib integration_tests -- --ignored --nocapture
//! ```

#[cfg(test)]
mod tests {
    use crate::config::Settings;
    use crate::hover::{HoverHost, HoverProvider, HoverRequest, render};
    use crate::locator::TreeSitterLocator;
    use crate::mt::{
        GoogleOptions, GoogleTranslateProvider, MockMode, MockTranslator, TranslateManager,
    };
    use crate::server::{Backend, SelectionChangedParams};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tower_lsp::LspService;
    use tower_lsp::lsp_types::*;

    const RUST_SOURCE: &str = "/**\n * Loads the configuration.\n * falls back to defaults\n */\nfn load() {}\n";

    fn uri() -> Url {
        Url::parse("file:///project/src/config.rs").unwrap()
    }

    fn provider_with(mock: Arc<MockTranslator>) -> Arc<HoverProvider> {
        Arc::new(HoverProvider::new(
            TranslateManager::new(mock),
            Arc::new(TreeSitterLocator::new()),
        ))
    }

    fn request(text: &str, language_id: &str, line: u32, character: u32) -> HoverRequest {
        HoverRequest {
            uri: uri(),
            language_id: language_id.to_string(),
            text: text.to_string(),
            position: Position::new(line, character),
            selection: None,
        }
    }

    fn markdown(hover: &Hover) -> &str {
        match &hover.contents {
            HoverContents::Markup(markup) => &markup.value,
            other => panic!("unexpected hover contents: {:?}", other),
        }
    }

    fn doc_hover(value: &str) -> Hover {
        Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: value.to_string(),
            }),
            range: Some(Range::new(Position::new(4, 3), Position::new(4, 7))),
        }
    }

    /// Host that answers with fixed hovers and records what it is told
    #[derive(Default)]
    struct RecordingHost {
        hovers: Vec<Hover>,
        errors: Mutex<Vec<String>>,
        delay_ms: u64,
    }

    #[async_trait]
    impl HoverHost for RecordingHost {
        async fn hovers_at(&self, _uri: &Url, _position: Position) -> Vec<Hover> {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            self.hovers.clone()
        }

        async fn log_error(&self, message: String) {
            self.errors.lock().unwrap().push(message);
        }
    }

    /// Host that behaves like an editor: collecting hovers dispatches the same
    /// hover request back to the provider
    struct ReentrantHost {
        provider: Arc<HoverProvider>,
        request: HoverRequest,
        settings: Settings,
        hovers: Vec<Hover>,
        nested: Mutex<Vec<Option<Hover>>>,
    }

    #[async_trait]
    impl HoverHost for ReentrantHost {
        async fn hovers_at(&self, _uri: &Url, _position: Position) -> Vec<Hover> {
            let nested = self
                .provider
                .provide(self, &self.request, &self.settings)
                .await;
            self.nested.lock().unwrap().push(nested);
            self.hovers.clone()
        }
    }

    // ============================================================================
    // Comment hovers
    // ============================================================================

    #[tokio::test]
    async fn test_block_comment_pipeline() {
        let mut mappings = HashMap::new();
        mappings.insert(
            "Loads the configuration. falls back to defaults".to_string(),
            "加载配置，回退到默认值".to_string(),
        );
        let mock = Arc::new(MockTranslator::new(MockMode::Mappings(mappings)));
        let provider = provider_with(mock.clone());

        let hover = provider
            .provide(
                &RecordingHost::default(),
                &request(RUST_SOURCE, "rust", 2, 6),
                &Settings::default(),
            )
            .await
            .unwrap();

        assert_eq!(
            mock.calls(),
            vec!["Loads the configuration. falls back to defaults"]
        );
        assert!(markdown(&hover).starts_with("```rust\n加载配置，回退到默认值\n```\n\n[Mock](mock://auto/zh-CN/"));
        assert_eq!(
            hover.range,
            Some(Range::new(Position::new(0, 0), Position::new(3, 3)))
        );
    }

    #[tokio::test]
    async fn test_python_docstring_pipeline() {
        let source = "def load():\n    \"\"\"Read the file.\n    returns a dict\n    \"\"\"\n";
        let mock = Arc::new(MockTranslator::new(MockMode::Suffix));
        let provider = provider_with(mock.clone());

        let hover = provider
            .provide(
                &RecordingHost::default(),
                &request(source, "python", 2, 8),
                &Settings::with_target("es"),
            )
            .await
            .unwrap();

        assert_eq!(mock.calls(), vec!["Read the file. returns a dict"]);
        assert!(markdown(&hover).starts_with("```python\nRead the file. returns a dict_es\n```"));
    }

    #[tokio::test]
    async fn test_failed_translation_is_reported_to_host() {
        let mock = Arc::new(MockTranslator::new(MockMode::Error("timeout".to_string())));
        let provider = provider_with(mock);
        let host = RecordingHost::default();

        let hover = provider
            .provide(&host, &request(RUST_SOURCE, "rust", 1, 6), &Settings::default())
            .await
            .unwrap();

        assert!(markdown(&hover).starts_with(render::TRANSLATE_ERROR));
        let errors = host.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Mock Translator could not translate"));
        assert!(errors[0].ends_with("config.rs:1"));
    }

    #[tokio::test]
    async fn test_empty_line_comment_has_no_hover() {
        let mock = Arc::new(MockTranslator::new(MockMode::Suffix));
        let provider = provider_with(mock.clone());
        let host = RecordingHost::default();

        let hover = provider
            .provide(&host, &request("//\nfn a() {}\n", "rust", 0, 1), &Settings::default())
            .await;

        assert!(hover.is_none());
        assert!(mock.calls().is_empty());
        assert!(host.errors.lock().unwrap().is_empty());
    }

    // ============================================================================
    // Content re-translation and re-entrancy
    // ============================================================================

    #[tokio::test]
    async fn test_reentrant_host_gets_no_hover_for_nested_request() {
        let mock = Arc::new(MockTranslator::new(MockMode::Suffix));
        let provider = provider_with(mock.clone());
        let settings = Settings::with_target("fr");
        // On `load`, outside any comment
        let req = request(RUST_SOURCE, "rust", 4, 4);

        let host = ReentrantHost {
            provider: provider.clone(),
            request: req.clone(),
            settings: settings.clone(),
            hovers: vec![doc_hover("```rust\nfn load()\n```\n\nLoads the configuration.")],
            nested: Mutex::new(Vec::new()),
        };

        let hover = provider.provide(&host, &req, &settings).await.unwrap();

        assert_eq!(*host.nested.lock().unwrap(), vec![None]);
        assert_eq!(
            markdown(&hover),
            "```rust\nfn load()\n```\n\nLoads the configuration._fr"
        );
        assert_eq!(hover.range, Some(Range::new(Position::new(4, 3), Position::new(4, 7))));
        assert!(provider.guard().is_empty());

        // Once the first lookup is done the same position is served again
        assert!(provider.provide(&host, &req, &settings).await.is_some());
    }

    #[tokio::test]
    async fn test_untranslated_groups_are_dropped() {
        let mock = Arc::new(MockTranslator::new(MockMode::Suffix));
        let provider = provider_with(mock);
        let code_only = Hover {
            range: None,
            ..doc_hover("```rust\nfn load()\n```")
        };
        let host = RecordingHost {
            hovers: vec![code_only, doc_hover("Reads settings from disk.")],
            ..Default::default()
        };

        let hover = provider
            .provide(&host, &request(RUST_SOURCE, "rust", 4, 4), &Settings::with_target("de"))
            .await
            .unwrap();

        assert_eq!(markdown(&hover), "Reads settings from disk._de");
        assert_eq!(hover.range, Some(Range::new(Position::new(4, 3), Position::new(4, 7))));
    }

    #[tokio::test]
    async fn test_content_hover_disabled() {
        let provider = provider_with(Arc::new(MockTranslator::new(MockMode::Suffix)));
        let host = RecordingHost {
            hovers: vec![doc_hover("Reads settings from disk.")],
            ..Default::default()
        };
        let mut settings = Settings::default();
        settings.hover.content = false;

        let hover = provider
            .provide(&host, &request(RUST_SOURCE, "rust", 4, 4), &settings)
            .await;
        assert!(hover.is_none());
    }

    #[tokio::test]
    async fn test_different_positions_run_concurrently() {
        let provider = provider_with(Arc::new(MockTranslator::new(MockMode::Suffix)));
        let host = RecordingHost {
            hovers: vec![doc_hover("Reads settings.")],
            delay_ms: 20,
            ..Default::default()
        };
        let settings = Settings::default();
        let first = request(RUST_SOURCE, "rust", 4, 4);
        let second = request(RUST_SOURCE, "rust", 4, 5);

        let (a, b) = tokio::join!(
            provider.provide(&host, &first, &settings),
            provider.provide(&host, &second, &settings)
        );
        assert!(a.is_some());
        assert!(b.is_some());
    }

    // ============================================================================
    // LSP backend
    // ============================================================================

    #[tokio::test]
    async fn test_backend_selection_hover_and_commands() {
        let mock = Arc::new(MockTranslator::new(MockMode::Suffix));
        let provider = provider_with(mock.clone());
        let (service, _socket) =
            LspService::new(|client| Backend::new(client, provider, Settings::default()));
        let backend = service.inner();

        let init = InitializeParams {
            initialization_options: Some(json!({"commentTranslate": {"targetLanguage": "fr"}})),
            ..Default::default()
        };
        let result = backend.handle_initialize(init).await;
        assert!(result.capabilities.hover_provider.is_some());
        assert_eq!(backend.settings.read().await.target_language, "fr");

        backend.handle_did_open(DidOpenTextDocumentParams {
            text_document: TextDocumentItem::new(
                uri(),
                "rust".to_string(),
                1,
                "let total = getUserName();\n".to_string(),
            ),
        });
        let selected = Range::new(Position::new(0, 12), Position::new(0, 23));
        backend
            .selection_changed(SelectionChangedParams {
                text_document: TextDocumentIdentifier::new(uri()),
                selections: vec![selected],
            })
            .await;

        let hover = backend
            .handle_hover(HoverParams {
                text_document_position_params: TextDocumentPositionParams {
                    text_document: TextDocumentIdentifier::new(uri()),
                    position: Position::new(0, 15),
                },
                work_done_progress_params: Default::default(),
            })
            .await
            .unwrap();
        assert_eq!(
            markdown(&hover),
            "```rust\nget user name:\nget user name_fr\n```\n\n[Mock](mock://auto/fr/get%20user%20name)"
        );
        assert_eq!(hover.range, Some(selected));

        let last = backend
            .handle_execute_command(ExecuteCommandParams {
                command: "commentTranslate.lastHover".to_string(),
                arguments: vec![json!(uri().to_string())],
                work_done_progress_params: Default::default(),
            })
            .await
            .unwrap();
        assert_eq!(last, Some(serde_json::to_value(selected).unwrap()));

        let translated = backend
            .handle_execute_command(ExecuteCommandParams {
                command: "commentTranslate.translate".to_string(),
                arguments: vec![json!("hello world"), json!("de")],
                work_done_progress_params: Default::default(),
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(translated["translatedText"], "hello world_de");
        assert!(translated.get("humanizeText").is_none());

        let unknown = backend
            .handle_execute_command(ExecuteCommandParams {
                command: "commentTranslate.nope".to_string(),
                arguments: Vec::new(),
                work_done_progress_params: Default::default(),
            })
            .await;
        assert!(unknown.is_err());

        let blank = backend
            .handle_execute_command(ExecuteCommandParams {
                command: "commentTranslate.translate".to_string(),
                arguments: vec![json!("   ")],
                work_done_progress_params: Default::default(),
            })
            .await
            .unwrap();
        assert_eq!(blank, None);
    }

    #[tokio::test]
    async fn test_backend_selection_after_astral_character() {
        let mock = Arc::new(MockTranslator::new(MockMode::Suffix));
        let provider = provider_with(mock.clone());
        let (service, _socket) =
            LspService::new(|client| Backend::new(client, provider, Settings::default()));
        let backend = service.inner();

        let result = backend.handle_initialize(InitializeParams::default()).await;
        assert_eq!(
            result.capabilities.position_encoding,
            Some(PositionEncodingKind::UTF16)
        );

        backend.handle_did_open(DidOpenTextDocumentParams {
            text_document: TextDocumentItem::new(
                uri(),
                "rust".to_string(),
                1,
                "let s = \"😀\"; getUserName();\n".to_string(),
            ),
        });
        // Columns in UTF-16 units: the emoji takes two
        let selected = Range::new(Position::new(0, 14), Position::new(0, 25));
        backend
            .selection_changed(SelectionChangedParams {
                text_document: TextDocumentIdentifier::new(uri()),
                selections: vec![selected],
            })
            .await;

        let hover = backend
            .handle_hover(HoverParams {
                text_document_position_params: TextDocumentPositionParams {
                    text_document: TextDocumentIdentifier::new(uri()),
                    position: Position::new(0, 16),
                },
                work_done_progress_params: Default::default(),
            })
            .await
            .unwrap();
        assert_eq!(mock.calls(), vec!["get user name"]);
        assert_eq!(hover.range, Some(selected));
    }

    #[tokio::test]
    async fn test_backend_document_lifecycle() {
        let provider = provider_with(Arc::new(MockTranslator::new(MockMode::Suffix)));
        let (service, _socket) =
            LspService::new(|client| Backend::new(client, provider, Settings::default()));
        let backend = service.inner();

        backend.handle_did_open(DidOpenTextDocumentParams {
            text_document: TextDocumentItem::new(uri(), "rust".to_string(), 1, "fn a() {}".to_string()),
        });
        backend.selections.insert(uri(), vec![Range::new(Position::new(0, 0), Position::new(0, 2))]);

        backend.handle_did_change(DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier::new(uri(), 2),
            content_changes: vec![TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "// changed\nfn a() {}".to_string(),
            }],
        });
        assert_eq!(backend.documents.get(&uri()).unwrap().text, "// changed\nfn a() {}");
        assert!(backend.selections.get(&uri()).is_none());

        backend.handle_did_close(DidCloseTextDocumentParams {
            text_document: TextDocumentIdentifier::new(uri()),
        });
        assert!(backend.documents.is_empty());
    }

    #[tokio::test]
    async fn test_backend_configuration_change() {
        let provider = provider_with(Arc::new(MockTranslator::new(MockMode::Suffix)));
        let (service, _socket) =
            LspService::new(|client| Backend::new(client, provider, Settings::with_target("ja")));
        let backend = service.inner();

        backend
            .apply_settings(&json!({"hover": {"concise": true, "liveMs": 500}}))
            .await;
        let settings = backend.settings.read().await;
        assert!(settings.hover.concise);
        assert_eq!(settings.hover.live_ms, Some(500));
        assert_eq!(settings.target_language, "ja");
    }

    // ============================================================================
    // Live endpoints
    // ============================================================================

    #[tokio::test]
    #[ignore]
    async fn test_live_google_comment_hover() {
        let google = GoogleTranslateProvider::new(GoogleOptions::default()).unwrap();
        let provider = Arc::new(HoverProvider::new(
            TranslateManager::new(Arc::new(google)),
            Arc::new(TreeSitterLocator::new()),
        ));

        let hover = provider
            .provide(
                &RecordingHost::default(),
                &request(RUST_SOURCE, "rust", 1, 6),
                &Settings::with_target("zh-CN"),
            )
            .await
            .unwrap();

        println!("{}", markdown(&hover));
        assert!(markdown(&hover).starts_with("```rust\n"));
        assert!(!markdown(&hover).starts_with(render::TRANSLATE_ERROR));
    }
}
