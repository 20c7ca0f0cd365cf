use clap::{Arg, Command};
use comment_translate::config::{DEFAULT_TARGET_LANGUAGE, Settings};
use comment_translate::hover::HoverProvider;
use comment_translate::locator::TreeSitterLocator;
use comment_translate::mt::{
    GoogleOptions, GoogleTranslateProvider, MachineTranslator, MockMode, MockTranslator,
    TranslateManager, normalize_locale,
};
use comment_translate::server::Backend;
use comment_translate::server::host::SELECTION_CHANGED;
use std::sync::Arc;
use std::time::Duration;
use tower_lsp::{LspService, Server};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("comment-translate-ls")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Language server that translates comments on hover")
        .arg(
            Arg::new("target-language")
                .long("target-language")
                .short('t')
                .help("Language to translate into when the client sets none")
                .default_value(DEFAULT_TARGET_LANGUAGE),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help("Log filter used when RUST_LOG is unset (logs go to stderr)")
                .default_value("info"),
        )
        .arg(
            Arg::new("timeout-secs")
                .long("timeout-secs")
                .help("Per-request timeout for translation backends")
                .value_parser(clap::value_parser!(u64))
                .default_value("10"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .help("Use the mock translator instead of Google Translate")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("info");
    // stdout carries the LSP stream
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let target_language = matches
        .get_one::<String>("target-language")
        .map(String::as_str)
        .unwrap_or(DEFAULT_TARGET_LANGUAGE);
    let target_language = normalize_locale(target_language)
        .map_err(|e| format!("Invalid --target-language: {}", e))?;
    let timeout_secs = matches.get_one::<u64>("timeout-secs").copied().unwrap_or(10);

    let provider: Arc<dyn MachineTranslator> = if matches.get_flag("mock") {
        Arc::new(MockTranslator::new(MockMode::Suffix))
    } else {
        let options = GoogleOptions {
            timeout: Duration::from_secs(timeout_secs),
            ..GoogleOptions::default()
        };
        Arc::new(
            GoogleTranslateProvider::new(options)
                .map_err(|e| format!("Failed to initialize translator: {}", e))?,
        )
    };

    let translator = TranslateManager::new(provider);
    info!(
        provider = translator.provider_name(),
        target_language = %target_language,
        "starting comment translation server"
    );

    let hover = Arc::new(HoverProvider::new(
        translator,
        Arc::new(TreeSitterLocator::new()),
    ));
    let settings = Settings::with_target(&target_language);

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(|client| Backend::new(client, hover, settings))
        .custom_method(SELECTION_CHANGED, Backend::selection_changed)
        .finish();

    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
