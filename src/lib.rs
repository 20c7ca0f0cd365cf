//! Comment translation for editors.
//!
//! Finds the comment or selection under the cursor and shows its machine
//! translation as a hover. Served over LSP by the `comment-translate-ls`
//! binary.

pub mod compile;
pub mod config;
pub mod hover;
pub mod locator;
pub mod model;
pub mod mt;
pub mod position;
pub mod server;
pub mod text;

// Re-export the pipeline types for convenient access
pub use compile::BlockCompiler;
pub use config::Settings;
pub use hover::{HoverHost, HoverProvider, HoverRequest};
pub use locator::{CommentLocator, TreeSitterLocator};
pub use model::{CommentBlock, CommentToken, ScopeSpan, SourceSpan, TranslationResult};
pub use text::{combine_lines, humanize, strip_ignored};

#[cfg(test)]
mod integration_tests;
