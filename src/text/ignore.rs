//! Removal of comment decoration from token content.

use crate::model::CommentToken;
use crate::mt::error::{MtError, MtResult};
use regex::Regex;

/// Advance each token's `ignore_start` past a leading match of `pattern`
///
/// `pattern` is a regular expression fragment, e.g. `[\*\s]+` for the
/// ` * ` prefix of block comment continuation lines. It is anchored at the
/// start of each token's valid text. An empty pattern leaves the tokens
/// untouched, and re-running with the same pattern finds nothing new.
///
/// # Errors
///
/// `MtError::InvalidPattern` when `pattern` does not compile; no token is
/// modified in that case.
pub fn strip_ignored<'a>(
    tokens: &'a mut [CommentToken],
    pattern: &str,
) -> MtResult<&'a mut [CommentToken]> {
    if pattern.is_empty() {
        return Ok(tokens);
    }

    let anchored = Regex::new(&format!("^(?:{})", pattern))
        .map_err(|e| MtError::InvalidPattern(format!("{}: {}", pattern, e)))?;

    for token in tokens.iter_mut() {
        let matched = anchored
            .find(token.valid_text())
            .map(|m| m.as_str().chars().count())
            .unwrap_or(0);
        token.ignore_start += matched;
    }

    Ok(tokens)
}
