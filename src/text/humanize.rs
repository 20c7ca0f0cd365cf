//! Identifier to phrase conversion.
//!
//! `getUserName`, `user_id` and `XMLHttpRequest` translate poorly as-is; split
//! into `get user name`, `user id` and `xml http request` they translate fine.

/// Turn an identifier-like token into a lowercase phrase
///
/// Text that already contains interior whitespace is considered worded and
/// yields an empty string, which callers read as "use the original text".
/// Feeding a result back in therefore always returns `""`.
pub fn humanize(text: &str) -> String {
    let token = text.trim();
    if token.chars().any(char::is_whitespace) {
        return String::new();
    }
    split_identifier(token)
}

fn split_identifier(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    let mut phrase = String::with_capacity(token.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            push_separator(&mut phrase);
            continue;
        }

        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            // "userName" and "v2Name" split before the capital; "HTTPServer"
            // splits before the last capital of the acronym.
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                push_separator(&mut phrase);
            }
        }

        phrase.extend(c.to_lowercase());
    }

    phrase.trim_end().to_string()
}

fn push_separator(phrase: &mut String) {
    if !phrase.is_empty() && !phrase.ends_with(' ') {
        phrase.push(' ');
    }
}
