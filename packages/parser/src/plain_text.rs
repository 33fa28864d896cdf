//! Plain-text previews of serialized bodies.
//!
//! Stripping is deliberately lenient: it runs on whatever the server hands
//! back, so it never fails. Text the lexer cannot classify is kept as-is.

use crate::tokenizer::{decode_entity, end_tag_name, split_start_tag, tokenize, Token};

/// Maximum preview length in characters, excluding the ellipsis
pub const PREVIEW_LENGTH: usize = 80;

/// Appended when a preview is cut short
pub const ELLIPSIS: &str = "...";

/// Tags whose boundaries separate words
const BREAKING_TAGS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol", "br", "img", "div"];

/// Remove all markup and cut the result to [`PREVIEW_LENGTH`] characters.
pub fn strip_to_plain_text(markup: &str) -> String {
    truncate(&strip_markup(markup), PREVIEW_LENGTH)
}

/// Like [`strip_to_plain_text`], accepting a missing body
pub fn preview_text(markup: Option<&str>) -> String {
    markup.map(strip_to_plain_text).unwrap_or_default()
}

/// Remove all markup without truncating.
///
/// Block boundaries become a space and whitespace runs collapse.
pub fn strip_markup(markup: &str) -> String {
    let mut raw = String::with_capacity(markup.len());

    for (result, span) in tokenize(markup) {
        match result {
            Ok(Token::Text(text)) => raw.push_str(text),
            Ok(Token::Entity(entity)) => raw.push_str(&decode_entity(entity)),
            Ok(Token::Ampersand) => raw.push('&'),
            Ok(Token::StartTag(tag)) => {
                let (name, _, _) = split_start_tag(tag);
                if BREAKING_TAGS.contains(&name.as_str()) {
                    raw.push(' ');
                }
            }
            Ok(Token::EndTag(tag)) => {
                if BREAKING_TAGS.contains(&end_tag_name(tag).as_str()) {
                    raw.push(' ');
                }
            }
            Err(()) => raw.push_str(&markup[span]),
        }
    }

    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to `max_chars` characters, appending [`ELLIPSIS`] when cut
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((byte_index, _)) => {
            let mut out = text[..byte_index].trim_end().to_string();
            out.push_str(ELLIPSIS);
            out
        }
    }
}
