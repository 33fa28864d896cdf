use logos::Logos;
use std::fmt;
use std::ops::Range;

/// Token types for serialized post bodies
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"<!--([^-]|-[^-]|--+[^->])*-*-->")]
pub enum Token<'src> {
    // Whole start tag including attributes, e.g. `<a href="x">` or `<br/>`
    #[regex(
        r#"<[a-zA-Z][a-zA-Z0-9]*(\s+[^\s"'>/=]+(\s*=\s*("[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*\s*/?>"#,
        |lex| lex.slice()
    )]
    StartTag(&'src str),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9]*\s*>", |lex| lex.slice())]
    EndTag(&'src str),

    #[regex(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,31});", |lex| lex.slice())]
    Entity(&'src str),

    // A bare ampersand that does not start an entity
    #[token("&")]
    Ampersand,

    #[regex(r"[^<&]+", |lex| lex.slice())]
    Text(&'src str),
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::StartTag(s) => write!(f, "start tag {}", s),
            Token::EndTag(s) => write!(f, "end tag {}", s),
            Token::Entity(s) => write!(f, "entity {}", s),
            Token::Ampersand => write!(f, "&"),
            Token::Text(s) => write!(f, "text {:?}", s),
        }
    }
}

/// Tokens found inside a start tag, after the tag name
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"\s+")]
pub enum AttrToken<'src> {
    #[regex(r"[a-zA-Z_:][a-zA-Z0-9_:.\-]*", |lex| lex.slice())]
    Name(&'src str),

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#, |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    #[regex(r"'[^']*'", |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    Quoted(&'src str),

    #[token("/")]
    Slash,
}

/// Entity scanner for attribute values, which carry no markup or comments
#[derive(Logos, Debug, Clone, PartialEq)]
enum EntityToken<'src> {
    #[regex(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,31});", |lex| lex.slice())]
    Entity(&'src str),

    #[regex(r"[^&]+|&")]
    Other,
}

/// A lexed token, or the byte range the lexer could not match
pub type Spanned<'src> = (Result<Token<'src>, ()>, Range<usize>);

/// Tokenize a source string.
///
/// Unlike a lenient tokenizer, failed matches are kept so the parser can
/// report them; the plain-text stripper falls back to the raw slice.
pub fn tokenize(source: &str) -> Vec<Spanned<'_>> {
    Token::lexer(source).spanned().collect()
}

/// Split a start tag slice into its lowercase name and raw attribute text.
pub fn split_start_tag(tag: &str) -> (String, &str, bool) {
    let inner = tag.trim_start_matches('<').trim_end_matches('>');
    let self_closing = inner.ends_with('/');
    let inner = inner.trim_end_matches('/');
    let name_end = inner
        .find(|c: char| c.is_whitespace())
        .unwrap_or(inner.len());
    (
        inner[..name_end].to_ascii_lowercase(),
        &inner[name_end..],
        self_closing,
    )
}

/// Lowercase name of an end tag slice
pub fn end_tag_name(tag: &str) -> String {
    tag.trim_start_matches("</")
        .trim_end_matches('>')
        .trim()
        .to_ascii_lowercase()
}

/// Decode a single entity slice such as `&amp;` or `&#x41;`.
///
/// Unknown named entities are returned unchanged.
pub fn decode_entity(entity: &str) -> String {
    let body = &entity[1..entity.len() - 1];

    let decoded = if let Some(hex) = body
        .strip_prefix("#x")
        .or_else(|| body.strip_prefix("#X"))
    {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = body.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        match body {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => None,
        }
    };

    match decoded {
        Some(c) => c.to_string(),
        None => entity.to_string(),
    }
}

/// Decode every entity in attribute text
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    for (result, span) in EntityToken::lexer(text).spanned() {
        match result {
            Ok(EntityToken::Entity(e)) => out.push_str(&decode_entity(e)),
            _ => out.push_str(&text[span]),
        }
    }
    out
}
