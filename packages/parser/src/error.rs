use std::ops::Range;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Lexer error at {pos}: unexpected {found:?}")]
    LexerError { pos: usize, found: String },

    #[error("Unsupported tag <{tag}> at {pos}")]
    UnsupportedTag { pos: usize, tag: String },

    #[error("Unexpected closing tag </{tag}> at {pos}")]
    UnexpectedClose { pos: usize, tag: String },

    #[error("Unclosed tag <{tag}> opened at {pos}")]
    Unclosed { pos: usize, tag: String },

    #[error("<{tag}> is not allowed inside <{parent}> at {pos}")]
    InvalidNesting {
        pos: usize,
        tag: String,
        parent: String,
    },

    #[error("Nesting deeper than {limit} levels at {pos}")]
    TooDeep { pos: usize, limit: usize },

    #[error("<{tag}> at {pos} is missing required attribute '{attribute}'")]
    MissingAttribute {
        pos: usize,
        tag: String,
        attribute: String,
    },
}

impl ParseError {
    pub fn lexer_error(span: Range<usize>, found: impl Into<String>) -> Self {
        Self::LexerError {
            pos: span.start,
            found: found.into(),
        }
    }

    pub fn unsupported_tag(pos: usize, tag: impl Into<String>) -> Self {
        Self::UnsupportedTag {
            pos,
            tag: tag.into(),
        }
    }

    pub fn unexpected_close(pos: usize, tag: impl Into<String>) -> Self {
        Self::UnexpectedClose {
            pos,
            tag: tag.into(),
        }
    }

    pub fn unclosed(pos: usize, tag: impl Into<String>) -> Self {
        Self::Unclosed {
            pos,
            tag: tag.into(),
        }
    }

    pub fn invalid_nesting(pos: usize, tag: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::InvalidNesting {
            pos,
            tag: tag.into(),
            parent: parent.into(),
        }
    }

    pub fn missing_attribute(
        pos: usize,
        tag: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self::MissingAttribute {
            pos,
            tag: tag.into(),
            attribute: attribute.into(),
        }
    }

    pub fn too_deep(pos: usize, limit: usize) -> Self {
        Self::TooDeep { pos, limit }
    }

    /// Byte offset the error points at
    pub fn pos(&self) -> usize {
        match self {
            ParseError::LexerError { pos, .. }
            | ParseError::UnsupportedTag { pos, .. }
            | ParseError::UnexpectedClose { pos, .. }
            | ParseError::Unclosed { pos, .. }
            | ParseError::InvalidNesting { pos, .. }
            | ParseError::MissingAttribute { pos, .. }
            | ParseError::TooDeep { pos, .. } => *pos,
        }
    }

    #[cfg_attr(not(feature = "pretty-errors"), allow(dead_code))]
    fn label(&self) -> String {
        match self {
            ParseError::LexerError { .. } => "not valid markup".to_string(),
            ParseError::UnsupportedTag { tag, .. } => format!("<{}> is not part of the vocabulary", tag),
            ParseError::UnexpectedClose { .. } => "nothing open matches this".to_string(),
            ParseError::Unclosed { .. } => "opened here".to_string(),
            ParseError::InvalidNesting { parent, .. } => format!("not allowed inside <{}>", parent),
            ParseError::MissingAttribute { attribute, .. } => format!("expected `{}`", attribute),
            ParseError::TooDeep { .. } => "nested too deeply".to_string(),
        }
    }
}

/// Pretty-print an error with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_error(source: &str, filename: &str, error: &ParseError) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let start = error.pos().min(source.len().saturating_sub(1));
    let end = (start + 1).min(source.len()).max(start);

    let mut output = Vec::new();
    let report = Report::build(ReportKind::Error, filename, start)
        .with_message(error.to_string())
        .with_label(
            Label::new((filename, start..end))
                .with_color(Color::Red)
                .with_message(error.label()),
        )
        .finish();

    if report
        .write((filename, Source::from(source)), &mut output)
        .is_err()
    {
        return error.to_string();
    }

    String::from_utf8(output).unwrap_or_else(|_| error.to_string())
}
