//! # Scribe Parser
//!
//! Document model and markup codec for post bodies.
//!
//! ```text
//! markup ──tokenize──▶ tokens ──parse──▶ Document ──serialize──▶ markup
//!                                │
//!                                └──strip_to_plain_text──▶ preview
//! ```
//!
//! The markup vocabulary is fixed (`p`, `h1`, `h2`, `ul`, `ol`, `li`, `img`,
//! `a`, `strong`, `em`, `u`, `br`) so bodies stored by older clients stay
//! renderable.

pub mod ast;
pub mod error;
pub mod parser;
pub mod plain_text;
pub mod serializer;
pub mod tokenizer;

pub use ast::{
    normalize_inlines, Block, Document, HeadingLevel, Image, ImageSource, Inline, ListItem, Mark,
    Marks, PLACEHOLDER_BODY,
};
#[cfg(feature = "pretty-errors")]
pub use error::format_error;
pub use error::{ParseError, ParseResult};
pub use parser::{parse, Parser, MAX_DEPTH};
pub use plain_text::{preview_text, strip_markup, strip_to_plain_text, PREVIEW_LENGTH};
pub use serializer::{serialize, Serializer};
pub use tokenizer::{tokenize, Token};
