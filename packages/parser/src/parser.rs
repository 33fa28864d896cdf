use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{
    decode_entities, decode_entity, end_tag_name, split_start_tag, tokenize, AttrToken, Token,
};
use logos::Logos;

/// Tags that open a block
const BLOCK_TAGS: &[&str] = &["p", "h1", "h2", "ul", "ol", "li", "img"];

/// Tags allowed inside paragraphs and headings
const INLINE_TAGS: &[&str] = &["strong", "b", "em", "i", "u", "a", "br", "img"];

fn is_block_tag(name: &str) -> bool {
    BLOCK_TAGS.contains(&name)
}

fn is_inline_tag(name: &str) -> bool {
    INLINE_TAGS.contains(&name)
}

/// Structural event produced from the token stream
#[derive(Debug, Clone, PartialEq)]
enum Event {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
        pos: usize,
    },
    Close {
        name: String,
        pos: usize,
    },
    Text {
        text: String,
        pos: usize,
    },
}

/// Where inline parsing stops
#[derive(Debug, Clone)]
enum Terminator {
    /// The matching end tag of an element opened at `pos`
    Close { tag: String, pos: usize },
    /// Any block-level tag or enclosing end tag (implicit paragraphs)
    BlockBoundary,
}

#[derive(Debug, Clone, Copy)]
enum TextBlockKind {
    Paragraph,
    Heading(HeadingLevel),
}

impl TextBlockKind {
    fn wrap(self, content: Vec<Inline>) -> Block {
        match self {
            TextBlockKind::Paragraph => Block::Paragraph { content },
            TextBlockKind::Heading(level) => Block::Heading { level, content },
        }
    }
}

/// Collects inline content; images found mid-paragraph split it into siblings
struct InlineSink {
    kind: TextBlockKind,
    current: Vec<Inline>,
    blocks: Vec<Block>,
    hoisted: bool,
}

impl InlineSink {
    fn new(kind: TextBlockKind) -> Self {
        Self {
            kind,
            current: Vec::new(),
            blocks: Vec::new(),
            hoisted: false,
        }
    }

    fn push(&mut self, inline: Inline) {
        self.current.push(inline);
    }

    fn push_image(&mut self, image: Image) {
        if !self.current.is_empty() {
            self.flush();
        }
        self.blocks.push(Block::Image(image));
        self.hoisted = true;
    }

    fn flush(&mut self) {
        let content = normalize_inlines(std::mem::take(&mut self.current));
        self.blocks.push(self.kind.wrap(content));
    }

    fn finish(mut self) -> Vec<Block> {
        if !self.current.is_empty() || !self.hoisted {
            self.flush();
        }
        self.blocks
    }
}

/// Deepest nesting of inline elements or list items accepted
pub const MAX_DEPTH: usize = 128;

/// Parser for serialized post bodies
pub struct Parser {
    events: Vec<Event>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> ParseResult<Self> {
        Ok(Self {
            events: Self::events(source)?,
            pos: 0,
            depth: 0,
        })
    }

    /// Turn spanned tokens into open/close/text events, merging text and entities
    fn events(source: &str) -> ParseResult<Vec<Event>> {
        let mut events = Vec::new();
        let mut pending_text: Option<(String, usize)> = None;

        for (result, span) in tokenize(source) {
            let token = result.map_err(|_| ParseError::lexer_error(span.clone(), &source[span.clone()]))?;

            let piece = match token {
                Token::Text(text) => Some(text.to_string()),
                Token::Entity(entity) => Some(decode_entity(entity)),
                Token::Ampersand => Some("&".to_string()),
                _ => None,
            };

            if let Some(piece) = piece {
                match &mut pending_text {
                    Some((text, _)) => text.push_str(&piece),
                    None => pending_text = Some((piece, span.start)),
                }
                continue;
            }

            if let Some((text, pos)) = pending_text.take() {
                events.push(Event::Text { text, pos });
            }

            match token {
                Token::StartTag(tag) => {
                    let (name, raw_attrs, self_closing) = split_start_tag(tag);
                    events.push(Event::Open {
                        name,
                        attrs: parse_attributes(raw_attrs),
                        self_closing,
                        pos: span.start,
                    });
                }
                Token::EndTag(tag) => {
                    events.push(Event::Close {
                        name: end_tag_name(tag),
                        pos: span.start,
                    });
                }
                _ => {}
            }
        }

        if let Some((text, pos)) = pending_text.take() {
            events.push(Event::Text { text, pos });
        }

        Ok(events)
    }

    /// Parse a complete document
    pub fn parse_document(&mut self) -> ParseResult<Document> {
        let blocks = self.parse_blocks(None)?;
        Ok(Document { blocks })
    }

    /// Parse blocks until the end of input or the end tag of `parent`
    fn parse_blocks(&mut self, parent: Option<(&str, usize)>) -> ParseResult<Vec<Block>> {
        let mut blocks = Vec::new();

        loop {
            let event = match self.peek() {
                Some(event) => event.clone(),
                None => {
                    return match parent {
                        Some((tag, pos)) => Err(ParseError::unclosed(pos, tag)),
                        None => Ok(blocks),
                    };
                }
            };

            match event {
                Event::Text { text, .. } if text.trim().is_empty() => {
                    self.advance();
                }
                Event::Close { name, pos } => match parent {
                    Some((tag, _)) if tag == name => {
                        self.advance();
                        return Ok(blocks);
                    }
                    _ => return Err(ParseError::unexpected_close(pos, name)),
                },
                Event::Open { ref name, pos, .. } if name == "li" => {
                    let parent_name = parent.map(|(tag, _)| tag).unwrap_or("document");
                    return Err(ParseError::invalid_nesting(pos, "li", parent_name));
                }
                Event::Open { ref name, .. } if is_block_tag(name) && name != "img" => {
                    self.advance();
                    blocks.extend(self.parse_block(event)?);
                }
                Event::Open { ref name, pos, .. } if !is_inline_tag(name) => {
                    return Err(ParseError::unsupported_tag(pos, name.clone()));
                }
                _ => {
                    // Bare inline content (or a lone image) becomes an implicit paragraph
                    let mut sink = InlineSink::new(TextBlockKind::Paragraph);
                    self.parse_inline(&mut sink, &Marks::default(), &Terminator::BlockBoundary)?;
                    blocks.extend(sink.finish());
                }
            }
        }
    }

    /// Parse the body of an already consumed block-level start tag
    fn parse_block(&mut self, open: Event) -> ParseResult<Vec<Block>> {
        let Event::Open {
            name,
            self_closing,
            pos,
            ..
        } = open
        else {
            return Ok(Vec::new());
        };

        match name.as_str() {
            "p" | "h1" | "h2" => {
                let kind = match HeadingLevel::from_tag(&name) {
                    Some(level) => TextBlockKind::Heading(level),
                    None => TextBlockKind::Paragraph,
                };
                let mut sink = InlineSink::new(kind);
                if !self_closing {
                    self.parse_inline(
                        &mut sink,
                        &Marks::default(),
                        &Terminator::Close { tag: name, pos },
                    )?;
                }
                Ok(sink.finish())
            }
            "ul" | "ol" => {
                let items = if self_closing {
                    Vec::new()
                } else {
                    self.parse_list_items(&name, pos)?
                };
                Ok(vec![if name == "ul" {
                    Block::BulletList { items }
                } else {
                    Block::OrderedList { items }
                }])
            }
            _ => Err(ParseError::unsupported_tag(pos, name)),
        }
    }

    fn parse_list_items(&mut self, list_tag: &str, list_pos: usize) -> ParseResult<Vec<ListItem>> {
        let mut items = Vec::new();

        loop {
            let event = match self.peek() {
                Some(event) => event.clone(),
                None => return Err(ParseError::unclosed(list_pos, list_tag)),
            };

            match event {
                Event::Text { text, .. } if text.trim().is_empty() => {
                    self.advance();
                }
                Event::Text { pos, .. } => {
                    return Err(ParseError::invalid_nesting(pos, "#text", list_tag));
                }
                Event::Open {
                    name,
                    self_closing,
                    pos,
                    ..
                } if name == "li" => {
                    self.advance();
                    let blocks = if self_closing {
                        Vec::new()
                    } else {
                        self.descend(pos)?;
                        let blocks = self.parse_blocks(Some(("li", pos)));
                        self.depth -= 1;
                        blocks?
                    };
                    items.push(ListItem { blocks });
                }
                Event::Open { name, pos, .. } => {
                    return Err(ParseError::invalid_nesting(pos, name, list_tag));
                }
                Event::Close { name, pos } => {
                    if name == list_tag {
                        self.advance();
                        return Ok(items);
                    }
                    return Err(ParseError::unexpected_close(pos, name));
                }
            }
        }
    }

    /// Parse inline content with the given active marks
    fn parse_inline(
        &mut self,
        sink: &mut InlineSink,
        marks: &Marks,
        terminator: &Terminator,
    ) -> ParseResult<()> {
        loop {
            let event = match self.peek() {
                Some(event) => event.clone(),
                None => {
                    return match terminator {
                        Terminator::Close { tag, pos } => Err(ParseError::unclosed(*pos, tag.clone())),
                        Terminator::BlockBoundary => Ok(()),
                    };
                }
            };

            match event {
                Event::Text { text, .. } => {
                    self.advance();
                    sink.push(Inline::marked(text, marks.clone()));
                }
                Event::Close { name, pos } => match terminator {
                    Terminator::Close { tag, .. } if *tag == name => {
                        self.advance();
                        return Ok(());
                    }
                    Terminator::BlockBoundary => return Ok(()),
                    Terminator::Close { .. } => {
                        return Err(ParseError::unexpected_close(pos, name));
                    }
                },
                Event::Open {
                    name,
                    attrs,
                    self_closing,
                    pos,
                } => {
                    let mut inner = marks.clone();
                    match name.as_str() {
                        "br" => {
                            self.advance();
                            self.skip_void_close("br");
                            sink.push(Inline::HardBreak);
                            continue;
                        }
                        "img" => {
                            self.advance();
                            self.skip_void_close("img");
                            sink.push_image(image_from_attrs(&attrs, pos)?);
                            continue;
                        }
                        "strong" | "b" => inner.bold = true,
                        "em" | "i" => inner.italic = true,
                        "u" => inner.underline = true,
                        "a" => {
                            // An anchor without href carries no link
                            if let Some(href) = attr(&attrs, "href") {
                                inner.link = Some(href.to_string());
                            }
                        }
                        block if is_block_tag(block) => {
                            return match terminator {
                                Terminator::BlockBoundary => Ok(()),
                                Terminator::Close { tag, .. } => {
                                    Err(ParseError::invalid_nesting(pos, block, tag.clone()))
                                }
                            };
                        }
                        _ => return Err(ParseError::unsupported_tag(pos, name)),
                    }

                    self.advance();
                    if !self_closing {
                        self.descend(pos)?;
                        let result =
                            self.parse_inline(sink, &inner, &Terminator::Close { tag: name, pos });
                        self.depth -= 1;
                        result?;
                    }
                }
            }
        }
    }

    /// Enter one nesting level; the caller leaves it by decrementing `depth`
    fn descend(&mut self, pos: usize) -> ParseResult<()> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::too_deep(pos, MAX_DEPTH));
        }
        self.depth += 1;
        Ok(())
    }

    /// Void elements may still be written with an explicit end tag
    fn skip_void_close(&mut self, tag: &str) {
        if let Some(Event::Close { name, .. }) = self.peek() {
            if name == tag {
                self.advance();
            }
        }
    }

    fn peek(&self) -> Option<&Event> {
        self.events.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Event> {
        let event = self.events.get(self.pos);
        self.pos += 1;
        event
    }
}

fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn image_from_attrs(attrs: &[(String, String)], pos: usize) -> ParseResult<Image> {
    let src = attr(attrs, "src").ok_or_else(|| ParseError::missing_attribute(pos, "img", "src"))?;

    Ok(Image {
        source: ImageSource::from_src(src),
        alt: attr(attrs, "alt").map(str::to_string),
        title: attr(attrs, "title").map(str::to_string),
    })
}

/// Parse the attribute section of a start tag. Malformed pieces are skipped.
fn parse_attributes(raw: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut lexer = AttrToken::lexer(raw).spanned().peekable();

    while let Some((token, _)) = lexer.next() {
        let Ok(AttrToken::Name(name)) = token else {
            continue;
        };
        let name = name.to_ascii_lowercase();

        if matches!(lexer.peek(), Some((Ok(AttrToken::Equals), _))) {
            lexer.next();
            let value = match lexer.next() {
                Some((Ok(AttrToken::Quoted(value)), _)) | Some((Ok(AttrToken::Name(value)), _)) => {
                    decode_entities(value)
                }
                Some((_, span)) => raw[span].to_string(),
                None => String::new(),
            };
            attrs.push((name, value));
        } else {
            attrs.push((name, String::new()));
        }
    }

    attrs
}

/// Parse a serialized body.
///
/// Empty, whitespace-only and placeholder bodies yield an empty document.
pub fn parse(source: &str) -> ParseResult<Document> {
    let trimmed = source.trim();
    if trimmed.is_empty() || trimmed == PLACEHOLDER_BODY {
        return Ok(Document::new());
    }

    Parser::new(source)?.parse_document()
}
