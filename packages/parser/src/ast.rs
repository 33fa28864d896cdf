use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Body sent for a document with no content.
///
/// Stored posts rely on this exact string, so it must never change.
pub const PLACEHOLDER_BODY: &str = "<p>Start writing your blog post...</p>";

/// Root document node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

/// Block-level node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Block {
    Paragraph {
        content: Vec<Inline>,
    },

    Heading {
        level: HeadingLevel,
        content: Vec<Inline>,
    },

    BulletList {
        items: Vec<ListItem>,
    },

    OrderedList {
        items: Vec<ListItem>,
    },

    Image(Image),
}

/// Only the two levels the editing surface offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
}

impl HeadingLevel {
    pub fn tag(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "h1" => Some(HeadingLevel::H1),
            "h2" => Some(HeadingLevel::H2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub blocks: Vec<Block>,
}

impl ListItem {
    pub fn paragraph(content: Vec<Inline>) -> Self {
        Self {
            blocks: vec![Block::Paragraph { content }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub source: ImageSource,
    pub alt: Option<String>,
    pub title: Option<String>,
}

impl Image {
    pub fn new(source: ImageSource) -> Self {
        Self {
            source,
            alt: None,
            title: None,
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }
}

/// Where an image's bytes live.
///
/// Embedded payloads keep their base64 text verbatim; nothing is decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ImageSource {
    Url { url: String },
    Embedded { mime_type: String, data: String },
}

impl ImageSource {
    pub fn url(url: impl Into<String>) -> Self {
        ImageSource::Url { url: url.into() }
    }

    /// Encode raw bytes as an embedded payload
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        ImageSource::Embedded {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Interpret an `src` attribute value
    pub fn from_src(src: &str) -> Self {
        if let Some(rest) = src.strip_prefix("data:") {
            if let Some((mime_type, data)) = rest.split_once(";base64,") {
                return ImageSource::Embedded {
                    mime_type: mime_type.to_string(),
                    data: data.to_string(),
                };
            }
        }
        ImageSource::Url {
            url: src.to_string(),
        }
    }

    /// Value written to the `src` attribute
    pub fn to_src(&self) -> String {
        match self {
            ImageSource::Url { url } => url.clone(),
            ImageSource::Embedded { mime_type, data } => {
                format!("data:{};base64,{}", mime_type, data)
            }
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, ImageSource::Embedded { .. })
    }
}

/// Inline node inside paragraphs and headings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Inline {
    Text { text: String, marks: Marks },
    HardBreak,
}

impl Inline {
    pub fn plain(text: impl Into<String>) -> Self {
        Inline::Text {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    pub fn marked(text: impl Into<String>, marks: Marks) -> Self {
        Inline::Text {
            text: text.into(),
            marks,
        }
    }

    /// Length in chars; a hard break counts as one
    pub fn char_len(&self) -> usize {
        match self {
            Inline::Text { text, .. } => text.chars().count(),
            Inline::HardBreak => 1,
        }
    }
}

/// Formatting applied to a text run
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub link: Option<String>,
}

impl Marks {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::default()
        }
    }

    pub fn link(href: impl Into<String>) -> Self {
        Self {
            link: Some(href.into()),
            ..Self::default()
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == Marks::default()
    }
}

/// A single mark, used when toggling formatting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Link { href: String },
}

impl Mark {
    /// Whether `marks` already carries this mark (any link counts for `Link`)
    pub fn is_set(&self, marks: &Marks) -> bool {
        match self {
            Mark::Bold => marks.bold,
            Mark::Italic => marks.italic,
            Mark::Underline => marks.underline,
            Mark::Link { .. } => marks.link.is_some(),
        }
    }

    pub fn set(&self, marks: &mut Marks) {
        match self {
            Mark::Bold => marks.bold = true,
            Mark::Italic => marks.italic = true,
            Mark::Underline => marks.underline = true,
            Mark::Link { href } => marks.link = Some(href.clone()),
        }
    }

    pub fn unset(&self, marks: &mut Marks) {
        match self {
            Mark::Bold => marks.bold = false,
            Mark::Italic => marks.italic = false,
            Mark::Underline => marks.underline = false,
            Mark::Link { .. } => marks.link = None,
        }
    }
}

/// Merge adjacent runs with equal marks and drop empty runs.
pub fn normalize_inlines(content: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(content.len());

    for inline in content {
        match inline {
            Inline::Text { text, marks } => {
                if text.is_empty() {
                    continue;
                }
                if let Some(Inline::Text {
                    text: prev,
                    marks: prev_marks,
                }) = out.last_mut()
                {
                    if *prev_marks == marks {
                        prev.push_str(&text);
                        continue;
                    }
                }
                out.push(Inline::Text { text, marks });
            }
            Inline::HardBreak => out.push(Inline::HardBreak),
        }
    }

    out
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// True when the document has neither text nor images
    pub fn is_blank(&self) -> bool {
        self.blocks.iter().all(Block::is_blank)
    }

    /// Concatenated text content, blocks separated by newlines
    pub fn plain_text(&self) -> String {
        let mut parts = Vec::new();
        for block in &self.blocks {
            block.collect_text(&mut parts);
        }
        parts.join("\n")
    }

    /// Number of images anywhere in the tree
    pub fn image_count(&self) -> usize {
        fn count(blocks: &[Block]) -> usize {
            blocks
                .iter()
                .map(|block| match block {
                    Block::Image(_) => 1,
                    Block::BulletList { items } | Block::OrderedList { items } => {
                        items.iter().map(|item| count(&item.blocks)).sum()
                    }
                    _ => 0,
                })
                .sum()
        }
        count(&self.blocks)
    }
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph {
            content: vec![Inline::plain(text)],
        }
    }

    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        Block::Heading {
            level,
            content: vec![Inline::plain(text)],
        }
    }

    /// Inline content of paragraphs and headings
    pub fn content(&self) -> Option<&Vec<Inline>> {
        match self {
            Block::Paragraph { content } | Block::Heading { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn content_mut(&mut self) -> Option<&mut Vec<Inline>> {
        match self {
            Block::Paragraph { content } | Block::Heading { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Block::Paragraph { content } | Block::Heading { content, .. } => {
                content.iter().all(|inline| match inline {
                    Inline::Text { text, .. } => text.trim().is_empty(),
                    Inline::HardBreak => true,
                })
            }
            Block::BulletList { items } | Block::OrderedList { items } => items
                .iter()
                .all(|item| item.blocks.iter().all(Block::is_blank)),
            Block::Image(_) => false,
        }
    }

    fn collect_text(&self, parts: &mut Vec<String>) {
        match self {
            Block::Paragraph { content } | Block::Heading { content, .. } => {
                let mut line = String::new();
                for inline in content {
                    match inline {
                        Inline::Text { text, .. } => line.push_str(text),
                        Inline::HardBreak => line.push('\n'),
                    }
                }
                parts.push(line);
            }
            Block::BulletList { items } | Block::OrderedList { items } => {
                for item in items {
                    for block in &item.blocks {
                        block.collect_text(parts);
                    }
                }
            }
            Block::Image(image) => {
                if let Some(alt) = &image.alt {
                    parts.push(alt.clone());
                }
            }
        }
    }
}
