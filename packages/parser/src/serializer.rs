use crate::ast::*;

/// Serializer converts a document tree back to markup.
///
/// Output is compact (no whitespace between blocks) and deterministic:
/// marks always nest in the order link, bold, italic, underline.
pub struct Serializer {
    output: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    /// Serialize a Document to markup
    pub fn serialize(mut self, doc: &Document) -> String {
        if doc.is_empty() {
            return PLACEHOLDER_BODY.to_string();
        }

        for block in &doc.blocks {
            self.serialize_block(block);
        }

        self.output
    }

    fn serialize_block(&mut self, block: &Block) {
        match block {
            Block::Paragraph { content } => {
                self.output.push_str("<p>");
                self.serialize_inlines(content);
                self.output.push_str("</p>");
            }
            Block::Heading { level, content } => {
                let tag = level.tag();
                self.output.push('<');
                self.output.push_str(tag);
                self.output.push('>');
                self.serialize_inlines(content);
                self.output.push_str("</");
                self.output.push_str(tag);
                self.output.push('>');
            }
            Block::BulletList { items } => self.serialize_list("ul", items),
            Block::OrderedList { items } => self.serialize_list("ol", items),
            Block::Image(image) => self.serialize_image(image),
        }
    }

    fn serialize_list(&mut self, tag: &str, items: &[ListItem]) {
        self.output.push('<');
        self.output.push_str(tag);
        self.output.push('>');
        for item in items {
            self.output.push_str("<li>");
            for block in &item.blocks {
                self.serialize_block(block);
            }
            self.output.push_str("</li>");
        }
        self.output.push_str("</");
        self.output.push_str(tag);
        self.output.push('>');
    }

    fn serialize_image(&mut self, image: &Image) {
        self.output.push_str("<img src=\"");
        escape_attr(&image.source.to_src(), &mut self.output);
        self.output.push('"');
        if let Some(alt) = &image.alt {
            self.output.push_str(" alt=\"");
            escape_attr(alt, &mut self.output);
            self.output.push('"');
        }
        if let Some(title) = &image.title {
            self.output.push_str(" title=\"");
            escape_attr(title, &mut self.output);
            self.output.push('"');
        }
        self.output.push('>');
    }

    fn serialize_inlines(&mut self, content: &[Inline]) {
        for inline in content {
            match inline {
                Inline::HardBreak => self.output.push_str("<br>"),
                Inline::Text { text, marks } => {
                    if let Some(href) = &marks.link {
                        self.output.push_str("<a href=\"");
                        escape_attr(href, &mut self.output);
                        self.output
                            .push_str("\" target=\"_blank\" rel=\"noopener noreferrer nofollow\">");
                    }
                    if marks.bold {
                        self.output.push_str("<strong>");
                    }
                    if marks.italic {
                        self.output.push_str("<em>");
                    }
                    if marks.underline {
                        self.output.push_str("<u>");
                    }

                    escape_text(text, &mut self.output);

                    if marks.underline {
                        self.output.push_str("</u>");
                    }
                    if marks.italic {
                        self.output.push_str("</em>");
                    }
                    if marks.bold {
                        self.output.push_str("</strong>");
                    }
                    if marks.link.is_some() {
                        self.output.push_str("</a>");
                    }
                }
            }
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

fn escape_attr(value: &str, output: &mut String) {
    for c in value.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Convenience function to serialize a document
pub fn serialize(doc: &Document) -> String {
    Serializer::new().serialize(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_serialize_empty_is_placeholder() {
        assert_eq!(serialize(&Document::new()), PLACEHOLDER_BODY);
    }

    #[test]
    fn test_serialize_paragraph() {
        let doc = Document::from_blocks(vec![Block::paragraph("World")]);
        assert_eq!(serialize(&doc), "<p>World</p>");
    }

    #[test]
    fn test_mark_nesting_order() {
        let marks = Marks {
            bold: true,
            italic: true,
            underline: true,
            link: Some("https://example.com/a?b=1&c=2".to_string()),
        };
        let doc = Document::from_blocks(vec![Block::Paragraph {
            content: vec![Inline::marked("x", marks)],
        }]);

        assert_eq!(
            serialize(&doc),
            "<p><a href=\"https://example.com/a?b=1&amp;c=2\" target=\"_blank\" \
             rel=\"noopener noreferrer nofollow\"><strong><em><u>x</u></em></strong></a></p>"
        );
    }

    #[test]
    fn test_escaping() {
        let doc = Document::from_blocks(vec![
            Block::paragraph("a < b & c > d"),
            Block::Image(Image::new(ImageSource::url("x.png")).with_alt("say \"hi\"")),
        ]);
        assert_eq!(
            serialize(&doc),
            "<p>a &lt; b &amp; c &gt; d</p><img src=\"x.png\" alt=\"say &quot;hi&quot;\">"
        );
    }

    #[test]
    fn test_embedded_image_kept_verbatim() {
        let src = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUg==";
        let doc = parse(&format!("<img src=\"{}\">", src)).unwrap();
        assert_eq!(serialize(&doc), format!("<img src=\"{}\">", src));
    }

    #[test]
    fn test_serialize_is_idempotent() {
        let source = r#"<h2 class="heading-node">Title</h2><ul class="list-disc pl-4"><li><p>a</p></li></ul><p><b>bold</b><br/>line</p>"#;
        let once = serialize(&parse(source).unwrap());
        let twice = serialize(&parse(&once).unwrap());
        assert_eq!(once, twice);
        assert_eq!(
            once,
            "<h2>Title</h2><ul><li><p>a</p></li></ul><p><strong>bold</strong><br>line</p>"
        );
    }
}
