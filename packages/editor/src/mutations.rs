//! # Document Mutations
//!
//! Structured edits issued by the editing surface.
//!
//! ## Addressing
//!
//! - Block indices address top-level blocks of the document.
//! - Character offsets count chars inside a paragraph or heading; a hard
//!   break counts as one char.
//!
//! ## Semantics
//!
//! Every mutation is validated against the current document before it is
//! applied. A mutation that fails validation leaves the document untouched.

use scribe_parser::{
    normalize_inlines, Block, Document, HeadingLevel, Image, Inline, ListItem, Mark, Marks,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured edits on a post body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Insert a block before `index` (`index == len` appends)
    InsertBlock { index: usize, block: Block },

    RemoveBlock { index: usize },

    ReplaceBlock { index: usize, block: Block },

    /// Paragraph becomes a heading of `level`; a heading already at `level`
    /// goes back to a paragraph
    SetHeading { index: usize, level: HeadingLevel },

    /// Wrap a text block in a list, switch the list kind, or unwrap a list
    /// of the requested kind
    ToggleList { index: usize, ordered: bool },

    /// Insert text at a char offset, inheriting the marks around it
    InsertText {
        index: usize,
        offset: usize,
        text: String,
    },

    /// Toggle a mark over the char range `start..end`.
    ///
    /// The mark is removed when every text run in the range already
    /// carries it, otherwise it is applied to the whole range.
    ToggleMark {
        index: usize,
        start: usize,
        end: usize,
        mark: Mark,
    },

    /// Insert an image block before `index`
    InsertImage { index: usize, image: Image },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Block {index} is out of range (document has {len} blocks)")]
    BlockOutOfRange { index: usize, len: usize },

    #[error("Block {0} has no inline content")]
    NotTextBlock(usize),

    #[error("Range {start}..{end} is invalid for content of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },
}

pub type MutationResult<T> = Result<T, MutationError>;

impl Mutation {
    /// Apply mutation to the document with validation
    pub fn apply(&self, doc: &mut Document) -> MutationResult<()> {
        self.validate(doc)?;

        match self {
            Mutation::InsertBlock { index, block } => {
                doc.blocks.insert(*index, normalize_block(block.clone()));
            }
            Mutation::InsertImage { index, image } => {
                doc.blocks.insert(*index, Block::Image(image.clone()));
            }
            Mutation::RemoveBlock { index } => {
                doc.blocks.remove(*index);
            }
            Mutation::ReplaceBlock { index, block } => {
                doc.blocks[*index] = normalize_block(block.clone());
            }
            Mutation::SetHeading { index, level } => {
                Self::apply_set_heading(&mut doc.blocks[*index], *level);
            }
            Mutation::ToggleList { index, ordered } => {
                Self::apply_toggle_list(doc, *index, *ordered);
            }
            Mutation::InsertText {
                index,
                offset,
                text,
            } => {
                if let Some(content) = doc.blocks[*index].content_mut() {
                    insert_text(content, *offset, text);
                }
            }
            Mutation::ToggleMark {
                index,
                start,
                end,
                mark,
            } => {
                if let Some(content) = doc.blocks[*index].content_mut() {
                    toggle_mark(content, *start, *end, mark);
                }
            }
        }

        Ok(())
    }

    /// Check the mutation against `doc` without changing it
    pub fn validate(&self, doc: &Document) -> MutationResult<()> {
        let len = doc.blocks.len();

        match self {
            Mutation::InsertBlock { index, .. } | Mutation::InsertImage { index, .. } => {
                if *index > len {
                    return Err(MutationError::BlockOutOfRange { index: *index, len });
                }
                Ok(())
            }
            Mutation::RemoveBlock { index } | Mutation::ReplaceBlock { index, .. } => {
                block_at(doc, *index).map(|_| ())
            }
            Mutation::SetHeading { index, .. } => text_content(doc, *index).map(|_| ()),
            Mutation::ToggleList { index, .. } => match block_at(doc, *index)? {
                Block::Image(_) => Err(MutationError::NotTextBlock(*index)),
                _ => Ok(()),
            },
            Mutation::InsertText { index, offset, .. } => {
                let len = content_len(text_content(doc, *index)?);
                if *offset > len {
                    return Err(MutationError::InvalidRange {
                        start: *offset,
                        end: *offset,
                        len,
                    });
                }
                Ok(())
            }
            Mutation::ToggleMark {
                index, start, end, ..
            } => {
                let len = content_len(text_content(doc, *index)?);
                if start >= end || *end > len {
                    return Err(MutationError::InvalidRange {
                        start: *start,
                        end: *end,
                        len,
                    });
                }
                Ok(())
            }
        }
    }

    fn apply_set_heading(block: &mut Block, level: HeadingLevel) {
        let to_paragraph = matches!(block, Block::Heading { level: current, .. } if *current == level);
        let content = block.content_mut().map(std::mem::take).unwrap_or_default();

        *block = if to_paragraph {
            Block::Paragraph { content }
        } else {
            Block::Heading { level, content }
        };
    }

    fn apply_toggle_list(doc: &mut Document, index: usize, ordered: bool) {
        let block = doc.blocks.remove(index);

        let replacement = match block {
            Block::BulletList { items } if !ordered => unwrap_items(items),
            Block::OrderedList { items } if ordered => unwrap_items(items),
            Block::BulletList { items } | Block::OrderedList { items } => {
                vec![list(ordered, items)]
            }
            Block::Paragraph { content } | Block::Heading { content, .. } => {
                vec![list(ordered, vec![ListItem::paragraph(content)])]
            }
            image @ Block::Image(_) => vec![image],
        };

        let tail = doc.blocks.split_off(index);
        doc.blocks.extend(replacement);
        doc.blocks.extend(tail);
    }
}

fn block_at(doc: &Document, index: usize) -> MutationResult<&Block> {
    doc.blocks.get(index).ok_or(MutationError::BlockOutOfRange {
        index,
        len: doc.blocks.len(),
    })
}

fn text_content(doc: &Document, index: usize) -> MutationResult<&Vec<Inline>> {
    block_at(doc, index)?
        .content()
        .ok_or(MutationError::NotTextBlock(index))
}

/// Bring caller-built blocks to the shape the parser produces
fn normalize_block(block: Block) -> Block {
    match block {
        Block::Paragraph { content } => Block::Paragraph {
            content: normalize_inlines(content),
        },
        Block::Heading { level, content } => Block::Heading {
            level,
            content: normalize_inlines(content),
        },
        Block::BulletList { items } => Block::BulletList {
            items: normalize_items(items),
        },
        Block::OrderedList { items } => Block::OrderedList {
            items: normalize_items(items),
        },
        image @ Block::Image(_) => image,
    }
}

fn normalize_items(items: Vec<ListItem>) -> Vec<ListItem> {
    items
        .into_iter()
        .map(|item| ListItem {
            blocks: item.blocks.into_iter().map(normalize_block).collect(),
        })
        .collect()
}

fn list(ordered: bool, items: Vec<ListItem>) -> Block {
    if ordered {
        Block::OrderedList { items }
    } else {
        Block::BulletList { items }
    }
}

fn unwrap_items(items: Vec<ListItem>) -> Vec<Block> {
    items.into_iter().flat_map(|item| item.blocks).collect()
}

fn content_len(content: &[Inline]) -> usize {
    content.iter().map(Inline::char_len).sum()
}

/// Split text runs so that a run boundary falls at char offset `at`
fn split_at(content: Vec<Inline>, at: usize) -> Vec<Inline> {
    let mut out = Vec::with_capacity(content.len() + 1);
    let mut pos = 0;

    for inline in content {
        let len = inline.char_len();
        match inline {
            Inline::Text { text, marks } if pos < at && at < pos + len => {
                let byte = text
                    .char_indices()
                    .nth(at - pos)
                    .map(|(i, _)| i)
                    .unwrap_or(text.len());
                let (head, tail) = text.split_at(byte);
                out.push(Inline::marked(head, marks.clone()));
                out.push(Inline::marked(tail, marks));
            }
            other => out.push(other),
        }
        pos += len;
    }

    out
}

fn insert_text(content: &mut Vec<Inline>, offset: usize, text: &str) {
    if text.is_empty() {
        return;
    }

    let mut runs = split_at(std::mem::take(content), offset);

    let mut idx = 0;
    let mut pos = 0;
    while idx < runs.len() && pos < offset {
        pos += runs[idx].char_len();
        idx += 1;
    }

    // Typing continues the run before the cursor, falling back to the one after
    let previous = idx.checked_sub(1).and_then(|i| runs.get(i));
    let marks = match (previous, runs.get(idx)) {
        (Some(Inline::Text { marks, .. }), _) | (_, Some(Inline::Text { marks, .. })) => {
            marks.clone()
        }
        _ => Marks::default(),
    };

    runs.insert(idx, Inline::marked(text, marks));
    *content = normalize_inlines(runs);
}

fn toggle_mark(content: &mut Vec<Inline>, start: usize, end: usize, mark: &Mark) {
    let mut runs = split_at(split_at(std::mem::take(content), start), end);

    let mut selected = Vec::with_capacity(runs.len());
    let mut pos = 0;
    for inline in &runs {
        let len = inline.char_len();
        selected.push(pos >= start && pos + len <= end && matches!(inline, Inline::Text { .. }));
        pos += len;
    }

    let mut any = false;
    let mut all_set = true;
    for (inline, _) in runs.iter().zip(&selected).filter(|(_, chosen)| **chosen) {
        if let Inline::Text { marks, .. } = inline {
            any = true;
            all_set &= mark.is_set(marks);
        }
    }
    let remove = any && all_set;

    for (inline, chosen) in runs.iter_mut().zip(&selected) {
        if !*chosen {
            continue;
        }
        if let Inline::Text { marks, .. } = inline {
            if remove {
                mark.unset(marks);
            } else {
                mark.set(marks);
            }
        }
    }

    *content = normalize_inlines(runs);
}
