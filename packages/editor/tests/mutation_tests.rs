//! Comprehensive mutation tests

use scribe_editor::{Mutation, MutationError};
use scribe_parser::{
    parse, serialize, Block, Document, HeadingLevel, Image, ImageSource, Inline, ListItem, Mark,
    Marks,
};

fn doc(markup: &str) -> Document {
    parse(markup).unwrap()
}

fn apply(markup: &str, mutation: Mutation) -> String {
    let mut document = doc(markup);
    mutation.apply(&mut document).unwrap();
    serialize(&document)
}

#[test]
fn test_insert_and_remove_blocks() {
    assert_eq!(
        apply(
            "<p>b</p>",
            Mutation::InsertBlock {
                index: 0,
                block: Block::heading(HeadingLevel::H1, "a"),
            }
        ),
        "<h1>a</h1><p>b</p>"
    );
    assert_eq!(
        apply(
            "<p>a</p>",
            Mutation::InsertBlock {
                index: 1,
                block: Block::paragraph("b"),
            }
        ),
        "<p>a</p><p>b</p>"
    );
    assert_eq!(
        apply("<p>a</p><p>b</p>", Mutation::RemoveBlock { index: 0 }),
        "<p>b</p>"
    );
    assert_eq!(
        apply(
            "<p>a</p>",
            Mutation::ReplaceBlock {
                index: 0,
                block: Block::paragraph("z"),
            }
        ),
        "<p>z</p>"
    );
}

#[test]
fn test_removing_last_block_gives_placeholder() {
    assert_eq!(
        apply("<p>only</p>", Mutation::RemoveBlock { index: 0 }),
        scribe_parser::PLACEHOLDER_BODY
    );
}

#[test]
fn test_set_heading_toggles() {
    let heading = apply(
        "<p><strong>Title</strong></p>",
        Mutation::SetHeading {
            index: 0,
            level: HeadingLevel::H2,
        },
    );
    assert_eq!(heading, "<h2><strong>Title</strong></h2>");

    let other_level = apply(
        &heading,
        Mutation::SetHeading {
            index: 0,
            level: HeadingLevel::H1,
        },
    );
    assert_eq!(other_level, "<h1><strong>Title</strong></h1>");

    let back = apply(
        &other_level,
        Mutation::SetHeading {
            index: 0,
            level: HeadingLevel::H1,
        },
    );
    assert_eq!(back, "<p><strong>Title</strong></p>");
}

#[test]
fn test_toggle_list_wraps_switches_and_unwraps() {
    let bullet = apply(
        "<p>item</p>",
        Mutation::ToggleList {
            index: 0,
            ordered: false,
        },
    );
    assert_eq!(bullet, "<ul><li><p>item</p></li></ul>");

    let ordered = apply(
        &bullet,
        Mutation::ToggleList {
            index: 0,
            ordered: true,
        },
    );
    assert_eq!(ordered, "<ol><li><p>item</p></li></ol>");

    let unwrapped = apply(
        "<p>before</p><ol><li><p>a</p></li><li><p>b</p></li></ol><p>after</p>",
        Mutation::ToggleList {
            index: 1,
            ordered: true,
        },
    );
    assert_eq!(unwrapped, "<p>before</p><p>a</p><p>b</p><p>after</p>");
}

#[test]
fn test_insert_text_at_offsets() {
    assert_eq!(
        apply(
            "<p>Hllo</p>",
            Mutation::InsertText {
                index: 0,
                offset: 1,
                text: "e".to_string(),
            }
        ),
        "<p>Hello</p>"
    );
    assert_eq!(
        apply(
            "<p>a<br>c</p>",
            Mutation::InsertText {
                index: 0,
                offset: 2,
                text: "b".to_string(),
            }
        ),
        "<p>a<br>bc</p>"
    );
    assert_eq!(
        apply(
            "<p></p>",
            Mutation::InsertText {
                index: 0,
                offset: 0,
                text: "x < y".to_string(),
            }
        ),
        "<p>x &lt; y</p>"
    );
}

#[test]
fn test_toggle_link() {
    let linked = apply(
        "<p>read the docs</p>",
        Mutation::ToggleMark {
            index: 0,
            start: 9,
            end: 13,
            mark: Mark::Link {
                href: "https://docs.example.com".to_string(),
            },
        },
    );

    let document = doc(&linked);
    assert_eq!(
        document.blocks,
        vec![Block::Paragraph {
            content: vec![
                Inline::plain("read the "),
                Inline::marked("docs", Marks::link("https://docs.example.com")),
            ]
        }]
    );

    // Toggling a link over an already linked range removes it
    let unlinked = apply(
        &linked,
        Mutation::ToggleMark {
            index: 0,
            start: 9,
            end: 13,
            mark: Mark::Link {
                href: "https://other.example.com".to_string(),
            },
        },
    );
    assert_eq!(unlinked, "<p>read the docs</p>");
}

#[test]
fn test_toggle_mark_skips_hard_breaks() {
    let result = apply(
        "<p>a<br>b</p>",
        Mutation::ToggleMark {
            index: 0,
            start: 0,
            end: 3,
            mark: Mark::Underline,
        },
    );
    assert_eq!(result, "<p><u>a</u><br><u>b</u></p>");
}

#[test]
fn test_insert_image() {
    let result = apply(
        "<p>caption</p>",
        Mutation::InsertImage {
            index: 1,
            image: Image::new(ImageSource::url("https://cdn.example.com/a.png")).with_alt("A"),
        },
    );
    assert_eq!(
        result,
        r#"<p>caption</p><img src="https://cdn.example.com/a.png" alt="A">"#
    );
}

#[test]
fn test_failures_leave_document_unchanged() {
    let original = doc("<p>text</p><img src=\"a.png\">");

    let cases = vec![
        (
            Mutation::RemoveBlock { index: 2 },
            MutationError::BlockOutOfRange { index: 2, len: 2 },
        ),
        (
            Mutation::InsertBlock {
                index: 3,
                block: Block::paragraph("x"),
            },
            MutationError::BlockOutOfRange { index: 3, len: 2 },
        ),
        (
            Mutation::SetHeading {
                index: 1,
                level: HeadingLevel::H1,
            },
            MutationError::NotTextBlock(1),
        ),
        (
            Mutation::ToggleList {
                index: 1,
                ordered: false,
            },
            MutationError::NotTextBlock(1),
        ),
        (
            Mutation::InsertText {
                index: 0,
                offset: 5,
                text: "!".to_string(),
            },
            MutationError::InvalidRange {
                start: 5,
                end: 5,
                len: 4,
            },
        ),
        (
            Mutation::ToggleMark {
                index: 0,
                start: 2,
                end: 2,
                mark: Mark::Bold,
            },
            MutationError::InvalidRange {
                start: 2,
                end: 2,
                len: 4,
            },
        ),
    ];

    for (mutation, expected) in cases {
        let mut document = original.clone();
        assert_eq!(mutation.apply(&mut document), Err(expected));
        assert_eq!(document, original);
    }
}

#[test]
fn test_mutation_serialization() {
    let mutation = Mutation::ToggleMark {
        index: 0,
        start: 0,
        end: 4,
        mark: Mark::Bold,
    };

    let json = serde_json::to_string(&mutation).unwrap();
    let back: Mutation = serde_json::from_str(&json).unwrap();
    assert_eq!(back, mutation);

    let list = Mutation::InsertBlock {
        index: 0,
        block: Block::BulletList {
            items: vec![ListItem::paragraph(vec![Inline::plain("a")])],
        },
    };
    let json = serde_json::to_string(&list).unwrap();
    assert_eq!(serde_json::from_str::<Mutation>(&json).unwrap(), list);
}

#[test]
fn test_inserted_blocks_are_normalized() {
    let mut document = doc("<p>x</p>");
    Mutation::InsertBlock {
        index: 1,
        block: Block::Paragraph {
            content: vec![Inline::plain("a"), Inline::plain(""), Inline::plain("b")],
        },
    }
    .apply(&mut document)
    .unwrap();
    Mutation::ReplaceBlock {
        index: 0,
        block: Block::BulletList {
            items: vec![ListItem::paragraph(vec![
                Inline::marked("c", Marks::bold()),
                Inline::marked("d", Marks::bold()),
            ])],
        },
    }
    .apply(&mut document)
    .unwrap();

    assert_eq!(
        document.blocks,
        vec![
            Block::BulletList {
                items: vec![ListItem::paragraph(vec![Inline::marked("cd", Marks::bold())])],
            },
            Block::Paragraph {
                content: vec![Inline::plain("ab")],
            },
        ]
    );
    assert_eq!(parse(&serialize(&document)).unwrap(), document);
}
