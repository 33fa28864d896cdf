//! Random edit sequences against a live session.
//!
//! Whatever the editing surface does, the stored body must parse back to
//! the session's document.

use proptest::collection::vec;
use proptest::prelude::*;
use scribe_editor::{EditSession, Mutation};
use scribe_parser::{parse, Block, HeadingLevel, Image, ImageSource, Inline, ListItem, Mark, Marks};

fn cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(256)
}

fn marks() -> impl Strategy<Value = Marks> {
    (
        any::<bool>(),
        any::<bool>(),
        prop::option::of("https://example\\.com/[a-z]{1,4}"),
    )
        .prop_map(|(bold, italic, link)| Marks {
            bold,
            italic,
            underline: false,
            link,
        })
}

/// Runs as a caller might build them: empty runs and unmerged neighbours allowed
fn raw_content() -> impl Strategy<Value = Vec<Inline>> {
    vec(
        prop_oneof![
            4 => ("[a-z <&>]{0,4}", marks()).prop_map(|(text, marks)| Inline::marked(text, marks)),
            1 => Just(Inline::HardBreak),
        ],
        0..5,
    )
}

fn level() -> impl Strategy<Value = HeadingLevel> {
    prop_oneof![Just(HeadingLevel::H1), Just(HeadingLevel::H2)]
}

fn block() -> impl Strategy<Value = Block> {
    prop_oneof![
        3 => raw_content().prop_map(|content| Block::Paragraph { content }),
        1 => (level(), raw_content()).prop_map(|(level, content)| Block::Heading { level, content }),
        1 => vec(raw_content().prop_map(ListItem::paragraph), 1..3)
            .prop_map(|items| Block::BulletList { items }),
        1 => vec(raw_content().prop_map(ListItem::paragraph), 1..3)
            .prop_map(|items| Block::OrderedList { items }),
    ]
}

fn mark() -> impl Strategy<Value = Mark> {
    prop_oneof![
        Just(Mark::Bold),
        Just(Mark::Italic),
        Just(Mark::Underline),
        "https://example\\.com/[a-z]{1,4}".prop_map(|href| Mark::Link { href }),
    ]
}

fn mutation() -> impl Strategy<Value = Mutation> {
    let index = 0..6usize;
    prop_oneof![
        (index.clone(), block()).prop_map(|(index, block)| Mutation::InsertBlock { index, block }),
        (index.clone(), block()).prop_map(|(index, block)| Mutation::ReplaceBlock { index, block }),
        index.clone().prop_map(|index| Mutation::RemoveBlock { index }),
        (index.clone(), level()).prop_map(|(index, level)| Mutation::SetHeading { index, level }),
        (index.clone(), any::<bool>())
            .prop_map(|(index, ordered)| Mutation::ToggleList { index, ordered }),
        (index.clone(), 0..8usize, "[a-z <&>]{0,3}").prop_map(|(index, offset, text)| {
            Mutation::InsertText {
                index,
                offset,
                text,
            }
        }),
        (index.clone(), 0..8usize, 1..4usize, mark()).prop_map(|(index, start, len, mark)| {
            Mutation::ToggleMark {
                index,
                start,
                end: start + len,
                mark,
            }
        }),
        (index, "[a-z]{1,4}").prop_map(|(index, name)| Mutation::InsertImage {
            index,
            image: Image::new(ImageSource::url(format!("https://img.example.com/{}.png", name))),
        }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(cases()))]

    #[test]
    fn body_parses_back_to_document(mutations in vec(mutation(), 1..12)) {
        let mut session = EditSession::new();
        for mutation in mutations {
            // Out-of-range edits are rejected and leave the session as it was
            let _ = session.apply(mutation);
            prop_assert_eq!(&parse(session.body()).unwrap(), session.document());
        }
    }

    #[test]
    fn reloading_the_body_is_not_an_edit(mutations in vec(mutation(), 1..8)) {
        let mut session = EditSession::new();
        for mutation in mutations {
            let _ = session.apply(mutation);
        }

        let body = session.body().to_string();
        let mut reopened = EditSession::for_post("1", "Title", &body).unwrap();
        reopened.replace_body(&body).unwrap();
        prop_assert!(!reopened.is_dirty());
        prop_assert_eq!(reopened.document(), session.document());
    }
}
