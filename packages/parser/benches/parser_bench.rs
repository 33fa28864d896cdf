use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scribe_parser::{parse, serialize, strip_to_plain_text};

const SHORT_POST: &str = r#"<h1>Weekend notes</h1><p>We went <strong>north</strong> and <a href="https://example.com/map" target="_blank" rel="noopener noreferrer nofollow">mapped it</a>.</p>"#;

fn long_post() -> String {
    let mut source = String::new();

    for i in 0..200 {
        source.push_str(&format!(
            r#"<h2 class="heading-node">Section {}</h2><p>Paragraph {} with <em>some</em> <u>formatting</u> &amp; an entity.<br>Second line.</p>"#,
            i, i
        ));
        if i % 10 == 0 {
            source.push_str(
                r#"<ul class="list-disc pl-4"><li><p>first</p></li><li><p>second</p><ol><li><p>nested</p></li></ol></li></ul>"#,
            );
            source.push_str(r#"<img src="https://cdn.example.com/photo.jpg" alt="photo">"#);
        }
    }

    source
}

fn parse_short_post(c: &mut Criterion) {
    c.bench_function("parse_short_post", |b| b.iter(|| parse(black_box(SHORT_POST))));
}

fn parse_long_post(c: &mut Criterion) {
    let source = long_post();

    c.bench_function("parse_long_post", |b| b.iter(|| parse(black_box(&source))));
}

fn serialize_long_post(c: &mut Criterion) {
    let doc = parse(&long_post()).unwrap();

    c.bench_function("serialize_long_post", |b| b.iter(|| serialize(black_box(&doc))));
}

fn strip_long_post(c: &mut Criterion) {
    let source = long_post();

    c.bench_function("strip_long_post", |b| {
        b.iter(|| strip_to_plain_text(black_box(&source)))
    });
}

criterion_group!(
    benches,
    parse_short_post,
    parse_long_post,
    serialize_long_post,
    strip_long_post
);
criterion_main!(benches);
