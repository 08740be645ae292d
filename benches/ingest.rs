use criterion::{black_box, criterion_group, criterion_main, Criterion};

use html2doc::{from_fragment, render_to_html};

fn make_article(paragraphs: usize) -> String {
    let mut result = String::from("<div><h1>Title</h1>");
    for i in 0..paragraphs {
        if i % 10 == 0 {
            result.push_str(&format!("<h3>Section {}</h3>", i / 10));
        }
        result.push_str(
            "<p>Some <strong>strong</strong> words, <em>some</em> \
             <a href=\"https://example.test/\">linked</a>, <span>and <b>more</b></span>.</p>",
        );
        if i % 7 == 0 {
            result.push_str("<ul><li>one</li><li>two <i>three</i></li></ul>");
        }
    }
    result.push_str("<div class=\"share-buttons\"><p>Share</p></div></div>");
    result
}

fn make_nested(depth: usize) -> String {
    format!(
        "<p>{}text{}</p>",
        "<span>".repeat(depth),
        "</span>".repeat(depth)
    )
}

fn bench_ingest(c: &mut Criterion) {
    let small = make_article(10);
    let large = make_article(1000);
    let nested = make_nested(500);
    c.bench_function("ingest_empty", |b| b.iter(|| from_fragment(black_box(""))));
    c.bench_function("ingest_article_10", |b| {
        b.iter(|| from_fragment(black_box(&small)))
    });
    c.bench_function("ingest_article_1000", |b| {
        b.iter(|| from_fragment(black_box(&large)))
    });
    c.bench_function("ingest_nested_500", |b| {
        b.iter(|| from_fragment(black_box(&nested)))
    });
}

fn bench_render(c: &mut Criterion) {
    let doc = from_fragment(&make_article(1000));
    c.bench_function("render_article_1000", |b| {
        b.iter(|| render_to_html(black_box(&doc)))
    });
    let json = doc.to_json();
    c.bench_function("render_json_article_1000", |b| {
        b.iter(|| html2doc::render_json(black_box(&json), Some("prose")))
    });
}

criterion_group!(benches, bench_ingest, bench_render);
criterion_main!(benches);
