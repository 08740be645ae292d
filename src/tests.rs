use std::collections::HashMap;
use std::time::Duration;

use crate::analyze::{
    count_words, count_words_json, estimate_reading_time, estimate_reading_time_json,
    extract_headings, extract_headings_json, slugify,
};
use crate::commands::{AltTextEditor, AltTextOutcome, AltTextState, Command, Editor, Key, NodePath};
use crate::config::{self, MarkMode, RootSelector};
use crate::ingest::batch::{slug_from_url, ImportOptions, ImportRecord, Importer, RecordMetadata};
use crate::render::html_renderer::escape_text;
use crate::schema::{
    is_block, is_inline, is_mark, validate_block, Alignment, Block, Document, Heading,
    HeadingLevel, Image, ImageAttrs, List, ListItem, Mark, MarkKind, Paragraph, SchemaErrorKind,
    Size, Text,
};
use crate::{from_fragment, from_read, render_json, render_to_html, Error};

/// Like assert_eq!(), but prints out the results normally as well
macro_rules! assert_eq_str {
    ($a:expr, $b:expr) => {
        if $a != $b {
            println!("<<<\n{}===\n{}>>>", $a, $b);
            assert_eq!($a, $b);
        }
    };
}

#[track_caller]
fn test_ingest(input: &str, expected: Vec<Block>) {
    let doc = from_fragment(input);
    assert_eq!(doc.content, expected);
}

#[track_caller]
fn test_render(doc: &Document, expected: &str) {
    let output = render_to_html(doc);
    assert_eq_str!(output, expected);
}

#[track_caller]
fn test_roundtrip_html(input: &str, expected: &str) {
    test_render(&from_fragment(input), expected);
}

fn para(texts: Vec<Text>) -> Block {
    Block::Paragraph(Paragraph { content: texts })
}

fn image(alignment: Alignment, size: Size) -> Block {
    let mut image = Image::new("cat.png");
    image.attrs.alt = "A cat".into();
    image.attrs.alignment = alignment;
    image.attrs.size = size;
    Block::Image(image)
}

fn words(n: usize) -> Document {
    if n == 0 {
        return Document::default();
    }
    Document::new(vec![Block::Paragraph(Paragraph::from_text(
        vec!["word"; n].join(" "),
    ))])
}

// Ingestion

#[test]
fn test_mark_extraction() {
    test_ingest(
        r#"<p>Hello <strong>world</strong> and <a href="https://x.test">link</a></p>"#,
        vec![para(vec![
            Text::plain("Hello "),
            Text::with_marks("world", vec![Mark::Bold]),
            Text::plain(" and "),
            Text::with_marks("link", vec![Mark::link("https://x.test")]),
        ])],
    );
}

#[test]
fn test_b_and_i_tags() {
    test_ingest(
        "<p><b>bold</b> <i>slanted</i></p>",
        vec![para(vec![
            Text::with_marks("bold", vec![Mark::Bold]),
            Text::with_marks("slanted", vec![Mark::Italic]),
        ])],
    );
}

#[test]
fn test_drop_empty() {
    test_ingest("<p></p>", vec![]);
    test_ingest("<p><span></span></p>", vec![]);
    test_ingest("<h2>   </h2>", vec![]);
    test_ingest("<ul><li> </li></ul>", vec![]);
    test_ingest("", vec![]);
}

#[test]
fn test_empty_link_dropped() {
    test_ingest(r#"<p><a href="https://x.test"> </a></p>"#, vec![]);
}

#[test]
fn test_link_without_href_is_plain() {
    test_ingest(
        "<p><a>just text</a></p>",
        vec![para(vec![Text::plain("just text")])],
    );
}

#[test]
fn test_span_expanded_in_order() {
    test_ingest(
        "<p><span>one <em>two</em></span> three</p>",
        vec![para(vec![
            Text::plain("one "),
            Text::with_marks("two", vec![Mark::Italic]),
            Text::plain(" three"),
        ])],
    );
}

#[test]
fn test_heading_levels() {
    test_ingest(
        "<h1>A</h1><h2>B</h2><h3>C</h3><h4>D</h4><h5>E</h5>",
        vec![
            Block::Heading(Heading::new(HeadingLevel::H2, "A")),
            Block::Heading(Heading::new(HeadingLevel::H2, "B")),
            Block::Heading(Heading::new(HeadingLevel::H3, "C")),
            Block::Heading(Heading::new(HeadingLevel::H3, "D")),
        ],
    );
}

#[test]
fn test_heading_text_flattened() {
    test_ingest(
        "<h2>  Big <em>news</em>  </h2>",
        vec![Block::Heading(Heading::new(HeadingLevel::H2, "Big news"))],
    );
}

#[test]
fn test_exclusion_filtering() {
    test_ingest(
        r#"<div><p>Keep</p><div class="share-box">x</div></div>"#,
        vec![para(vec![Text::plain("Keep")])],
    );
}

#[test]
fn test_exclusion_nested_share() {
    test_ingest(
        r#"<div><section><p>Gone</p><span class="social-share-links"></span></section><p>Kept</p></div>"#,
        vec![para(vec![Text::plain("Kept")])],
    );
}

#[test]
fn test_exclusion_swiper() {
    test_ingest(
        r#"<div><div class="gallery"><div class="swiper"><p>Slide</p></div></div><p>Text</p></div>"#,
        vec![para(vec![Text::plain("Text")])],
    );
    // Only the exact class counts.
    test_ingest(
        r#"<div><div class="swiper-like"><p>Slide</p></div></div>"#,
        vec![para(vec![Text::plain("Slide")])],
    );
}

#[test]
fn test_exclusion_lone_wrapper() {
    test_ingest(r#"<div class="share-box"><p>x</p></div>"#, vec![]);
    test_ingest(
        r#"<div class="share-box"><p>x</p></div><p>y</p>"#,
        vec![para(vec![Text::plain("y")])],
    );
    test_ingest(r#"<div class="swiper"><p>slide</p></div>"#, vec![]);
    // A plain lone wrapper is still the content region.
    test_ingest(
        r#"<div class="content"><p>a</p><p>b</p></div>"#,
        vec![para(vec![Text::plain("a")]), para(vec![Text::plain("b")])],
    );
}

#[test]
fn test_exclusion_phrase() {
    test_ingest(
        r#"<div><div><p>Objednejte se ještě dnes!</p></div><p>Article</p></div>"#,
        vec![para(vec![Text::plain("Article")])],
    );
    let doc = config::ingest()
        .clear_exclusions()
        .exclude_phrase("Subscribe")
        .document_from_fragment(
            r#"<div><div class="share"><p>Shared</p></div><p>Subscribe now</p></div>"#,
        );
    assert_eq!(doc.content, vec![para(vec![Text::plain("Shared")])]);
}

#[test]
fn test_list_flattening() {
    test_ingest(
        "<ul><li>A <b>bold</b></li><li>B</li></ul>",
        vec![Block::BulletList(List {
            items: vec![ListItem::from_text("A bold"), ListItem::from_text("B")],
        })],
    );
}

#[test]
fn test_ordered_list_direct_children_only() {
    test_ingest(
        "<ol><li>One<ol><li>Nested</li></ol></li><li>Two</li></ol>",
        vec![
            Block::OrderedList(List {
                items: vec![ListItem::from_text("OneNested"), ListItem::from_text("Two")],
            }),
            // The nested list is also a list element in its own right.
            Block::OrderedList(List {
                items: vec![ListItem::from_text("Nested")],
            }),
        ],
    );
}

#[test]
fn test_unhandled_elements_dropped() {
    test_ingest(
        r#"<div><img src="x.png"><table><tr><td>cell</td></tr></table><p>After</p></div>"#,
        vec![para(vec![Text::plain("After")])],
    );
}

#[test]
fn test_shallow_marks() {
    test_ingest(
        "<p><strong><em>x</em></strong></p>",
        vec![para(vec![Text::with_marks("x", vec![Mark::Bold])])],
    );
}

#[test]
fn test_nested_marks() {
    let doc = config::ingest()
        .mark_mode(MarkMode::Nested)
        .document_from_fragment("<p><strong>a <em>b</em></strong> c</p>");
    assert_eq!(
        doc.content,
        vec![para(vec![
            Text::with_marks("a ", vec![Mark::Bold]),
            Text::with_marks("b", vec![Mark::Bold, Mark::Italic]),
            Text::plain(" c"),
        ])]
    );
}

#[test]
fn test_deep_nesting() {
    let depth = 1000;
    let html = format!(
        "<p>{}deep{}</p>",
        "<span>".repeat(depth),
        "</span>".repeat(depth)
    );
    test_ingest(&html, vec![para(vec![Text::plain("deep")])]);
}

#[test]
fn test_from_read_finds_article() {
    let html = br#"<html><head><title>Page</title></head>
        <body><nav><p>Menu</p></nav>
        <article><h1>Title</h1><p>Body</p></article></body></html>"#;
    let doc = from_read(&html[..]).unwrap();
    assert_eq!(
        doc.content,
        vec![
            Block::Heading(Heading::new(HeadingLevel::H2, "Title")),
            para(vec![Text::plain("Body")]),
        ]
    );
}

#[test]
fn test_from_read_class_root() {
    let html = br#"<html><body><p>Outside</p>
        <div class="entry-content"><p>Inside</p></div></body></html>"#;
    let doc = config::ingest()
        .content_root(RootSelector::Class("entry-content".into()))
        .document_from_read(&html[..])
        .unwrap();
    assert_eq!(doc.content, vec![para(vec![Text::plain("Inside")])]);

    let doc = config::ingest()
        .content_root(RootSelector::Tag("aside".into()))
        .document_from_read(&html[..])
        .unwrap();
    assert!(doc.is_empty());
}

// Schema

#[test]
fn test_json_shape() {
    let doc = Document::new(vec![
        Block::Heading(Heading::new(HeadingLevel::H2, "T")),
        para(vec![Text::with_marks("b", vec![Mark::Bold])]),
        Block::BulletList(List {
            items: vec![ListItem::from_text("A")],
        }),
        Block::Image(Image::new("a.png")),
    ]);
    assert_eq_str!(
        doc.to_json(),
        concat!(
            r#"{"type":"doc","content":["#,
            r#"{"type":"heading","attrs":{"level":2},"content":[{"type":"text","text":"T","marks":[]}]},"#,
            r#"{"type":"paragraph","content":[{"type":"text","text":"b","marks":[{"type":"bold"}]}]},"#,
            r#"{"type":"bulletList","content":[{"type":"listItem","content":[{"type":"paragraph","content":[{"type":"text","text":"A","marks":[]}]}]}]},"#,
            r#"{"type":"image","attrs":{"src":"a.png","alt":"","alignment":"center","size":"full"}}"#,
            r#"]}"#
        )
    );
}

#[test]
fn test_block_type_names() {
    let doc = from_fragment(
        r#"<h2>H</h2><p>P</p><ul><li>U</li></ul><ol><li>O</li></ol>"#,
    );
    let mut blocks = doc.content;
    blocks.push(image(Alignment::Left, Size::Small));
    let names: Vec<&str> = blocks.iter().map(Block::type_name).collect();
    assert_eq!(
        names,
        vec!["heading", "paragraph", "bulletList", "orderedList", "image"]
    );
    for block in &blocks {
        let value = serde_json::to_value(block).unwrap();
        assert_eq!(value["type"], block.type_name());
    }
}

#[test]
fn test_json_roundtrip() {
    let doc = from_fragment(
        r#"<h3>Sub</h3><p>a <a href="/x">b</a> <em>c</em></p><ol><li>1</li><li>2</li></ol>"#,
    );
    let json = doc.to_json();
    assert_eq!(Document::from_json(&json).unwrap(), doc);
    assert_eq!(Document::from_json(&json).unwrap().to_json(), json);
}

#[test]
fn test_empty_document() {
    let doc = Document::from_json(r#"{"type":"doc","content":[]}"#).unwrap();
    assert!(doc.is_empty());
    assert_eq!(Document::from_json(r#"{"type":"doc"}"#).unwrap(), doc);
    test_render(&doc, "");
}

#[test]
fn test_strict_rejects_unknown_type() {
    let json = r#"{"type":"doc","content":[
        {"type":"paragraph","content":[{"type":"text","text":"ok"}]},
        {"type":"video","attrs":{"src":"v.mp4"}}]}"#;
    match Document::from_json(json) {
        Err(Error::Schema(e)) => {
            assert_eq!(e.path, "content[1]");
            assert_eq!(
                e.kind,
                SchemaErrorKind::UnexpectedType("video".into(), "a block")
            );
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_strict_rejects_missing_type() {
    let json = r#"{"type":"doc","content":[{"type":"paragraph","content":[{"text":"no type"}]}]}"#;
    match Document::from_json(json) {
        Err(Error::Schema(e)) => {
            assert_eq!(e.path, "content[0].content[0]");
            assert_eq!(e.kind, SchemaErrorKind::MissingType);
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_strict_rejects_bad_heading_level() {
    let json = r#"{"type":"doc","content":[{"type":"heading","attrs":{"level":1},"content":[{"type":"text","text":"x"}]}]}"#;
    assert!(matches!(Document::from_json(json), Err(Error::Schema(_))));
}

#[test]
fn test_lenient_drops_invalid() {
    let json = r#"{"type":"doc","content":[
        {"type":"video"},
        {"content":[]},
        {"type":"paragraph","content":[
            {"type":"text","text":"kept","marks":[{"type":"underline"},{"type":"italic"}]},
            {"type":"mention","id":3}]},
        {"type":"paragraph","content":[{"type":"text","text":"   "}]}]}"#;
    let doc = Document::from_json_lenient(json).unwrap();
    assert_eq!(
        doc.content,
        vec![para(vec![Text::with_marks("kept", vec![Mark::Italic])])]
    );
}

#[test]
fn test_malformed_json() {
    assert!(matches!(Document::from_json("{not json"), Err(Error::Json(_))));
    assert!(matches!(
        Document::from_json_lenient("{not json"),
        Err(Error::Json(_))
    ));
}

#[test]
fn test_validators() {
    let block: serde_json::Value = serde_json::json!({
        "type": "image",
        "attrs": {"src": "a.png"}
    });
    assert!(is_block(&block));
    match validate_block(&block).unwrap() {
        Block::Image(image) => {
            assert_eq!(image.attrs.alt, "");
            assert_eq!(image.attrs.alignment, Alignment::Center);
            assert_eq!(image.attrs.size, Size::Full);
        }
        other => panic!("unexpected block {:?}", other),
    }
    assert!(!is_block(&serde_json::json!({"type": "text", "text": "x"})));
    assert!(!is_block(&serde_json::json!({"attrs": {}})));
    assert!(is_inline(&serde_json::json!({"type": "text", "text": "x"})));
    assert!(!is_inline(&serde_json::json!({"type": "text", "text": ""})));
    assert!(is_mark(&serde_json::json!({"type": "bold"})));
    assert!(is_mark(
        &serde_json::json!({"type": "link", "attrs": {"href": "h", "target": "_blank"}})
    ));
    assert!(!is_mark(&serde_json::json!({"type": "link", "attrs": {"href": ""}})));
    assert!(!is_mark(&serde_json::json!({"type": "strike"})));
}

// Rendering

#[test]
fn test_render_blocks() {
    test_roundtrip_html(
        "<h1>Intro</h1><p>Text <em>here</em></p><ol><li>a</li></ol><ul><li>b</li></ul>",
        r#"<h2 id="intro">Intro</h2><p>Text <em>here</em></p><ol><li>a</li></ol><ul><li>b</li></ul>"#,
    );
}

#[test]
fn test_render_link() {
    test_roundtrip_html(
        r#"<p><a href="https://x.test/?a=1&amp;b=2">go</a></p>"#,
        r#"<p><a href="https://x.test/?a=1&amp;b=2" target="_blank" rel="noopener noreferrer">go</a></p>"#,
    );
}

#[test]
fn test_render_escapes() {
    let doc = Document::new(vec![para(vec![Text::plain("1 < 2 & \"q\"")])]);
    test_render(&doc, "<p>1 &lt; 2 &amp; \"q\"</p>");
}

#[test]
fn test_render_image() {
    let doc = Document::new(vec![image(Alignment::Left, Size::Small)]);
    test_render(
        &doc,
        r#"<img src="cat.png" alt="A cat" class="rounded-lg my-4 float-left mr-6 max-w-xs" data-alignment="left" data-size="small">"#,
    );
}

#[test]
fn test_render_image_custom_classes() {
    let doc = Document::new(vec![image(Alignment::Full, Size::Large)]);
    let html = config::render()
        .image_base_classes("")
        .alignment_class(Alignment::Full, "wide")
        .size_class(Size::Large, "big")
        .render(&doc);
    assert_eq_str!(
        html,
        r#"<img src="cat.png" alt="A cat" class="wide big" data-alignment="full" data-size="large">"#
    );
}

#[test]
fn test_render_deterministic() {
    let doc = from_fragment(
        r#"<h2>A</h2><p>x <b>y</b> <a href="/z">z</a></p><ul><li>i</li></ul>"#,
    );
    assert_eq!(render_to_html(&doc), render_to_html(&doc));
    assert_eq!(render_to_html(&doc), render_to_html(&doc.clone()));
}

#[test]
fn test_mark_order_independence() {
    let a = Document::new(vec![para(vec![Text::with_marks(
        "x",
        vec![Mark::Italic, Mark::link("/h"), Mark::Bold],
    )])]);
    let b = Document::new(vec![para(vec![Text::with_marks(
        "x",
        vec![Mark::Bold, Mark::Italic, Mark::link("/h")],
    )])]);
    let expected = r#"<p><a href="/h" target="_blank" rel="noopener noreferrer"><strong><em>x</em></strong></a></p>"#;
    test_render(&a, expected);
    test_render(&b, expected);
}

#[test]
fn test_custom_mark_order() {
    let doc = Document::new(vec![para(vec![Text::with_marks(
        "x",
        vec![Mark::Bold, Mark::Italic],
    )])]);
    let html = config::render()
        .mark_order(vec![MarkKind::Italic, MarkKind::Bold])
        .render(&doc);
    assert_eq_str!(html, "<p><em><strong>x</strong></em></p>");
}

#[test]
fn test_duplicate_marks_rendered_once() {
    let doc = Document::new(vec![para(vec![Text::with_marks(
        "x",
        vec![Mark::Bold, Mark::Bold],
    )])]);
    test_render(&doc, "<p><strong>x</strong></p>");
}

#[test]
fn test_heading_ids_match_toc() {
    let doc = from_fragment("<h2>Jak začít?</h2><h3>Krok 1</h3>");
    let toc = extract_headings(&doc);
    let html = render_to_html(&doc);
    for entry in &toc {
        assert!(html.contains(&format!("id=\"{}\"", entry.id)));
    }
    let html = config::render().heading_ids(false).render(&doc);
    assert_eq_str!(html, "<h2>Jak začít?</h2><h3>Krok 1</h3>");
}

#[test]
fn test_heading_without_slug_has_no_id() {
    test_roundtrip_html(
        "<h2>!!!</h2><h2>???</h2><h3>Ok</h3>",
        r#"<h2>!!!</h2><h2>???</h2><h3 id="ok">Ok</h3>"#,
    );
}

#[test]
fn test_escape_text() {
    assert_eq!(escape_text("a < b && c > \"d\""), "a &lt; b &amp;&amp; c &gt; \"d\"");
    assert_eq!(escape_text("plain"), "plain");
}

#[test]
fn test_render_every_image_option() {
    let render = config::render();
    for alignment in Alignment::ALL {
        for size in Size::ALL {
            let html = render_to_html(&Document::new(vec![image(alignment, size)]));
            assert!(html.contains(&format!("data-alignment=\"{}\"", alignment.as_str())));
            assert!(html.contains(&format!("data-size=\"{}\"", size.as_str())));
            let attrs = ImageAttrs {
                alignment,
                size,
                ..ImageAttrs::default()
            };
            assert!(html.contains(&format!("class=\"{}\"", render.image_class(&attrs))));
            // The serialized names agree with as_str.
            assert_eq!(
                serde_json::to_value(alignment).unwrap(),
                serde_json::Value::from(alignment.as_str())
            );
            assert_eq!(
                serde_json::to_value(size).unwrap(),
                serde_json::Value::from(size.as_str())
            );
        }
    }
}

#[test]
fn test_render_json() {
    let json = r#"{"type":"doc","content":[
        {"type":"callout","content":[]},
        {"type":"paragraph","content":[{"type":"text","text":"Hi"}]}]}"#;
    assert_eq_str!(render_json(json, None), "<p>Hi</p>");
    assert_eq_str!(
        render_json(json, Some("prose")),
        r#"<div class="prose"><p>Hi</p></div>"#
    );
    assert_eq_str!(render_json("not json", Some("prose")), "");
}

// Analysis

#[test]
fn test_count_words() {
    let doc = from_fragment("<h2>Two words</h2><p>one <b>two</b>  three</p><ul><li>four five</li></ul>");
    assert_eq!(count_words(&doc), 7);
    assert_eq!(count_words(&Document::default()), 0);
}

#[test]
fn test_reading_time_boundary() {
    assert_eq!(estimate_reading_time(&words(0)), 1);
    assert_eq!(estimate_reading_time(&words(200)), 1);
    assert_eq!(estimate_reading_time(&words(201)), 2);
    assert_eq!(estimate_reading_time(&words(400)), 2);
}

#[test]
fn test_analysis_json_defaults() {
    assert_eq!(count_words_json("{"), 0);
    assert_eq!(estimate_reading_time_json("{"), 0);
    assert_eq!(estimate_reading_time_json("{oops"), 0);
    // A valid but empty document still takes a minute.
    assert_eq!(estimate_reading_time_json(r#"{"type":"doc","content":[]}"#), 1);
    assert!(extract_headings_json("garbage").is_empty());
    assert_eq!(count_words_json(&words(201).to_json()), 201);
    assert_eq!(estimate_reading_time_json(&words(201).to_json()), 2);
}

#[test]
fn test_extract_headings() {
    let doc = from_fragment("<h1>Úvod do tématu</h1><p>x</p><h4>Co dál?</h4>");
    let toc = extract_headings(&doc);
    assert_eq!(toc.len(), 2);
    assert_eq!(toc[0].id, "úvod-do-tématu");
    assert_eq!(toc[0].text, "Úvod do tématu");
    assert_eq!(toc[0].level, HeadingLevel::H2);
    assert_eq!(toc[1].id, "co-dál");
    assert_eq!(toc[1].level, HeadingLevel::H3);
}

#[test]
fn test_slugify() {
    assert_eq!(slugify("Hello, World!"), "hello-world");
    assert_eq!(slugify("Příliš žluťoučký kůň"), "příliš-žluťoučký-kůň");
    assert_eq!(slugify("a  -  b"), "a-b");
    assert_eq!(slugify("Tabs\tare\tdropped"), "tabsaredropped");
}

// Commands

#[test]
fn test_set_alignment_idempotent() {
    let doc = Document::new(vec![image(Alignment::Center, Size::Full)]);
    let before = doc.to_json();
    let mut editor = Editor::new(doc);
    assert!(editor.select(NodePath::Block(0)));
    editor.set_alignment(Alignment::Center);
    assert_eq!(editor.to_json(), before);
    editor.set_alignment(Alignment::Center);
    assert_eq!(editor.to_json(), before);
}

#[test]
fn test_set_attributes() {
    let mut editor = Editor::new(Document::new(vec![
        para(vec![Text::plain("p")]),
        image(Alignment::Center, Size::Full),
    ]));
    editor.select(NodePath::Block(1));
    editor.set_alignment(Alignment::Right);
    editor.apply(Command::SetSize(Size::Medium));
    editor.set_alt("A dog");
    let attrs = editor.target_image().unwrap();
    assert_eq!(attrs.alignment, Alignment::Right);
    assert_eq!(attrs.size, Size::Medium);
    assert_eq!(attrs.alt, "A dog");
    assert_eq!(attrs.src, "cat.png");
    assert_eq!(editor.document().content[0], para(vec![Text::plain("p")]));
}

#[test]
fn test_commands_without_target() {
    let doc = Document::new(vec![
        para(vec![Text::plain("p")]),
        image(Alignment::Center, Size::Full),
    ]);
    let before = doc.to_json();
    let mut editor = Editor::new(doc);
    editor.set_alignment(Alignment::Left);
    editor.delete_node();
    // A paragraph is not an image.
    editor.select(NodePath::Block(0));
    editor.set_size(Size::Small);
    assert!(!editor.select(NodePath::Block(7)));
    editor.apply(Command::SetAlt("x".into()));
    assert_eq!(editor.to_json(), before);
}

#[test]
fn test_delete_node() {
    let mut editor = Editor::new(Document::new(vec![
        para(vec![Text::plain("a")]),
        image(Alignment::Center, Size::Full),
        para(vec![Text::plain("b")]),
    ]));
    editor.select(NodePath::Block(1));
    editor.apply(Command::DeleteNode);
    assert_eq!(editor.target(), None);
    assert_eq!(
        editor.document().content,
        vec![para(vec![Text::plain("a")]), para(vec![Text::plain("b")])]
    );
}

#[test]
fn test_delete_list_item() {
    let mut editor = Editor::new(from_fragment("<ul><li>one</li><li>two</li></ul><p>end</p>"));
    assert!(editor.select(NodePath::ListItem { block: 0, item: 0 }));
    editor.delete_node();
    assert_eq!(
        editor.document().content[0],
        Block::BulletList(List {
            items: vec![ListItem::from_text("two")]
        })
    );
    assert!(!editor.select(NodePath::ListItem { block: 1, item: 0 }));
    editor.select(NodePath::ListItem { block: 0, item: 0 });
    editor.delete_node();
    assert_eq!(editor.document().content, vec![para(vec![Text::plain("end")])]);
}

#[test]
fn test_alt_text_save() {
    let mut editor = Editor::new(Document::new(vec![image(Alignment::Center, Size::Full)]));
    editor.select(NodePath::Block(0));
    let mut alt = AltTextEditor::new();
    assert_eq!(alt.display(&editor), "A cat");
    assert!(alt.begin(&editor));
    assert_eq!(
        alt.state(),
        &AltTextState::Editing {
            buffer: "A cat".into(),
            target: NodePath::Block(0),
        }
    );
    for _ in 0..3 {
        alt.handle_key(&mut editor, Key::Backspace);
    }
    for c in "dog".chars() {
        assert_eq!(alt.handle_key(&mut editor, Key::Char(c)), None);
    }
    assert_eq!(alt.display(&editor), "A dog");
    // Not written until committed.
    assert_eq!(editor.target_image().unwrap().alt, "A cat");
    assert_eq!(
        alt.handle_key(&mut editor, Key::Enter),
        Some(AltTextOutcome::Saved("A dog".into()))
    );
    assert_eq!(alt.state(), &AltTextState::Idle);
    assert_eq!(editor.target_image().unwrap().alt, "A dog");
}

#[test]
fn test_alt_text_cancel() {
    let mut editor = Editor::new(Document::new(vec![image(Alignment::Center, Size::Full)]));
    editor.select(NodePath::Block(0));
    let before = editor.to_json();
    let mut alt = AltTextEditor::new();
    alt.begin(&editor);
    alt.set_buffer("Something else");
    assert_eq!(
        alt.handle_key(&mut editor, Key::Escape),
        Some(AltTextOutcome::Cancelled)
    );
    assert!(!alt.is_editing());
    assert_eq!(alt.display(&editor), "A cat");
    assert_eq!(editor.to_json(), before);
    // Keys do nothing while idle.
    assert_eq!(alt.handle_key(&mut editor, Key::Enter), None);
}

#[test]
fn test_alt_text_needs_image() {
    let mut editor = Editor::new(Document::new(vec![para(vec![Text::plain("p")])]));
    let mut alt = AltTextEditor::new();
    assert!(!alt.begin(&editor));
    editor.select(NodePath::Block(0));
    assert!(!alt.begin(&editor));
    assert_eq!(alt.display(&editor), "");
}

#[test]
fn test_alt_text_follows_its_image() {
    let mut dog = Image::new("dog.png");
    dog.attrs.alt = "A dog".into();
    let mut editor = Editor::new(Document::new(vec![
        image(Alignment::Center, Size::Full),
        Block::Image(dog),
    ]));
    editor.select(NodePath::Block(0));
    let mut alt = AltTextEditor::new();
    assert!(alt.begin(&editor));
    alt.set_buffer("edited for cat");
    editor.select(NodePath::Block(1));
    assert_eq!(
        alt.handle_key(&mut editor, Key::Enter),
        Some(AltTextOutcome::Cancelled)
    );
    assert!(!alt.is_editing());
    assert_eq!(editor.target_image().unwrap().alt, "A dog");
    editor.select(NodePath::Block(0));
    assert_eq!(editor.target_image().unwrap().alt, "A cat");

    // Deselecting mid-edit also drops the edit.
    assert!(alt.begin(&editor));
    alt.set_buffer("lost");
    editor.deselect();
    assert_eq!(editor.target(), None);
    assert_eq!(
        alt.handle_key(&mut editor, Key::Enter),
        Some(AltTextOutcome::Cancelled)
    );

    // Reselecting the same image before committing saves as usual.
    editor.select(NodePath::Block(0));
    assert!(alt.begin(&editor));
    alt.set_buffer("A grey cat");
    editor.select(NodePath::Block(1));
    editor.select(NodePath::Block(0));
    assert_eq!(
        alt.handle_key(&mut editor, Key::Enter),
        Some(AltTextOutcome::Saved("A grey cat".into()))
    );
    let doc = editor.into_document();
    match (&doc.content[0], &doc.content[1]) {
        (Block::Image(cat), Block::Image(dog)) => {
            assert_eq!(cat.attrs.alt, "A grey cat");
            assert_eq!(dog.attrs.alt, "A dog");
        }
        other => panic!("unexpected blocks {:?}", other),
    }
}

// Batch import

fn pages() -> HashMap<String, String> {
    let mut pages = HashMap::new();
    pages.insert(
        "https://example.test/blog/first-post/".to_string(),
        r#"<html><head><title>First | Blog</title>
           <meta property="og:image" content="https://example.test/first.jpg"></head>
           <body><article><h1>First post</h1><p>Hello there.</p></article></body></html>"#
            .to_string(),
    );
    pages.insert(
        "https://example.test/blog/empty".to_string(),
        "<html><head><title>Empty</title></head><body></body></html>".to_string(),
    );
    pages.insert(
        "https://example.test/blog/first-post?ref=dup".to_string(),
        "<html><body><p>dup</p></body></html>".to_string(),
    );
    pages
}

#[test]
fn test_import_batch() {
    let pages = pages();
    let source = |url: &str| {
        pages.get(url).cloned().ok_or_else(|| Error::Fetch {
            url: url.to_string(),
            message: "404".into(),
        })
    };
    let records = vec![
        ImportRecord::new("https://example.test/blog/first-post/"),
        ImportRecord::new("https://example.test/blog/missing"),
        ImportRecord {
            url: "https://example.test/blog/empty".into(),
            metadata: RecordMetadata {
                slug: Some("renamed".into()),
                title: None,
                featured_image: Some("cover.png".into()),
            },
        },
        ImportRecord::new("https://example.test/blog/first-post?ref=dup"),
    ];
    let report = Importer::new(source)
        .with_options(ImportOptions {
            delay: Duration::ZERO,
        })
        .run(&records);

    assert_eq!(report.imported(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failures[0].url, "https://example.test/blog/missing");
    assert_eq!(report.skipped, vec!["https://example.test/blog/first-post?ref=dup"]);
    assert_eq!(report.needs_review, vec!["renamed"]);

    let first = &report.articles[0];
    assert_eq!(first.slug, "first-post");
    assert_eq!(first.title, "First post");
    assert_eq!(
        first.featured_image.as_deref(),
        Some("https://example.test/first.jpg")
    );
    assert_eq!(first.content_length, 2);
    assert_eq!(
        Document::from_json(&first.content).unwrap().content[1],
        para(vec![Text::plain("Hello there.")])
    );

    let empty = &report.articles[1];
    assert_eq!(empty.slug, "renamed");
    assert_eq!(empty.title, "Empty");
    assert_eq!(empty.featured_image.as_deref(), Some("cover.png"));
    assert_eq!(empty.content_length, 0);
    assert_eq!(empty.content, r#"{"type":"doc","content":[]}"#);
}

#[test]
fn test_imported_article_json() {
    let pages = pages();
    let mut importer = Importer::new(|url: &str| {
        pages.get(url).cloned().ok_or_else(|| Error::Fetch {
            url: url.to_string(),
            message: "404".into(),
        })
    });
    let article = importer
        .import_one(&ImportRecord::new("https://example.test/blog/empty"))
        .unwrap();
    let json = serde_json::to_value(&article).unwrap();
    assert_eq!(json["slug"], "empty");
    assert_eq!(json["featuredImage"], serde_json::Value::Null);
    assert_eq!(json["contentLength"], 0);
}

#[test]
fn test_import_record_json() {
    let records: Vec<ImportRecord> = serde_json::from_str(
        r#"[{"url":"a.html"},{"url":"b.html","metadata":{"title":"B","featuredImage":"b.png"}}]"#,
    )
    .unwrap();
    assert_eq!(records[0].metadata, RecordMetadata::default());
    assert_eq!(records[1].metadata.title.as_deref(), Some("B"));
    assert_eq!(records[1].metadata.featured_image.as_deref(), Some("b.png"));
}

#[test]
fn test_slug_from_url() {
    assert_eq!(
        slug_from_url("https://example.test/blog/post-1/?utm=x#top").as_deref(),
        Some("post-1")
    );
    assert_eq!(slug_from_url("pages/about.html").as_deref(), Some("about"));
    assert_eq!(slug_from_url("https://example.test/"), None);
    assert_eq!(slug_from_url("https://example.test"), None);
}
