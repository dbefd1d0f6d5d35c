//! End-to-end tests over PDFs built in memory with lopdf.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document as LopdfDocument, Object, Stream};

use pdfsect::parser::{LayoutSource, PageSelection, ParseOptions, PdfSource};
use pdfsect::{parse_bytes, render, segment_source, Error, SegmentOptions, StyleMap, StyleRule};

fn text(s: &str) -> Object {
    Object::string_literal(s)
}

fn op(operator: &str, operands: Vec<Object>) -> Operation {
    Operation::new(operator, operands)
}

/// First page: a bold heading, a paragraph wrapped over three lines with a
/// hyphenated break.
fn first_page() -> Vec<Operation> {
    vec![
        op("BT", vec![]),
        op("Tf", vec!["F1".into(), 14.into()]),
        op("Td", vec![72.into(), 720.into()]),
        op("Tj", vec![text("Introduction")]),
        op("Tf", vec!["F2".into(), 11.into()]),
        op("Td", vec![0.into(), (-20).into()]),
        op("Tj", vec![text("Rust is fast. It is also safe.")]),
        op("Td", vec![0.into(), (-14).into()]),
        op("Tj", vec![text("Memory is man-")]),
        op("Td", vec![0.into(), (-14).into()]),
        op("Tj", vec![text("aged well.")]),
        op("ET", vec![]),
    ]
}

/// Second page: a heading and a `TJ` line whose words are split by kerning.
fn second_page() -> Vec<Operation> {
    vec![
        op("BT", vec![]),
        op("Tf", vec!["F1".into(), 14.into()]),
        op("Td", vec![72.into(), 720.into()]),
        op("Tj", vec![text("Methods")]),
        op("Tf", vec!["F2".into(), 11.into()]),
        op("Td", vec![0.into(), (-20).into()]),
        op(
            "TJ",
            vec![Object::Array(vec![
                text("We"),
                (-300).into(),
                text("measure."),
            ])],
        ),
        op("ET", vec![]),
    ]
}

fn build_pdf(pages: Vec<Vec<Operation>>) -> Vec<u8> {
    let mut doc = LopdfDocument::with_version("1.5");
    let pages_id = doc.new_object_id();

    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let roman = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => bold,
            "F2" => roman,
        },
    });

    let mut kids = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let stream = Stream::new(dictionary! {}, content.encode().unwrap());
        let content_id = doc.add_object(stream);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn title_map() -> StyleMap {
    StyleMap::from_rules(vec![StyleRule::title("Times-Bold")])
}

#[test]
fn test_pdf_to_sections() {
    let data = build_pdf(vec![first_page(), second_page()]);
    let doc = parse_bytes("paper.pdf", &data, &title_map()).unwrap();

    assert_eq!(doc.name, "paper.pdf");
    assert_eq!(doc.section_count(), 2);

    let intro = &doc.sections[0];
    assert_eq!(intro.title.content.trim(), "Introduction");
    assert_eq!(intro.title.style, "Times-Bold");
    let sentences: Vec<_> = intro.sentences.iter().map(|s| s.content.as_str()).collect();
    assert_eq!(
        sentences,
        vec!["Rust is fast.", "It is also safe.", "Memory is managed well."]
    );

    let methods = &doc.sections[1];
    assert_eq!(methods.title.content.trim(), "Methods");
    assert_eq!(methods.sentences[0].content, "We measure.");
    assert_eq!(methods.sentences[0].dominant_font(), Some("Times-Roman"));
}

#[test]
fn test_pdf_layout_structure() {
    let data = build_pdf(vec![first_page()]);
    let source = PdfSource::from_bytes("paper.pdf", data, &ParseOptions::default()).unwrap();
    let pages = source.extract().unwrap();

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].number, 1);
    assert_eq!(pages[0].containers.len(), 1);
    assert_eq!(pages[0].containers[0].lines.len(), 4);
}

#[test]
fn test_pdf_page_selection() {
    let data = build_pdf(vec![first_page(), second_page()]);
    let options = ParseOptions::new().with_pages(PageSelection::Pages(vec![2]));
    let source = PdfSource::from_bytes("paper.pdf", data.clone(), &options).unwrap();

    let doc = segment_source(source, &title_map(), &SegmentOptions::default()).unwrap();
    assert_eq!(doc.section_count(), 1);
    assert_eq!(doc.sections[0].title.content.trim(), "Methods");

    let options = ParseOptions::new().with_pages(PageSelection::Pages(vec![5]));
    let source = PdfSource::from_bytes("paper.pdf", data, &options).unwrap();
    assert!(matches!(source.extract(), Err(Error::PageOutOfRange(5, 2))));
}

#[test]
fn test_pdf_json_output() {
    let data = build_pdf(vec![second_page()]);
    let doc = parse_bytes("paper.pdf", &data, &title_map()).unwrap();

    let json = render::to_json(&doc, render::JsonFormat::Compact).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["name"], "paper.pdf");
    assert_eq!(value["content"][0]["title"]["style"], "Times-Bold");
    assert_eq!(value["content"][0]["sentences"][0]["content"], "We measure.");
    // "We measure. " including the word gap and the closing line break.
    assert_eq!(
        value["content"][0]["sentences"][0]["style"]["Times-Roman"],
        12
    );
}
