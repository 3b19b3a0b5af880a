//! Benchmarks for chapter segmentation.
//!
//! Run with: cargo bench

use std::io::{Cursor, Write};

use criterion::{Criterion, criterion_group, criterion_main};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use shiori::chapters::{
    ChapterAssembler, Diagnostic, HeadingClassifier, PositionIndex, build_segments,
    heading_candidates,
};
use shiori::dom::Document;

const CHAPTERS: usize = 200;
const PARAGRAPHS_PER_CHAPTER: usize = 20;

/// `CHAPTERS` sections headed `Chapter n`, each holding paragraphs and quotes.
fn sample_html() -> String {
    let mut html = String::from("<html><body>");
    for chapter in 1..=CHAPTERS {
        html.push_str(&format!("<section><h2>Chapter {chapter}</h2>"));
        for paragraph in 0..PARAGRAPHS_PER_CHAPTER {
            if paragraph % 5 == 0 {
                html.push_str("<blockquote><p>Quoted <em>passage</em> text.</p></blockquote>");
            } else {
                html.push_str("<p>Some prose with <a href=\"#n\">a note</a> in it.</p>");
            }
        }
        html.push_str("</section>");
    }
    html.push_str("</body></html>");
    html
}

fn sample_epub(html: &str) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file("META-INF/container.xml", options).unwrap();
    zip.write_all(br#"<container><rootfiles><rootfile full-path="content.opf"/></rootfiles></container>"#)
        .unwrap();
    zip.start_file("content.opf", options).unwrap();
    zip.write_all(
        br#"<package><metadata/><manifest><item id="text" href="text.xhtml" media-type="application/xhtml+xml"/></manifest><spine><itemref idref="text"/></spine></package>"#,
    )
    .unwrap();
    zip.start_file("text.xhtml", options).unwrap();
    zip.write_all(html.as_bytes()).unwrap();

    zip.finish().unwrap().into_inner()
}

// ============================================================================
// Segmentation Benchmarks
// ============================================================================

fn bench_parse_document(c: &mut Criterion) {
    let html = sample_html();

    c.bench_function("parse_document", |b| {
        b.iter(|| Document::parse(&html));
    });
}

fn bench_build_segments(c: &mut Criterion) {
    let doc = Document::parse(&sample_html());
    let classifier = HeadingClassifier::default();

    c.bench_function("build_segments", |b| {
        b.iter(|| {
            let index = PositionIndex::build(doc.dom(), doc.body());
            let candidates = heading_candidates(doc.dom(), &index);
            build_segments(doc.dom(), &index, &candidates, &classifier)
        });
    });
}

fn bench_assemble_document(c: &mut Criterion) {
    let doc = Document::parse(&sample_html());
    let assembler = ChapterAssembler::default();

    c.bench_function("assemble_document", |b| {
        b.iter(|| {
            let mut chapters = Vec::new();
            assembler.append_document("text", &doc, &mut chapters, &mut Vec::<Diagnostic>::new());
            chapters
        });
    });
}

// ============================================================================
// Book I/O Benchmarks
// ============================================================================

fn bench_read_book(c: &mut Criterion) {
    let epub = sample_epub(&sample_html());

    c.bench_function("read_book", |b| {
        b.iter(|| shiori::read_book(Cursor::new(epub.as_slice()), "bench").unwrap());
    });
}

criterion_group!(
    benches,
    bench_parse_document,
    bench_build_segments,
    bench_assemble_document,
    bench_read_book,
);
criterion_main!(benches);
