//! Benchmarks for normalization and restyling.
//!
//! Run with: cargo bench
//!
//! Documents are synthetic: repeated sections of headings, body text,
//! captions, tables, and a reference list.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use texword::docx::{read_docx_bytes, to_docx_bytes};
use texword::model::{Document, Paragraph, StyleSheet, Table};
use texword::normalize::{resolve_citations, strip_comments};
use texword::restyle::Restyler;
use texword::{Diagnostics, StyleConfig};

/// Creates a document with the given number of sections.
fn create_test_document(sections: usize) -> Document {
    let mut doc = Document::new();
    doc.styles = StyleSheet::academic();
    doc.add_paragraph(Paragraph::with_text("A Synthetic Study").with_style("Title"));

    for i in 0..sections {
        doc.add_paragraph(Paragraph::with_text(format!("Section {}", i + 1)).with_style("Heading1"));
        for _ in 0..8 {
            doc.add_paragraph(
                Paragraph::with_text("Lorem ipsum dolor sit amet, consectetur adipiscing elit.")
                    .with_style("BodyText"),
            );
        }
        doc.add_paragraph(Paragraph::new().with_style("BodyText"));
        doc.add_paragraph(Paragraph::new().with_style("BodyText"));
        doc.add_paragraph(Paragraph::with_text(format!("Table {}: Scores", i + 1)).with_style("TableCaption"));
        doc.add_table(Table::from_rows([["Model", "Score"], ["A", "0.91"], ["B", "0.87"]]));
    }

    doc.add_paragraph(Paragraph::with_text("References").with_style("Heading1"));
    for i in 0..sections {
        doc.add_paragraph(
            Paragraph::with_text(format!("Author{}, A. (2020). A paper.", i)).with_style("BodyText"),
        );
    }
    doc
}

/// Creates LaTeX source with the given number of cited paragraphs.
fn create_test_source(paragraphs: usize) -> String {
    let mut source = String::from("\\documentclass{article}\n\\begin{document}\n");
    for i in 0..paragraphs {
        source.push_str(&format!(
            "As \\citet{{key{}}} showed, results hold \\citep[p. 3]{{key{}}}. % note {}\n",
            i % 20,
            (i + 1) % 20,
            i
        ));
    }
    source.push_str("\\begin{thebibliography}{99}\n");
    for i in 0..20 {
        source.push_str(&format!("\\bibitem[Author{}(2020)]{{key{}}} Entry.\n", i, i));
    }
    source.push_str("\\end{thebibliography}\n\\end{document}\n");
    source
}

fn bench_restyle(c: &mut Criterion) {
    let style = StyleConfig::default();
    let restyler = Restyler::new(&style).unwrap();
    let mut group = c.benchmark_group("restyle");

    for sections in [10, 100] {
        let doc = create_test_document(sections);
        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter_batched(
                || doc.clone(),
                |mut doc| black_box(restyler.run(&mut doc)),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_docx_roundtrip(c: &mut Criterion) {
    let bytes = to_docx_bytes(&create_test_document(50)).unwrap();

    c.bench_function("docx_read_50_sections", |b| {
        b.iter(|| read_docx_bytes(black_box(&bytes)).unwrap())
    });
}

fn bench_normalize(c: &mut Criterion) {
    let source = create_test_source(500);

    c.bench_function("strip_comments_500", |b| {
        b.iter(|| strip_comments(black_box(&source)))
    });
    c.bench_function("resolve_citations_500", |b| {
        b.iter(|| {
            let mut diags = Diagnostics::new();
            resolve_citations(black_box(&source), &mut diags)
        })
    });
}

criterion_group!(benches, bench_restyle, bench_docx_roundtrip, bench_normalize);
criterion_main!(benches);
