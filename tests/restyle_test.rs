//! Integration tests for structural restyling.

use texword::model::{Alignment, Document, Paragraph, StyleSheet, Table};
use texword::restyle::{
    classify, ArtifactCleaner, PageDecoration, RegionTracker, Region, RestyleOptions, Restyler,
    TableStyler,
};
use texword::StyleConfig;

fn doc_with(paragraphs: &[(&str, &str)]) -> Document {
    let mut doc = Document::new();
    doc.styles = StyleSheet::academic();
    for (style, text) in paragraphs {
        let para = if text.is_empty() {
            Paragraph::new().with_style(*style)
        } else {
            Paragraph::with_text(*text).with_style(*style)
        };
        doc.add_paragraph(para);
    }
    doc
}

fn texts(doc: &Document) -> Vec<String> {
    doc.paragraphs().map(|p| p.text()).collect()
}

#[test]
fn test_residue_removed_but_sentences_kept() {
    let mut doc = doc_with(&[("BodyText", "99"), ("BodyText", "99 bottles of beer")]);
    let removed = ArtifactCleaner::new().remove_residue(&mut doc);
    assert_eq!(removed, 1);
    assert_eq!(texts(&doc), vec!["99 bottles of beer"]);
}

#[test]
fn test_empty_paragraph_collapse() {
    let mut doc = doc_with(&[
        ("BodyText", ""),
        ("BodyText", ""),
        ("BodyText", ""),
        ("BodyText", "Content"),
    ]);
    assert_eq!(ArtifactCleaner::new().collapse_empty(&mut doc), 2);
    assert_eq!(texts(&doc), vec!["", "Content"]);

    let mut doc = doc_with(&[("BodyText", "A"), ("BodyText", ""), ("BodyText", "B")]);
    assert_eq!(ArtifactCleaner::new().collapse_empty(&mut doc), 0);
}

#[test]
fn test_three_line_table() {
    let style = StyleConfig::default();
    let mut table = Table::from_rows([["H1", "H2", "H3"], ["a", "b", "c"], ["d", "e", "f"]]);
    TableStyler::new(&style).style_table(&mut table);

    let borders = table.properties.borders.as_ref().unwrap();
    let top = borders.top.as_ref().unwrap();
    assert_eq!((top.style.as_str(), top.size), ("single", Some(12)));
    assert_eq!(borders.left.as_ref().unwrap().style, "none");
    assert_eq!(borders.inside_v.as_ref().unwrap().style, "none");

    for cell in &table.rows[0].cells {
        for run in cell.paragraphs().flat_map(|p| p.runs()) {
            assert_eq!(run.properties.bold, Some(true));
        }
    }
}

#[test]
fn test_caption_detection_in_two_languages() {
    assert!(classify::is_caption("bodytext", "Figure 3: Results"));
    assert!(classify::is_caption("bodytext", "图 2 实验结果"));
    assert!(classify::is_caption("bodytext", "表1 参数"));
    assert!(classify::is_caption("imagecaption", "Anything"));
    assert!(!classify::is_caption("bodytext", "Figures show that"));
}

#[test]
fn test_caption_abbreviation_and_negatives() {
    assert!(classify::is_caption("bodytext", "Fig. 2 shows the setup"));
    assert!(!classify::is_caption("bodytext", "The figure shows"));
    assert!(!classify::is_caption("bodytext", ""));
    assert!(!classify::is_caption_text("Table of contents"));
}

#[test]
fn test_collapse_empty_across_table() {
    let mut doc = doc_with(&[("BodyText", "")]);
    doc.add_table(Table::from_rows([["A"], ["1"]]));
    doc.add_paragraph(Paragraph::new().with_style("BodyText"));

    assert_eq!(ArtifactCleaner::new().collapse_empty(&mut doc), 0);
    assert_eq!(doc.body.len(), 3);
}

#[test]
fn test_region_tracker_enters_references() {
    let mut tracker = RegionTracker::new();
    assert_eq!(tracker.observe("heading1", "Introduction"), Region::Body);
    assert_eq!(tracker.observe("heading1", "References"), Region::References);
    assert_eq!(
        tracker.observe("bodytext", "Smith, J. (2020). Title."),
        Region::References
    );
}

#[test]
fn test_full_run_on_manuscript() {
    let style = StyleConfig::default().with_font("Times New Roman");
    let mut doc = doc_with(&[
        ("Title", "A Study of Things"),
        ("Author", "A. Author"),
        ("AbstractTitle", "Abstract"),
        ("Abstract", "We study things."),
        ("Heading1", "Introduction"),
        ("FirstParagraph", "Things matter."),
        ("ImageCaption", "Figure 1: A plot"),
        ("Heading1", "References"),
        ("BodyText", "Smith, J. (2020). A paper."),
    ]);
    doc.add_table(Table::from_rows([["A", "B"], ["1", "2"]]));

    let options = RestyleOptions::new()
        .with_page_decoration(PageDecoration::RunningHead("A Study of Things".into()));
    let report = Restyler::new(&style).unwrap().with_options(options).run(&mut doc);

    assert_eq!(report.captions_styled, 1);
    assert_eq!(report.tables_styled, 1);
    assert!(report.decorated);

    let paras: Vec<&Paragraph> = doc.paragraphs().collect();
    assert_eq!(paras[0].properties.alignment, Some(Alignment::Center));
    let title_run = paras[0].runs().next().unwrap();
    assert_eq!(title_run.properties.font_name(), Some("Times New Roman"));
    assert_eq!(title_run.properties.bold, Some(true));
    assert_eq!(paras[6].properties.alignment, Some(Alignment::Center));
    let reference = paras[8].properties.indent.as_ref().unwrap();
    assert_eq!(reference.first_line, Some(-720));
    assert_eq!(reference.left, Some(720));

    let header = doc.header.as_ref().unwrap();
    assert!(header.paragraphs().next().unwrap().text().starts_with("A STUDY OF THINGS"));
}

#[test]
fn test_styling_idempotent_without_numbering() {
    let style = StyleConfig::default();
    let restyler = Restyler::new(&style).unwrap().with_options(
        RestyleOptions::new().with_equation_numbers(false).with_cleanup(false),
    );
    let mut doc = doc_with(&[
        ("Title", "T"),
        ("Heading2", "Method"),
        ("BodyText", "We did it."),
        ("TableCaption", "Table 1: Numbers"),
    ]);
    doc.add_table(Table::from_rows([["x"], ["1"]]));

    restyler.run(&mut doc);
    let once = doc.clone();
    restyler.run(&mut doc);
    assert_eq!(doc.body, once.body);
    assert_eq!(doc.styles, once.styles);
    assert_eq!(doc.footer, once.footer);
}
