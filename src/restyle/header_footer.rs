//! Running head and page-number decoration.

use crate::model::units::cm_to_twips;
use crate::model::{
    Alignment, Block, Document, FieldCharType, HeaderFooterKind, Paragraph, Run, RunContent,
    RunProperties, TabStop,
};
use crate::style::StyleConfig;

/// Point size of header and footer text.
pub const DECORATION_FONT_SIZE: f32 = 10.0;

/// What to write into the page header and footer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageDecoration {
    /// Leave headers and footers untouched
    None,
    /// Empty header, centered page number in the footer
    #[default]
    PageNumber,
    /// Upper-cased title and page number in the header
    RunningHead(String),
}

/// Writes page decorations into a document.
#[derive(Debug, Clone, Copy)]
pub struct HeaderFooterWriter<'a> {
    style: &'a StyleConfig,
}

impl<'a> HeaderFooterWriter<'a> {
    pub fn new(style: &'a StyleConfig) -> Self {
        Self { style }
    }

    /// Apply a decoration; returns whether anything was written.
    pub fn write(&self, doc: &mut Document, decoration: &PageDecoration) -> bool {
        match decoration {
            PageDecoration::None => false,
            PageDecoration::PageNumber => {
                if let Some(header) = doc.header.as_mut() {
                    header.clear();
                }
                let mut para = Paragraph::new();
                para.properties.alignment = Some(Alignment::Center);
                for run in self.page_field() {
                    para.add_run(run);
                }
                let footer = doc.header_footer_mut(HeaderFooterKind::Footer);
                footer.blocks = vec![Block::Paragraph(para)];
                true
            }
            PageDecoration::RunningHead(title) => {
                let tab_position = doc
                    .section
                    .text_width()
                    .unwrap_or_else(|| cm_to_twips(self.style.text_width()));

                let mut para = Paragraph::new();
                para.properties.alignment = Some(Alignment::Left);
                para.properties.tabs.push(TabStop::right(tab_position));

                let mut head = self.properties();
                head.italic = Some(true);
                para.add_run(
                    Run::text(title.to_uppercase())
                        .with_properties(head)
                        .with(RunContent::Tab),
                );
                for run in self.page_field() {
                    para.add_run(run);
                }

                let header = doc.header_footer_mut(HeaderFooterKind::Header);
                header.blocks = vec![Block::Paragraph(para)];
                true
            }
        }
    }

    fn properties(&self) -> RunProperties {
        let mut props = RunProperties::default();
        props.set_font(&self.style.font_body, &self.style.font_cjk);
        props.set_size_pt(DECORATION_FONT_SIZE);
        props
    }

    /// Runs of a `PAGE` field with a `1` placeholder result.
    pub fn page_field(&self) -> Vec<Run> {
        let props = self.properties();
        [
            RunContent::FieldChar(FieldCharType::Begin),
            RunContent::InstrText(" PAGE ".to_string()),
            RunContent::FieldChar(FieldCharType::Separate),
            RunContent::Text("1".to_string()),
            RunContent::FieldChar(FieldCharType::End),
        ]
        .into_iter()
        .map(|item| Run::new().with_properties(props.clone()).with(item))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_kinds(para: &Paragraph) -> Vec<String> {
        para.runs()
            .flat_map(|r| r.content.iter())
            .filter_map(|c| match c {
                RunContent::FieldChar(kind) => Some(kind.as_str().to_string()),
                RunContent::InstrText(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_page_number_footer() {
        let style = StyleConfig::default();
        let mut doc = Document::new();
        doc.header_footer_mut(HeaderFooterKind::Header)
            .blocks
            .push(Block::Paragraph(Paragraph::with_text("old head")));

        assert!(HeaderFooterWriter::new(&style).write(&mut doc, &PageDecoration::PageNumber));
        assert!(doc.header.as_ref().unwrap().blocks.is_empty());

        let footer = doc.footer.as_ref().unwrap();
        let para = footer.paragraphs().next().unwrap();
        assert_eq!(para.properties.alignment, Some(Alignment::Center));
        assert_eq!(field_kinds(para), vec!["begin", " PAGE ", "separate", "end"]);
        assert_eq!(para.text(), "1");
        assert!(para.runs().all(|r| r.properties.size == Some(20)));
    }

    #[test]
    fn test_running_head() {
        let style = StyleConfig::default();
        let mut doc = Document::new();
        let decoration = PageDecoration::RunningHead("Deep Learning".into());
        assert!(HeaderFooterWriter::new(&style).write(&mut doc, &decoration));
        assert!(doc.footer.is_none());

        let header = doc.header.as_ref().unwrap();
        let para = header.paragraphs().next().unwrap();
        assert_eq!(para.text(), "DEEP LEARNING\t1");
        let first = para.runs().next().unwrap();
        assert_eq!(first.properties.italic, Some(true));
        assert_eq!(first.properties.size, Some(20));
        assert_eq!(field_kinds(para).len(), 4);
    }

    #[test]
    fn test_none_writes_nothing() {
        let style = StyleConfig::default();
        let mut doc = Document::new();
        assert!(!HeaderFooterWriter::new(&style).write(&mut doc, &PageDecoration::None));
        assert!(doc.header.is_none() && doc.footer.is_none());
    }

    #[test]
    fn test_rewrite_replaces_content() {
        let style = StyleConfig::default();
        let writer = HeaderFooterWriter::new(&style);
        let mut doc = Document::new();
        writer.write(&mut doc, &PageDecoration::PageNumber);
        writer.write(&mut doc, &PageDecoration::PageNumber);
        assert_eq!(doc.footer.as_ref().unwrap().blocks.len(), 1);
    }
}
