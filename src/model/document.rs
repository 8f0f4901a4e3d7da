//! Document-level types.

use super::{Element, HeaderFooterKind, Paragraph, SectionProperties, StyleSheet, Table};
use crate::docx::{namespaces, Package};
use serde::{Deserialize, Serialize};

/// An editable word-processing document.
///
/// Body, section, style sheet, and the default header/footer are typed; every
/// other package part travels along untouched so a write-back loses nothing
/// the pipeline did not edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Root attributes of `w:document` (namespace declarations)
    pub attributes: Vec<(String, String)>,

    /// Body blocks in document order
    pub body: Vec<Block>,

    /// Final section properties
    pub section: SectionProperties,

    /// Style sheet
    pub styles: StyleSheet,

    /// Default page header
    pub header: Option<HeaderFooter>,

    /// Default page footer
    pub footer: Option<HeaderFooter>,

    /// Media added since the document was read
    pub media: Vec<MediaPart>,

    /// Root children before the body (`w:background`)
    pub(crate) prelude: Vec<Element>,

    #[serde(skip)]
    pub(crate) package: Package,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            attributes: namespaces::document_attributes(),
            body: Vec::new(),
            section: SectionProperties::default(),
            styles: StyleSheet::new(),
            header: None,
            footer: None,
            media: Vec::new(),
            prelude: Vec::new(),
            package: Package::default(),
        }
    }

    /// Append a paragraph to the body.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.body.push(Block::Paragraph(paragraph));
    }

    /// Append a table to the body.
    pub fn add_table(&mut self, table: Table) {
        self.body.push(Block::Table(table));
    }

    /// Top-level body paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().filter_map(Block::as_paragraph)
    }

    /// Top-level body paragraphs, mutably.
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.body.iter_mut().filter_map(Block::as_paragraph_mut)
    }

    /// Top-level tables.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Top-level tables, mutably.
    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.body.iter_mut().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Check if the body is empty.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Get plain text content of the body, one line per paragraph.
    pub fn plain_text(&self) -> String {
        self.body
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p.text()),
                Block::Table(t) => Some(t.plain_text()),
                Block::Other(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Default header or footer, created empty when absent.
    pub fn header_footer_mut(&mut self, kind: HeaderFooterKind) -> &mut HeaderFooter {
        let slot = match kind {
            HeaderFooterKind::Header => &mut self.header,
            HeaderFooterKind::Footer => &mut self.footer,
        };
        slot.get_or_insert_with(|| HeaderFooter::new(kind))
    }

    /// Register an image and return the relationship id to reference it with.
    pub fn add_media(&mut self, extension: &str, data: Vec<u8>) -> String {
        let index = self.media.len() + 1;
        let rel_id = format!("rIdTexwordMedia{}", index);
        self.media.push(MediaPart {
            file_name: format!("texword_image{}.{}", index, extension),
            rel_id: rel_id.clone(),
            data,
        });
        rel_id
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// A block-level body element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph
    Paragraph(Paragraph),
    /// A table
    Table(Table),
    /// Anything else (section breaks in content controls, bookmarks, ...)
    Other(Element),
}

impl Block {
    /// The paragraph, if this block is one.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// The paragraph mutably, if this block is one.
    pub fn as_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }
}

/// A header or footer part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderFooter {
    /// Header or footer
    pub kind: HeaderFooterKind,

    /// Package part name; `None` until the part is first written
    pub part_name: Option<String>,

    /// Relationship id from the main document; `None` for new parts
    pub rel_id: Option<String>,

    /// Root attributes of `w:hdr` / `w:ftr`
    pub attributes: Vec<(String, String)>,

    /// Content blocks
    pub blocks: Vec<Block>,
}

impl HeaderFooter {
    /// Create an empty part not yet present in the package.
    pub fn new(kind: HeaderFooterKind) -> Self {
        Self {
            kind,
            part_name: None,
            rel_id: None,
            attributes: namespaces::document_attributes(),
            blocks: Vec::new(),
        }
    }

    /// Remove all content.
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Paragraphs of the part.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(Block::as_paragraph)
    }
}

/// An image part added to the package on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPart {
    /// File name under `word/media/`
    pub file_name: String,

    /// Relationship id from the main document
    pub rel_id: String,

    /// Raw image bytes
    #[serde(skip)]
    pub data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert!(doc.header.is_none());
        assert!(doc.attributes.iter().any(|(k, _)| k == "xmlns:w"));
    }

    #[test]
    fn test_paragraph_iteration_skips_tables() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("one"));
        doc.add_table(Table::from_rows([["a", "b"]]));
        doc.add_paragraph(Paragraph::with_text("two"));

        let texts: Vec<_> = doc.paragraphs().map(|p| p.text()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(doc.tables().count(), 1);
        assert_eq!(doc.plain_text(), "one\na\tb\ntwo");
    }

    #[test]
    fn test_header_created_on_demand() {
        let mut doc = Document::new();
        doc.header_footer_mut(HeaderFooterKind::Footer)
            .blocks
            .push(Block::Paragraph(Paragraph::with_text("1")));
        assert!(doc.footer.is_some());
        assert!(doc.header.is_none());
        assert_eq!(doc.footer.as_ref().unwrap().part_name, None);
    }

    #[test]
    fn test_add_media_ids() {
        let mut doc = Document::new();
        assert_eq!(doc.add_media("png", vec![1]), "rIdTexwordMedia1");
        assert_eq!(doc.add_media("jpeg", vec![2]), "rIdTexwordMedia2");
        assert_eq!(doc.media[1].file_name, "texword_image2.jpeg");
    }
}
