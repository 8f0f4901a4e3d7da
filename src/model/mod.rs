//! Document model types.
//!
//! This module defines the mutable document tree that the restyling passes
//! operate on, plus the role-tagged [`ContentBlock`] hand-over format used
//! by the block assembler. Typed structures cover what the pipeline edits;
//! everything else is carried as raw [`Element`]s so it survives a
//! read/write cycle.

mod content;
mod document;
mod element;
mod paragraph;
mod section;
mod styles;
mod table;
pub mod units;

pub use content::{BlockKind, ContentBlock};
pub use document::{Block, Document, HeaderFooter, MediaPart};
pub use element::{Element, Node};
pub use paragraph::{
    Alignment, FieldCharType, FontSet, Hyperlink, Indent, InlineContent, LineRule, Paragraph,
    ParagraphProperties, Run, RunContent, RunProperties, Spacing, TabAlignment, TabStop,
};
pub use section::{PageMargins, PageSize, PartReference, SectionProperties};
pub use styles::{normalize_label, StyleDefinition, StyleSheet};
pub use table::{Border, BorderSet, CellProperties, Table, TableCell, TableProperties, TableRow};

use serde::{Deserialize, Serialize};

/// Which of the two page-decoration parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderFooterKind {
    /// Page header (`w:hdr`)
    Header,
    /// Page footer (`w:ftr`)
    Footer,
}
