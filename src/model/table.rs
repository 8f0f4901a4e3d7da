//! Table types.

use super::{Alignment, Block, Element, Paragraph};
use serde::{Deserialize, Serialize};

/// A table (`w:tbl`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table properties (`w:tblPr`)
    pub properties: TableProperties,

    /// Column grid (`w:tblGrid`), kept verbatim
    pub grid: Option<Element>,

    /// Rows in the table
    pub rows: Vec<TableRow>,

    /// Other children (bookmarks, content controls)
    pub extra: Vec<Element>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from rows of cell text.
    pub fn from_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for row in rows {
            table.add_row(TableRow::from_strings(row));
        }
        table
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (based on the widest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Table-level properties (`w:tblPr`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableProperties {
    /// Table style id (`w:tblStyle`)
    pub style: Option<String>,

    /// Table justification (`w:jc`)
    pub alignment: Option<Alignment>,

    /// Table borders (`w:tblBorders`)
    pub borders: Option<BorderSet>,

    /// Uninterpreted property elements
    pub extra: Vec<Element>,
}

/// A table row (`w:tr`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row-level property elements (`w:tblPrEx`, `w:trPr`), kept verbatim
    pub properties: Vec<Element>,

    /// Cells in the row
    pub cells: Vec<TableCell>,

    /// Other children
    pub extra: Vec<Element>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            ..Self::default()
        }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.plain_text())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell (`w:tc`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell properties (`w:tcPr`)
    pub properties: CellProperties,

    /// Cell content
    pub blocks: Vec<Block>,
}

impl TableCell {
    /// Create a new cell with text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            properties: CellProperties::default(),
            blocks: vec![Block::Paragraph(Paragraph::with_text(text))],
        }
    }

    /// Direct paragraphs of the cell.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(Block::as_paragraph)
    }

    /// Direct paragraphs of the cell, mutably.
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.blocks.iter_mut().filter_map(Block::as_paragraph_mut)
    }

    /// Get plain text content.
    pub fn plain_text(&self) -> String {
        self.paragraphs()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Cell-level properties (`w:tcPr`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellProperties {
    /// Cell borders (`w:tcBorders`)
    pub borders: Option<BorderSet>,

    /// Uninterpreted property elements
    pub extra: Vec<Element>,
}

/// One border edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Border {
    /// Line style (`w:val`: `single`, `double`, `none`, ...)
    pub style: String,

    /// Width in eighths of a point (`w:sz`)
    pub size: Option<u32>,

    /// Spacing in points (`w:space`)
    pub space: Option<u32>,

    /// Hex color or `auto` (`w:color`)
    pub color: Option<String>,
}

impl Border {
    /// A single black line of `size` eighths of a point.
    pub fn single(size: u32) -> Self {
        Self {
            style: "single".to_string(),
            size: Some(size),
            space: Some(0),
            color: Some("000000".to_string()),
        }
    }

    /// No border.
    pub fn none() -> Self {
        Self {
            style: "none".to_string(),
            size: Some(0),
            space: Some(0),
            color: Some("auto".to_string()),
        }
    }
}

/// A set of border edges (`w:tblBorders` or `w:tcBorders`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderSet {
    /// Top edge
    pub top: Option<Border>,
    /// Left (start) edge
    pub left: Option<Border>,
    /// Bottom edge
    pub bottom: Option<Border>,
    /// Right (end) edge
    pub right: Option<Border>,
    /// Horizontal edges between rows
    pub inside_h: Option<Border>,
    /// Vertical edges between columns
    pub inside_v: Option<Border>,
    /// Other edges (diagonals)
    pub extra: Vec<Element>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_new() {
        let table = Table::new();
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_table_from_rows() {
        let table = Table::from_rows([["Name", "Age"], ["Alice", "30"], ["Bob", "25"]]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.plain_text(), "Name\tAge\nAlice\t30\nBob\t25");
    }

    #[test]
    fn test_border_constructors() {
        let rule = Border::single(12);
        assert_eq!(rule.style, "single");
        assert_eq!(rule.size, Some(12));
        assert_eq!(Border::none().style, "none");
    }

    #[test]
    fn test_cell_text() {
        let cell = TableCell::text("Hello");
        assert_eq!(cell.plain_text(), "Hello");
        assert_eq!(cell.paragraphs().count(), 1);
    }
}
