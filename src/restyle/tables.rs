//! Three-line ("booktabs") table styling.

use crate::model::{Alignment, Border, BorderSet, Document, Table};
use crate::style::StyleConfig;

/// Width of the top and bottom rules, in eighths of a point (1.5 pt).
pub const OUTER_RULE_SIZE: u32 = 12;

/// Width of the rule under the header row (0.75 pt).
pub const HEADER_RULE_SIZE: u32 = 6;

/// Styles tables as three-line tables with a bold header row.
#[derive(Debug, Clone, Copy)]
pub struct TableStyler<'a> {
    style: &'a StyleConfig,
}

impl<'a> TableStyler<'a> {
    pub fn new(style: &'a StyleConfig) -> Self {
        Self { style }
    }

    /// Style every top-level table and return how many were styled.
    pub fn style_document(&self, doc: &mut Document) -> usize {
        let mut count = 0;
        for table in doc.tables_mut() {
            self.style_table(table);
            count += 1;
        }
        count
    }

    /// Style one table in place. Applying this twice is a no-op.
    pub fn style_table(&self, table: &mut Table) {
        let s = self.style;
        table.properties.alignment = Some(Alignment::Center);

        for (index, row) in table.rows.iter_mut().enumerate() {
            for cell in &mut row.cells {
                for para in cell.paragraphs_mut() {
                    para.properties.alignment = Some(Alignment::Center);
                    for run in para.runs_mut() {
                        run.properties.set_font(&s.font_body, &s.font_cjk);
                        run.properties.set_size_pt(s.font_size_table);
                        if index == 0 {
                            run.properties.bold = Some(true);
                        }
                    }
                    para.properties.set_spacing(1.0, 1.0, 1.0);
                    para.properties.set_first_line_indent(0);
                }

                if index == 0 {
                    let borders = cell.properties.borders.get_or_insert_with(BorderSet::default);
                    borders.bottom = Some(Border::single(HEADER_RULE_SIZE));
                }
            }
        }

        table.properties.borders = Some(BorderSet {
            top: Some(Border::single(OUTER_RULE_SIZE)),
            bottom: Some(Border::single(OUTER_RULE_SIZE)),
            left: Some(Border::none()),
            right: Some(Border::none()),
            inside_h: Some(Border::none()),
            inside_v: Some(Border::none()),
            extra: Vec::new(),
        });
    }
}
