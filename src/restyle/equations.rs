//! Sequence numbers for displayed equations.

use crate::model::units::cm_to_twips;
use crate::model::{Block, Document, Run, RunContent, RunProperties, TabStop};
use crate::style::StyleConfig;

/// Appends `\t(n)` to every display-math paragraph.
///
/// Not idempotent: a second pass would number the equations again.
#[derive(Debug, Clone, Copy)]
pub struct EquationNumberer<'a> {
    style: &'a StyleConfig,
}

impl<'a> EquationNumberer<'a> {
    pub fn new(style: &'a StyleConfig) -> Self {
        Self { style }
    }

    /// Number display equations in document order; returns the count.
    pub fn number(&self, doc: &mut Document) -> usize {
        let s = self.style;
        let tab_position = doc
            .section
            .text_width()
            .unwrap_or_else(|| cm_to_twips(s.text_width()));

        let mut count = 0;
        for block in &mut doc.body {
            let Block::Paragraph(para) = block else {
                continue;
            };
            if !para.has_display_math() {
                continue;
            }
            count += 1;
            para.properties.tabs.push(TabStop::right(tab_position));

            let mut props = RunProperties::default();
            props.set_font(&s.font_body, &s.font_cjk);
            props.set_size_pt(s.font_size_body);
            let label = Run::new()
                .with_properties(props)
                .with(RunContent::Tab)
                .with(RunContent::Text(format!("({})", count)));
            para.add_run(label);
        }
        log::debug!("Numbered {} equations", count);
        count
    }
}
