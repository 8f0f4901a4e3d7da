//! Role-specific paragraph formatting, page setup, and style-sheet defaults.

use super::classify::Role;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::units::cm_to_twips;
use crate::model::{
    Alignment, Document, PageMargins, PageSize, Paragraph, RunProperties, StyleSheet,
};
use crate::style::{ReferenceLayout, StyleConfig};

/// Indent of abstract blocks and hanging indent of reference entries.
const BLOCK_INDENT_CM: f32 = 1.27;

/// Font color written for headings and the default style.
const BLACK: &str = "000000";

/// Applies formatting derived from a [`StyleConfig`].
#[derive(Debug, Clone, Copy)]
pub struct StyleApplier<'a> {
    style: &'a StyleConfig,
}

impl<'a> StyleApplier<'a> {
    pub fn new(style: &'a StyleConfig) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &StyleConfig {
        self.style
    }

    /// Write page size and margins into the section properties.
    pub fn apply_page_setup(&self, doc: &mut Document) {
        let s = self.style;
        let orient = doc.section.page_size.as_ref().and_then(|p| p.orient.clone());
        doc.section.page_size = Some(PageSize {
            width: cm_to_twips(s.page_width).max(0) as u32,
            height: cm_to_twips(s.page_height).max(0) as u32,
            orient,
        });
        let margins = doc.section.margins.get_or_insert_with(PageMargins::default);
        margins.top = cm_to_twips(s.margin_top);
        margins.bottom = cm_to_twips(s.margin_bottom);
        margins.left = cm_to_twips(s.margin_left);
        margins.right = cm_to_twips(s.margin_right);
    }

    /// Set fonts, sizes, and spacing on the `Normal` and heading styles.
    pub fn apply_style_defaults(&self, styles: &mut StyleSheet, diagnostics: &mut Diagnostics) {
        if styles.is_empty() {
            return;
        }
        let s = self.style;

        for level in 1..=3u8 {
            let name = format!("heading {}", level);
            let Some(def) = styles.find_mut(&name) else {
                diagnostics.push(
                    DiagnosticKind::MissingStyle,
                    format!("style '{}' is not defined", name),
                );
                continue;
            };
            let run = def.run_mut();
            run.set_font(&s.font_body, &s.font_cjk);
            run.set_size_pt(s.heading_size(level));
            run.bold = Some(true);
            run.set_color(BLACK);
            def.paragraph_mut().set_spacing(s.line_spacing, 12.0, 6.0);
        }

        match styles.find_mut("Normal") {
            Some(def) => {
                let run = def.run_mut();
                run.set_font(&s.font_body, &s.font_cjk);
                run.set_size_pt(s.font_size_body);
                run.set_color(BLACK);
                let para = def.paragraph_mut();
                para.set_line_spacing(s.line_spacing);
                para.set_first_line_indent(cm_to_twips(s.first_line_indent));
            }
            None => diagnostics.push(DiagnosticKind::MissingStyle, "style 'Normal' is not defined"),
        }
    }

    /// Format a paragraph for its role.
    ///
    /// Captions are left alone here; see [`StyleApplier::apply_caption`].
    pub fn apply(&self, paragraph: &mut Paragraph, role: Role) {
        let s = self.style;
        match role {
            Role::Title => {
                paragraph.properties.alignment = Some(Alignment::Center);
                self.format_runs(paragraph, s.font_size_title, |run| run.bold = Some(true));
                paragraph.properties.set_spacing(s.line_spacing, 24.0, 12.0);
                paragraph.properties.widow_control = Some(true);
            }
            Role::AuthorDate => {
                paragraph.properties.alignment = Some(Alignment::Center);
                self.format_runs(paragraph, s.font_size_body, |_| {});
                paragraph.properties.set_spacing(1.5, 6.0, 6.0);
                paragraph.properties.set_first_line_indent(0);
            }
            Role::AbstractHeading => {
                paragraph.properties.alignment = Some(Alignment::Center);
                self.format_runs(paragraph, s.font_size_h2, |run| run.bold = Some(true));
                paragraph.properties.set_spacing(s.line_spacing, 12.0, 6.0);
                paragraph.properties.set_first_line_indent(0);
            }
            Role::AbstractBody => {
                self.format_runs(paragraph, s.font_size_abstract, |_| {});
                let props = &mut paragraph.properties;
                props.set_spacing(1.5, 0.0, 0.0);
                props.set_first_line_indent(0);
                props.set_left_indent(cm_to_twips(BLOCK_INDENT_CM));
                props.set_right_indent(cm_to_twips(BLOCK_INDENT_CM));
            }
            Role::Heading(level) => {
                paragraph.properties.set_first_line_indent(0);
                self.format_runs(paragraph, s.heading_size(level), |run| {
                    run.bold = Some(true);
                    run.set_color(BLACK);
                });
                paragraph.properties.set_spacing(s.line_spacing, 12.0, 6.0);
                paragraph.properties.widow_control = Some(true);
            }
            Role::Reference => {
                self.format_runs(paragraph, s.font_size_ref, |_| {});
                let props = &mut paragraph.properties;
                match s.reference_layout {
                    ReferenceLayout::Compact => props.set_spacing(1.5, 0.0, 3.0),
                    ReferenceLayout::Document => props.set_spacing(s.line_spacing, 0.0, 0.0),
                }
                props.set_first_line_indent(-cm_to_twips(BLOCK_INDENT_CM));
                props.set_left_indent(cm_to_twips(BLOCK_INDENT_CM));
            }
            Role::Body => self.apply_body(paragraph),
            Role::Caption => {}
        }
    }

    /// Body paragraphs keep explicit formatting; only gaps are filled.
    fn apply_body(&self, paragraph: &mut Paragraph) {
        let s = self.style;
        for run in paragraph.runs_mut() {
            let props = &mut run.properties;
            let replace = matches!(props.font_name(), None | Some("Calibri"));
            if replace {
                props.set_font(&s.font_body, &s.font_cjk);
            } else if let Some(fonts) = props.fonts.as_mut() {
                fonts.east_asia = Some(s.font_cjk.clone());
            }
            if props.size.is_none() {
                props.set_size_pt(s.font_size_body);
            }
        }
        if paragraph.properties.line_spacing().is_none() {
            paragraph.properties.set_line_spacing(s.line_spacing);
        }
        if !paragraph.text().trim().is_empty() {
            paragraph.properties.widow_control = Some(true);
        }
    }

    /// Format a caption paragraph. Empty captions are skipped.
    ///
    /// Returns whether the paragraph was formatted.
    pub fn apply_caption(&self, paragraph: &mut Paragraph) -> bool {
        if paragraph.text().trim().is_empty() {
            return false;
        }
        paragraph.properties.alignment = Some(Alignment::Center);
        self.format_runs(paragraph, self.style.font_size_caption, |_| {});
        paragraph.properties.set_spacing(1.5, 6.0, 6.0);
        paragraph.properties.set_first_line_indent(0);
        true
    }

    /// Body font and `size` on every run, then `extra` per run.
    pub fn format_runs<F>(&self, paragraph: &mut Paragraph, size: f32, mut extra: F)
    where
        F: FnMut(&mut RunProperties),
    {
        for run in paragraph.runs_mut() {
            let props = &mut run.properties;
            props.set_font(&self.style.font_body, &self.style.font_cjk);
            props.set_size_pt(size);
            extra(props);
        }
    }
}
