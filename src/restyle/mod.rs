//! Structural restyling of a converted document.
//!
//! [`Restyler::run`] applies every pass in a fixed order:
//!
//! 1. artifact cleanup (residue tokens, redundant empty paragraphs)
//! 2. page setup and style-sheet defaults
//! 3. role classification and role styling, in one scan
//! 4. caption styling
//! 5. three-line tables
//! 6. equation numbering
//! 7. header/footer decoration
//!
//! Every pass except equation numbering and cleanup is idempotent.
//!
//! # Example
//!
//! ```
//! use texword::model::{Document, Paragraph, StyleSheet};
//! use texword::restyle::Restyler;
//! use texword::StyleConfig;
//!
//! let style = StyleConfig::default();
//! let mut doc = Document::new();
//! doc.styles = StyleSheet::academic();
//! doc.add_paragraph(Paragraph::with_text("A Study").with_style("Title"));
//!
//! let report = Restyler::new(&style).unwrap().run(&mut doc);
//! assert_eq!(report.paragraphs_styled, 1);
//! ```

pub mod apply;
pub mod classify;
pub mod cleanup;
pub mod equations;
pub mod header_footer;
pub mod tables;

pub use apply::StyleApplier;
pub use classify::{Classifier, LabelResolver, Region, RegionTracker, Role};
pub use cleanup::{ArtifactCleaner, CleanupCounts, DEFAULT_RESIDUE_TOKENS};
pub use equations::EquationNumberer;
pub use header_footer::{HeaderFooterWriter, PageDecoration};
pub use tables::TableStyler;

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::model::{Block, Document};
use crate::style::StyleConfig;

/// Options for a restyling run.
#[derive(Debug, Clone)]
pub struct RestyleOptions {
    /// Header/footer decoration
    pub page_decoration: PageDecoration,

    /// Append sequence numbers to display equations
    pub number_equations: bool,

    /// Remove converter residue before styling
    pub cleanup: bool,

    /// Residue tokens in addition to the defaults
    pub residue_tokens: Vec<String>,
}

impl RestyleOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page decoration.
    pub fn with_page_decoration(mut self, decoration: PageDecoration) -> Self {
        self.page_decoration = decoration;
        self
    }

    /// Enable or disable equation numbering.
    pub fn with_equation_numbers(mut self, enabled: bool) -> Self {
        self.number_equations = enabled;
        self
    }

    /// Enable or disable artifact cleanup.
    pub fn with_cleanup(mut self, enabled: bool) -> Self {
        self.cleanup = enabled;
        self
    }

    /// Add a residue token.
    pub fn with_residue_token(mut self, token: impl Into<String>) -> Self {
        self.residue_tokens.push(token.into());
        self
    }
}

impl Default for RestyleOptions {
    fn default() -> Self {
        Self {
            page_decoration: PageDecoration::PageNumber,
            number_equations: true,
            cleanup: true,
            residue_tokens: Vec::new(),
        }
    }
}

/// Counts and diagnostics from a restyling run.
#[derive(Debug, Clone, Default)]
pub struct RestyleReport {
    /// Residue paragraphs removed
    pub residue_removed: usize,

    /// Redundant empty paragraphs removed
    pub empty_removed: usize,

    /// Paragraphs given role formatting (captions excluded)
    pub paragraphs_styled: usize,

    /// Captions formatted
    pub captions_styled: usize,

    /// Tables given three-line styling
    pub tables_styled: usize,

    /// Display equations numbered
    pub equations_numbered: usize,

    /// Whether a header or footer was written
    pub decorated: bool,

    /// Missing styles and similar soft problems
    pub diagnostics: Diagnostics,
}

/// Runs the restyling passes over a document.
pub struct Restyler<'a> {
    style: &'a StyleConfig,
    options: RestyleOptions,
}

impl<'a> Restyler<'a> {
    /// Create a restyler; the configuration is validated here.
    pub fn new(style: &'a StyleConfig) -> Result<Self> {
        style.validate()?;
        Ok(Self {
            style,
            options: RestyleOptions::default(),
        })
    }

    /// Builder: replace the options.
    pub fn with_options(mut self, options: RestyleOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options.
    pub fn options(&self) -> &RestyleOptions {
        &self.options
    }

    /// Apply every pass in order.
    pub fn run(&self, doc: &mut Document) -> RestyleReport {
        let mut report = RestyleReport::default();

        if self.options.cleanup {
            let counts = ArtifactCleaner::new()
                .with_tokens(self.options.residue_tokens.iter().cloned())
                .clean(doc);
            report.residue_removed = counts.residue;
            report.empty_removed = counts.empty;
            log::debug!(
                "Cleanup removed {} residue and {} empty paragraphs",
                counts.residue,
                counts.empty
            );
        }

        let applier = StyleApplier::new(self.style);
        applier.apply_page_setup(doc);
        applier.apply_style_defaults(&mut doc.styles, &mut report.diagnostics);

        let mut labels = LabelResolver::new();
        report.paragraphs_styled = self.style_paragraphs(doc, &mut labels, &mut report.diagnostics);
        report.captions_styled = self.style_captions(doc, &mut labels, &mut report.diagnostics);
        report.tables_styled = TableStyler::new(self.style).style_document(doc);

        if self.options.number_equations {
            report.equations_numbered = EquationNumberer::new(self.style).number(doc);
        }
        report.decorated = HeaderFooterWriter::new(self.style).write(doc, &self.options.page_decoration);

        log::info!(
            "Restyled {} paragraphs, {} captions, {} tables, {} equations",
            report.paragraphs_styled,
            report.captions_styled,
            report.tables_styled,
            report.equations_numbered
        );
        report
    }

    /// Classify and style top-level body paragraphs; captions are skipped.
    pub fn style_paragraphs(
        &self,
        doc: &mut Document,
        labels: &mut LabelResolver,
        diagnostics: &mut Diagnostics,
    ) -> usize {
        let applier = StyleApplier::new(self.style);
        let mut classifier = Classifier::new().with_labels(std::mem::take(labels));
        let styles = &doc.styles;
        let mut count = 0;

        for block in doc.body.iter_mut() {
            let Block::Paragraph(para) = block else {
                continue;
            };
            match classifier.classify(styles, para, diagnostics) {
                Role::Caption => continue,
                role => applier.apply(para, role),
            }
            count += 1;
        }
        *labels = classifier.into_labels();
        count
    }

    /// Style caption paragraphs.
    pub fn style_captions(
        &self,
        doc: &mut Document,
        labels: &mut LabelResolver,
        diagnostics: &mut Diagnostics,
    ) -> usize {
        let applier = StyleApplier::new(self.style);
        let styles = &doc.styles;
        let mut count = 0;

        for block in doc.body.iter_mut() {
            let Block::Paragraph(para) = block else {
                continue;
            };
            let label = labels.resolve(styles, para.properties.style.as_deref(), diagnostics);
            if classify::is_caption(&label, para.text().trim()) && applier.apply_caption(para) {
                count += 1;
            }
        }
        count
    }
}
