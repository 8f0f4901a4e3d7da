//! Document assembly from extracted content blocks.
//!
//! The page-extraction route skips the conversion engine: an extractor hands
//! over role-tagged [`ContentBlock`]s and the [`Assembler`] builds a styled
//! [`Document`] from them, using the same role formatting as the restyler.
//! Blocks that carry an image but no markup are sent to a [`Recognizer`].

use std::fs;
use std::path::Path;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::docx::to_docx_bytes;
use crate::error::{Error, Result};
use crate::model::units::EMU_PER_INCH;
use crate::model::{
    Alignment, BlockKind, ContentBlock, Document, Element, Paragraph, Run, RunContent, StyleSheet,
    Table,
};
use crate::restyle::{HeaderFooterWriter, PageDecoration, Role, StyleApplier, TableStyler};
use crate::style::StyleConfig;

/// Width of assembled figures.
pub const FIGURE_WIDTH_INCHES: f32 = 5.0;

/// Markup recognized from a block image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recognition {
    /// Plain text or table rows
    pub text: String,

    /// Formula or table markup, when the service produced any
    pub latex: Option<String>,

    /// Service confidence (0.0 - 1.0)
    pub confidence: f32,
}

impl Recognition {
    /// Markup if present, otherwise the plain text.
    pub fn markup(&self) -> &str {
        self.latex
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.text)
    }
}

/// A vision service that reads formulas and tables from images.
pub trait Recognizer {
    /// Service name for log messages.
    fn name(&self) -> &str;

    /// Recognize the content of `image`; `kind` is the block's tagged kind.
    fn recognize(&self, image: &Path, kind: BlockKind) -> Result<Recognition>;
}

/// Options for an assembly run.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Header/footer decoration
    pub page_decoration: PageDecoration,

    /// Figure width in inches
    pub figure_width: f32,
}

impl AssembleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_decoration(mut self, decoration: PageDecoration) -> Self {
        self.page_decoration = decoration;
        self
    }

    pub fn with_figure_width(mut self, inches: f32) -> Self {
        self.figure_width = inches;
        self
    }
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            page_decoration: PageDecoration::PageNumber,
            figure_width: FIGURE_WIDTH_INCHES,
        }
    }
}

/// An assembled document and what happened along the way.
#[derive(Debug, Clone)]
pub struct Assembled {
    /// The styled document
    pub document: Document,

    /// Blocks that made it into the document
    pub blocks_placed: usize,

    /// Blocks dropped
    pub blocks_skipped: usize,

    /// Skipped blocks and recognition failures
    pub diagnostics: Diagnostics,
}

/// Builds styled documents from content blocks.
pub struct Assembler<'a> {
    style: &'a StyleConfig,
    recognizer: Option<&'a dyn Recognizer>,
    options: AssembleOptions,
}

impl<'a> Assembler<'a> {
    /// Create an assembler; the configuration is validated here.
    pub fn new(style: &'a StyleConfig) -> Result<Self> {
        style.validate()?;
        Ok(Self {
            style,
            recognizer: None,
            options: AssembleOptions::default(),
        })
    }

    /// Builder: attach a recognition service.
    pub fn with_recognizer(mut self, recognizer: &'a dyn Recognizer) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Builder: replace the options.
    pub fn with_options(mut self, options: AssembleOptions) -> Self {
        self.options = options;
        self
    }

    /// Assemble blocks in order.
    pub fn assemble(&self, blocks: &[ContentBlock]) -> Assembled {
        let applier = StyleApplier::new(self.style);
        let mut doc = Document::new();
        doc.styles = StyleSheet::academic();

        let mut diagnostics = Diagnostics::new();
        applier.apply_page_setup(&mut doc);
        applier.apply_style_defaults(&mut doc.styles, &mut diagnostics);

        let mut placed = 0;
        let mut skipped = 0;
        for (index, block) in blocks.iter().enumerate() {
            match self.place(&mut doc, block, &mut diagnostics) {
                Ok(()) => placed += 1,
                Err(reason) => {
                    skipped += 1;
                    diagnostics.push(
                        DiagnosticKind::SkippedBlock,
                        format!(
                            "block {} ({:?}, page {}): {}",
                            index, block.kind, block.page, reason
                        ),
                    );
                }
            }
        }

        TableStyler::new(self.style).style_document(&mut doc);
        HeaderFooterWriter::new(self.style).write(&mut doc, &self.options.page_decoration);

        log::info!("Assembled {} blocks, skipped {}", placed, skipped);
        Assembled {
            document: doc,
            blocks_placed: placed,
            blocks_skipped: skipped,
            diagnostics,
        }
    }

    /// Assemble blocks and write the document to `path`.
    pub fn assemble_to_file<P: AsRef<Path>>(
        &self,
        blocks: &[ContentBlock],
        path: P,
    ) -> Result<Assembled> {
        let assembled = self.assemble(blocks);
        let bytes = to_docx_bytes(&assembled.document)?;
        crate::convert::write_atomic(path.as_ref(), &bytes)?;
        Ok(assembled)
    }

    fn place(
        &self,
        doc: &mut Document,
        block: &ContentBlock,
        diagnostics: &mut Diagnostics,
    ) -> std::result::Result<(), String> {
        let applier = StyleApplier::new(self.style);
        let text = block.text.trim();

        match block.kind {
            BlockKind::Title => doc.add_paragraph(styled(&applier, "Title", text, Role::Title)),
            BlockKind::Author => {
                doc.add_paragraph(styled(&applier, "Author", text, Role::AuthorDate))
            }
            BlockKind::Abstract => {
                doc.add_paragraph(styled(
                    &applier,
                    "AbstractTitle",
                    "Abstract",
                    Role::AbstractHeading,
                ));
                doc.add_paragraph(styled(&applier, "Abstract", text, Role::AbstractBody));
            }
            BlockKind::Heading => {
                let level = block.heading_level();
                let style_id = format!("Heading{}", level);
                doc.add_paragraph(styled(&applier, &style_id, text, Role::Heading(level)));
            }
            BlockKind::Reference => {
                doc.add_paragraph(styled(&applier, "BodyText", text, Role::Reference))
            }
            BlockKind::Text => {
                if text.is_empty() {
                    return Err("no text".into());
                }
                doc.add_paragraph(styled(&applier, "BodyText", text, Role::Body));
            }
            BlockKind::Equation => {
                let markup = self.markup(block, diagnostics)?;
                let mut para = styled(&applier, "BodyText", &markup, Role::Body);
                para.properties.alignment = Some(Alignment::Center);
                para.properties.set_first_line_indent(0);
                doc.add_paragraph(para);
            }
            BlockKind::Table => {
                let markup = self.markup(block, diagnostics)?;
                let rows = parse_table_rows(&markup);
                if rows.is_empty() {
                    return Err("table has no rows".into());
                }
                doc.add_table(Table::from_rows(rows));
            }
            BlockKind::Figure => {
                let image = block.image_path.as_deref().ok_or("figure has no image")?;
                let drawing = self
                    .figure_run(doc, image)
                    .map_err(|e| format!("{}: {}", image.display(), e))?;
                let mut para = Paragraph::new().with_style("BodyText");
                para.properties.alignment = Some(Alignment::Center);
                para.add_run(drawing);
                doc.add_paragraph(para);

                if !text.is_empty() {
                    let mut caption = Paragraph::with_text(text).with_style("ImageCaption");
                    applier.apply_caption(&mut caption);
                    doc.add_paragraph(caption);
                }
            }
        }
        Ok(())
    }

    /// Formula or table markup for a block, asking the recognizer when the
    /// block has an image but no markup.
    fn markup(
        &self,
        block: &ContentBlock,
        diagnostics: &mut Diagnostics,
    ) -> std::result::Result<String, String> {
        if let Some(latex) = block.latex.as_deref().filter(|l| !l.trim().is_empty()) {
            return Ok(latex.trim().to_string());
        }
        let Some(image) = block.image_path.as_deref() else {
            let text = block.text.trim();
            return if text.is_empty() {
                Err("no markup".into())
            } else {
                Ok(text.to_string())
            };
        };

        let outcome = match self.recognizer {
            Some(recognizer) => recognizer.recognize(image, block.kind).and_then(|r| {
                log::debug!(
                    "{} recognized {} (confidence {:.2})",
                    recognizer.name(),
                    image.display(),
                    r.confidence
                );
                let markup = r.markup().trim().to_string();
                if markup.is_empty() {
                    Err(Error::Other("empty recognition result".into()))
                } else {
                    Ok(markup)
                }
            }),
            None => Err(Error::MissingDependency("no recognition service configured".into())),
        };

        outcome.map_err(|e| {
            diagnostics.push(
                DiagnosticKind::RecognitionFailed,
                format!("{}: {}", image.display(), e),
            );
            "recognition failed".to_string()
        })
    }

    fn figure_run(&self, doc: &mut Document, image: &Path) -> Result<Run> {
        let data = fs::read(image)?;
        let (width, height) = image::image_dimensions(image)
            .map_err(|e| Error::Other(format!("unreadable image: {}", e)))?;
        if width == 0 || height == 0 {
            return Err(Error::Other("image has no pixels".into()));
        }

        let extension = image
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_else(|| "png".to_string());
        let index = doc.media.len() + 1;
        let rel_id = doc.add_media(&extension, data);

        let cx = (self.options.figure_width * EMU_PER_INCH as f32).round() as u64;
        let cy = cx * u64::from(height) / u64::from(width);
        Ok(Run::new().with(RunContent::Drawing(inline_picture(&rel_id, index, cx, cy))))
    }
}

fn styled(applier: &StyleApplier, style_id: &str, text: &str, role: Role) -> Paragraph {
    let mut para = if text.is_empty() {
        Paragraph::new().with_style(style_id)
    } else {
        Paragraph::with_text(text).with_style(style_id)
    };
    applier.apply(&mut para, role);
    para
}

/// Split table markup into rows of cells.
///
/// Rows end at newlines or `\\`; cells split on tabs, `|`, or `&`. Rule
/// commands and `tabular` environment lines are dropped.
pub fn parse_table_rows(markup: &str) -> Vec<Vec<String>> {
    const RULES: &[&str] = &["\\hline", "\\toprule", "\\midrule", "\\bottomrule"];

    markup
        .split(['\n', '\r'])
        .flat_map(|line| line.split("\\\\"))
        .map(|line| {
            let mut line = line.to_string();
            for rule in RULES {
                line = line.replace(rule, "");
            }
            line
        })
        .filter(|line| {
            let t = line.trim();
            !t.is_empty()
                && !t.starts_with("\\begin{")
                && !t.starts_with("\\end{")
                && !t.chars().all(|c| matches!(c, '|' | '-' | ':' | ' '))
        })
        .map(|line| {
            let line = line.trim().trim_matches('|');
            line.split(['\t', '|', '&'])
                .map(|cell| cell.trim().to_string())
                .collect()
        })
        .collect()
}

/// An inline `w:drawing` showing image relationship `rel_id` at `cx` × `cy` EMU.
fn inline_picture(rel_id: &str, index: usize, cx: u64, cy: u64) -> Element {
    let id = index.to_string();
    let name = format!("Figure {}", index);
    let (cx, cy) = (cx.to_string(), cy.to_string());

    let picture = Element::new("pic:pic")
        .with_child(
            Element::new("pic:nvPicPr")
                .with_child(
                    Element::new("pic:cNvPr")
                        .with_attr("id", id.clone())
                        .with_attr("name", name.clone()),
                )
                .with_child(Element::new("pic:cNvPicPr")),
        )
        .with_child(
            Element::new("pic:blipFill")
                .with_child(Element::new("a:blip").with_attr("r:embed", rel_id))
                .with_child(Element::new("a:stretch").with_child(Element::new("a:fillRect"))),
        )
        .with_child(
            Element::new("pic:spPr")
                .with_child(
                    Element::new("a:xfrm")
                        .with_child(Element::new("a:off").with_attr("x", "0").with_attr("y", "0"))
                        .with_child(
                            Element::new("a:ext")
                                .with_attr("cx", cx.clone())
                                .with_attr("cy", cy.clone()),
                        ),
                )
                .with_child(
                    Element::new("a:prstGeom")
                        .with_attr("prst", "rect")
                        .with_child(Element::new("a:avLst")),
                ),
        );

    let inline = Element::new("wp:inline")
        .with_attr("distT", "0")
        .with_attr("distB", "0")
        .with_attr("distL", "0")
        .with_attr("distR", "0")
        .with_child(Element::new("wp:extent").with_attr("cx", cx).with_attr("cy", cy))
        .with_child(Element::new("wp:docPr").with_attr("id", id).with_attr("name", name))
        .with_child(
            Element::new("a:graphic").with_child(
                Element::new("a:graphicData")
                    .with_attr("uri", "http://schemas.openxmlformats.org/drawingml/2006/picture")
                    .with_child(picture),
            ),
        );

    Element::new("w:drawing").with_child(inline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Block;

    struct FixedRecognizer(&'static str);

    impl Recognizer for FixedRecognizer {
        fn name(&self) -> &str {
            "fixed"
        }

        fn recognize(&self, _image: &Path, _kind: BlockKind) -> Result<Recognition> {
            Ok(Recognition {
                text: String::new(),
                latex: Some(self.0.to_string()),
                confidence: 0.9,
            })
        }
    }

    struct FailingRecognizer;

    impl Recognizer for FailingRecognizer {
        fn name(&self) -> &str {
            "failing"
        }

        fn recognize(&self, _image: &Path, _kind: BlockKind) -> Result<Recognition> {
            Err(Error::Other("service unavailable".into()))
        }
    }

    fn style_ids(doc: &Document) -> Vec<String> {
        doc.paragraphs()
            .map(|p| p.properties.style.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_role_mapping() {
        let style = StyleConfig::default();
        let blocks = vec![
            ContentBlock::new(BlockKind::Title, "On Things"),
            ContentBlock::new(BlockKind::Author, "A. Author"),
            ContentBlock::new(BlockKind::Abstract, "We study things."),
            ContentBlock::new(BlockKind::Heading, "Method"),
            ContentBlock::new(BlockKind::Text, "Body."),
            ContentBlock::new(BlockKind::Reference, "Smith, J. (2020). A paper."),
        ];
        let assembled = Assembler::new(&style).unwrap().assemble(&blocks);
        let doc = &assembled.document;

        assert_eq!(assembled.blocks_placed, 6);
        assert_eq!(
            style_ids(doc),
            vec!["Title", "Author", "AbstractTitle", "Abstract", "Heading1", "BodyText", "BodyText"]
        );
        let paras: Vec<&Paragraph> = doc.paragraphs().collect();
        assert_eq!(paras[0].properties.alignment, Some(Alignment::Center));
        assert_eq!(paras[0].runs().next().unwrap().properties.size, Some(32));
        assert_eq!(paras[2].text(), "Abstract");
        let indent = paras[6].properties.indent.as_ref().unwrap();
        assert_eq!(indent.first_line, Some(-720));
        assert!(doc.footer.is_some());
    }

    #[test]
    fn test_equation_uses_latex() {
        let style = StyleConfig::default();
        let blocks = vec![ContentBlock::new(BlockKind::Equation, "E = mc2").with_latex("E = mc^2")];
        let assembled = Assembler::new(&style).unwrap().assemble(&blocks);
        let para = assembled.document.paragraphs().next().unwrap();
        assert_eq!(para.text(), "E = mc^2");
        assert_eq!(para.properties.alignment, Some(Alignment::Center));
    }

    #[test]
    fn test_recognizer_fills_missing_markup() {
        let style = StyleConfig::default();
        let recognizer = FixedRecognizer("a & b \\\\ 1 & 2");
        let blocks = vec![ContentBlock::new(BlockKind::Table, "").with_image("table.png")];
        let assembled = Assembler::new(&style)
            .unwrap()
            .with_recognizer(&recognizer)
            .assemble(&blocks);

        let table = assembled.document.tables().next().unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].plain_text(), "a\tb");
        // Three-line styling is applied to assembled tables.
        assert!(table.properties.borders.is_some());
        assert!(assembled.diagnostics.is_empty());
    }

    #[test]
    fn test_recognition_failure_skips_block() {
        let style = StyleConfig::default();
        let blocks = vec![
            ContentBlock::new(BlockKind::Equation, "").with_image("eq.png"),
            ContentBlock::new(BlockKind::Text, "After."),
        ];
        let assembled = Assembler::new(&style)
            .unwrap()
            .with_recognizer(&FailingRecognizer)
            .assemble(&blocks);

        assert_eq!(assembled.blocks_placed, 1);
        assert_eq!(assembled.blocks_skipped, 1);
        assert_eq!(assembled.diagnostics.count(DiagnosticKind::RecognitionFailed), 1);
        assert_eq!(assembled.diagnostics.count(DiagnosticKind::SkippedBlock), 1);
        assert_eq!(assembled.document.paragraphs().count(), 1);
    }

    #[test]
    fn test_figure_embeds_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.png");
        image::RgbImage::new(40, 20).save(&path).unwrap();

        let style = StyleConfig::default();
        let blocks = vec![ContentBlock::new(BlockKind::Figure, "Figure 1: Plot").with_image(&path)];
        let assembled = Assembler::new(&style).unwrap().assemble(&blocks);
        let doc = &assembled.document;

        assert_eq!(doc.media.len(), 1);
        let para = doc.paragraphs().next().unwrap();
        assert!(para.has_drawing());
        let Some(RunContent::Drawing(drawing)) = para.runs().next().unwrap().content.first() else {
            panic!("expected drawing");
        };
        let extent = drawing.child("wp:inline").unwrap().child("wp:extent").unwrap();
        assert_eq!(extent.attr("cx"), Some("4572000"));
        assert_eq!(extent.attr("cy"), Some("2286000"));

        let caption = doc.paragraphs().nth(1).unwrap();
        assert_eq!(caption.properties.style.as_deref(), Some("ImageCaption"));
        assert_eq!(caption.properties.alignment, Some(Alignment::Center));
    }

    #[test]
    fn test_missing_figure_skipped() {
        let style = StyleConfig::default();
        let blocks = vec![
            ContentBlock::new(BlockKind::Figure, "Figure 2"),
            ContentBlock::new(BlockKind::Figure, "").with_image("/nonexistent/fig.png"),
        ];
        let assembled = Assembler::new(&style).unwrap().assemble(&blocks);
        assert_eq!(assembled.blocks_skipped, 2);
        assert!(assembled.document.body.iter().all(|b| !matches!(b, Block::Paragraph(_))));
    }

    #[test]
    fn test_parse_table_rows() {
        assert_eq!(
            parse_table_rows("| a | b |\n|---|---|\n| 1 | 2 |"),
            vec![vec!["a", "b"], vec!["1", "2"]]
        );
        assert_eq!(
            parse_table_rows("\\begin{tabular}{cc}\n\\toprule\nx & y \\\\\n\\end{tabular}"),
            vec![vec!["x", "y"]]
        );
        assert_eq!(parse_table_rows("p\tq"), vec![vec!["p", "q"]]);
    }

    #[test]
    fn test_assemble_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        let style = StyleConfig::default();
        let blocks = vec![ContentBlock::new(BlockKind::Text, "Hello.")];
        Assembler::new(&style).unwrap().assemble_to_file(&blocks, &path).unwrap();

        let doc = crate::docx::read_docx(&path).unwrap();
        assert_eq!(doc.plain_text(), "Hello.");
    }
}
