//! Integration tests for the conversion driver.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use texword::convert::{EngineOutput, EngineRequest};
use texword::error::Result;
use texword::model::{Document, Paragraph, StyleSheet};
use texword::{
    ConversionEngine, ConvertOptions, Converter, DiagnosticKind, Error, Rasterizer, SourceFormat,
};

/// Records the source it was handed and writes a fixed document.
#[derive(Clone, Default)]
struct RecordingEngine {
    seen_source: Arc<Mutex<Option<String>>>,
}

impl ConversionEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    fn check_available(&self) -> Result<()> {
        Ok(())
    }

    fn convert(&self, request: &EngineRequest) -> Result<EngineOutput> {
        let source = fs::read_to_string(&request.input)?;
        *self.seen_source.lock().unwrap() = Some(source);

        let mut doc = Document::new();
        doc.styles = StyleSheet::academic();
        for (style, text) in [
            ("Title", "Deep Things"),
            ("Heading1", "Introduction"),
            ("FirstParagraph", "As Smith (2020) showed."),
            ("BodyText", ""),
            ("BodyText", ""),
            ("Heading1", "References"),
            ("BodyText", "99"),
            ("BodyText", "Smith, J. (2020). A paper."),
        ] {
            let para = if text.is_empty() {
                Paragraph::new().with_style(style)
            } else {
                Paragraph::with_text(text).with_style(style)
            };
            doc.add_paragraph(para);
        }
        texword::write_docx(&doc, &request.output)?;
        Ok(EngineOutput {
            warnings: vec!["[WARNING] Missing character".into()],
        })
    }
}

/// Fails like a hung engine.
struct TimeoutEngine;

impl ConversionEngine for TimeoutEngine {
    fn name(&self) -> &str {
        "timeout"
    }

    fn check_available(&self) -> Result<()> {
        Ok(())
    }

    fn convert(&self, request: &EngineRequest) -> Result<EngineOutput> {
        Err(Error::ConverterTimeout(request.timeout))
    }
}

struct NoRasterizer;

impl Rasterizer for NoRasterizer {
    fn rasterize(&self, _pdf: &Path, _output: &Path) -> Result<()> {
        Err(Error::MissingDependency("pdftoppm".into()))
    }
}

const PAPER: &str = "\\documentclass{article}\n\\title{Deep Things}\n\\begin{document}\n\
    As \\citet{smith} showed. % remark\n\
    \\begin{thebibliography}{99}\n\\bibitem[Smith(2020)]{smith} Smith.\n\\end{thebibliography}\n\
    \\end{document}\n";

#[test]
fn test_latex_pipeline_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("paper.tex");
    fs::write(&input, PAPER).unwrap();

    let engine = RecordingEngine::default();
    let seen = Arc::clone(&engine.seen_source);
    let converter = Converter::new()
        .with_engine(Box::new(engine))
        .with_rasterizer(Box::new(NoRasterizer));
    let result = converter.convert(&input, None, &ConvertOptions::default()).unwrap();

    let source = seen.lock().unwrap().clone().unwrap();
    assert!(source.contains("As Smith (2020) showed."));
    assert!(!source.contains("% remark"));
    assert!(source.contains("\\usepackage{amsmath}"));

    assert_eq!(result.format, SourceFormat::Latex);
    assert_eq!(result.citations_resolved, 1);
    assert_eq!(result.title.as_deref(), Some("Deep Things"));
    assert_eq!(result.report.residue_removed, 1);
    assert_eq!(result.report.empty_removed, 1);
    assert_eq!(result.diagnostics.count(DiagnosticKind::ConverterWarning), 1);

    let doc = texword::read_docx(&result.output).unwrap();
    assert!(!doc.paragraphs().any(|p| p.text() == "99"));
    let entry = doc.paragraphs().last().unwrap();
    assert_eq!(entry.properties.indent.as_ref().unwrap().first_line, Some(-720));
    assert!(doc.header.is_some());
}

#[test]
fn test_running_head_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("paper.tex");
    fs::write(&input, PAPER).unwrap();
    let output = dir.path().join("styled.docx");

    let converter = Converter::new()
        .with_engine(Box::new(RecordingEngine::default()))
        .with_rasterizer(Box::new(NoRasterizer));
    let options = ConvertOptions::new().with_running_head(false);
    let result = converter.convert(&input, Some(&output), &options).unwrap();

    assert!(result.title.is_none());
    let doc = texword::read_docx(&output).unwrap();
    assert!(doc.footer.is_some());
}

#[test]
fn test_timeout_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("paper.md");
    fs::write(&input, "# Title\n").unwrap();

    let converter = Converter::new().with_engine(Box::new(TimeoutEngine));
    let options = ConvertOptions::new().with_timeout(Duration::from_secs(1));
    let result = converter.convert(&input, None, &options);

    assert!(matches!(result, Err(Error::ConverterTimeout(_))));
    assert!(!dir.path().join("paper.docx").exists());
}

#[test]
fn test_invalid_style_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("paper.tex");
    fs::write(&input, PAPER).unwrap();

    let converter = Converter::new().with_engine(Box::new(RecordingEngine::default()));
    let style = texword::StyleConfig::default().with_font_size(-1.0);
    let result = converter.convert(&input, None, &ConvertOptions::new().with_style(style));
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[test]
fn test_missing_reference_doc_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("paper.tex");
    fs::write(&input, PAPER).unwrap();

    let converter = Converter::new().with_engine(Box::new(RecordingEngine::default()));
    let options = ConvertOptions::new().with_reference_doc(dir.path().join("ref.docx"));
    assert!(matches!(
        converter.convert(&input, None, &options),
        Err(Error::SourceNotFound(_))
    ));
}
