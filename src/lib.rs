//! # texword
//!
//! Academic manuscript conversion to house-styled DOCX.
//!
//! A generic markup-to-DOCX converter gets the content right but not the
//! house style. This library wraps one (pandoc by default) in two passes:
//!
//! - **Source normalization** ([`normalize`]): expand `\input`/`\include`,
//!   strip comments, rasterize PDF figures, resolve natbib citations into
//!   plain text, and rewrite constructs the converter cannot parse.
//! - **Structural restyling** ([`restyle`]): remove converter residue,
//!   classify each paragraph's role, and apply fonts, spacing, margins,
//!   three-line tables, equation numbers, and a running head.
//!
//! ## Quick Start
//!
//! ```no_run
//! use texword::{convert_file, StyleConfig};
//!
//! fn main() -> texword::Result<()> {
//!     let style = StyleConfig::default().with_font("Times New Roman");
//!     let result = convert_file("paper.tex", style)?;
//!     println!("Wrote {}", result.output.display());
//!     for diagnostic in &result.diagnostics {
//!         eprintln!("{}", diagnostic);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Routes
//!
//! - `.tex` sources are normalized, converted, and restyled.
//! - `.md` sources are converted and restyled without normalization.
//! - An existing `.docx` can be restyled directly with [`restyle_docx`].
//! - Extracted page content ([`model::ContentBlock`]s) is turned into a
//!   document by [`assemble::Assembler`].

pub mod assemble;
pub mod convert;
pub mod detect;
pub mod diagnostics;
pub mod docx;
pub mod error;
pub mod model;
pub mod normalize;
pub mod restyle;
pub mod style;

// Re-export commonly used types
pub use assemble::{Assembled, AssembleOptions, Assembler, Recognition, Recognizer};
pub use convert::{ConversionEngine, ConvertOptions, ConvertResult, Converter, PandocEngine};
pub use detect::SourceFormat;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use docx::{read_docx, read_docx_bytes, to_docx_bytes, write_docx};
pub use error::{Error, Result};
pub use model::{BlockKind, ContentBlock, Document};
pub use normalize::{NormalizeOptions, Normalizer, PdftoppmRasterizer, Rasterizer};
pub use restyle::{PageDecoration, RestyleOptions, RestyleReport, Restyler};
pub use style::{ReferenceLayout, StyleConfig};

use std::path::Path;

/// Convert a manuscript with the default pipeline.
///
/// The output is written next to the input with a `.docx` extension.
pub fn convert_file<P: AsRef<Path>>(path: P, style: StyleConfig) -> Result<ConvertResult> {
    let options = ConvertOptions::new().with_style(style);
    Converter::new().convert(path.as_ref(), None, &options)
}

/// Convert a manuscript with custom options and output path.
pub fn convert_file_with_options<P: AsRef<Path>>(
    path: P,
    output: Option<&Path>,
    options: &ConvertOptions,
) -> Result<ConvertResult> {
    Converter::new().convert(path.as_ref(), output, options)
}

/// Restyle an existing DOCX file into `output`.
///
/// # Example
///
/// ```no_run
/// use texword::{restyle_docx, RestyleOptions, StyleConfig};
///
/// let report = restyle_docx(
///     "raw.docx",
///     "styled.docx",
///     &StyleConfig::default(),
///     RestyleOptions::default(),
/// )
/// .unwrap();
/// println!("{} tables styled", report.tables_styled);
/// ```
pub fn restyle_docx<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    style: &StyleConfig,
    options: RestyleOptions,
) -> Result<RestyleReport> {
    let mut doc = read_docx(input)?;
    let report = Restyler::new(style)?.with_options(options).run(&mut doc);
    let bytes = to_docx_bytes(&doc)?;
    convert::write_atomic(output.as_ref(), &bytes)?;
    Ok(report)
}

/// Assemble a JSON list of content blocks into a DOCX file.
pub fn assemble_json<P: AsRef<Path>>(
    json: &str,
    output: P,
    style: &StyleConfig,
) -> Result<Assembled> {
    let blocks = ContentBlock::from_json_list(json)?;
    Assembler::new(style)?.assemble_to_file(&blocks, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Paragraph, StyleSheet};

    #[test]
    fn test_restyle_docx() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw.docx");
        let output = dir.path().join("styled.docx");

        let mut doc = Document::new();
        doc.styles = StyleSheet::academic();
        doc.add_paragraph(Paragraph::with_text("Introduction").with_style("Heading1"));
        doc.add_paragraph(Paragraph::with_text("100").with_style("BodyText"));
        write_docx(&doc, &input).unwrap();

        let report = restyle_docx(&input, &output, &StyleConfig::default(), RestyleOptions::new())
            .unwrap();
        assert_eq!(report.residue_removed, 1);

        let styled = read_docx(&output).unwrap();
        assert_eq!(styled.plain_text(), "Introduction");
        let run = styled.paragraphs().next().unwrap().runs().next().unwrap();
        assert_eq!(run.properties.bold, Some(true));
    }

    #[test]
    fn test_assemble_json() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("blocks.docx");
        let json = r#"[{"kind": "title", "text": "On Things"},
                       {"kind": "text", "text": "Body."}]"#;
        let assembled = assemble_json(json, &output, &StyleConfig::default()).unwrap();
        assert_eq!(assembled.blocks_placed, 2);
        assert!(output.is_file());
    }

    #[test]
    fn test_missing_input() {
        let result = convert_file("/nonexistent/paper.tex", StyleConfig::default());
        assert!(matches!(result, Err(Error::SourceNotFound(_))));
    }
}
