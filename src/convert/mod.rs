//! End-to-end conversion of a manuscript to a house-styled DOCX.
//!
//! A [`Converter`] runs the fixed pipeline: fatal-input checks, working
//! directory, source normalization (LaTeX only), the external conversion
//! engine, DOCX reading, restyling, and an atomic write of the result.
//!
//! # Example
//!
//! ```no_run
//! use texword::convert::{ConvertOptions, Converter};
//! use std::path::Path;
//!
//! fn main() -> texword::Result<()> {
//!     let converter = Converter::new();
//!     let result = converter.convert(Path::new("paper.tex"), None, &ConvertOptions::default())?;
//!     println!("{} ({} bytes)", result.output.display(), result.size_bytes);
//!     Ok(())
//! }
//! ```

pub mod engine;

pub use engine::{
    check_output, ConversionEngine, EngineOutput, EngineRequest, PandocEngine, DEFAULT_TIMEOUT,
};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::detect::{is_docx_bytes, SourceFormat};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::docx::{read_docx_bytes, to_docx_bytes};
use crate::error::{Error, Result};
use crate::normalize::{extract_short_title, NormalizeOptions, Normalizer, PdftoppmRasterizer, Rasterizer};
use crate::restyle::{PageDecoration, RestyleOptions, RestyleReport, Restyler};
use crate::style::StyleConfig;

/// File name of the normalized source inside the working directory.
pub const PROCESSED_SOURCE: &str = "processed.tex";

/// File name of the engine output inside the working directory.
pub const RAW_OUTPUT: &str = "raw_output.docx";

/// Options for one conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// House style
    pub style: StyleConfig,

    /// Source normalization options
    pub normalize: NormalizeOptions,

    /// Restyling options
    pub restyle: RestyleOptions,

    /// Keep the working directory for inspection instead of deleting it
    pub keep_work_dir: bool,

    /// Reference document handed to the engine for base styles
    pub reference_doc: Option<PathBuf>,

    /// Put the manuscript's short title in the page header
    pub running_head: bool,

    /// Engine timeout
    pub timeout: Duration,
}

impl ConvertOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the house style.
    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.style = style;
        self
    }

    /// Set normalization options.
    pub fn with_normalize_options(mut self, options: NormalizeOptions) -> Self {
        self.normalize = options;
        self
    }

    /// Set restyling options.
    pub fn with_restyle_options(mut self, options: RestyleOptions) -> Self {
        self.restyle = options;
        self
    }

    /// Keep or remove the working directory.
    pub fn with_keep_work_dir(mut self, keep: bool) -> Self {
        self.keep_work_dir = keep;
        self
    }

    /// Set the reference document.
    pub fn with_reference_doc(mut self, path: impl Into<PathBuf>) -> Self {
        self.reference_doc = Some(path.into());
        self
    }

    /// Enable or disable the running head.
    pub fn with_running_head(mut self, enabled: bool) -> Self {
        self.running_head = enabled;
        self
    }

    /// Set the engine timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            style: StyleConfig::default(),
            normalize: NormalizeOptions::default(),
            restyle: RestyleOptions::default(),
            keep_work_dir: false,
            reference_doc: None,
            running_head: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Written DOCX file
    pub output: PathBuf,

    /// Size of the written file
    pub size_bytes: u64,

    /// Detected source format
    pub format: SourceFormat,

    /// Every soft problem from normalization, conversion, and restyling
    pub diagnostics: Diagnostics,

    /// Restyling counts (its diagnostics are moved into `diagnostics`)
    pub report: RestyleReport,

    /// Working directory left on disk, when requested
    pub retained_work_dir: Option<PathBuf>,

    /// Running-head title used, if any
    pub title: Option<String>,

    /// Figure references relocated during normalization
    pub figures_converted: usize,

    /// Citations resolved during normalization
    pub citations_resolved: usize,
}

/// Output path used when none is given: the input with a `.docx` extension.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("docx")
}

/// Runs manuscripts through the conversion pipeline.
pub struct Converter {
    engine: Box<dyn ConversionEngine>,
    rasterizer: Box<dyn Rasterizer>,
}

/// Intermediate state carried from the engine stage to restyling.
struct Staged {
    bytes: Vec<u8>,
    diagnostics: Diagnostics,
    title: Option<String>,
    residue_label: Option<String>,
    figures_converted: usize,
    citations_resolved: usize,
}

impl Converter {
    /// Create a converter using pandoc and pdftoppm.
    pub fn new() -> Self {
        Self {
            engine: Box::new(PandocEngine::new()),
            rasterizer: Box::new(PdftoppmRasterizer::new()),
        }
    }

    /// Builder: replace the conversion engine.
    pub fn with_engine(mut self, engine: Box<dyn ConversionEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Builder: replace the figure rasterizer.
    pub fn with_rasterizer(mut self, rasterizer: Box<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Name of the configured engine.
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Convert `input` to DOCX.
    ///
    /// `output` defaults to [`default_output_path`]. Nothing is written at the
    /// output path unless every fatal stage succeeds.
    pub fn convert(
        &self,
        input: &Path,
        output: Option<&Path>,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        if !input.is_file() {
            return Err(Error::SourceNotFound(input.to_path_buf()));
        }
        let format = SourceFormat::from_path(input)?;
        self.engine.check_available()?;
        options.style.validate()?;
        if let Some(reference) = &options.reference_doc {
            if !reference.is_file() {
                return Err(Error::SourceNotFound(reference.clone()));
            }
        }

        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output_path(input));
        log::info!(
            "Converting {} ({}) -> {}",
            input.display(),
            format,
            output.display()
        );

        let work_dir = tempfile::Builder::new().prefix("texword_").tempdir()?;
        let result = self.run(input, &output, format, work_dir.path(), options);

        let retained = if options.keep_work_dir {
            let path = work_dir.keep();
            log::info!("Working directory kept at {}", path.display());
            Some(path)
        } else {
            None
        };

        let mut result = result?;
        result.retained_work_dir = retained;
        Ok(result)
    }

    fn run(
        &self,
        input: &Path,
        output: &Path,
        format: SourceFormat,
        work_dir: &Path,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let staged = self.stage(input, format, work_dir, options)?;
        let mut diagnostics = staged.diagnostics;

        let mut doc = read_docx_bytes(&staged.bytes)?;

        let mut restyle = options.restyle.clone();
        if let Some(label) = staged.residue_label {
            restyle = restyle.with_residue_token(label);
        }
        if let Some(title) = &staged.title {
            restyle = restyle.with_page_decoration(PageDecoration::RunningHead(title.clone()));
        }
        let mut report = Restyler::new(&options.style)?
            .with_options(restyle)
            .run(&mut doc);
        diagnostics.extend(std::mem::take(&mut report.diagnostics));

        let bytes = to_docx_bytes(&doc)?;
        write_atomic(output, &bytes)?;
        log::info!("Wrote {} ({} bytes)", output.display(), bytes.len());

        Ok(ConvertResult {
            output: output.to_path_buf(),
            size_bytes: bytes.len() as u64,
            format,
            diagnostics,
            report,
            retained_work_dir: None,
            title: staged.title,
            figures_converted: staged.figures_converted,
            citations_resolved: staged.citations_resolved,
        })
    }

    /// Normalize (when applicable) and run the engine; returns its DOCX bytes.
    fn stage(
        &self,
        input: &Path,
        format: SourceFormat,
        work_dir: &Path,
        options: &ConvertOptions,
    ) -> Result<Staged> {
        let mut staged = Staged {
            bytes: Vec::new(),
            diagnostics: Diagnostics::new(),
            title: None,
            residue_label: None,
            figures_converted: 0,
            citations_resolved: 0,
        };

        let engine_input = if format.needs_normalization() {
            let normalized = Normalizer::new(self.rasterizer.as_ref())
                .with_options(options.normalize.clone())
                .normalize_file(input, work_dir)?;
            let processed = work_dir.join(PROCESSED_SOURCE);
            fs::write(&processed, &normalized.text)?;

            if options.running_head {
                staged.title = extract_short_title(&normalized.text);
            }
            staged.residue_label = normalized.bibliography_label;
            staged.figures_converted = normalized.figures_converted;
            staged.citations_resolved = normalized.citations_resolved;
            staged.diagnostics.extend(normalized.diagnostics);
            processed
        } else {
            input.to_path_buf()
        };

        let resource_dir = input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let raw = work_dir.join(RAW_OUTPUT);
        let request = EngineRequest::new(engine_input, &raw, format)
            .with_resource_dir(resource_dir)
            .with_reference_doc(options.reference_doc.clone())
            .with_timeout(options.timeout);

        log::debug!("Running engine {}", self.engine.name());
        let engine_output = self.engine.convert(&request)?;
        for warning in engine_output.warnings {
            staged
                .diagnostics
                .push(DiagnosticKind::ConverterWarning, warning);
        }

        check_output(&raw)?;
        let bytes = fs::read(&raw)?;
        if !is_docx_bytes(&bytes) {
            return Err(Error::InvalidPackage(format!(
                "{} output is not a ZIP package",
                self.engine.name()
            )));
        }
        staged.bytes = bytes;
        Ok(staged)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `bytes` to a temporary file beside `path`, then move it into place.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut file = tempfile::NamedTempFile::new_in(parent)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, Paragraph, StyleSheet};
    use std::sync::{Arc, Mutex};

    /// Records requests and writes a canned document.
    struct MockEngine {
        requests: Arc<Mutex<Vec<EngineRequest>>>,
        available: bool,
        write_output: bool,
        warnings: Vec<String>,
    }

    impl MockEngine {
        fn new() -> (Self, Arc<Mutex<Vec<EngineRequest>>>) {
            let requests = Arc::new(Mutex::new(Vec::new()));
            let engine = Self {
                requests: Arc::clone(&requests),
                available: true,
                write_output: true,
                warnings: Vec::new(),
            };
            (engine, requests)
        }
    }

    impl ConversionEngine for MockEngine {
        fn name(&self) -> &str {
            "mock"
        }

        fn check_available(&self) -> Result<()> {
            if self.available {
                Ok(())
            } else {
                Err(Error::MissingDependency("mock".into()))
            }
        }

        fn convert(&self, request: &EngineRequest) -> Result<EngineOutput> {
            self.requests.lock().unwrap().push(request.clone());
            if self.write_output {
                let mut doc = Document::new();
                doc.styles = StyleSheet::academic();
                doc.add_paragraph(Paragraph::with_text("A Study").with_style("Title"));
                doc.add_paragraph(Paragraph::with_text("Body.").with_style("BodyText"));
                doc.add_paragraph(Paragraph::with_text("99").with_style("BodyText"));
                crate::docx::write_docx(&doc, &request.output)?;
            }
            Ok(EngineOutput {
                warnings: self.warnings.clone(),
            })
        }
    }

    struct NoRasterizer;

    impl Rasterizer for NoRasterizer {
        fn rasterize(&self, _pdf: &Path, _output: &Path) -> Result<()> {
            Err(Error::MissingDependency("pdftoppm".into()))
        }
    }

    fn converter(engine: MockEngine) -> Converter {
        Converter::new()
            .with_engine(Box::new(engine))
            .with_rasterizer(Box::new(NoRasterizer))
    }

    fn write_source(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_options_builder() {
        let options = ConvertOptions::new()
            .with_keep_work_dir(true)
            .with_running_head(false)
            .with_reference_doc("ref.docx")
            .with_timeout(Duration::from_secs(5));
        assert!(options.keep_work_dir);
        assert!(!options.running_head);
        assert_eq!(options.reference_doc, Some(PathBuf::from("ref.docx")));
        assert_eq!(options.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("a/paper.tex")),
            PathBuf::from("a/paper.docx")
        );
    }

    #[test]
    fn test_latex_conversion() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(
            dir.path(),
            "paper.tex",
            "\\title{A Study}\n\\begin{document}\nText % comment\n\\end{document}\n",
        );
        let (engine, requests) = MockEngine::new();
        let result = converter(engine)
            .convert(&input, None, &ConvertOptions::default())
            .unwrap();

        assert_eq!(result.output, dir.path().join("paper.docx"));
        assert!(result.size_bytes > 0);
        assert_eq!(result.format, SourceFormat::Latex);
        assert_eq!(result.title.as_deref(), Some("A Study"));
        assert_eq!(result.report.residue_removed, 1);
        assert!(result.retained_work_dir.is_none());

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].input.ends_with(PROCESSED_SOURCE));
        assert_eq!(requests[0].resource_dir, dir.path());
        // The working directory is gone once the run returns.
        assert!(!requests[0].input.exists());

        let doc = crate::docx::read_docx(&result.output).unwrap();
        let header = doc.header.as_ref().unwrap();
        assert!(header.paragraphs().next().unwrap().text().starts_with("A STUDY\t"));
    }

    #[test]
    fn test_markdown_skips_normalization() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(dir.path(), "notes.md", "# A Study\n\nText.\n");
        let out = dir.path().join("out/notes.docx");
        let (engine, requests) = MockEngine::new();
        let result = converter(engine)
            .convert(&input, Some(&out), &ConvertOptions::default())
            .unwrap();

        assert!(out.is_file());
        assert!(result.title.is_none());
        assert_eq!(requests.lock().unwrap()[0].input, input);
        assert_eq!(requests.lock().unwrap()[0].format, SourceFormat::Markdown);

        let doc = crate::docx::read_docx(&out).unwrap();
        assert!(doc.footer.is_some());
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, requests) = MockEngine::new();
        let result = converter(engine).convert(
            &dir.path().join("absent.tex"),
            None,
            &ConvertOptions::default(),
        );
        assert!(matches!(result, Err(Error::SourceNotFound(_))));
        assert!(requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unavailable_engine_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(dir.path(), "paper.tex", "x");
        let (mut engine, requests) = MockEngine::new();
        engine.available = false;
        let result = converter(engine).convert(&input, None, &ConvertOptions::default());
        assert!(matches!(result, Err(Error::MissingDependency(_))));
        assert!(requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_output_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(dir.path(), "paper.tex", "x");
        let (mut engine, _) = MockEngine::new();
        engine.write_output = false;
        let result = converter(engine).convert(&input, None, &ConvertOptions::default());
        assert!(matches!(result, Err(Error::MissingOutput(_))));
        assert!(!dir.path().join("paper.docx").exists());
    }

    #[test]
    fn test_unsupported_source() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(dir.path(), "paper.rtf", "x");
        let (engine, _) = MockEngine::new();
        let result = converter(engine).convert(&input, None, &ConvertOptions::default());
        assert!(matches!(result, Err(Error::UnsupportedSource(_))));
    }

    #[test]
    fn test_keep_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(dir.path(), "paper.tex", "\\begin{document}x\\end{document}");
        let (engine, _) = MockEngine::new();
        let options = ConvertOptions::new().with_keep_work_dir(true);
        let result = converter(engine).convert(&input, None, &options).unwrap();

        let kept = result.retained_work_dir.unwrap();
        assert!(kept.join(PROCESSED_SOURCE).is_file());
        assert!(kept.join(RAW_OUTPUT).is_file());
        fs::remove_dir_all(kept).unwrap();
    }

    #[test]
    fn test_engine_warnings_become_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(dir.path(), "paper.md", "text");
        let (mut engine, _) = MockEngine::new();
        engine.warnings = vec!["[WARNING] Could not fetch resource".into()];
        let result = converter(engine)
            .convert(&input, None, &ConvertOptions::default())
            .unwrap();
        assert_eq!(result.diagnostics.count(DiagnosticKind::ConverterWarning), 1);
    }

    #[test]
    fn test_write_atomic_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        fs::write(&path, b"old").unwrap();
        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");
    }
}
