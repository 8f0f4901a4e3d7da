//! Figure relocation: PDF page images are rasterized, others copied.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{Error, Result};

static GRAPHICSPATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\graphicspath\{((?:\s*\{[^}]*\})+)\s*\}").unwrap());
static GRAPHICSPATH_DIR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^}]*)\}").unwrap());
static INCLUDEGRAPHICS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\includegraphics(\[[^\]]*\])?\{([^}]+)\}").unwrap());

/// Extensions tried, in order, when resolving a figure name.
const CANDIDATE_EXTENSIONS: &[&str] = &["", ".pdf", ".png", ".jpg", ".jpeg"];

/// Renders the first page of a PDF to a PNG file.
pub trait Rasterizer {
    /// Rasterize page 1 of `pdf` into `output` (a `.png` path).
    fn rasterize(&self, pdf: &Path, output: &Path) -> Result<()>;

    /// Check whether the backend can run at all.
    fn is_available(&self) -> bool {
        true
    }
}

/// Rasterizer backed by poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    program: PathBuf,
    dpi: u32,
}

impl PdftoppmRasterizer {
    /// Use `pdftoppm` from `PATH` at 300 DPI.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("pdftoppm"),
            dpi: 300,
        }
    }

    /// Builder: set the output resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Builder: use a specific executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf: &Path, output: &Path) -> Result<()> {
        // pdftoppm appends the extension itself.
        let prefix = output.with_extension("");
        let out = Command::new(&self.program)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg("1")
            .arg("-l")
            .arg("1")
            .arg("-png")
            .arg("-singlefile")
            .arg(pdf)
            .arg(&prefix)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::MissingDependency(self.program.display().to_string())
                } else {
                    Error::Io(e)
                }
            })?;

        if !out.status.success() {
            return Err(Error::Other(format!(
                "pdftoppm exited with {}: {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        match fs::metadata(output) {
            Ok(meta) if meta.len() > 0 => Ok(()),
            _ => Err(Error::MissingOutput(output.to_path_buf())),
        }
    }

    fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }
}

/// Directories named by `\graphicspath`, resolved against `base_dir`.
pub fn graphics_paths(source: &str, base_dir: &Path) -> Vec<PathBuf> {
    GRAPHICSPATH_RE
        .captures(source)
        .map(|caps| {
            GRAPHICSPATH_DIR_RE
                .captures_iter(&caps[1])
                .map(|d| base_dir.join(d[1].trim()))
                .collect()
        })
        .unwrap_or_default()
}

/// Locate a figure file by trying each search directory and extension.
pub fn resolve_figure(name: &str, search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs.iter().find_map(|dir| {
        CANDIDATE_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}{}", name, ext)))
            .find(|candidate| candidate.is_file())
    })
}

struct FigureRelocator<'a> {
    work_dir: &'a Path,
    rasterizer: &'a dyn Rasterizer,
    search_dirs: Vec<PathBuf>,
    placed: HashMap<PathBuf, PathBuf>,
    used_names: HashSet<String>,
    relocated: usize,
}

impl<'a> FigureRelocator<'a> {
    fn unique_destination(&mut self, file_name: &str) -> PathBuf {
        let path = Path::new(file_name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "figure".to_string());
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let mut candidate = format!("{}{}", stem, ext);
        let mut n = 1;
        while self.used_names.contains(&candidate) {
            candidate = format!("{}_{}{}", stem, n, ext);
            n += 1;
        }
        self.used_names.insert(candidate.clone());
        self.work_dir.join(candidate)
    }

    fn place(&mut self, source: &Path) -> Result<PathBuf> {
        if let Some(existing) = self.placed.get(source) {
            return Ok(existing.clone());
        }

        let is_pdf = source
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "figure".to_string());

        let destination = if is_pdf {
            let png_name = Path::new(&file_name).with_extension("png");
            let destination = self.unique_destination(&png_name.to_string_lossy());
            self.rasterizer.rasterize(source, &destination)?;
            log::debug!("Rasterized {} -> {}", source.display(), destination.display());
            destination
        } else {
            let destination = self.unique_destination(&file_name);
            fs::copy(source, &destination)?;
            destination
        };

        self.placed.insert(source.to_path_buf(), destination.clone());
        Ok(destination)
    }

    fn rewrite(&mut self, caps: &Captures, diagnostics: &mut Diagnostics) -> String {
        let directive = caps[0].to_string();
        let options = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let name = caps[2].trim();

        let Some(source) = resolve_figure(name, &self.search_dirs) else {
            diagnostics.push(
                DiagnosticKind::UnresolvedFigure,
                format!("figure '{}' not found", name),
            );
            return directive;
        };

        match self.place(&source) {
            Ok(destination) => {
                self.relocated += 1;
                let path = destination.to_string_lossy().replace('\\', "/");
                format!("\\includegraphics{}{{{}}}", options, path)
            }
            Err(e) => {
                diagnostics.push(
                    DiagnosticKind::FigureConversion,
                    format!("{}: {}", source.display(), e),
                );
                directive
            }
        }
    }
}

/// Relocate every `\includegraphics` target into `work_dir`.
///
/// Returns the rewritten source and the number of references rewritten.
pub fn convert_figures(
    source: &str,
    base_dir: &Path,
    work_dir: &Path,
    rasterizer: &dyn Rasterizer,
    diagnostics: &mut Diagnostics,
) -> (String, usize) {
    let mut search_dirs = graphics_paths(source, base_dir);
    search_dirs.push(base_dir.to_path_buf());

    let mut relocator = FigureRelocator {
        work_dir,
        rasterizer,
        search_dirs,
        placed: HashMap::new(),
        used_names: HashSet::new(),
        relocated: 0,
    };

    let text = INCLUDEGRAPHICS_RE
        .replace_all(source, |caps: &Captures| relocator.rewrite(caps, diagnostics))
        .into_owned();
    (text, relocator.relocated)
}
