//! Source normalization.
//!
//! Rewrites a LaTeX manuscript into a form the conversion engine handles
//! well. Stages run in a fixed order:
//!
//! 1. inclusion expansion (`\input`, `\include`)
//! 2. comment stripping
//! 3. figure relocation (PDF figures rasterized to PNG)
//! 4. citation resolution (natbib commands to plain text)
//! 5. compatibility rewrites and `amsmath` injection
//!
//! No stage fails hard; problems are collected as diagnostics.

pub mod citations;
pub mod comments;
pub mod compat;
pub mod figures;
pub mod include;

pub use citations::{bibliography_label, resolve_citations, BibEntry, Bibliography};
pub use comments::strip_comments;
pub use compat::{apply_compat_rewrites, inject_amsmath};
pub use figures::{convert_figures, PdftoppmRasterizer, Rasterizer};
pub use include::{expand_includes, MAX_INCLUDE_DEPTH};

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\title\{(?:\\textbf\{)?([^}]+)").unwrap());

const SHORT_TITLE_MAX: usize = 60;

/// Options for the normalization pass.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Render natbib citations to plain text
    pub resolve_citations: bool,

    /// Relocate and rasterize figures into the working directory
    pub convert_figures: bool,

    /// Nesting limit for `\input`/`\include`
    pub max_include_depth: usize,
}

impl NormalizeOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable citation resolution.
    pub fn with_citations(mut self, resolve: bool) -> Self {
        self.resolve_citations = resolve;
        self
    }

    /// Enable or disable figure relocation.
    pub fn with_figures(mut self, convert: bool) -> Self {
        self.convert_figures = convert;
        self
    }

    /// Set the inclusion nesting limit.
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            resolve_citations: true,
            convert_figures: true,
            max_include_depth: MAX_INCLUDE_DEPTH,
        }
    }
}

/// Output of a normalization pass.
#[derive(Debug, Clone, Default)]
pub struct NormalizedSource {
    /// Rewritten source text
    pub text: String,

    /// Problems encountered along the way
    pub diagnostics: Diagnostics,

    /// `\includegraphics` references rewritten to relocated files
    pub figures_converted: usize,

    /// Citation commands replaced with text
    pub citations_resolved: usize,

    /// Widest-label argument of `thebibliography`, if any
    pub bibliography_label: Option<String>,
}

/// Runs the normalization stages over a manuscript.
pub struct Normalizer<'a> {
    rasterizer: &'a dyn Rasterizer,
    options: NormalizeOptions,
}

impl<'a> Normalizer<'a> {
    /// Create a normalizer with default options.
    pub fn new(rasterizer: &'a dyn Rasterizer) -> Self {
        Self {
            rasterizer,
            options: NormalizeOptions::default(),
        }
    }

    /// Builder: replace the options.
    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    /// Normalize `source`.
    ///
    /// Includes and figures resolve against `base_dir`; relocated figures are
    /// written into `work_dir`.
    pub fn normalize(&self, source: &str, base_dir: &Path, work_dir: &Path) -> NormalizedSource {
        let mut diagnostics = Diagnostics::new();

        let text = expand_includes(
            source,
            base_dir,
            self.options.max_include_depth,
            &mut diagnostics,
        );
        let text = strip_comments(&text);

        let (text, figures_converted) = if self.options.convert_figures {
            convert_figures(&text, base_dir, work_dir, self.rasterizer, &mut diagnostics)
        } else {
            (text, 0)
        };

        let bibliography_label = bibliography_label(&text);
        let (text, citations_resolved) = if self.options.resolve_citations {
            resolve_citations(&text, &mut diagnostics)
        } else {
            (text, 0)
        };

        let text = apply_compat_rewrites(&text);

        log::info!(
            "Normalized source: {} figures, {} citations, {} diagnostics",
            figures_converted,
            citations_resolved,
            diagnostics.len()
        );

        NormalizedSource {
            text,
            diagnostics,
            figures_converted,
            citations_resolved,
            bibliography_label,
        }
    }

    /// Read and normalize a file, resolving against its directory.
    pub fn normalize_file<P: AsRef<Path>>(&self, path: P, work_dir: &Path) -> Result<NormalizedSource> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::SourceNotFound(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Ok(self.normalize(&source, base_dir, work_dir))
    }
}

/// Running-head title from `\title{...}`.
///
/// A leading `\textbf{` is unwrapped and the title is cut at the first `\\`.
/// Titles over 60 characters are truncated to 57 plus `...`.
pub fn extract_short_title(source: &str) -> Option<String> {
    let caps = TITLE_RE.captures(source)?;
    let raw = &caps[1];
    let title = raw.split("\\\\").next().unwrap_or(raw).trim();
    if title.is_empty() {
        return None;
    }
    if title.chars().count() > SHORT_TITLE_MAX {
        let cut: String = title.chars().take(SHORT_TITLE_MAX - 3).collect();
        Some(format!("{}...", cut.trim_end()))
    } else {
        Some(title.to_string())
    }
}
