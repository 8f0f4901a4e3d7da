//! Source format detection and output validation.

use crate::error::{Error, Result};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Manuscript source formats with a conversion route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// LaTeX source; normalized before conversion
    Latex,
    /// Markdown source; converted as-is
    Markdown,
}

impl SourceFormat {
    /// Detect the format from a file extension.
    ///
    /// # Example
    /// ```
    /// use texword::detect::SourceFormat;
    ///
    /// assert_eq!(SourceFormat::from_path("paper.tex").unwrap(), SourceFormat::Latex);
    /// assert!(SourceFormat::from_path("paper.pdf").is_err());
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "tex" | "latex" => Ok(SourceFormat::Latex),
            "md" | "markdown" => Ok(SourceFormat::Markdown),
            _ => Err(Error::UnsupportedSource(path.display().to_string())),
        }
    }

    /// Reader name passed to pandoc's `-f`.
    pub fn as_pandoc_format(&self) -> &'static str {
        match self {
            SourceFormat::Latex => "latex",
            SourceFormat::Markdown => "markdown",
        }
    }

    /// Whether the source goes through the normalizer.
    pub fn needs_normalization(&self) -> bool {
        matches!(self, SourceFormat::Latex)
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceFormat::Latex => "LaTeX",
            SourceFormat::Markdown => "Markdown",
        })
    }
}

/// ZIP local file header magic: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Check if bytes start like a DOCX (ZIP) package.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    data.starts_with(ZIP_MAGIC)
}

/// Check if a file starts like a DOCX (ZIP) package.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    let mut header = [0u8; 4];
    File::open(path)
        .and_then(|mut f| f.read_exact(&mut header))
        .map(|_| is_docx_bytes(&header))
        .unwrap_or(false)
}
