//! Soft-failure diagnostics accumulated over a conversion run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a recoverable problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// An `\input`/`\include` target does not exist.
    MissingInclude,
    /// Inclusion nesting exceeded the depth cap.
    IncludeDepthExceeded,
    /// An `\includegraphics` target could not be found.
    UnresolvedFigure,
    /// A figure was found but could not be rasterized or copied.
    FigureConversion,
    /// A citation referenced a key with no `\bibitem`.
    UnknownCitationKey,
    /// A `\bibitem` label matched no known author/year format.
    UnparsedBibLabel,
    /// A paragraph or style-sheet lookup named a style the document lacks.
    MissingStyle,
    /// The conversion engine wrote to stderr.
    ConverterWarning,
    /// The recognition service failed on a block.
    RecognitionFailed,
    /// A content block was dropped from an assembled document.
    SkippedBlock,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::MissingInclude => "missing-include",
            DiagnosticKind::IncludeDepthExceeded => "include-depth",
            DiagnosticKind::UnresolvedFigure => "unresolved-figure",
            DiagnosticKind::FigureConversion => "figure-conversion",
            DiagnosticKind::UnknownCitationKey => "unknown-citation-key",
            DiagnosticKind::UnparsedBibLabel => "unparsed-bib-label",
            DiagnosticKind::MissingStyle => "missing-style",
            DiagnosticKind::ConverterWarning => "converter-warning",
            DiagnosticKind::RecognitionFailed => "recognition-failed",
            DiagnosticKind::SkippedBlock => "skipped-block",
        };
        f.write_str(name)
    }
}

/// A single recoverable problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Problem category
    pub kind: DiagnosticKind,
    /// Human-readable detail
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Ordered collection of diagnostics.
///
/// Every pushed diagnostic is also logged at `warn` level. Nothing in the
/// pipeline branches on the collected contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn push(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            kind,
            message: message.into(),
        };
        log::warn!("{}", diagnostic);
        self.items.push(diagnostic);
    }

    /// Move all diagnostics from `other` into this collection.
    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// Number of diagnostics recorded.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Count diagnostics of one kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    /// Iterate over diagnostics in recording order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_count() {
        let mut diags = Diagnostics::new();
        diags.push(DiagnosticKind::MissingInclude, "sub.tex");
        diags.push(DiagnosticKind::UnknownCitationKey, "smith20");
        diags.push(DiagnosticKind::MissingInclude, "other.tex");

        assert_eq!(diags.len(), 3);
        assert_eq!(diags.count(DiagnosticKind::MissingInclude), 2);
        assert_eq!(diags.count(DiagnosticKind::MissingStyle), 0);
    }

    #[test]
    fn test_display() {
        let mut diags = Diagnostics::new();
        diags.push(DiagnosticKind::MissingStyle, "style 'Abstract' not defined");
        let first = diags.iter().next().unwrap();
        assert_eq!(
            first.to_string(),
            "[missing-style] style 'Abstract' not defined"
        );
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut a = Diagnostics::new();
        a.push(DiagnosticKind::MissingInclude, "a");
        let mut b = Diagnostics::new();
        b.push(DiagnosticKind::ConverterWarning, "b");
        a.extend(b);

        let kinds: Vec<_> = a.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::MissingInclude, DiagnosticKind::ConverterWarning]
        );
    }
}
