//! Removal of converter residue from the document body.

use crate::model::{Block, Document};

/// Residue tokens always removed: the engine turns the widest-label
/// argument of `thebibliography` into a stray paragraph.
pub const DEFAULT_RESIDUE_TOKENS: &[&str] = &["99", "100"];

/// Counts reported by [`ArtifactCleaner::clean`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupCounts {
    /// Residue-token paragraphs removed
    pub residue: usize,
    /// Redundant empty paragraphs removed
    pub empty: usize,
}

/// Removes stray residue paragraphs and collapses blank runs.
#[derive(Debug, Clone)]
pub struct ArtifactCleaner {
    tokens: Vec<String>,
}

impl ArtifactCleaner {
    /// Cleaner with the default residue tokens.
    pub fn new() -> Self {
        Self {
            tokens: DEFAULT_RESIDUE_TOKENS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Builder: add a residue token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        if !token.is_empty() && !self.tokens.contains(&token) {
            self.tokens.push(token);
        }
        self
    }

    /// Builder: add several residue tokens.
    pub fn with_tokens<I, S>(self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        tokens.into_iter().fold(self, |cleaner, t| cleaner.with_token(t))
    }

    /// Active residue tokens.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Run both sweeps: residue first, then empty-paragraph collapse.
    pub fn clean(&self, doc: &mut Document) -> CleanupCounts {
        let residue = self.remove_residue(doc);
        let empty = self.collapse_empty(doc);
        CleanupCounts { residue, empty }
    }

    /// Remove paragraphs whose trimmed text equals a residue token.
    ///
    /// Only paragraphs with at most one run qualify, so numeric content
    /// that carries its own formatting survives.
    pub fn remove_residue(&self, doc: &mut Document) -> usize {
        let before = doc.body.len();
        doc.body.retain(|block| match block {
            Block::Paragraph(p) => {
                let text = p.text();
                let is_token = self.tokens.iter().any(|t| t == text.trim());
                !(is_token && p.run_count() <= 1)
            }
            _ => true,
        });
        before - doc.body.len()
    }

    /// Collapse each run of consecutive empty paragraphs to one.
    pub fn collapse_empty(&self, doc: &mut Document) -> usize {
        let before = doc.body.len();
        let mut previous_empty = false;
        doc.body.retain(|block| {
            let empty = matches!(block, Block::Paragraph(p) if p.is_empty());
            let keep = !(empty && previous_empty);
            previous_empty = empty;
            keep
        });
        before - doc.body.len()
    }
}

impl Default for ArtifactCleaner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Paragraph, Run, RunProperties, Table};

    fn doc_of(texts: &[&str]) -> Document {
        let mut doc = Document::new();
        for text in texts {
            doc.add_paragraph(if text.is_empty() {
                Paragraph::new()
            } else {
                Paragraph::with_text(*text)
            });
        }
        doc
    }

    fn texts(doc: &Document) -> Vec<String> {
        doc.paragraphs().map(|p| p.text()).collect()
    }

    #[test]
    fn test_residue_exact_match_only() {
        let mut doc = doc_of(&["99", "99 bottles of beer", " 100 ", "Body"]);
        let removed = ArtifactCleaner::new().remove_residue(&mut doc);
        assert_eq!(removed, 2);
        assert_eq!(texts(&doc), vec!["99 bottles of beer", "Body"]);
    }

    #[test]
    fn test_residue_with_formatting_kept() {
        let mut doc = Document::new();
        let mut para = Paragraph::new();
        para.add_run(Run::text("9"));
        let mut bold = RunProperties::default();
        bold.bold = Some(true);
        para.add_run(Run::text("9").with_properties(bold));
        doc.add_paragraph(para);

        assert_eq!(ArtifactCleaner::new().remove_residue(&mut doc), 0);
    }

    #[test]
    fn test_extra_token() {
        let mut doc = doc_of(&["9", "999"]);
        let cleaner = ArtifactCleaner::new().with_token("9").with_token("9");
        assert_eq!(cleaner.tokens().len(), 3);
        assert_eq!(cleaner.remove_residue(&mut doc), 1);
        assert_eq!(texts(&doc), vec!["999"]);
    }

    #[test]
    fn test_collapse_empty_runs() {
        let mut doc = doc_of(&["", "", "", "Content"]);
        assert_eq!(ArtifactCleaner::new().collapse_empty(&mut doc), 2);
        assert_eq!(doc.body.len(), 2);

        let mut doc = doc_of(&["A", "", "B"]);
        assert_eq!(ArtifactCleaner::new().collapse_empty(&mut doc), 0);
    }

    #[test]
    fn test_non_paragraph_breaks_run() {
        let mut doc = doc_of(&["", ""]);
        doc.add_table(Table::from_rows([["x"]]));
        doc.add_paragraph(Paragraph::new());
        doc.add_paragraph(Paragraph::new());

        assert_eq!(ArtifactCleaner::new().collapse_empty(&mut doc), 2);
        assert_eq!(doc.body.len(), 3);
    }

    #[test]
    fn test_clean_counts() {
        let mut doc = doc_of(&["Intro", "", "99", "", "End"]);
        let counts = ArtifactCleaner::new().clean(&mut doc);
        assert_eq!(counts, CleanupCounts { residue: 1, empty: 1 });
        assert_eq!(texts(&doc), vec!["Intro", "", "End"]);
    }
}
