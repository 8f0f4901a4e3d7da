//! Named style definitions (`word/styles.xml`).

use super::{Element, ParagraphProperties, RunProperties};
use serde::{Deserialize, Serialize};

/// The document style sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSheet {
    /// Root attributes (namespace declarations)
    pub attributes: Vec<(String, String)>,

    /// Children preceding the style list (`w:docDefaults`, `w:latentStyles`)
    pub prelude: Vec<Element>,

    /// Style definitions in document order
    pub styles: Vec<StyleDefinition>,
}

impl StyleSheet {
    /// Create an empty style sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no styles are defined.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Look up a style by id.
    pub fn get(&self, id: &str) -> Option<&StyleDefinition> {
        self.styles.iter().find(|s| s.id == id)
    }

    /// Look up a style by id, mutably.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut StyleDefinition> {
        self.styles.iter_mut().find(|s| s.id == id)
    }

    /// Look up a style by display name or id, comparing normalized labels.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut StyleDefinition> {
        let wanted = normalize_label(name);
        let index = self
            .styles
            .iter()
            .position(|s| s.label() == wanted)
            .or_else(|| self.styles.iter().position(|s| normalize_label(&s.id) == wanted))?;
        self.styles.get_mut(index)
    }

    /// Normalized label for a style id, if the id is defined.
    pub fn label_for(&self, id: &str) -> Option<String> {
        self.get(id).map(StyleDefinition::label)
    }

    /// Add a style, replacing any definition with the same id.
    pub fn insert(&mut self, style: StyleDefinition) {
        match self.get_mut(&style.id) {
            Some(existing) => *existing = style,
            None => self.styles.push(style),
        }
    }

    /// Paragraph styles for documents built from scratch.
    ///
    /// Ids and names follow the conventions of pandoc's reference document
    /// so that assembled and converted documents classify identically.
    pub fn academic() -> Self {
        let mut sheet = Self::new();
        let mut normal = StyleDefinition::paragraph("Normal", "Normal");
        normal.attributes.push(("w:default".into(), "1".into()));
        sheet.insert(normal);

        for (id, name) in [
            ("BodyText", "Body Text"),
            ("FirstParagraph", "First Paragraph"),
            ("Compact", "Compact"),
            ("Title", "Title"),
            ("Author", "Author"),
            ("Date", "Date"),
            ("AbstractTitle", "Abstract Title"),
            ("Abstract", "Abstract"),
            ("Heading1", "heading 1"),
            ("Heading2", "heading 2"),
            ("Heading3", "heading 3"),
            ("Caption", "caption"),
            ("ImageCaption", "Image Caption"),
            ("TableCaption", "Table Caption"),
        ] {
            let mut style = StyleDefinition::paragraph(id, name);
            style.based_on = Some("Normal".into());
            sheet.insert(style);
        }
        sheet
    }
}

/// A single style definition (`w:style`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleDefinition {
    /// Style type (`paragraph`, `character`, `table`, `numbering`)
    pub kind: String,

    /// Style id (`w:styleId`)
    pub id: String,

    /// Display name (`w:name`)
    pub name: Option<String>,

    /// Parent style id (`w:basedOn`)
    pub based_on: Option<String>,

    /// Other attributes (`w:default`, `w:customStyle`)
    pub attributes: Vec<(String, String)>,

    /// Paragraph properties
    pub paragraph: Option<ParagraphProperties>,

    /// Run properties
    pub run: Option<RunProperties>,

    /// Uninterpreted children
    pub extra: Vec<Element>,
}

impl StyleDefinition {
    /// Create a paragraph style.
    pub fn paragraph(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: "paragraph".into(),
            id: id.into(),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Normalized label: display name (or id) lowercased without whitespace.
    pub fn label(&self) -> String {
        normalize_label(self.name.as_deref().unwrap_or(&self.id))
    }

    /// Paragraph properties, created on first access.
    pub fn paragraph_mut(&mut self) -> &mut ParagraphProperties {
        self.paragraph.get_or_insert_with(ParagraphProperties::default)
    }

    /// Run properties, created on first access.
    pub fn run_mut(&mut self) -> &mut RunProperties {
        self.run.get_or_insert_with(RunProperties::default)
    }
}

/// Lowercase a style name and drop whitespace (`Heading 1` → `heading1`).
pub fn normalize_label(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Heading 1"), "heading1");
        assert_eq!(normalize_label("heading 1"), "heading1");
        assert_eq!(normalize_label("Heading1"), "heading1");
        assert_eq!(normalize_label("Body Text"), "bodytext");
    }

    #[test]
    fn test_label_lookup() {
        let sheet = StyleSheet::academic();
        assert_eq!(sheet.label_for("Heading2").as_deref(), Some("heading2"));
        assert_eq!(sheet.label_for("FirstParagraph").as_deref(), Some("firstparagraph"));
        assert_eq!(sheet.label_for("Missing"), None);
    }

    #[test]
    fn test_find_by_name_or_id() {
        let mut sheet = StyleSheet::academic();
        assert_eq!(sheet.find_mut("Heading 1").map(|s| s.id.clone()).as_deref(), Some("Heading1"));
        assert_eq!(sheet.find_mut("normal").map(|s| s.id.clone()).as_deref(), Some("Normal"));
        assert!(sheet.find_mut("Heading 7").is_none());
    }

    #[test]
    fn test_insert_replaces() {
        let mut sheet = StyleSheet::new();
        sheet.insert(StyleDefinition::paragraph("Title", "Title"));
        sheet.insert(StyleDefinition::paragraph("Title", "Big Title"));
        assert_eq!(sheet.styles.len(), 1);
        assert_eq!(sheet.label_for("Title").as_deref(), Some("bigtitle"));
    }
}
