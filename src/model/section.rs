//! Section (page setup) types.

use super::Element;
use serde::{Deserialize, Serialize};

/// Final section properties of the body (`w:sectPr`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    /// Raw attributes (revision ids)
    pub attributes: Vec<(String, String)>,

    /// Page size (`w:pgSz`), in twips
    pub page_size: Option<PageSize>,

    /// Page margins (`w:pgMar`), in twips
    pub margins: Option<PageMargins>,

    /// Header part references
    pub header_refs: Vec<PartReference>,

    /// Footer part references
    pub footer_refs: Vec<PartReference>,

    /// Uninterpreted property elements (`w:cols`, `w:docGrid`, ...)
    pub extra: Vec<Element>,
}

impl SectionProperties {
    /// Relationship id of the default header, if referenced.
    pub fn default_header(&self) -> Option<&str> {
        find_default(&self.header_refs)
    }

    /// Relationship id of the default footer, if referenced.
    pub fn default_footer(&self) -> Option<&str> {
        find_default(&self.footer_refs)
    }

    /// Width of the text block in twips.
    pub fn text_width(&self) -> Option<i32> {
        let size = self.page_size.as_ref()?;
        let margins = self.margins.as_ref()?;
        Some(size.width as i32 - margins.left - margins.right)
    }
}

fn find_default(refs: &[PartReference]) -> Option<&str> {
    refs.iter()
        .find(|r| r.kind == "default")
        .map(|r| r.id.as_str())
}

/// Page dimensions in twips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSize {
    /// Page width
    pub width: u32,
    /// Page height
    pub height: u32,
    /// Orientation (`portrait` / `landscape`)
    pub orient: Option<String>,
}

/// Page margins in twips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMargins {
    /// Top margin
    pub top: i32,
    /// Right margin
    pub right: i32,
    /// Bottom margin
    pub bottom: i32,
    /// Left margin
    pub left: i32,
    /// Header distance from the top edge
    pub header: u32,
    /// Footer distance from the bottom edge
    pub footer: u32,
    /// Binding gutter
    pub gutter: u32,
}

impl Default for PageMargins {
    fn default() -> Self {
        Self {
            top: 1440,
            right: 1440,
            bottom: 1440,
            left: 1440,
            header: 720,
            footer: 720,
            gutter: 0,
        }
    }
}

/// A header or footer reference (`w:headerReference` / `w:footerReference`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartReference {
    /// Reference type (`default`, `first`, `even`)
    pub kind: String,
    /// Relationship id
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        let section = SectionProperties {
            page_size: Some(PageSize {
                width: 12240,
                height: 15840,
                orient: None,
            }),
            margins: Some(PageMargins::default()),
            ..Default::default()
        };
        assert_eq!(section.text_width(), Some(9360));
        assert_eq!(SectionProperties::default().text_width(), None);
    }

    #[test]
    fn test_default_reference_lookup() {
        let section = SectionProperties {
            header_refs: vec![
                PartReference {
                    kind: "first".into(),
                    id: "rId9".into(),
                },
                PartReference {
                    kind: "default".into(),
                    id: "rId8".into(),
                },
            ],
            ..Default::default()
        };
        assert_eq!(section.default_header(), Some("rId8"));
        assert_eq!(section.default_footer(), None);
    }
}
