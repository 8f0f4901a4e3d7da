//! House-style configuration shared by every restyling pass.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Document style configuration.
///
/// Built once per conversion run from [`StyleConfig::default`] plus caller
/// overrides, validated, and then shared by reference. Lengths are in
/// centimetres, font sizes in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Body font family
    pub font_body: String,

    /// East-Asian fallback font family
    pub font_cjk: String,

    /// Body text size
    pub font_size_body: f32,

    /// Document title size
    pub font_size_title: f32,

    /// Section heading size
    pub font_size_h1: f32,

    /// Subsection heading size
    pub font_size_h2: f32,

    /// Subsubsection heading size
    pub font_size_h3: f32,

    /// Abstract body size
    pub font_size_abstract: f32,

    /// Table cell size
    pub font_size_table: f32,

    /// Footnote size
    pub font_size_note: f32,

    /// Reference list size
    pub font_size_ref: f32,

    /// Figure/table caption size
    pub font_size_caption: f32,

    /// Line spacing multiplier (2.0 = double)
    pub line_spacing: f32,

    /// Page width
    pub page_width: f32,

    /// Page height
    pub page_height: f32,

    /// Top margin
    pub margin_top: f32,

    /// Bottom margin
    pub margin_bottom: f32,

    /// Left margin
    pub margin_left: f32,

    /// Right margin
    pub margin_right: f32,

    /// Body first-line indent
    pub first_line_indent: f32,

    /// Spacing policy for reference-list entries
    pub reference_layout: ReferenceLayout,
}

/// Spacing policy for reference-list entries.
///
/// Both variants use a 1.27 cm hanging indent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceLayout {
    /// 1.5 line spacing, 3 pt after each entry
    #[default]
    Compact,
    /// Configured document line spacing, no extra space
    Document,
}

impl StyleConfig {
    /// Create the default house style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Substitute the body font family.
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font_body = font.into();
        self
    }

    /// Substitute the East-Asian fallback font family.
    pub fn with_cjk_font(mut self, font: impl Into<String>) -> Self {
        self.font_cjk = font.into();
        self
    }

    /// Override the body point size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size_body = size;
        self
    }

    /// Override the line-spacing multiplier.
    pub fn with_line_spacing(mut self, spacing: f32) -> Self {
        self.line_spacing = spacing;
        self
    }

    /// Set the reference-list spacing policy.
    pub fn with_reference_layout(mut self, layout: ReferenceLayout) -> Self {
        self.reference_layout = layout;
        self
    }

    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: StyleConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON override file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Point size for a heading level; levels outside 1..=3 use the level-1 size.
    pub fn heading_size(&self, level: u8) -> f32 {
        match level {
            2 => self.font_size_h2,
            3 => self.font_size_h3,
            _ => self.font_size_h1,
        }
    }

    /// Width of the text block (page width minus side margins).
    pub fn text_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Check every size/margin invariant.
    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("font_size_body", self.font_size_body),
            ("font_size_title", self.font_size_title),
            ("font_size_h1", self.font_size_h1),
            ("font_size_h2", self.font_size_h2),
            ("font_size_h3", self.font_size_h3),
            ("font_size_abstract", self.font_size_abstract),
            ("font_size_table", self.font_size_table),
            ("font_size_note", self.font_size_note),
            ("font_size_ref", self.font_size_ref),
            ("font_size_caption", self.font_size_caption),
            ("line_spacing", self.line_spacing),
            ("page_width", self.page_width),
            ("page_height", self.page_height),
        ];
        for (name, value) in sizes {
            if !(value > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let margins = [
            ("margin_top", self.margin_top),
            ("margin_bottom", self.margin_bottom),
            ("margin_left", self.margin_left),
            ("margin_right", self.margin_right),
        ];
        for (name, value) in margins {
            if !(value >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        if self.margin_left + self.margin_right >= self.page_width {
            return Err(Error::InvalidConfig(
                "left + right margins must be smaller than the page width".into(),
            ));
        }
        if self.margin_top + self.margin_bottom >= self.page_height {
            return Err(Error::InvalidConfig(
                "top + bottom margins must be smaller than the page height".into(),
            ));
        }
        if self.font_body.trim().is_empty() {
            return Err(Error::InvalidConfig("font_body must not be empty".into()));
        }

        Ok(())
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_body: "Times New Roman".to_string(),
            font_cjk: "宋体".to_string(),
            font_size_body: 12.0,
            font_size_title: 16.0,
            font_size_h1: 14.0,
            font_size_h2: 13.0,
            font_size_h3: 12.0,
            font_size_abstract: 11.0,
            font_size_table: 10.0,
            font_size_note: 9.0,
            font_size_ref: 11.0,
            font_size_caption: 10.0,
            line_spacing: 2.0,
            // US Letter
            page_width: 21.59,
            page_height: 27.94,
            margin_top: 2.54,
            margin_bottom: 2.54,
            margin_left: 2.54,
            margin_right: 2.54,
            first_line_indent: 1.27,
            reference_layout: ReferenceLayout::Compact,
        }
    }
}
